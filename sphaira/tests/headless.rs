use render::{Extent, RowOrder, SchedulerConfig};
use scene::{default_scene, CameraConfig, ManipulationConfig};
use sphaira::export::save_png;
use sphaira::{run_headless, Viewer};

fn default_viewer(extent: Extent) -> Viewer {
    let desc = default_scene();
    let camera = desc.camera(CameraConfig::default());
    let scene = desc.into_scene(ManipulationConfig::default()).unwrap();
    Viewer::new(scene, camera, SchedulerConfig::default(), extent).unwrap()
}

#[test]
fn headless_run_accumulates_the_full_image() {
    let mut viewer = default_viewer(Extent::new(32, 24));
    let report = run_headless(&mut viewer, 6).unwrap();
    assert_eq!(report.samples, 6);
    assert_eq!(report.passes, 6);
    assert_eq!(report.image.extent(), Extent::new(32, 24));
    assert_eq!(report.image.rows, RowOrder::TopDown);

    // Centre sees the sphere facing the camera; the top corner sees sky.
    let centre = report.image.pixel_top_down(16, 12);
    let corner = report.image.pixel_top_down(0, 0);
    assert!(centre[0] > 0.6, "centre {centre:?}");
    assert!(corner[0] < 0.4, "corner {corner:?}");
    assert!(report.image.data.chunks_exact(4).all(|px| (px[3] - 1.0).abs() < 1e-6));
}

#[test]
fn headless_image_saves_as_png() {
    let mut viewer = default_viewer(Extent::new(16, 12));
    let report = run_headless(&mut viewer, 2).unwrap();
    let path = std::env::temp_dir().join(format!("sphaira-headless-{}.png", std::process::id()));
    save_png(&path, &report.image).unwrap();

    let png = image::open(&path).unwrap().to_rgba8();
    assert_eq!(png.dimensions(), (16, 12));
    assert_eq!(png.get_pixel(0, 0)[3], 255);
    std::fs::remove_file(&path).unwrap();
}
