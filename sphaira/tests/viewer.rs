use std::time::Instant;

use render::{Channel, Extent, SchedulerConfig};
use scene::{Camera, ManipulationConfig, Scene, Sphere, Vec2, Vec3};
use sphaira::{InputEvent, MouseButton, Viewer};

fn viewer() -> Viewer {
    let mut scene = Scene::new(ManipulationConfig::default());
    scene.add_gen_sphere(Sphere::new(Vec3::ZERO, 1.0));
    let camera = Camera::new(Vec3::new(0.0, 0.0, 20.0), Vec3::ZERO, Vec3::Y, 60.0);
    Viewer::new(scene, camera, SchedulerConfig::default(), Extent::new(800, 600)).unwrap()
}

fn right_down(position: Vec2) -> InputEvent {
    InputEvent::PointerDown {
        button: MouseButton::Right,
        position,
    }
}

#[test]
fn scale_drag_renders_both_channels_until_release() {
    let mut v = viewer();
    let now = Instant::now();
    v.handle(right_down(Vec2::new(400.0, 310.0)), now);
    v.handle(InputEvent::PointerUp { button: MouseButton::Right }, now);
    v.frame(now);

    v.handle(InputEvent::KeyDown('s'), now);
    assert!(v.scene().is_scale_armed());
    v.handle(right_down(Vec2::new(500.0, 300.0)), now);
    v.handle(
        InputEvent::PointerMove {
            position: Vec2::new(550.0, 300.0),
        },
        now,
    );
    assert!(v.scene().is_parameter_changing());
    assert!((v.scene().gen_spheres()[0].radius - 51.0).abs() < 1e-9);

    let passes = v.frame(now);
    let channels: Vec<Channel> = passes.iter().map(|p| p.channel).collect();
    assert_eq!(channels, vec![Channel::Preview, Channel::Full]);
    assert!(passes.iter().all(|p| p.num_samples == 0));

    v.handle(InputEvent::PointerUp { button: MouseButton::Right }, now);
    v.handle(InputEvent::KeyUp('s'), now);
    assert!(!v.scene().is_parameter_changing());
    assert!(!v.scene().is_scale_armed());
    let passes = v.frame(now);
    assert_eq!(passes.len(), 1);
    assert_eq!(passes[0].channel, Channel::Preview);
}

#[test]
fn wheel_zooms_and_restarts_the_full_image() {
    let mut v = viewer();
    let now = Instant::now();
    let passes = v.handle(InputEvent::Wheel { delta_y: -1.0 }, now);
    assert_eq!(passes.len(), 1);
    assert_eq!(passes[0].channel, Channel::Full);
    assert_eq!(passes[0].num_samples, 0);
    assert!((v.camera().position().z - 20.0 / 1.2).abs() < 1e-9);

    v.handle(InputEvent::Wheel { delta_y: 0.0 }, now);
    assert!((v.camera().position().z - 20.0).abs() < 1e-9);
}

#[test]
fn empty_click_clears_the_selection() {
    let mut v = viewer();
    let now = Instant::now();
    v.handle(right_down(Vec2::new(400.0, 300.0)), now);
    assert!(v.scene().selection().is_some());
    v.handle(InputEvent::PointerUp { button: MouseButton::Right }, now);
    v.handle(right_down(Vec2::new(10.0, 10.0)), now);
    assert!(v.scene().selection().is_none());
}

#[test]
fn resize_rebuilds_the_screen_transform() {
    let mut v = viewer();
    v.resize(Extent::new(400, 200)).unwrap();
    assert_eq!(v.scheduler().full().extent(), Extent::new(400, 200));
    assert_eq!(v.scheduler().preview().extent(), Extent::new(200, 100));
    let top_left = v.raster_to_screen().apply_to_point(Vec3::ZERO);
    assert!((top_left - Vec3::new(-2.0, 1.0, 0.0)).length() < 1e-12);
    assert!(v.resize(Extent::new(0, 200)).is_err());
    assert_eq!(v.scheduler().full().extent(), Extent::new(400, 200));
}
