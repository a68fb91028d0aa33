use scene::{
    raster_to_screen, Camera, CameraConfig, Component, ManipulationConfig, Ray, Scene, SceneDesc, SceneError,
    SceneEvent, ShapeId, ShapeKind, Sphere, Vec2, Vec3,
};
use std::fs;

const W: f64 = 800.0;
const H: f64 = 600.0;

fn front_camera() -> Camera {
    Camera::new(Vec3::new(0.0, 0.0, 20.0), Vec3::ZERO, Vec3::Y, 60.0)
}

fn load(name: &str) -> (Camera, Scene) {
    let json = fs::read_to_string(format!("tests/data/{name}")).unwrap();
    let desc = json.parse::<SceneDesc>().unwrap();
    let camera = desc.camera(CameraConfig::default());
    (camera, desc.into_scene(ManipulationConfig::default()).unwrap())
}

#[test]
fn parse_triangle_scene() {
    let (camera, scene) = load("triangle.json");
    let ctx = scene.shader_context();
    assert_eq!(ctx.num_gen_spheres, 2);
    assert_eq!(ctx.num_gen_planes, 1);
    assert_eq!(ctx.num_divide_planes, 1);
    assert_eq!(ctx.num_control_points, 1);
    assert!((camera.distance_to_target() - 20.0).abs() < 1e-12);
    assert!((scene.control_point("apex").unwrap().radius - 0.2).abs() < f64::EPSILON);
}

#[test]
fn duplicate_control_points_fail_to_load() {
    let json = fs::read_to_string("tests/data/duplicate_points.json").unwrap();
    let err = json.parse::<SceneDesc>()
        .unwrap()
        .into_scene(ManipulationConfig::default());
    assert!(matches!(err, Err(SceneError::DuplicateControlPoint(name)) if name == "p"));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = r#"{ "primitives": [ { "kind": "torus" } ] }"#.parse::<SceneDesc>();
    assert!(matches!(err, Err(SceneError::Parse(_))));
}

#[test]
fn click_selects_the_nearest_sphere() {
    let mut scene = Scene::default();
    scene.add_gen_sphere(Sphere::new(Vec3::ZERO, 1.0));
    let near = scene.add_gen_sphere(Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0));
    let cam = front_camera();
    let rts = raster_to_screen(W, H);

    assert!(scene.mouse_right_down(&cam, Vec2::new(W / 2.0, H / 2.0), &rts));
    assert_eq!(scene.selection(), Some(near));
    assert_eq!(scene.selected_axis(), None);
}

#[test]
fn equal_distance_keeps_the_first_primitive() {
    let mut scene = Scene::default();
    let first = scene.add_gen_sphere(Sphere::new(Vec3::ZERO, 1.0));
    scene.add_gen_sphere(Sphere::new(Vec3::ZERO, 1.0));
    let ray = Ray::new(Vec3::new(0.0, 0.0, 20.0), Vec3::new(0.0, 0.0, -1.0));
    let info = scene.cast(&ray);
    assert_eq!(info.hit_object, Some(first));
    assert!((info.tmin - 19.0).abs() < 1e-9);
}

#[test]
fn planes_and_control_points_are_pickable() {
    let (_, scene) = load("triangle.json");

    let down = Ray::new(Vec3::new(0.5, 10.0, 5.0), Vec3::new(0.0, -1.0, 0.0));
    assert_eq!(scene.cast(&down).hit_object, None);

    let floor = Ray::new(Vec3::new(0.5, -1.0, 0.5), Vec3::new(0.0, -1.0, 0.0));
    assert_eq!(scene.cast(&floor).hit_object, Some(ShapeId::new(ShapeKind::GenPlane, 0)));

    let sideways = Ray::new(Vec3::new(-10.0, 0.2, 0.0), Vec3::X);
    let info = scene.cast(&sideways);
    assert_eq!(info.hit_object, Some(ShapeId::new(ShapeKind::DividePlane, 0)));
    assert!((info.tmin - 7.0).abs() < 1e-9);

    let at_apex = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
    let info = scene.cast(&at_apex);
    assert_eq!(info.hit_object, Some(ShapeId::new(ShapeKind::ControlPoint, 0)));
    assert_eq!(info.component, Component::Body);
    assert!((info.tmin - 6.8).abs() < 1e-9);
}

#[test]
fn clicking_empty_space_clears_the_selection() {
    let mut scene = Scene::default();
    let id = scene.add_gen_sphere(Sphere::new(Vec3::ZERO, 1.0));
    let cam = front_camera();
    let rts = raster_to_screen(W, H);

    assert!(scene.mouse_right_down(&cam, Vec2::new(W / 2.0, H / 2.0), &rts));
    scene.mouse_up();
    assert!(scene.mouse_right_down(&cam, Vec2::new(5.0, 5.0), &rts));
    assert_eq!(scene.selection(), None);

    let events = scene.drain_events();
    assert_eq!(
        events,
        vec![
            SceneEvent::SelectionChanged {
                previous: None,
                current: Some(id)
            },
            SceneEvent::SelectionChanged {
                previous: Some(id),
                current: None
            },
        ]
    );
    assert!(scene.drain_events().is_empty());
}

#[test]
fn reclicking_the_selection_reports_no_change() {
    let mut scene = Scene::default();
    scene.add_gen_sphere(Sphere::new(Vec3::new(3.0, 0.0, 0.0), 1.0));
    let cam = front_camera();
    let rts = raster_to_screen(W, H);
    let at = cam.project(Vec3::new(3.0, 0.0, 0.0), &rts);
    // Offset in y so the click misses the handles drawn at the centre.
    let click = at + Vec2::new(0.0, 12.0);

    assert!(scene.mouse_right_down(&cam, click, &rts));
    scene.mouse_up();
    assert!(!scene.mouse_right_down(&cam, click, &rts));
    assert!(scene.selection().is_some());
}
