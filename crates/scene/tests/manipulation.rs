use scene::{raster_to_screen, Axis, Camera, Scene, SceneEvent, Shape, Sphere, Transform, Vec2, Vec3, MIN_SCALE};

const W: f64 = 800.0;
const H: f64 = 600.0;

struct Fixture {
    camera: Camera,
    rts: Transform,
    scene: Scene,
}

fn fixture() -> Fixture {
    let mut scene = Scene::default();
    scene.add_gen_sphere(Sphere::new(Vec3::ZERO, 1.0));
    Fixture {
        camera: Camera::new(Vec3::new(0.0, 0.0, 20.0), Vec3::ZERO, Vec3::Y, 60.0),
        rts: raster_to_screen(W, H),
        scene,
    }
}

impl Fixture {
    fn px(&self, p: Vec3) -> Vec2 {
        self.camera.project(p, &self.rts)
    }

    fn select_centre(&mut self) {
        let c = self.px(Vec3::ZERO) + Vec2::new(0.0, 12.0);
        assert!(self.scene.mouse_right_down(&self.camera, c, &self.rts));
        self.scene.mouse_up();
    }

    fn origin(&self) -> Vec3 {
        self.scene.shape(self.scene.selection().unwrap()).unwrap().origin()
    }
}

#[test]
fn x_handle_drag_follows_world_offset() {
    let mut f = fixture();
    f.select_centre();

    let grab = f.px(Vec3::new(0.5, 0.0, 0.0));
    assert!(!f.scene.mouse_right_down(&f.camera, grab, &f.rts));
    assert_eq!(f.scene.selected_axis(), Some(Axis::X));

    let delta = f.px(Vec3::new(1.0, 0.0, 0.0)) - f.px(Vec3::ZERO);
    assert!(f.scene.mouse_right_move(&f.camera, grab + delta, &f.rts).unwrap());
    assert!(f.scene.is_parameter_changing());

    let o = f.origin();
    assert!((o.x - 1.0).abs() < 1e-3, "x = {}", o.x);
    assert_eq!(o.y, 0.0);
    assert_eq!(o.z, 0.0);
}

#[test]
fn mouse_up_clears_axis_and_keeps_origin() {
    let mut f = fixture();
    f.select_centre();
    let grab = f.px(Vec3::new(0.5, 0.0, 0.0));
    f.scene.mouse_right_down(&f.camera, grab, &f.rts);
    let delta = f.px(Vec3::new(1.0, 0.0, 0.0)) - f.px(Vec3::ZERO);
    f.scene.mouse_right_move(&f.camera, grab + delta, &f.rts).unwrap();
    let moved = f.origin();

    f.scene.mouse_up();
    assert_eq!(f.scene.selected_axis(), None);
    assert!(!f.scene.is_parameter_changing());
    assert!(!f.scene.is_dragging());
    assert!(f.scene.selection().is_some());
    assert_eq!(f.origin(), moved);

    // Further moves without a button do nothing.
    assert!(!f.scene.mouse_right_move(&f.camera, grab, &f.rts).unwrap());
    assert_eq!(f.origin(), moved);
}

#[test]
fn drag_steps_are_measured_from_the_grab_point() {
    let mut f = fixture();
    f.select_centre();
    let grab = f.px(Vec3::new(0.5, 0.0, 0.0));
    f.scene.mouse_right_down(&f.camera, grab, &f.rts);
    let delta = f.px(Vec3::new(1.0, 0.0, 0.0)) - f.px(Vec3::ZERO);

    for k in 1..=4 {
        let step = f64::from(k) * 0.25;
        f.scene.mouse_right_move(&f.camera, grab + delta * step, &f.rts).unwrap();
    }
    let stepped = f.origin();

    let mut g = fixture();
    g.select_centre();
    g.scene.mouse_right_down(&g.camera, grab, &g.rts);
    g.scene.mouse_right_move(&g.camera, grab + delta, &g.rts).unwrap();
    assert!((stepped - g.origin()).length() < 1e-12);
}

#[test]
fn y_handle_uses_a_wider_cylinder() {
    let mut f = fixture();
    f.select_centre();

    let grab = f.px(Vec3::new(0.0, 0.5, 0.0));
    f.scene.mouse_right_down(&f.camera, grab, &f.rts);
    assert_eq!(f.scene.selected_axis(), Some(Axis::Y));

    let delta = f.px(Vec3::new(0.0, 1.0, 0.0)) - f.px(Vec3::ZERO);
    assert!(f.scene.mouse_right_move(&f.camera, grab + delta, &f.rts).unwrap());

    let o = f.origin();
    assert!((o.y - 1.0).abs() < 1e-3, "y = {}", o.y);
    assert_eq!(o.x, 0.0);
    assert_eq!(o.z, 0.0);
}

#[test]
fn perpendicular_mouse_motion_does_not_move_along_x() {
    let mut f = fixture();
    f.select_centre();
    let grab = f.px(Vec3::new(0.5, 0.0, 0.0));
    f.scene.mouse_right_down(&f.camera, grab, &f.rts);
    f.scene.mouse_right_move(&f.camera, grab + Vec2::new(0.0, 40.0), &f.rts).unwrap();
    // The drag ray passes through the old centre, landing within r of it.
    assert!(f.origin().x.abs() < 1e-3);
}

#[test]
fn scale_drag_adds_radial_travel_to_the_start_scale() {
    let mut f = fixture();
    f.select_centre();
    f.scene.key_down('s');
    assert!(f.scene.is_scale_armed());
    let id = f.scene.selection().unwrap();

    let start = f.px(Vec3::new(1.0, 0.0, 0.0));
    assert!(!f.scene.mouse_right_down(&f.camera, start, &f.rts));
    assert_eq!(f.scene.selected_axis(), None);
    assert!(f.scene.mouse_right_move(&f.camera, start + Vec2::new(50.0, 0.0), &f.rts).unwrap());
    assert!((f.scene.shape(id).unwrap().scale() - 51.0).abs() < 1e-9);
    assert_eq!(f.origin(), Vec3::ZERO);

    // Each step measures from the press, not from the previous step.
    f.scene.mouse_right_move(&f.camera, start + Vec2::new(20.0, 0.0), &f.rts).unwrap();
    assert!((f.scene.shape(id).unwrap().scale() - 21.0).abs() < 1e-9);
    f.scene.mouse_up();

    // A new press starts from the grown scale; moving inward shrinks it.
    let outer = start + Vec2::new(20.0, 0.0);
    f.scene.mouse_right_down(&f.camera, outer, &f.rts);
    f.scene.mouse_right_move(&f.camera, outer - Vec2::new(15.0, 0.0), &f.rts).unwrap();
    assert!((f.scene.shape(id).unwrap().scale() - 6.0).abs() < 1e-9);
    f.scene.mouse_up();

    f.scene.key_up('s');
    assert!(!f.scene.is_scale_armed());
}

#[test]
fn scale_drag_clamps_at_the_minimum() {
    let mut f = fixture();
    f.select_centre();
    f.scene.key_down('s');
    let id = f.scene.selection().unwrap();

    let start = f.px(Vec3::new(1.0, 0.0, 0.0));
    f.scene.mouse_right_down(&f.camera, start, &f.rts);
    f.scene.mouse_right_move(&f.camera, start - Vec2::new(10.0, 0.0), &f.rts).unwrap();
    assert_eq!(f.scene.shape(id).unwrap().scale(), MIN_SCALE);
}

#[test]
fn drag_steps_queue_parameter_events() {
    let mut f = fixture();
    f.select_centre();
    let id = f.scene.selection().unwrap();
    f.scene.drain_events();

    let grab = f.px(Vec3::new(0.5, 0.0, 0.0));
    f.scene.mouse_right_down(&f.camera, grab, &f.rts);
    f.scene.mouse_right_move(&f.camera, grab + Vec2::new(5.0, 0.0), &f.rts).unwrap();
    f.scene.mouse_right_move(&f.camera, grab + Vec2::new(10.0, 0.0), &f.rts).unwrap();

    let events = f.scene.drain_events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(SceneEvent::is_parameter_change));
    assert_eq!(events[0], SceneEvent::ParameterChanged { id });
}
