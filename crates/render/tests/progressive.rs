use std::time::{Duration, Instant};

use render::{
    export_full, Channel, CpuBackend, Extent, FrameSnapshot, RenderBackend, RenderError, RenderPass, RenderScheduler,
    RowOrder, SchedulerConfig, TickInput, UniformValues,
};
use scene::{Camera, Scene, Vec3};

const QUIET: TickInput = TickInput {
    parameter_changing: false,
};
const CHANGING: TickInput = TickInput {
    parameter_changing: true,
};

fn scheduler(config: SchedulerConfig) -> RenderScheduler {
    RenderScheduler::new(config, Extent::new(16, 12)).unwrap()
}

#[test]
fn parameter_change_restarts_preview_accumulation() {
    let mut s = scheduler(SchedulerConfig::default());
    let now = Instant::now();
    for _ in 0..50 {
        s.tick(QUIET, now);
    }
    assert_eq!(s.preview().num_samples(), 50);

    let passes = s.tick(CHANGING, now);
    assert_eq!(passes.len(), 2);
    let preview = passes[0];
    assert_eq!(preview.channel, Channel::Preview);
    assert_eq!(preview.num_samples, 0);
    assert_eq!(preview.texture_weight, 0.0);
    assert_eq!(passes[1].channel, Channel::Full);
    assert_eq!(s.preview().num_samples(), 1);
    assert_eq!(s.full().num_samples(), 0);
}

#[test]
fn parameter_change_restarts_a_free_running_full_image() {
    let mut s = scheduler(SchedulerConfig {
        keep_sampling_full: true,
        keep_sampling_preview: false,
        ..SchedulerConfig::default()
    });
    let now = Instant::now();
    for _ in 0..10 {
        s.tick(QUIET, now);
    }
    assert_eq!(s.full().num_samples(), 10);

    let passes = s.tick(CHANGING, now);
    assert_eq!(passes[1].channel, Channel::Full);
    assert_eq!(passes[1].num_samples, 0);
    assert_eq!(passes[1].texture_weight, 0.0);
    assert_eq!(s.full().num_samples(), 1);
}

#[test]
fn debounce_adds_one_full_pass_after_quiet_period() {
    let config = SchedulerConfig {
        low_res_interaction: true,
        keep_sampling_preview: false,
        ..SchedulerConfig::default()
    };
    let mut s = scheduler(config);
    let t0 = Instant::now();

    let pass = s.call_render(t0).unwrap();
    assert_eq!(pass.channel, Channel::Preview);
    assert!(s.is_debounce_armed());

    assert!(s.tick(QUIET, t0 + Duration::from_millis(100)).is_empty());
    let passes = s.tick(QUIET, t0 + Duration::from_millis(200));
    assert_eq!(passes.len(), 1);
    assert_eq!(passes[0].channel, Channel::Full);
    assert!(s.tick(QUIET, t0 + Duration::from_millis(400)).is_empty());
}

#[test]
fn further_interaction_postpones_the_full_pass() {
    let config = SchedulerConfig {
        low_res_interaction: true,
        keep_sampling_preview: false,
        ..SchedulerConfig::default()
    };
    let mut s = scheduler(config);
    let t0 = Instant::now();

    s.call_render(t0);
    s.call_render(t0 + Duration::from_millis(150));
    assert!(s.tick(QUIET, t0 + Duration::from_millis(250)).is_empty());
    let full: Vec<RenderPass> = s.tick(QUIET, t0 + Duration::from_millis(350));
    assert_eq!(full.len(), 1);
}

#[test]
fn preview_that_keeps_sampling_never_arms_the_debounce() {
    let config = SchedulerConfig {
        low_res_interaction: true,
        ..SchedulerConfig::default()
    };
    let mut s = scheduler(config);
    let t0 = Instant::now();
    s.call_render(t0);
    assert!(!s.is_debounce_armed());
}

#[test]
fn wheel_restarts_the_full_image() {
    let config = SchedulerConfig {
        keep_sampling_full: true,
        keep_sampling_preview: false,
        ..SchedulerConfig::default()
    };
    let mut s = scheduler(config);
    let now = Instant::now();
    for _ in 0..10 {
        s.tick(QUIET, now);
    }
    assert_eq!(s.full().num_samples(), 10);

    let pass = s.wheel(now).unwrap();
    assert_eq!(pass.channel, Channel::Full);
    assert_eq!(pass.num_samples, 0);
    assert_eq!(s.full().num_samples(), 1);
}

#[test]
fn resize_rejects_empty_canvas() {
    let mut s = scheduler(SchedulerConfig::default());
    assert!(matches!(
        s.resize(Extent::new(0, 0)),
        Err(RenderError::EmptyTarget { .. })
    ));
    assert_eq!(s.full().extent(), Extent::new(16, 12));
    s.resize(Extent::new(40, 30)).unwrap();
    assert_eq!(s.preview().extent(), Extent::new(20, 15));
}

#[test]
fn cpu_backend_converges_to_the_sample_mean() {
    let config = SchedulerConfig {
        keep_sampling_full: true,
        keep_sampling_preview: false,
        ..SchedulerConfig::default()
    };
    let mut s = scheduler(config);
    let scene = Scene::default();
    let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y, 60.0);
    // Sub-pixel offset along x; uniform jitter averages to the pixel centre.
    let shader = |_: &UniformValues, frag: [f32; 2]| Ok::<_, RenderError>([frag[0].fract(), 0.0, 0.0, 1.0]);
    let mut backend = CpuBackend::new(
        shader,
        &scene.shader_context(),
        s.full().extent(),
        s.preview().extent(),
    )
    .with_seed(7);

    let now = Instant::now();
    for _ in 0..200 {
        for pass in s.tick(QUIET, now) {
            let frame = FrameSnapshot {
                scene: &scene,
                camera: &camera,
                pass: &pass,
                max_iterations: 1,
                fudge_factor: 0.2,
            };
            backend.render(&frame).unwrap();
        }
    }
    assert_eq!(s.full().num_samples(), 200);

    let image = export_full(&backend, &s).unwrap();
    assert_eq!(image.rows, RowOrder::TopDown);
    let mean = image.data.chunks(4).map(|p| p[0]).sum::<f32>() / (16.0 * 12.0);
    assert!((mean - 0.5).abs() < 0.05, "mean {mean}");
}
