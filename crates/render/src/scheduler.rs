//! Frame-driven render scheduling
//!
//! Once per frame the owner calls [`RenderScheduler::tick`] with the scene's
//! `parameter_changing` flag. The scheduler picks one row of
//!
//! | condition                    | passes                              |
//! |------------------------------|-------------------------------------|
//! | parameters changing          | reset, one preview and one full     |
//! | camera moving                | one full                            |
//! | a channel keeps sampling     | one more sample on that channel     |
//! | otherwise                    | none                                |
//!
//! and then polls the debounce, which adds a single full pass once
//! low-resolution rendering has been quiet for the configured delay.
//! The returned passes are executed in order by a [`crate::RenderBackend`].

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::accumulation::{AccumulationChannel, Channel, Extent, RenderPass};
use crate::debounce::Debounce;
use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// Preview size relative to the full target.
    pub preview_ratio: f64,
    pub debounce: Duration,
    pub max_samples: u32,
    pub max_iterations: u32,
    pub fudge_factor: f32,
    pub keep_sampling_full: bool,
    pub keep_sampling_preview: bool,
    /// Route interactive renders through the preview channel.
    pub low_res_interaction: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            preview_ratio: 0.5,
            debounce: Duration::from_millis(200),
            max_samples: 1024,
            max_iterations: 50,
            fudge_factor: 0.2,
            keep_sampling_full: false,
            keep_sampling_preview: true,
            low_res_interaction: false,
        }
    }
}

/// Scene-side state the scheduler reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickInput {
    pub parameter_changing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    ParameterChanging,
    CameraMoving,
    FreeRunning(Channel),
    Idle,
}

#[derive(Debug, Clone)]
pub struct RenderScheduler {
    config: SchedulerConfig,
    full: AccumulationChannel,
    preview: AccumulationChannel,
    debounce: Debounce,
    camera_active: bool,
}

impl RenderScheduler {
    /// # Errors
    ///
    /// Fails when `full` has no pixels.
    pub fn new(config: SchedulerConfig, full: Extent) -> Result<Self, RenderError> {
        if full.is_empty() {
            return Err(RenderError::EmptyTarget {
                width: full.width,
                height: full.height,
            });
        }
        let preview = full.scaled(config.preview_ratio);
        debug!(?full, ?preview, "render scheduler created");
        Ok(Self {
            config,
            full: AccumulationChannel::new(Channel::Full, full, config.max_samples, config.keep_sampling_full),
            preview: AccumulationChannel::new(
                Channel::Preview,
                preview,
                config.max_samples,
                config.keep_sampling_preview,
            ),
            debounce: Debounce::new(config.debounce),
            camera_active: false,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    #[must_use]
    pub const fn full(&self) -> &AccumulationChannel {
        &self.full
    }

    #[must_use]
    pub const fn preview(&self) -> &AccumulationChannel {
        &self.preview
    }

    #[must_use]
    pub const fn channel(&self, channel: Channel) -> &AccumulationChannel {
        match channel {
            Channel::Full => &self.full,
            Channel::Preview => &self.preview,
        }
    }

    pub fn channel_mut(&mut self, channel: Channel) -> &mut AccumulationChannel {
        match channel {
            Channel::Full => &mut self.full,
            Channel::Preview => &mut self.preview,
        }
    }

    #[must_use]
    pub const fn is_camera_active(&self) -> bool {
        self.camera_active
    }

    #[must_use]
    pub const fn is_debounce_armed(&self) -> bool {
        self.debounce.is_armed()
    }

    /// Resize both channels to follow a new canvas size.
    ///
    /// # Errors
    ///
    /// Fails when `full` has no pixels; the old sizes are kept.
    pub fn resize(&mut self, full: Extent) -> Result<(), RenderError> {
        if full.is_empty() {
            return Err(RenderError::EmptyTarget {
                width: full.width,
                height: full.height,
            });
        }
        self.full.set_extent(full);
        self.preview.set_extent(full.scaled(self.config.preview_ratio));
        debug!(?full, "render targets resized");
        Ok(())
    }

    /// Camera drag started. The full image restarts from scratch.
    pub fn begin_camera_move(&mut self) {
        self.full.reset();
        self.camera_active = true;
    }

    /// Pointer or key released; the full channel stops tracking the camera.
    pub fn end_camera_move(&mut self) {
        self.camera_active = false;
    }

    /// Drop every accumulated sample on both channels.
    pub fn reset(&mut self) {
        self.full.reset();
        self.preview.reset();
    }

    /// Wheel zoom: reset and render immediately.
    pub fn wheel(&mut self, now: Instant) -> Option<RenderPass> {
        self.reset();
        self.call_render(now)
    }

    /// Interactive render: the preview path when low-resolution interaction
    /// is enabled, a full pass otherwise.
    pub fn call_render(&mut self, now: Instant) -> Option<RenderPass> {
        if self.config.low_res_interaction {
            self.render_low_res(now)
        } else {
            self.render_full()
        }
    }

    pub fn render_full(&mut self) -> Option<RenderPass> {
        self.full.next_pass()
    }

    /// One preview pass. Unless the preview keeps sampling, this cancels and
    /// re-arms the debounce so a full pass follows once input goes quiet.
    pub fn render_low_res(&mut self, now: Instant) -> Option<RenderPass> {
        self.debounce.cancel();
        let pass = self.preview.next_pass();
        if !self.preview.keep_sampling() {
            self.debounce.arm(now);
        }
        pass
    }

    #[must_use]
    pub fn decide(&self, input: TickInput) -> TickDecision {
        if input.parameter_changing {
            TickDecision::ParameterChanging
        } else if self.camera_active {
            TickDecision::CameraMoving
        } else if self.preview.keep_sampling() && !self.preview.is_saturated() {
            TickDecision::FreeRunning(Channel::Preview)
        } else if self.full.keep_sampling() && !self.full.is_saturated() {
            TickDecision::FreeRunning(Channel::Full)
        } else {
            TickDecision::Idle
        }
    }

    /// Plan this frame's passes and advance the channels accordingly.
    pub fn tick(&mut self, input: TickInput, now: Instant) -> Vec<RenderPass> {
        let decision = self.decide(input);
        let mut passes = Vec::with_capacity(2);
        match decision {
            TickDecision::ParameterChanging => {
                self.reset();
                passes.extend(self.render_low_res(now));
                passes.extend(self.render_full());
            }
            TickDecision::CameraMoving | TickDecision::FreeRunning(Channel::Full) => {
                passes.extend(self.render_full());
            }
            TickDecision::FreeRunning(Channel::Preview) => {
                passes.extend(self.preview.next_pass());
            }
            TickDecision::Idle => {}
        }
        if self.debounce.poll(now) {
            passes.extend(self.render_full());
        }
        trace!(?decision, passes = passes.len(), "tick");
        passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(config: SchedulerConfig) -> RenderScheduler {
        RenderScheduler::new(config, Extent::new(64, 48)).unwrap()
    }

    #[test]
    fn empty_target_is_rejected() {
        let err = RenderScheduler::new(SchedulerConfig::default(), Extent::new(0, 10));
        assert!(matches!(err, Err(RenderError::EmptyTarget { width: 0, height: 10 })));
    }

    #[test]
    fn preview_is_a_fraction_of_full() {
        let s = scheduler(SchedulerConfig::default());
        assert_eq!(s.preview().extent(), Extent::new(32, 24));
    }

    #[test]
    fn decision_order() {
        let mut s = scheduler(SchedulerConfig::default());
        let changing = TickInput { parameter_changing: true };
        let quiet = TickInput::default();

        assert_eq!(s.decide(quiet), TickDecision::FreeRunning(Channel::Preview));
        s.begin_camera_move();
        assert_eq!(s.decide(quiet), TickDecision::CameraMoving);
        assert_eq!(s.decide(changing), TickDecision::ParameterChanging);
        s.end_camera_move();

        s.channel_mut(Channel::Preview).set_keep_sampling(false);
        assert_eq!(s.decide(quiet), TickDecision::Idle);
        s.channel_mut(Channel::Full).set_keep_sampling(true);
        assert_eq!(s.decide(quiet), TickDecision::FreeRunning(Channel::Full));
    }

    #[test]
    fn camera_move_resets_full_once() {
        let config = SchedulerConfig {
            keep_sampling_full: true,
            keep_sampling_preview: false,
            ..SchedulerConfig::default()
        };
        let mut s = scheduler(config);
        let now = Instant::now();
        for _ in 0..5 {
            s.tick(TickInput::default(), now);
        }
        assert_eq!(s.full().num_samples(), 5);

        s.begin_camera_move();
        assert_eq!(s.full().num_samples(), 0);
        let passes = s.tick(TickInput::default(), now);
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].channel, Channel::Full);
        assert_eq!(passes[0].num_samples, 0);
        s.end_camera_move();
        assert!(!s.is_camera_active());
    }

    #[test]
    fn max_samples_caps_free_running() {
        let config = SchedulerConfig {
            max_samples: 4,
            ..SchedulerConfig::default()
        };
        let mut s = scheduler(config);
        let now = Instant::now();
        let total: usize = (0..10).map(|_| s.tick(TickInput::default(), now).len()).sum();
        assert_eq!(total, 4);
        assert_eq!(s.decide(TickInput::default()), TickDecision::Idle);
    }
}
