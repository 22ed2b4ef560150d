//! Mount/unmount lifecycle and the per-frame time source.

use std::time::{Duration, Instant};

/// Produces the elapsed scene time once per displayed frame.
///
/// Elapsed time never decreases, and a cancelled pump yields no more frames.
#[derive(Debug, Clone)]
pub struct FramePump {
    start: Instant,
    last_elapsed_s: f32,
    frames: u64,
    cancelled: bool,
}

impl FramePump {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last_elapsed_s: 0.0,
            frames: 0,
            cancelled: false,
        }
    }

    /// Elapsed seconds for a frame displayed at `now`, or `None` once cancelled
    pub fn next_frame_at(&mut self, now: Instant) -> Option<f32> {
        if self.cancelled {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.start).as_secs_f32();
        self.last_elapsed_s = self.last_elapsed_s.max(elapsed);
        self.frames += 1;
        Some(self.last_elapsed_s)
    }

    pub fn next_frame(&mut self) -> Option<f32> {
        self.next_frame_at(Instant::now())
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_secs_f32(self.last_elapsed_s)
    }
}

impl Default for FramePump {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU-side resources that must be released on teardown
pub trait Release {
    /// Free every resource. Called at most once by [`Mounted`].
    fn release(&mut self);
}

/// A mounted scene: the frame pump plus the resources it draws with.
///
/// `unmount` stops the pump before releasing, so no frame can observe freed
/// resources. Unmounting again (or dropping) does nothing further.
pub struct Mounted<R: Release> {
    pump: FramePump,
    resources: Option<R>,
}

impl<R: Release> Mounted<R> {
    pub fn mount(resources: R) -> Self {
        Self::with_pump(resources, FramePump::new())
    }

    /// Mount with an existing time base, so a re-mount keeps the clock running
    pub fn with_pump(resources: R, pump: FramePump) -> Self {
        log::info!("Scene mounted");
        Self {
            pump,
            resources: Some(resources),
        }
    }

    /// Advance one frame; yields the elapsed time and the live resources
    pub fn frame(&mut self) -> Option<(f32, &mut R)> {
        self.frame_at(Instant::now())
    }

    pub fn frame_at(&mut self, now: Instant) -> Option<(f32, &mut R)> {
        let elapsed = self.pump.next_frame_at(now)?;
        self.resources.as_mut().map(|r| (elapsed, r))
    }

    pub fn resources(&self) -> Option<&R> {
        self.resources.as_ref()
    }

    pub fn resources_mut(&mut self) -> Option<&mut R> {
        self.resources.as_mut()
    }

    pub fn pump(&self) -> &FramePump {
        &self.pump
    }

    pub fn is_mounted(&self) -> bool {
        self.resources.is_some()
    }

    /// Cancel the pump, then release resources exactly once
    pub fn unmount(&mut self) {
        self.pump.cancel();
        if let Some(mut resources) = self.resources.take() {
            resources.release();
            log::info!(
                "Scene unmounted after {} frames ({:.1?})",
                self.pump.frames(),
                self.pump.elapsed()
            );
        }
    }
}

impl<R: Release> Drop for Mounted<R> {
    fn drop(&mut self) {
        self.unmount();
    }
}
