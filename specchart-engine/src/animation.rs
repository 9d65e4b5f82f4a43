//! Frame-stepped x-domain zoom animation.

/// Identifies a frame request made by an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Result of advancing an animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationStep {
    /// Intermediate domain; another frame is needed.
    InProgress((f64, f64)),
    /// Final domain; the animation is over.
    Finished((f64, f64)),
    /// The animation was cancelled and does nothing.
    Idle,
}

/// Linear interpolation of the x domain between two ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomAnimation {
    from: (f64, f64),
    to: (f64, f64),
    start_ms: f64,
    duration_ms: f64,
    frame: Option<FrameHandle>,
}

impl ZoomAnimation {
    /// Starts an animation at `start_ms` holding the frame handle `frame`.
    #[must_use]
    pub fn new(from: (f64, f64), to: (f64, f64), start_ms: f64, duration_ms: f64, frame: FrameHandle) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms,
            frame: Some(frame),
        }
    }

    #[must_use]
    pub fn start_domain(&self) -> (f64, f64) {
        self.from
    }

    #[must_use]
    pub fn target(&self) -> (f64, f64) {
        self.to
    }

    #[must_use]
    pub fn frame(&self) -> Option<FrameHandle> {
        self.frame
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.frame.is_some()
    }

    /// Cancels the animation. Safe to call any number of times.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.frame.take() {
            log::debug!("cancelled zoom animation frame {}", handle.0);
        }
    }

    /// Domain at `now_ms`.
    pub fn step(&mut self, now_ms: f64) -> AnimationStep {
        if self.frame.is_none() {
            return AnimationStep::Idle;
        }
        let t = if self.duration_ms > 0.0 {
            ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if t >= 1.0 {
            self.frame = None;
            return AnimationStep::Finished(self.to);
        }
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        AnimationStep::InProgress((lerp(self.from.0, self.to.0), lerp(self.from.1, self.to.1)))
    }
}
