use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// One scheduled frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Zero-based frame number.
    pub index: u64,
    /// Seconds since the clock was created.
    pub elapsed: f32,
    /// Seconds since the previous frame (0 on the first frame of a wall clock).
    pub delta: f32,
}

/// Source of frame ticks. Each call suspends until the next frame is due.
pub trait FrameClock {
    fn next_frame(&mut self) -> FrameTick;
}

/// Wall-clock frame source with an optional frame-rate cap.
pub struct SystemClock {
    start: Instant,
    last: Instant,
    index: u64,
    min_frame: Duration,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Uncapped clock: frames are paced by whoever calls `next_frame`
    /// (typically vsync on the present call).
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            index: 0,
            min_frame: Duration::ZERO,
        }
    }

    /// Clock that sleeps so frames are at least `1 / fps` apart (0 = uncapped).
    pub fn with_fps_cap(fps: u32) -> Self {
        let mut clock = Self::new();
        if fps > 0 {
            clock.min_frame = Duration::from_secs_f64(1.0 / fps as f64);
        }
        clock
    }
}

impl FrameClock for SystemClock {
    fn next_frame(&mut self) -> FrameTick {
        let since_last = self.last.elapsed();
        if self.index > 0 && since_last < self.min_frame {
            std::thread::sleep(self.min_frame - since_last);
        }
        let now = Instant::now();
        let tick = FrameTick {
            index: self.index,
            elapsed: now.duration_since(self.start).as_secs_f32(),
            delta: if self.index == 0 {
                0.0
            } else {
                now.duration_since(self.last).as_secs_f32()
            },
        };
        self.last = now;
        self.index += 1;
        tick
    }
}

/// Deterministic clock: every frame advances time by exactly `step` seconds.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step: f32,
    index: u64,
}

impl FixedStepClock {
    pub fn new(step: f32) -> Self {
        Self { step, index: 0 }
    }

    /// 60 frames per second.
    pub fn sixty_hz() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl FrameClock for FixedStepClock {
    fn next_frame(&mut self) -> FrameTick {
        let tick = FrameTick {
            index: self.index,
            elapsed: (self.index + 1) as f32 * self.step,
            delta: self.step,
        };
        self.index += 1;
        tick
    }
}

/// Shared cancellation flag for a frame loop.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Explicit animation loop: tick the clock, run the frame, repeat until stopped.
pub struct FrameLoop<C: FrameClock> {
    clock: C,
    stop: StopHandle,
    max_frames: Option<u64>,
}

impl<C: FrameClock> FrameLoop<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            stop: StopHandle::new(),
            max_frames: None,
        }
    }

    /// Stop after `frames` frames even if nobody calls `stop`.
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Use an externally owned stop flag.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run frames until stopped, the frame limit is hit, or `on_frame` fails.
    ///
    /// Returns the number of frames that completed successfully.
    pub fn run<E, F>(&mut self, mut on_frame: F) -> Result<u64, E>
    where
        F: FnMut(FrameTick) -> Result<(), E>,
    {
        let mut frames = 0;
        while !self.stop.is_stopped() {
            if self.max_frames.is_some_and(|max| frames >= max) {
                break;
            }
            let tick = self.clock.next_frame();
            on_frame(tick)?;
            frames += 1;
        }
        tracing::debug!("frame loop finished after {frames} frames");
        Ok(frames)
    }
}
