/// Frame clock - per-frame delta from a surface's elapsed time

/// Frame timing snapshot
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the previous frame
    pub delta: f32,
    /// Seconds since the surface was created
    pub elapsed: f64,
    /// Frame counter, starting at 0
    pub frame_index: u64,
}

/// Turns successive elapsed-time readings into `FrameTime` snapshots
///
/// The first delta is measured from time 0. A reading earlier than the
/// previous one yields a zero delta.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: f64,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to `elapsed` seconds
    pub fn tick(&mut self, elapsed: f64) -> FrameTime {
        let delta = (elapsed - self.last).max(0.0) as f32;
        self.last = self.last.max(elapsed);

        let time = FrameTime {
            delta,
            elapsed,
            frame_index: self.frame_index,
        };
        self.frame_index += 1;
        time
    }

    /// Frames ticked so far
    pub fn frame_count(&self) -> u64 {
        self.frame_index
    }
}

#[cfg(test)]
#[path = "frame_clock_tests.rs"]
mod tests;
