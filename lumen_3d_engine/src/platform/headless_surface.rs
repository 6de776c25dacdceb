/// HeadlessSurface - windowless surface with a fixed-timestep clock
///
/// Every frame spans exactly one timestep; `elapsed_time` reads the end of
/// the frame being produced, so each loop iteration sees a delta of one
/// timestep. Input is scripted: events registered for frame `n` are
/// delivered by the poll that ends frame `n` and are visible to the update
/// of frame `n + 1`.

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::engine_trace;
use crate::graphics_device::Gpu;
use crate::input::{InputEvent, InputHandler};
use crate::platform::Surface;

const SOURCE: &str = "lumen3d::HeadlessSurface";

/// Default timestep (60 frames per second)
pub const DEFAULT_TIMESTEP: f64 = 1.0 / 60.0;

pub struct HeadlessSurface {
    gpu: Gpu,
    width: u32,
    height: u32,
    timestep: f64,
    frames_presented: u64,
    frame_limit: Option<u64>,
    should_close: bool,
    input_active: bool,
    script: FxHashMap<u64, Vec<InputEvent>>,
    close_after: Option<u64>,
}

impl HeadlessSurface {
    pub fn new(gpu: Gpu, width: u32, height: u32) -> Self {
        Self {
            gpu,
            width,
            height,
            timestep: DEFAULT_TIMESTEP,
            frames_presented: 0,
            frame_limit: None,
            should_close: false,
            input_active: false,
            script: FxHashMap::default(),
            close_after: None,
        }
    }

    /// Seconds per frame
    pub fn with_timestep(mut self, timestep: f64) -> Self {
        self.timestep = timestep;
        self
    }

    /// Request close once `frames` frames have been presented
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Deliver `event` with the poll that ends frame `frame`
    pub fn push_event(&mut self, frame: u64, event: InputEvent) {
        self.script.entry(frame).or_default().push(event);
    }

    /// Builder form of [`Self::push_event`]
    pub fn with_event(mut self, frame: u64, event: InputEvent) -> Self {
        self.push_event(frame, event);
        self
    }

    /// Simulate the user closing the window during frame `frame`
    pub fn with_close_request(mut self, frame: u64) -> Self {
        self.close_after = Some(frame);
        self
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn is_input_active(&self) -> bool {
        self.input_active
    }
}

impl Surface for HeadlessSurface {
    fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    fn elapsed_time(&self) -> f64 {
        (self.frames_presented + 1) as f64 * self.timestep
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn swap_buffers(&mut self) -> Result<()> {
        self.frames_presented += 1;
        if let Some(limit) = self.frame_limit {
            if self.frames_presented >= limit {
                engine_trace!(SOURCE, "Frame limit {} reached", limit);
                self.should_close = true;
            }
        }
        Ok(())
    }

    fn poll_events(&mut self, handler: &mut dyn InputHandler) {
        // The frame that just ended
        let frame = self.frames_presented.saturating_sub(1);

        if let Some(events) = self.script.remove(&frame) {
            if self.input_active {
                for event in events {
                    handler.handle_event(event);
                }
            } else {
                engine_trace!(SOURCE, "Dropped {} input events before input activation", events.len());
            }
        }

        if self.close_after == Some(frame) {
            self.should_close = true;
        }
    }

    fn should_close(&self) -> bool {
        self.should_close
    }

    fn set_should_close(&mut self, value: bool) {
        self.should_close = value;
    }

    fn activate_input(&mut self) {
        self.input_active = true;
    }
}

#[cfg(test)]
#[path = "headless_surface_tests.rs"]
mod tests;
