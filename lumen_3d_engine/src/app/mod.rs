/// App module - scene trait, frame clock and the application loop

pub mod frame_clock;
pub mod scene;
pub mod application;

pub use frame_clock::{FrameClock, FrameTime};
pub use scene::{FrameContext, Scene};
pub use application::{Application, ApplicationState};
