mod frame_buffer;
mod input;
mod loop_runner;
mod metrics;

pub use frame_buffer::FrameBuffer;
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
