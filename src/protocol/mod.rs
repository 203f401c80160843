//! Wire protocol for the framed message format.

pub mod frame;

pub use frame::{emit_call_error, emit_call_result, Frame, FrameError, FrameType};
