//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per window, `tick()` once per presented frame to obtain `FrameTime`
//! - one `FramePacer` per window to decide when the next redraw is due

mod frame_clock;
mod frame_pacer;

pub use frame_clock::{FrameClock, FrameTime};
pub use frame_pacer::FramePacer;
