//! CPU/GPU frame synchronization.
//!
//! The pool here is the only blocking point in the per-frame path.

mod frame_pool;

pub use frame_pool::{FramePool, FrameSlot};
