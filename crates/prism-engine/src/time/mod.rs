//! Time subsystem.
//!
//! One `FrameClock` per window. `tick()` is called once per serviced frame and
//! yields both the clamped delta and the monotonic elapsed time since the clock
//! (or its last `restart`) began.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
