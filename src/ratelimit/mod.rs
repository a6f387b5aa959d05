//! Slot-based admission control.

mod allocator;
mod limiter;
mod request;
mod slots;

pub use allocator::SlotAllocator;
pub use limiter::{Admission, RateLimiter};
pub use request::{PermitRequest, Window};
pub use slots::SlotKey;
