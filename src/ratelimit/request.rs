//! Admission request types.

use std::time::Duration;

use crate::error::{Result, TurnstileError};

/// The rate-limiting policy in force for a single call: at most `ops`
/// operations per `period`.
///
/// Not persisted anywhere; supplied per call, validated at construction so
/// degenerate limits are rejected before any store interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    ops: u32,
    period: Duration,
}

impl Window {
    /// Create a window, rejecting degenerate limits.
    pub fn new(ops: u32, period: Duration) -> Result<Self> {
        if ops == 0 {
            return Err(TurnstileError::InvalidWindow(
                "limit_ops must be at least 1".to_string(),
            ));
        }
        if period.is_zero() {
            return Err(TurnstileError::InvalidWindow(
                "limit_period must be positive".to_string(),
            ));
        }

        Ok(Self { ops, period })
    }

    /// Maximum operations per window; also the size of the slot pool.
    pub fn ops(&self) -> u32 {
        self.ops
    }

    /// Window length; also the lifetime of every claim.
    pub fn period(&self) -> Duration {
        self.period
    }
}

/// A single admission request. Ephemeral: one per `acquire` call.
#[derive(Debug, Clone, Copy)]
pub struct PermitRequest {
    /// Block until admitted (bounded by the wait horizon) instead of
    /// denying immediately.
    pub wait: bool,
    /// The window to enforce.
    pub window: Window,
}

impl PermitRequest {
    /// Request that blocks until a slot frees or the wait horizon passes.
    pub fn waiting(window: Window) -> Self {
        Self { wait: true, window }
    }

    /// Request that is denied immediately when every slot is occupied.
    pub fn immediate(window: Window) -> Self {
        Self { wait: false, window }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_accessors() {
        let window = Window::new(7, Duration::from_secs(60)).unwrap();
        assert_eq!(window.ops(), 7);
        assert_eq!(window.period(), Duration::from_secs(60));
    }

    #[test]
    fn test_zero_ops_rejected() {
        let result = Window::new(0, Duration::from_secs(60));
        assert!(matches!(result, Err(TurnstileError::InvalidWindow(_))));
    }

    #[test]
    fn test_zero_period_rejected() {
        let result = Window::new(7, Duration::ZERO);
        assert!(matches!(result, Err(TurnstileError::InvalidWindow(_))));
    }

    #[test]
    fn test_request_modes() {
        let window = Window::new(1, Duration::from_secs(1)).unwrap();
        assert!(PermitRequest::waiting(window).wait);
        assert!(!PermitRequest::immediate(window).wait);
    }
}
