// crates/core/src/cancel.rs
//! Cooperative cancellation token shared between the controller and a
//! running engine.
//!
//! One token per job. The controller sets the flag to `Requested`; the
//! engine polls it at its own cadence and calls [`CancelToken::acknowledge`]
//! when it stops work because of the flag.

use std::sync::atomic::{AtomicU8, Ordering};

/// Observable states of a cancellation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CancelState {
    /// No cancellation has been asked for.
    NotRequested = 0,
    /// The controller asked the engine to stop.
    Requested = 1,
    /// The engine stopped work in response to the request.
    Acknowledged = 2,
}

impl CancelState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Requested,
            2 => Self::Acknowledged,
            _ => Self::NotRequested,
        }
    }
}

/// Tri-state cancellation flag, wait-free on both sides.
pub struct CancelToken {
    state: AtomicU8,
}

impl CancelToken {
    /// Create a fresh token in the `NotRequested` state.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(CancelState::NotRequested as u8),
        }
    }

    /// Current state of the token.
    pub fn state(&self) -> CancelState {
        CancelState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Ask the running engine to stop. Idempotent; returns `true` only on
    /// the first call that actually flips the flag.
    pub fn request(&self) -> bool {
        self.state
            .compare_exchange(
                CancelState::NotRequested as u8,
                CancelState::Requested as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Non-blocking read used from the engine's polling loop. Remains
    /// `true` after acknowledgement.
    pub fn is_requested(&self) -> bool {
        self.state.load(Ordering::Acquire) != CancelState::NotRequested as u8
    }

    /// Called by the engine when it honors the request. Only a `Requested`
    /// token can be acknowledged; returns `true` when the transition took.
    pub fn acknowledge(&self) -> bool {
        self.state
            .compare_exchange(
                CancelState::Requested as u8,
                CancelState::Acknowledged as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Whether the engine has already honored a cancellation request.
    pub fn is_acknowledged(&self) -> bool {
        self.state() == CancelState::Acknowledged
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_initial_state() {
        let token = CancelToken::new();
        assert_eq!(token.state(), CancelState::NotRequested);
        assert!(!token.is_requested());
        assert!(!token.is_acknowledged());
    }

    #[test]
    fn test_request_is_idempotent() {
        let token = CancelToken::new();
        assert!(token.request());
        assert!(!token.request());
        assert!(!token.request());
        assert_eq!(token.state(), CancelState::Requested);
        assert!(token.is_requested());
    }

    #[test]
    fn test_acknowledge_requires_request() {
        let token = CancelToken::new();
        // Nothing requested yet, nothing to acknowledge.
        assert!(!token.acknowledge());
        assert_eq!(token.state(), CancelState::NotRequested);

        token.request();
        assert!(token.acknowledge());
        assert!(!token.acknowledge());
        assert_eq!(token.state(), CancelState::Acknowledged);
        // The flag stays visible to any late poller.
        assert!(token.is_requested());
    }

    #[test]
    fn test_concurrent_request_flips_once() {
        let token = Arc::new(CancelToken::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let t = Arc::clone(&token);
                std::thread::spawn(move || t.request())
            })
            .collect();

        let wins: usize = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked") as usize)
            .sum();
        assert_eq!(wins, 1);
        assert_eq!(token.state(), CancelState::Requested);
    }
}
