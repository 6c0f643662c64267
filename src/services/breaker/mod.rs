//! Circuit breaker service.
//!
//! Per-named-service state machines (Closed/Open/HalfOpen) that wrap calls
//! through the transport and shield the system from persistently failing
//! backends. Cooldowns are evaluated lazily on the next call attempt; no
//! background timers are involved.

mod error;
mod registry;
mod service;

pub use error::{BreakerError, CircuitOpenError};
pub use registry::CircuitBreakerRegistry;
pub use service::{CircuitBreaker, CircuitBreakerSnapshot, CircuitStatus};
