//! Time utilities and abstractions
//!
//! Expiry checks and lock timestamps read wall-clock time through [`Clock`]
//! so tests can drive time with [`MockClock`] instead of sleeping.

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
