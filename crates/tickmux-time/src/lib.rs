#![forbid(unsafe_code)]

//! Tick and rate primitives for the hardware-timer multiplexer.
//!
//! The multiplexer schedules everything in **ticks** of the underlying
//! countdown register; callers mostly think in microseconds. [`TickRate`]
//! captures the register's effective frequency (input clock divided by a
//! [`Prescaler`]) as a runtime value, so the same scheduling code runs
//! against real hardware and against a deterministic simulation without
//! rebuilding for a different clock.

mod rate;

pub use rate::{Prescaler, TickRate, REFERENCE_INPUT_HZ};
