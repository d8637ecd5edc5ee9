#![forbid(unsafe_code)]

//! Virtual hardware-timer multiplexer.
//!
//! One physical countdown register and its single interrupt line are shared
//! by an unbounded number of logical timer clients. Clients register under a
//! caller-chosen [`OwnerToken`], attach a callback, and arm themselves for a
//! relative delay in ticks or microseconds; the multiplexer keeps the armed
//! entries in a delta-ordered queue whose head delta is exactly the value
//! loaded into the hardware register. When the register reaches zero the
//! dispatcher drains every entry that has come due — auto-reload entries are
//! reinserted with their period, one-shot entries are parked — and re-arms
//! the register for the next-soonest deadline.
//!
//! The hardware boundary is the [`CountdownTimer`] trait; production
//! embeddings implement it over the real register block and call
//! [`TimerMux::on_interrupt`] from their interrupt shim, while
//! [`sim::SimCountdown`] provides a deterministic software register for
//! tests and host-side simulation.

pub mod hw;
pub mod mux;
pub mod sim;

pub use hw::{CountdownTimer, TimerSource, TriggerMode};
pub use mux::{EntrySnapshot, Error, MuxConfig, OwnerToken, TimerMux};
pub use sim::{HwEvent, SimCountdown};
