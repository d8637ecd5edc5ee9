//! Deterministic software rendition of the countdown register.
//!
//! [`SimCountdown`] models the reference peripheral closely enough to drive
//! the scheduler without hardware: a 23-bit down-counter that keeps counting
//! (and wraps) after passing zero, latching an edge interrupt at each zero
//! crossing. Tests advance it tick by tick and dispatch
//! [`TimerMux::on_interrupt`](crate::TimerMux::on_interrupt) whenever the
//! latch is set; the same pairing serves as a software-simulated interrupt
//! source on hosts with no countdown peripheral at all.
//!
//! The handle is cheaply cloneable: one clone is handed to the multiplexer
//! as its [`CountdownTimer`], the harness keeps another to advance time and
//! inspect the recorded [`HwEvent`] stream.

use std::cell::RefCell;
use std::rc::Rc;

use crate::hw::{CountdownTimer, TriggerMode};

/// One observable interaction with the simulated register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwEvent {
    Loaded(u32),
    Enabled { mode: TriggerMode, auto_reload: bool },
    Disabled,
    Masked,
    Unmasked,
}

#[derive(Debug)]
struct SimState {
    count: u32,
    bits: u32,
    enabled: bool,
    masked: bool,
    irq_pending: bool,
    events: Vec<HwEvent>,
}

/// Simulated countdown register; see the module docs.
#[derive(Debug, Clone)]
pub struct SimCountdown {
    state: Rc<RefCell<SimState>>,
}

impl SimCountdown {
    pub fn new() -> Self {
        Self::with_counter_bits(23)
    }

    /// A register with a non-reference counter width, for wrap tests.
    pub fn with_counter_bits(bits: u32) -> Self {
        assert!(bits > 0 && bits < 32);
        Self {
            state: Rc::new(RefCell::new(SimState {
                count: 0,
                bits,
                enabled: false,
                masked: false,
                irq_pending: false,
                events: Vec::new(),
            })),
        }
    }

    /// Lets `ticks` ticks of time pass.
    ///
    /// The counter only runs while the peripheral is enabled. Passing zero
    /// latches the edge interrupt and the counter wraps and keeps counting,
    /// exactly like the reference part.
    pub fn advance(&self, ticks: u64) {
        let mut s = self.state.borrow_mut();
        if !s.enabled || ticks == 0 {
            return;
        }
        let period = 1u64 << s.bits;
        let start = u64::from(s.count);
        // Ticks until the next zero crossing: a counter sitting at zero has
        // just crossed and needs a full period to cross again.
        let until_zero = if start == 0 { period } else { start };
        if ticks >= until_zero {
            s.irq_pending = true;
        }
        let t = ticks % period;
        s.count = ((start + period - t) % period) as u32;
    }

    pub fn count(&self) -> u32 {
        self.state.borrow().count
    }

    pub fn enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    pub fn masked(&self) -> bool {
        self.state.borrow().masked
    }

    pub fn irq_pending(&self) -> bool {
        self.state.borrow().irq_pending
    }

    /// Clears and returns the interrupt latch.
    pub fn take_irq(&self) -> bool {
        std::mem::take(&mut self.state.borrow_mut().irq_pending)
    }

    /// Drains the recorded event stream.
    pub fn take_events(&self) -> Vec<HwEvent> {
        std::mem::take(&mut self.state.borrow_mut().events)
    }
}

impl Default for SimCountdown {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownTimer for SimCountdown {
    fn read_count(&self) -> u32 {
        self.state.borrow().count
    }

    fn load(&mut self, ticks: u32) {
        let mut s = self.state.borrow_mut();
        let mask = (1u32 << s.bits) - 1;
        s.count = ticks & mask;
        s.events.push(HwEvent::Loaded(ticks));
    }

    fn enable(&mut self, mode: TriggerMode, auto_reload: bool) {
        let mut s = self.state.borrow_mut();
        s.enabled = true;
        s.events.push(HwEvent::Enabled { mode, auto_reload });
    }

    fn disable(&mut self) {
        let mut s = self.state.borrow_mut();
        s.enabled = false;
        s.events.push(HwEvent::Disabled);
    }

    fn mask_irqs(&mut self) {
        let mut s = self.state.borrow_mut();
        s.masked = true;
        s.events.push(HwEvent::Masked);
    }

    fn unmask_irqs(&mut self) {
        let mut s = self.state.borrow_mut();
        s.masked = false;
        s.events.push(HwEvent::Unmasked);
    }

    fn counter_bits(&self) -> u32 {
        self.state.borrow().bits
    }
}
