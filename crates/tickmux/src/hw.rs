//! Hardware boundary of the multiplexer.
//!
//! [`CountdownTimer`] is the whole contract the scheduler has with the
//! peripheral: read the live count, load a new countdown value, gate the
//! peripheral and its interrupt routing, and mask/unmask interrupts globally
//! for the critical section. Everything else — delta queue, dispatch,
//! client bookkeeping — is hardware-independent.

/// Interrupt trigger mode of the countdown peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    Edge,
    Level,
}

/// Interrupt vector the dispatcher is driven from.
///
/// The reference part can route the countdown interrupt either through the
/// ordinary timer vector or through the NMI. The multiplexer records the
/// first client's choice; actually attaching the handler to that vector is
/// the embedding's job, since only it knows the platform's interrupt table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSource {
    Frc1,
    Nmi,
}

/// Access to one physical countdown register and its interrupt plumbing.
///
/// The modelled hardware is a down-counter of `counter_bits()` bits that
/// keeps counting (and wraps) after passing zero, raising an interrupt at
/// each zero crossing. [`read_count`](CountdownTimer::read_count) therefore
/// returns a value that the scheduler interprets relative to the last loaded
/// count to recover a *signed* remaining-tick value: a raw count larger than
/// the last load means the deadline was already missed.
///
/// `mask_irqs`/`unmask_irqs` control the global interrupt-enable bit and are
/// allowed to nest the way the scheduler drives them: several masks may be
/// issued before the single unmask that ends the outermost critical section.
pub trait CountdownTimer {
    /// Current live value of the down-counter.
    fn read_count(&self) -> u32;

    /// Arms the counter to reach zero after `ticks` more ticks.
    fn load(&mut self, ticks: u32);

    /// Powers up the peripheral and routes its interrupt.
    ///
    /// `auto_reload` selects the hardware's own reload-on-zero mode; the
    /// multiplexer never uses it (periodic behavior is implemented in the
    /// scheduler so one register can serve many periodic clients) but the
    /// capability is part of the register contract.
    fn enable(&mut self, mode: TriggerMode, auto_reload: bool);

    /// Powers down the peripheral and detaches its interrupt.
    fn disable(&mut self);

    /// Masks all maskable interrupts (enters a critical section).
    fn mask_irqs(&mut self);

    /// Unmasks interrupts again (leaves the outermost critical section).
    fn unmask_irqs(&mut self);

    /// Width of the down-counter in bits. The reference register is 23 bits
    /// wide, which bounds both the longest schedulable delay and the window
    /// in which a missed deadline can be told apart from a pending one.
    fn counter_bits(&self) -> u32 {
        23
    }
}
