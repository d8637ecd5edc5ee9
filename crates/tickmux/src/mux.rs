//! The timer multiplexer: many logical timers on one countdown register.
//!
//! Armed entries live in a singly linked, time-ordered **delta queue**: each
//! entry stores only the tick difference from its predecessor's deadline, so
//! the head's delta is exactly "ticks until the next interrupt" and is the
//! value loaded into the hardware register. Arming walks the queue
//! subtracting deltas until the insertion point is found; firing pops every
//! entry whose delta has reached zero.
//!
//! Because only the head's delta is live (the register counts it down in
//! hardware), every structural change to the queue must first resynchronize
//! the head with the real register — otherwise the stored delta would be
//! stale by however many ticks have passed since the last load. That resync
//! is [`TimerMux::adjust_root`]; the register keeps counting down past zero
//! and wraps, so a raw count above the last loaded value decodes to a
//! *negative* remaining delta (the deadline was already missed).
//!
//! Entries are allocated once per owner in an arena and linked by index;
//! they move between the active queue and an inactive pool but are never
//! freed, so no allocation ever happens on an interrupt-adjacent path.

use tickmux_time::{Prescaler, TickRate, REFERENCE_INPUT_HZ};
use tracing::{error, trace};

use crate::hw::{CountdownTimer, TimerSource, TriggerMode};

/// Caller-chosen identity of one logical timer.
///
/// Any process-wide-unique value works — a small constant, a pointer-derived
/// integer. The multiplexer never mints handles; all lookups go through the
/// owner token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerToken(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The owner token was never registered with [`TimerMux::init`].
    #[error("owner is not registered")]
    UnknownOwner,
    /// The entry arena is full; raise [`MuxConfig::max_entries`].
    #[error("timer entry pool is exhausted")]
    PoolExhausted,
}

/// Callback invoked when an entry fires. It receives the multiplexer itself,
/// so re-arming, closing or re-registering (this or any other owner) from
/// inside a callback is allowed.
pub type TimerCallback<H> = Box<dyn FnMut(&mut TimerMux<H>, OwnerToken)>;

/// Construction-time configuration of the multiplexer.
#[derive(Debug, Clone, Copy)]
pub struct MuxConfig {
    /// Tick frequency used by [`TimerMux::arm_us`].
    pub rate: TickRate,
    /// Interrupt trigger mode programmed into the peripheral.
    pub trigger: TriggerMode,
    /// Capacity of the entry arena (one slot per distinct owner, reused for
    /// the lifetime of the multiplexer).
    pub max_entries: usize,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            rate: TickRate::from_divided_clock(REFERENCE_INPUT_HZ, Prescaler::Div16),
            trigger: TriggerMode::Edge,
            max_entries: 16,
        }
    }
}

/// Diagnostic view of one entry, in queue order for armed entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntrySnapshot {
    pub owner: OwnerToken,
    /// Delta from the predecessor's deadline (armed) or leftover value
    /// (parked).
    pub delay: i64,
    pub autoload: bool,
    pub autoload_delay: i64,
    pub fire_count: u64,
    pub armed: bool,
}

/// Upper bound on entries popped by a single [`TimerMux::on_interrupt`].
///
/// A healthy queue never comes close: the bound exists so corrupted state
/// (a negative-delay cycle) cannot wedge the interrupt handler. A drain cut
/// short resumes at the next interrupt.
const MAX_DRAIN_ITERATIONS: u32 = 1024;

struct Entry<H: CountdownTimer> {
    owner: OwnerToken,
    /// Delta ticks past the predecessor's deadline; for the head, ticks
    /// until fire (possibly negative after a resync of an overdue queue).
    delay: i64,
    autoload_delay: i64,
    autoload: bool,
    /// Absolute virtual-tick deadline of the next scheduled fire.
    expected: i64,
    callback: Option<TimerCallback<H>>,
    fire_count: u64,
    /// Link into whichever list currently owns this entry.
    next: Option<usize>,
}

impl<H: CountdownTimer> Entry<H> {
    fn new(owner: OwnerToken) -> Self {
        Self {
            owner,
            delay: 0,
            autoload_delay: 0,
            autoload: false,
            expected: 0,
            callback: None,
            fire_count: 0,
            next: None,
        }
    }
}

/// The multiplexer. See the module docs for the scheduling model.
pub struct TimerMux<H: CountdownTimer> {
    hw: H,
    cfg: MuxConfig,
    entries: Vec<Entry<H>>,
    /// Head of the delta-ordered active queue.
    active: Option<usize>,
    /// Head of the unordered pool of registered-but-unarmed entries.
    inactive: Option<usize>,
    /// Whether the register currently holds a counting-down deadline.
    running: bool,
    hw_enabled: bool,
    /// Critical-section nesting depth; interrupts are unmasked at zero.
    lock_depth: u32,
    /// The value most recently loaded into the register (or observed at the
    /// last resync); the reference point for decoding wrapped counts.
    last_load: i64,
    /// Monotonic virtual tick timeline, advanced at every resync.
    now: i64,
    source: Option<TimerSource>,
}

impl<H: CountdownTimer> TimerMux<H> {
    pub fn new(hw: H, cfg: MuxConfig) -> Self {
        Self {
            hw,
            cfg,
            entries: Vec::new(),
            active: None,
            inactive: None,
            running: false,
            hw_enabled: false,
            lock_depth: 0,
            last_load: 0,
            now: 0,
            source: None,
        }
    }

    pub fn new_default(hw: H) -> Self {
        Self::new(hw, MuxConfig::default())
    }

    /// Registers `owner`, creating its entry on first registration and
    /// parking it on the inactive pool. Re-registering an existing owner
    /// reuses its entry (disarming it if it was armed) and only updates the
    /// auto-reload flag. The first registration overall powers up the
    /// peripheral.
    pub fn init(
        &mut self,
        owner: OwnerToken,
        source: TimerSource,
        autoload: bool,
    ) -> Result<(), Error> {
        let idx = match self.find_and_remove(owner) {
            Some(idx) => idx,
            None => {
                if self.entries.len() >= self.cfg.max_entries {
                    return Err(Error::PoolExhausted);
                }
                self.entries.push(Entry::new(owner));
                self.entries.len() - 1
            }
        };
        self.entries[idx].autoload = autoload;

        self.lock();
        if self.active.is_none() && self.inactive.is_none() {
            self.hw.enable(self.cfg.trigger, false);
            self.hw_enabled = true;
            self.source = Some(source);
        }
        self.push_inactive(idx);
        self.unlock();

        trace!(owner = owner.0, autoload, "init");
        Ok(())
    }

    /// Attaches the fire callback for `owner`.
    pub fn set_callback<F>(&mut self, owner: OwnerToken, callback: F) -> Result<(), Error>
    where
        F: FnMut(&mut TimerMux<H>, OwnerToken) + 'static,
    {
        let idx = self.find(owner).ok_or(Error::UnknownOwner)?;
        self.entries[idx].callback = Some(Box::new(callback));
        trace!(owner = owner.0, "set callback");
        Ok(())
    }

    /// Arms `owner` to fire after `ticks` ticks. An already-armed entry is
    /// removed and reinserted at its new deadline. Delays beyond the
    /// register width are clamped to the longest representable delay.
    pub fn arm_ticks(&mut self, owner: OwnerToken, ticks: u64) -> Result<(), Error> {
        let idx = self.find_and_remove(owner).ok_or(Error::UnknownOwner)?;
        let ticks = ticks.min(self.counter_mask() as u64) as i64;
        self.entries[idx].delay = ticks;
        self.entries[idx].autoload_delay = ticks;
        trace!(owner = owner.0, ticks, "arm");

        self.lock();
        self.adjust_root();
        self.insert_active(idx);
        self.unlock();
        Ok(())
    }

    /// Arms `owner` to fire after `microseconds`, converted through the
    /// configured [`TickRate`].
    pub fn arm_us(&mut self, owner: OwnerToken, microseconds: u64) -> Result<(), Error> {
        self.arm_ticks(owner, self.cfg.rate.ticks_from_us(microseconds))
    }

    /// Disarms `owner` and parks its entry. Closing an owner that is already
    /// parked is a no-op. When the active queue empties, the peripheral is
    /// quiesced; the next arm powers it back up. Safe to call from a timer
    /// callback.
    pub fn close(&mut self, owner: OwnerToken) -> Result<(), Error> {
        let idx = self.find_and_remove(owner).ok_or(Error::UnknownOwner)?;
        self.lock();
        self.push_inactive(idx);
        if self.active.is_none() && self.hw_enabled {
            self.hw.disable();
            self.hw_enabled = false;
            self.running = false;
        }
        self.unlock();
        trace!(owner = owner.0, "close");
        Ok(())
    }

    /// The interrupt dispatch entry point.
    ///
    /// Called by the embedding's interrupt shim when the register reaches
    /// zero, or directly by a simulated interrupt source. Pops every entry
    /// whose delta has reached zero (several deadlines may coincide),
    /// reinserts auto-reload entries, parks one-shot entries, and runs each
    /// fired entry's callback synchronously — with the entry already fully
    /// detached and interrupts unmasked, so callbacks may freely arm, close
    /// or re-register any owner. Finally re-arms the register for the new
    /// head, if any.
    pub fn on_interrupt(&mut self) {
        self.lock();
        self.adjust_root();
        self.running = false;

        let mut drained = 0u32;
        loop {
            let Some(head) = self.active else { break };
            if self.entries[head].delay > 0 {
                break;
            }
            drained += 1;
            if drained > MAX_DRAIN_ITERATIONS {
                error!(
                    limit = MAX_DRAIN_ITERATIONS,
                    "drain loop hit its iteration bound; abandoning drain until the next interrupt"
                );
                break;
            }

            // Detach the head. Its delta is how overdue the deadline is
            // (zero or negative); the successor inherits it so the
            // remaining deltas stay anchored to the present.
            let consumed = self.entries[head].delay;
            self.active = self.entries[head].next.take();
            if let Some(next) = self.active {
                self.entries[next].delay += consumed;
            }

            if self.entries[head].autoload {
                // Reschedule relative to the *scheduled* deadline, not the
                // actual dispatch time, so a late interrupt does not shift
                // every subsequent period.
                let period = self.entries[head].autoload_delay;
                self.entries[head].delay = consumed + period;
                self.insert_active(head);
            } else {
                self.push_inactive(head);
            }

            self.entries[head].fire_count += 1;
            let owner = self.entries[head].owner;
            trace!(owner = owner.0, count = self.entries[head].fire_count, "fire");

            if let Some(mut callback) = self.entries[head].callback.take() {
                self.unlock();
                callback(self, owner);
                self.lock();
                // Keep the callback unless the entry installed a new one
                // while it ran.
                if self.entries[head].callback.is_none() {
                    self.entries[head].callback = Some(callback);
                }
            }
        }

        if !self.running {
            if let Some(head) = self.active {
                let delay = self.entries[head].delay;
                self.set_timer(delay);
            }
        }
        self.unlock();
    }

    /// Number of times `owner` has fired since registration.
    pub fn fire_count(&self, owner: OwnerToken) -> Result<u64, Error> {
        let idx = self.find(owner).ok_or(Error::UnknownOwner)?;
        Ok(self.entries[idx].fire_count)
    }

    /// Ticks elapsed since `owner`'s last scheduled deadline, clamped to
    /// zero while the deadline is still in the future.
    pub fn ticks_since_fire(&mut self, owner: OwnerToken) -> Result<u64, Error> {
        let idx = self.find(owner).ok_or(Error::UnknownOwner)?;
        self.lock();
        self.adjust_root();
        self.unlock();
        let since = self.now - self.entries[idx].expected;
        Ok(since.max(0) as u64)
    }

    /// Diagnostic view: the active queue in deadline order, then the
    /// inactive pool.
    pub fn snapshot(&self) -> Vec<EntrySnapshot> {
        let mut out = Vec::new();
        for (list, armed) in [(self.active, true), (self.inactive, false)] {
            let mut cur = list;
            while let Some(idx) = cur {
                let entry = &self.entries[idx];
                out.push(EntrySnapshot {
                    owner: entry.owner,
                    delay: entry.delay,
                    autoload: entry.autoload,
                    autoload_delay: entry.autoload_delay,
                    fire_count: entry.fire_count,
                    armed,
                });
                cur = entry.next;
            }
        }
        out
    }

    /// Whether the register currently holds a counting-down deadline.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Interrupt source requested by the first registered client.
    pub fn source(&self) -> Option<TimerSource> {
        self.source
    }

    pub fn rate(&self) -> TickRate {
        self.cfg.rate
    }

    pub fn hw(&self) -> &H {
        &self.hw
    }

    fn counter_mask(&self) -> i64 {
        (1i64 << self.hw.counter_bits()) - 1
    }

    /// Decodes the live register into signed ticks remaining until the
    /// programmed deadline. The counter keeps counting down past zero, so a
    /// raw value above the last load means the interrupt moment has already
    /// passed and the true remainder is negative.
    fn time_left(&self) -> i64 {
        let raw = i64::from(self.hw.read_count()) & self.counter_mask();
        if raw > self.last_load {
            raw - (self.counter_mask() + 1)
        } else {
            raw
        }
    }

    /// Resynchronizes the queue head with the live register and advances the
    /// virtual timeline. Mandatory before any structural queue change: every
    /// non-head delta is defined relative to the head, and the head's stored
    /// delta goes stale the moment the register starts counting.
    ///
    /// Must be called with the lock held.
    fn adjust_root(&mut self) {
        let time_left = self.time_left();
        self.now += self.last_load - time_left;
        if self.running {
            if let Some(head) = self.active {
                self.entries[head].delay = time_left;
            }
        }
        self.last_load = time_left;
    }

    /// Loads the register with `delay` (clamped to at least one tick) and
    /// marks the timer running, re-enabling a quiesced peripheral first.
    ///
    /// Must be called with the lock held.
    fn set_timer(&mut self, delay: i64) {
        let delay = delay.max(1);
        debug_assert!(delay <= self.counter_mask());
        let time_left = self.time_left();
        self.now += self.last_load - time_left;
        if !self.hw_enabled {
            self.hw.enable(self.cfg.trigger, false);
            self.hw_enabled = true;
        }
        trace!(delay, "load");
        self.hw.load(delay as u32);
        self.last_load = delay;
        self.running = true;
    }

    fn lock(&mut self) {
        self.hw.mask_irqs();
        self.lock_depth += 1;
    }

    fn unlock(&mut self) {
        debug_assert!(self.lock_depth > 0, "unbalanced critical section");
        self.lock_depth -= 1;
        if self.lock_depth == 0 {
            self.hw.unmask_irqs();
        }
    }

    /// Must be called with the lock held.
    fn push_inactive(&mut self, idx: usize) {
        self.entries[idx].next = self.inactive;
        self.inactive = Some(idx);
    }

    fn find(&self, owner: OwnerToken) -> Option<usize> {
        for list in [self.inactive, self.active] {
            let mut cur = list;
            while let Some(idx) = cur {
                if self.entries[idx].owner == owner {
                    return Some(idx);
                }
                cur = self.entries[idx].next;
            }
        }
        None
    }

    /// Finds `owner`'s entry and unlinks it from whichever list holds it.
    ///
    /// Removing the head of a non-singleton active queue resynchronizes
    /// first (the successor's delta is about to absorb the head's live
    /// delta) and reloads the register for the new head.
    fn find_and_remove(&mut self, owner: OwnerToken) -> Option<usize> {
        self.lock();

        let mut prev: Option<usize> = None;
        let mut cur = self.inactive;
        while let Some(idx) = cur {
            if self.entries[idx].owner == owner {
                let next = self.entries[idx].next.take();
                match prev {
                    Some(p) => self.entries[p].next = next,
                    None => self.inactive = next,
                }
                self.unlock();
                return Some(idx);
            }
            prev = cur;
            cur = self.entries[idx].next;
        }

        let mut prev: Option<usize> = None;
        let mut cur = self.active;
        while let Some(idx) = cur {
            if self.entries[idx].owner == owner {
                let need_reload = prev.is_none() && self.entries[idx].next.is_some();
                if need_reload {
                    self.adjust_root();
                }
                let removed_delay = self.entries[idx].delay;
                if let Some(next) = self.entries[idx].next {
                    self.entries[next].delay += removed_delay;
                }
                let next = self.entries[idx].next.take();
                match prev {
                    Some(p) => self.entries[p].next = next,
                    None => self.active = next,
                }
                if need_reload {
                    if let Some(head) = self.active {
                        let delay = self.entries[head].delay;
                        self.set_timer(delay);
                    }
                }
                self.unlock();
                return Some(idx);
            }
            prev = cur;
            cur = self.entries[idx].next;
        }

        self.unlock();
        None
    }

    /// Splices `idx` into the active queue in deadline order.
    ///
    /// Walks from the head subtracting each visited delta from the new
    /// entry's delay; the node the walk stops at keeps its absolute deadline
    /// by shedding the inserted delta. A new head reloads the register.
    ///
    /// Must be called after a resync, with the lock held.
    fn insert_active(&mut self, idx: usize) {
        self.lock();
        let requested = self.entries[idx].delay;
        self.entries[idx].expected = self.now + requested;

        let mut prev: Option<usize> = None;
        let mut cur = self.active;
        while let Some(i) = cur {
            let step = self.entries[i].delay;
            if step >= self.entries[idx].delay {
                break;
            }
            self.entries[idx].delay -= step;
            prev = cur;
            cur = self.entries[i].next;
        }

        if let Some(i) = cur {
            let inserted = self.entries[idx].delay;
            self.entries[i].delay -= inserted;
        }
        self.entries[idx].next = cur;
        match prev {
            Some(p) => self.entries[p].next = Some(idx),
            None => {
                self.active = Some(idx);
                let delay = self.entries[idx].delay;
                self.set_timer(delay);
            }
        }
        self.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{HwEvent, SimCountdown};

    const A: OwnerToken = OwnerToken(0xA);
    const B: OwnerToken = OwnerToken(0xB);

    fn mux_with_sim() -> (TimerMux<SimCountdown>, SimCountdown) {
        let sim = SimCountdown::new();
        let mux = TimerMux::new_default(sim.clone());
        (mux, sim)
    }

    #[test]
    fn operations_on_unknown_owner_fail() {
        let (mut mux, _sim) = mux_with_sim();
        assert_eq!(mux.arm_ticks(A, 10), Err(Error::UnknownOwner));
        assert_eq!(mux.close(A), Err(Error::UnknownOwner));
        assert_eq!(mux.fire_count(A), Err(Error::UnknownOwner));
        assert_eq!(
            mux.set_callback(A, |_, _| {}).unwrap_err(),
            Error::UnknownOwner
        );
    }

    #[test]
    fn first_init_powers_up_the_peripheral() {
        let (mut mux, sim) = mux_with_sim();
        mux.init(A, TimerSource::Frc1, false).unwrap();
        assert!(sim.enabled());
        assert_eq!(mux.source(), Some(TimerSource::Frc1));

        // A second client does not reconfigure the hardware.
        sim.take_events();
        mux.init(B, TimerSource::Nmi, true).unwrap();
        assert!(!sim
            .take_events()
            .iter()
            .any(|e| matches!(e, HwEvent::Enabled { .. })));
        assert_eq!(mux.source(), Some(TimerSource::Frc1));
    }

    #[test]
    fn init_is_idempotent_per_owner() {
        let (mut mux, _sim) = mux_with_sim();
        mux.init(A, TimerSource::Frc1, false).unwrap();
        mux.init(A, TimerSource::Frc1, true).unwrap();
        let snap = mux.snapshot();
        assert_eq!(snap.len(), 1);
        assert!(snap[0].autoload);
    }

    #[test]
    fn pool_exhaustion_is_reported_and_leaves_state_intact() {
        let sim = SimCountdown::new();
        let cfg = MuxConfig {
            max_entries: 2,
            ..MuxConfig::default()
        };
        let mut mux = TimerMux::new(sim.clone(), cfg);
        mux.init(A, TimerSource::Frc1, false).unwrap();
        mux.init(B, TimerSource::Frc1, false).unwrap();
        assert_eq!(
            mux.init(OwnerToken(0xC), TimerSource::Frc1, false),
            Err(Error::PoolExhausted)
        );
        // Existing owners are untouched and still re-registrable.
        mux.init(A, TimerSource::Frc1, false).unwrap();
        assert_eq!(mux.snapshot().len(), 2);
    }

    #[test]
    fn arming_loads_the_register_with_the_head_delta() {
        let (mut mux, sim) = mux_with_sim();
        mux.init(A, TimerSource::Frc1, false).unwrap();
        sim.take_events();

        mux.arm_ticks(A, 100).unwrap();
        assert!(mux.is_running());
        assert_eq!(sim.count(), 100);
        assert!(sim.take_events().contains(&HwEvent::Loaded(100)));
    }

    #[test]
    fn arm_us_converts_through_the_configured_rate() {
        let (mut mux, sim) = mux_with_sim();
        mux.init(A, TimerSource::Frc1, false).unwrap();
        // Reference rate: 5 ticks per microsecond.
        mux.arm_us(A, 20).unwrap();
        assert_eq!(sim.count(), 100);
    }

    #[test]
    fn zero_tick_arm_is_clamped_to_one() {
        let (mut mux, sim) = mux_with_sim();
        mux.init(A, TimerSource::Frc1, false).unwrap();
        sim.take_events();
        mux.arm_ticks(A, 0).unwrap();
        assert!(sim.take_events().contains(&HwEvent::Loaded(1)));
    }

    #[test]
    fn oversized_arm_is_clamped_to_the_register_width() {
        let (mut mux, sim) = mux_with_sim();
        mux.init(A, TimerSource::Frc1, false).unwrap();
        sim.take_events();
        mux.arm_ticks(A, u64::MAX).unwrap();
        let mask = (1u32 << 23) - 1;
        assert!(sim.take_events().contains(&HwEvent::Loaded(mask)));
    }

    #[test]
    fn close_parks_the_entry_and_quiesces_an_empty_queue() {
        let (mut mux, sim) = mux_with_sim();
        mux.init(A, TimerSource::Frc1, false).unwrap();
        mux.arm_ticks(A, 50).unwrap();
        mux.close(A).unwrap();

        assert!(!mux.is_running());
        assert!(!sim.enabled());
        let snap = mux.snapshot();
        assert_eq!(snap.len(), 1);
        assert!(!snap[0].armed);

        // Closing again is a no-op, not an error.
        mux.close(A).unwrap();

        // Re-arming powers the peripheral back up.
        sim.take_events();
        mux.arm_ticks(A, 10).unwrap();
        assert!(sim.enabled());
        assert!(sim.take_events().contains(&HwEvent::Loaded(10)));
    }

    #[test]
    fn closing_one_owner_keeps_the_other_scheduled() {
        let (mut mux, sim) = mux_with_sim();
        mux.init(A, TimerSource::Frc1, false).unwrap();
        mux.init(B, TimerSource::Frc1, false).unwrap();
        mux.arm_ticks(A, 30).unwrap();
        mux.arm_ticks(B, 100).unwrap();

        // Removing the head rebases the successor onto the register.
        mux.close(A).unwrap();
        assert!(mux.is_running());
        assert!(sim.enabled());
        assert_eq!(sim.count(), 100);

        let armed: Vec<_> = mux.snapshot().into_iter().filter(|e| e.armed).collect();
        assert_eq!(armed.len(), 1);
        assert_eq!(armed[0].owner, B);
        assert_eq!(armed[0].delay, 100);
    }

    #[test]
    fn interrupts_are_unmasked_after_every_operation() {
        let (mut mux, sim) = mux_with_sim();
        mux.init(A, TimerSource::Frc1, true).unwrap();
        mux.arm_ticks(A, 10).unwrap();
        mux.close(A).unwrap();
        mux.arm_ticks(A, 5).unwrap();
        sim.advance(5);
        assert!(sim.take_irq());
        mux.on_interrupt();
        assert!(!sim.masked());
    }

    #[test]
    fn register_loads_only_happen_inside_the_critical_section() {
        let (mut mux, sim) = mux_with_sim();
        mux.init(A, TimerSource::Frc1, false).unwrap();
        mux.init(B, TimerSource::Frc1, true).unwrap();
        sim.take_events();

        mux.arm_ticks(A, 100).unwrap();
        mux.arm_ticks(B, 30).unwrap();
        sim.advance(30);
        sim.take_irq();
        mux.on_interrupt();
        mux.close(B).unwrap();

        let mut masked = false;
        for event in sim.take_events() {
            match event {
                HwEvent::Masked => masked = true,
                HwEvent::Unmasked => masked = false,
                HwEvent::Loaded(_) => assert!(masked, "register load outside critical section"),
                _ => {}
            }
        }
        assert!(!masked);
    }
}
