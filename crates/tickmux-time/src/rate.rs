/// Input clock of the reference countdown peripheral, in Hz.
///
/// The reference part feeds an 80 MHz bus clock through a prescaler into a
/// 23-bit down-counter; at `/16` one tick is 200 ns and the counter takes a
/// little over a second to wrap.
pub const REFERENCE_INPUT_HZ: u64 = 80_000_000;

const US_PER_SEC: u128 = 1_000_000;

/// Clock prescaler of the countdown peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prescaler {
    Div1,
    Div16,
    Div256,
}

impl Prescaler {
    pub fn divisor(self) -> u64 {
        match self {
            Prescaler::Div1 => 1,
            Prescaler::Div16 => 16,
            Prescaler::Div256 => 256,
        }
    }
}

/// Effective tick frequency of a countdown register.
///
/// Kept as a runtime value rather than a compile-time constant so tests and
/// alternative hardware can supply their own frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRate {
    hz: u64,
}

impl TickRate {
    /// Builds a rate directly from a tick frequency.
    ///
    /// # Panics
    ///
    /// Panics if `hz` is zero; a timer with no clock cannot schedule anything.
    pub fn from_hz(hz: u64) -> Self {
        assert!(hz > 0, "tick rate must be nonzero");
        Self { hz }
    }

    /// Builds a rate from an input clock and the prescaler it runs through.
    pub fn from_divided_clock(input_hz: u64, prescaler: Prescaler) -> Self {
        Self::from_hz(input_hz / prescaler.divisor())
    }

    pub fn hz(self) -> u64 {
        self.hz
    }

    /// Duration of one tick in nanoseconds, rounded down.
    pub fn tick_ns(self) -> u64 {
        1_000_000_000 / self.hz
    }

    /// Converts a relative delay in microseconds to ticks, rounding up so a
    /// deadline is never scheduled earlier than requested.
    pub fn ticks_from_us(self, us: u64) -> u64 {
        let numer = (us as u128) * (self.hz as u128);
        ((numer + US_PER_SEC - 1) / US_PER_SEC) as u64
    }

    /// Converts a tick count back to microseconds, rounding down.
    pub fn us_from_ticks(self, ticks: u64) -> u64 {
        ((ticks as u128) * US_PER_SEC / (self.hz as u128)) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_rate() -> TickRate {
        TickRate::from_divided_clock(REFERENCE_INPUT_HZ, Prescaler::Div16)
    }

    #[test]
    fn reference_clock_is_five_ticks_per_microsecond() {
        let rate = reference_rate();
        assert_eq!(rate.hz(), 5_000_000);
        assert_eq!(rate.tick_ns(), 200);
        assert_eq!(rate.ticks_from_us(1), 5);
        assert_eq!(rate.ticks_from_us(1_000), 5_000);
        assert_eq!(rate.us_from_ticks(5_000), 1_000);
    }

    #[test]
    fn zero_microseconds_is_zero_ticks() {
        assert_eq!(reference_rate().ticks_from_us(0), 0);
    }

    #[test]
    fn conversion_rounds_up_to_the_next_tick() {
        // 3 MHz: 1 us = 3 ticks exactly, 1.5 us lands between ticks.
        let rate = TickRate::from_hz(3_000_000);
        assert_eq!(rate.ticks_from_us(1), 3);
        // 999_999 us * 3 MHz / 1e6 = 2_999_997 exactly.
        assert_eq!(rate.ticks_from_us(999_999), 2_999_997);
        // 1 us at 1.5 MHz is 1.5 ticks; the deadline must not come early.
        let rate = TickRate::from_hz(1_500_000);
        assert_eq!(rate.ticks_from_us(1), 2);
    }

    #[test]
    fn prescaler_divisors() {
        assert_eq!(Prescaler::Div1.divisor(), 1);
        assert_eq!(Prescaler::Div16.divisor(), 16);
        assert_eq!(Prescaler::Div256.divisor(), 256);
    }

    #[test]
    fn large_delays_do_not_overflow() {
        let rate = reference_rate();
        // An hour in microseconds.
        let us = 3_600 * 1_000_000u64;
        assert_eq!(rate.ticks_from_us(us), us * 5);
    }

    #[test]
    #[should_panic(expected = "tick rate must be nonzero")]
    fn zero_rate_is_rejected() {
        TickRate::from_hz(0);
    }
}
