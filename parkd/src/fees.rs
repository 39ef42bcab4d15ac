//! Parking fee schedule.
//!
//! The tariff is a step function over the parked duration:
//!
//! - up to 6 hours: 2
//! - 6 to 24 hours: 3
//! - beyond 24 hours: 3 per started day
//!
//! VIP plates always pay 0. Amounts are [`Decimal`] in local currency units.

use rust_decimal::Decimal;

/// Minutes covered by the base rate.
const BASE_RATE_MINUTES: i64 = 360;
/// Minutes in one charged day.
const DAY_MINUTES: i64 = 1440;

const BASE_RATE: Decimal = Decimal::TWO;
const DAY_RATE: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

/// Compute the parking fee for a stay of the given duration.
///
/// Negative durations happen when camera clocks skew and an exit event
/// carries an earlier timestamp than the matching entry. They are clamped
/// to zero so the vehicle is charged the minimum rate rather than being
/// refunded or bounced back to the gate.
pub fn fee_for_duration(duration_minutes: i64) -> Decimal {
    let minutes = duration_minutes.max(0);
    if minutes <= BASE_RATE_MINUTES {
        BASE_RATE
    } else if minutes <= DAY_MINUTES {
        DAY_RATE
    } else {
        let days = (minutes + DAY_MINUTES - 1) / DAY_MINUTES;
        DAY_RATE * Decimal::from(days)
    }
}

/// Fee for an exiting vehicle, with the VIP exemption applied.
pub fn fee_for_exit(duration_minutes: i64, is_vip: bool) -> Decimal {
    if is_vip {
        Decimal::ZERO
    } else {
        fee_for_duration(duration_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn test_base_rate() {
        assert_eq!(fee_for_duration(0), dec(2));
        assert_eq!(fee_for_duration(1), dec(2));
        assert_eq!(fee_for_duration(360), dec(2));
    }

    #[test]
    fn test_day_rate() {
        assert_eq!(fee_for_duration(361), dec(3));
        assert_eq!(fee_for_duration(1440), dec(3));
    }

    #[test]
    fn test_multi_day_rate() {
        // One minute past a full day starts a second charged day
        assert_eq!(fee_for_duration(1441), dec(6));
        assert_eq!(fee_for_duration(2880), dec(6));
        assert_eq!(fee_for_duration(2881), dec(9));
        // Ten full days
        assert_eq!(fee_for_duration(14400), dec(30));
    }

    #[test]
    fn test_negative_duration_clamped() {
        // Clock skew between entry and exit cameras must not produce a
        // negative fee; the minimum rate applies.
        assert_eq!(fee_for_duration(-1), dec(2));
        assert_eq!(fee_for_duration(-10_000), dec(2));
    }

    #[test]
    fn test_vip_always_free() {
        assert_eq!(fee_for_exit(0, true), Decimal::ZERO);
        assert_eq!(fee_for_exit(360, true), Decimal::ZERO);
        assert_eq!(fee_for_exit(100_000, true), Decimal::ZERO);
        assert_eq!(fee_for_exit(-5, true), Decimal::ZERO);
    }

    #[test]
    fn test_non_vip_matches_schedule() {
        assert_eq!(fee_for_exit(360, false), dec(2));
        assert_eq!(fee_for_exit(1441, false), dec(6));
    }
}
