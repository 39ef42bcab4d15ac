//! Database models for operator shifts.

use crate::types::{ShiftId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Database response for an operator shift
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShiftDBResponse {
    pub id: ShiftId,
    pub operator_id: UserId,
    pub park_zone: String,
    pub login_at: DateTime<Utc>,
    pub logout_at: Option<DateTime<Utc>>,
    pub collected: Decimal,
}

/// Sum the fees of the sessions an operator has to account for.
///
/// Returns `None` when there is nothing to settle, which callers report as
/// a distinct condition rather than a zero settlement.
pub fn settlement_total<'a, I>(fees: I) -> Option<Decimal>
where
    I: IntoIterator<Item = &'a Option<Decimal>>,
{
    let mut total = Decimal::ZERO;
    let mut any = false;
    for fee in fees {
        total += fee.unwrap_or(Decimal::ZERO);
        any = true;
    }
    any.then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_total_sums_fees() {
        let fees = vec![
            Some(Decimal::from(2)),
            Some(Decimal::from(3)),
            Some(Decimal::from(6)),
        ];
        assert_eq!(settlement_total(&fees), Some(Decimal::from(11)));
    }

    #[test]
    fn test_settlement_total_empty_is_nothing_to_settle() {
        assert_eq!(settlement_total(&[]), None);
    }

    #[test]
    fn test_settlement_total_missing_fee_counts_as_zero() {
        // A session waved through before its fee was computed still gets
        // marked settled; it just contributes nothing.
        let fees = vec![Some(Decimal::from(2)), None];
        assert_eq!(settlement_total(&fees), Some(Decimal::from(2)));
    }
}
