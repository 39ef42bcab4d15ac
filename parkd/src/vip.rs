//! VIP plate membership filter.
//!
//! Plates listed in the tariff table are exempt from parking fees. The
//! allow-list is tested on every exit event, so membership checks go
//! through a Bloom filter instead of the database. False positives (a
//! non-VIP plate waved through free) are an accepted tradeoff of the
//! structure; false negatives cannot occur for plates present at the last
//! rebuild.
//!
//! Bloom filters do not support removal, so the filter is rebuilt in full
//! from the tariff table after every tariff create or delete. Readers take
//! an immutable snapshot via [`arc_swap`], so a rebuild never blocks
//! membership tests in flight.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use bloomfilter::Bloom;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::db::{errors::Result, handlers::Tariffs};

/// Expected number of plates the filter is sized for.
const EXPECTED_PLATES: usize = 1_000_000;
/// Target false-positive rate.
const FALSE_POSITIVE_RATE: f64 = 0.01;

/// Shared, atomically swappable VIP plate filter.
///
/// Owned by the application state and injected into handlers; there is no
/// global instance.
#[derive(Default)]
pub struct VipFilter {
    filter: ArcSwapOption<Bloom<str>>,
}

impl VipFilter {
    pub fn new() -> Self {
        Self {
            filter: ArcSwapOption::const_empty(),
        }
    }

    /// Replace the current filter with a fresh one populated from `plates`.
    pub fn rebuild<I, S>(&self, plates: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bloom: Bloom<str> = Bloom::new_for_fp_rate(EXPECTED_PLATES, FALSE_POSITIVE_RATE);
        let mut count = 0usize;
        for plate in plates {
            bloom.set(plate.as_ref());
            count += 1;
        }
        self.filter.store(Some(Arc::new(bloom)));
        info!(plates = count, "VIP plate filter rebuilt");
    }

    /// Test a plate for VIP membership.
    ///
    /// Returns `false` (not an error) for empty plates and when the filter
    /// has not been loaded yet.
    pub fn is_vip(&self, plate: &str) -> bool {
        if plate.is_empty() {
            return false;
        }
        match self.filter.load_full() {
            Some(bloom) => bloom.check(plate),
            None => {
                warn!("VIP plate filter has not been loaded yet");
                false
            }
        }
    }

    /// Rebuild the filter from the tariff table.
    ///
    /// Called at startup and after every tariff mutation; the tariff table
    /// is the source of truth and the filter is always re-derived in full.
    #[instrument(skip_all, err)]
    pub async fn reload_from_db(&self, pool: &PgPool) -> Result<()> {
        let mut conn = pool.acquire().await.map_err(crate::db::errors::DbError::from)?;
        let plates = Tariffs::new(&mut conn).all_plates().await?;
        self.rebuild(plates);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unloaded_filter_rejects() {
        let filter = VipFilter::new();
        assert!(!filter.is_vip("BE5084AG"));
    }

    #[test]
    fn test_empty_plate_rejects() {
        let filter = VipFilter::new();
        filter.rebuild(["BE5084AG"]);
        assert!(!filter.is_vip(""));
    }

    #[test]
    fn test_membership_after_rebuild() {
        let filter = VipFilter::new();
        filter.rebuild(["BE5084AG", "AH1234BC"]);
        // No false negatives for loaded plates
        assert!(filter.is_vip("BE5084AG"));
        assert!(filter.is_vip("AH1234BC"));
    }

    #[test]
    fn test_rebuild_replaces_previous_set() {
        let filter = VipFilter::new();
        filter.rebuild(["ABC123"]);
        assert!(filter.is_vip("ABC123"));

        // The only tariff for ABC123 is gone; a rebuild from the new
        // source set must drop it (the 1% false-positive rate makes a
        // residual hit on this single plate vanishingly unlikely).
        filter.rebuild(["XYZ789"]);
        assert!(!filter.is_vip("ABC123"));
        assert!(filter.is_vip("XYZ789"));
    }

    #[test]
    fn test_rebuild_with_empty_set() {
        let filter = VipFilter::new();
        filter.rebuild(Vec::<String>::new());
        assert!(!filter.is_vip("BE5084AG"));
    }
}
