//! Flattening of polled runner books into snapshot rows.

use std::array;

use chrono::{DateTime, Utc};

use crate::domain::{
    MarketId, MarketStatus, PriceSize, RunnerBook, Snapshot, EMPTY_LEVEL, PRICE_DEPTH,
};

/// Convert the runner books of one market into snapshot rows.
///
/// Each runner yields one row with its best [`PRICE_DEPTH`] back and lay
/// levels; missing levels are filled with [`EMPTY_LEVEL`]. When no runner
/// has a single level on either side the market carries no information and
/// nothing is emitted.
#[must_use]
pub fn process_runner_books(
    runners: &[RunnerBook],
    status: MarketStatus,
    inplay: bool,
    market_id: &MarketId,
    timestamp: DateTime<Utc>,
) -> Vec<Snapshot> {
    if runners.iter().all(RunnerBook::is_empty) {
        return Vec::new();
    }

    runners
        .iter()
        .map(|runner| Snapshot {
            selection_id: runner.selection_id,
            back: best_levels(&runner.available_to_back),
            lay: best_levels(&runner.available_to_lay),
            last_price_traded: runner.last_price_traded,
            market_status: status,
            inplay,
            market_id: market_id.clone(),
            timestamp,
        })
        .collect()
}

fn best_levels(side: &[PriceSize]) -> [PriceSize; PRICE_DEPTH] {
    array::from_fn(|i| side.get(i).copied().unwrap_or(EMPTY_LEVEL))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::{RunnerStatus, SelectionId, NO_LIQUIDITY};

    fn runner(id: u64, back: &[(f64, f64)], lay: &[(f64, f64)]) -> RunnerBook {
        let level = |&(p, s): &(f64, f64)| {
            PriceSize::new(
                rust_decimal::Decimal::try_from(p).unwrap(),
                rust_decimal::Decimal::try_from(s).unwrap(),
            )
        };
        RunnerBook {
            selection_id: SelectionId::new(id),
            status: RunnerStatus::Active,
            last_price_traded: Some(dec!(2.5)),
            available_to_back: back.iter().map(level).collect(),
            available_to_lay: lay.iter().map(level).collect(),
        }
    }

    fn process(runners: &[RunnerBook]) -> Vec<Snapshot> {
        process_runner_books(
            runners,
            MarketStatus::Open,
            false,
            &MarketId::new("1.100"),
            Utc::now(),
        )
    }

    #[test]
    fn single_back_level_is_padded_with_sentinel() {
        let rows = process(&[runner(47972, &[(2.5, 120.0)], &[])]);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.back[0], PriceSize::new(dec!(2.5), dec!(120)));
        assert_eq!(row.back[1], EMPTY_LEVEL);
        assert_eq!(row.back[2], EMPTY_LEVEL);
        assert!(row.lay.iter().all(|l| *l == EMPTY_LEVEL));
        assert!(row.has_back(0));
        assert!(!row.has_back(1));
        assert!(!row.has_lay(0));
    }

    #[test]
    fn no_levels_anywhere_yields_no_rows() {
        let rows = process(&[runner(1, &[], &[]), runner(2, &[], &[]), runner(3, &[], &[])]);
        assert!(rows.is_empty());
    }

    #[test]
    fn no_runners_yields_no_rows() {
        assert!(process(&[]).is_empty());
    }

    #[test]
    fn runners_without_levels_still_emit_when_another_runner_has_prices() {
        let rows = process(&[runner(1, &[(1.5, 10.0)], &[(1.52, 8.0)]), runner(2, &[], &[])]);

        assert_eq!(rows.len(), 2);
        assert!(rows[1].back.iter().all(|l| l.price == NO_LIQUIDITY));
    }

    #[test]
    fn depth_is_capped_at_three_levels() {
        let rows = process(&[runner(
            1,
            &[(2.0, 1.0), (1.99, 2.0), (1.98, 3.0), (1.97, 4.0)],
            &[(2.02, 1.0), (2.04, 2.0), (2.06, 3.0), (2.08, 4.0)],
        )]);

        let row = &rows[0];
        assert_eq!(row.back[2].price, dec!(1.98));
        assert_eq!(row.lay[2].price, dec!(2.06));
    }

    #[test]
    fn market_fields_are_copied_to_every_row() {
        let ts = Utc::now();
        let rows = process_runner_books(
            &[runner(1, &[(3.0, 5.0)], &[]), runner(2, &[], &[(4.0, 6.0)])],
            MarketStatus::Suspended,
            true,
            &MarketId::new("1.42"),
            ts,
        );

        for row in &rows {
            assert_eq!(row.market_status, MarketStatus::Suspended);
            assert!(row.inplay);
            assert_eq!(row.market_id.as_str(), "1.42");
            assert_eq!(row.timestamp, ts);
            assert_eq!(row.last_price_traded, Some(dec!(2.5)));
        }
    }
}
