//! Pure metric computations.
//!
//! Every function returns `None` rather than erroring when the inputs are
//! insufficient; callers decide whether `None` is a wire-level null or a
//! fallback. All percentages are rounded to 2 decimals.

use watchlist_core::{round2, EstimateTable, PricePoint, PriceTarget};

/// Percent change between the chronologically first and last closes of a
/// series. Fewer than 2 present closes, or a zero baseline, yields `None`.
pub fn percent_change(series: &[PricePoint]) -> Option<f64> {
    let closes: Vec<f64> = series.iter().filter_map(|p| p.close).collect();
    if closes.len() < 2 {
        return None;
    }

    let first = closes[0];
    let last = closes[closes.len() - 1];
    if first == 0.0 {
        return None;
    }

    Some(round2((last - first) / first * 100.0))
}

/// Analyst price-target upside versus the current price. A null or zero
/// current price, or a missing mean target, yields `None`.
pub fn upside(target: &PriceTarget) -> Option<f64> {
    let current = target.current_price?;
    if current == 0.0 {
        return None;
    }
    let mean = target.mean_target?;

    Some(round2((mean - current) / current * 100.0))
}

/// Growth from the current-year estimate to the next-year estimate of one
/// table. A missing or zero current-year baseline yields `None`.
pub fn estimate_growth(table: &EstimateTable) -> Option<f64> {
    let current = table.avg_for("0y")?;
    if current == 0.0 {
        return None;
    }
    let next = table.avg_for("+1y")?;

    Some(round2((next - current) / current * 100.0))
}

/// Sum of forward revenue growth and forward EPS growth.
///
/// The two percentages are intentionally combined into one figure; callers
/// must label it as the combined growth, not as revenue growth alone. If
/// either term is unavailable the composite is `None` — a missing term is
/// never substituted with zero.
pub fn growth_composite(revenue: &EstimateTable, eps: &EstimateTable) -> Option<f64> {
    let revenue_growth = estimate_growth(revenue)?;
    let eps_growth = estimate_growth(eps)?;

    Some(round2(revenue_growth + eps_growth))
}

/// First two sentence-terminated clauses of a description.
///
/// Splits on `". "`, keeps the first two clauses, rejoins and appends the
/// trailing period. Empty or whitespace-only input yields `None` so the
/// caller can substitute the fallback text.
pub fn truncate_description(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }

    let clauses: Vec<&str> = text.split(". ").take(2).collect();
    Some(format!("{}.", clauses.join(". ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use watchlist_core::PricePoint;

    fn series(closes: &[Option<f64>]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| PricePoint {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1 + i as u32, 0, 0, 0).unwrap(),
                close: *close,
            })
            .collect()
    }

    fn table(current: Option<f64>, next: Option<f64>) -> EstimateTable {
        let mut t = EstimateTable::default();
        t.insert("0y", current);
        t.insert("+1y", next);
        t
    }

    #[test]
    fn percent_change_requires_two_points() {
        assert_eq!(percent_change(&[]), None);
        assert_eq!(percent_change(&series(&[Some(100.0)])), None);
        // Null closes do not count toward the minimum.
        assert_eq!(percent_change(&series(&[Some(100.0), None])), None);
    }

    #[test]
    fn percent_change_uses_first_and_last_close() {
        assert_eq!(percent_change(&series(&[Some(100.0), Some(110.0)])), Some(10.0));
        assert_eq!(percent_change(&series(&[Some(100.0), Some(90.0)])), Some(-10.0));
        // First/last chronologically, not min/max.
        assert_eq!(
            percent_change(&series(&[Some(100.0), Some(150.0), Some(120.0)])),
            Some(20.0)
        );
    }

    #[test]
    fn percent_change_skips_null_closes() {
        assert_eq!(
            percent_change(&series(&[None, Some(100.0), None, Some(103.0)])),
            Some(3.0)
        );
    }

    #[test]
    fn percent_change_zero_baseline_is_null() {
        assert_eq!(percent_change(&series(&[Some(0.0), Some(10.0)])), None);
    }

    #[test]
    fn upside_from_target_and_current() {
        let target = PriceTarget {
            mean_target: Some(120.0),
            current_price: Some(100.0),
        };
        assert_eq!(upside(&target), Some(20.0));
    }

    #[test]
    fn upside_null_on_zero_or_missing_current() {
        let zero = PriceTarget {
            mean_target: Some(120.0),
            current_price: Some(0.0),
        };
        assert_eq!(upside(&zero), None);

        let missing = PriceTarget {
            mean_target: Some(120.0),
            current_price: None,
        };
        assert_eq!(upside(&missing), None);
    }

    #[test]
    fn upside_null_on_missing_target() {
        let target = PriceTarget {
            mean_target: None,
            current_price: Some(100.0),
        };
        assert_eq!(upside(&target), None);
    }

    #[test]
    fn growth_composite_sums_both_terms() {
        let revenue = table(Some(100.0), Some(110.0)); // 10.00
        let eps = table(Some(2.0), Some(2.5)); // 25.00
        assert_eq!(growth_composite(&revenue, &eps), Some(35.0));
    }

    #[test]
    fn growth_composite_null_when_either_term_missing() {
        let good = table(Some(100.0), Some(110.0));

        assert_eq!(growth_composite(&table(None, Some(110.0)), &good), None);
        assert_eq!(growth_composite(&good, &table(Some(0.0), Some(2.5))), None);
        assert_eq!(growth_composite(&good, &EstimateTable::default()), None);
    }

    #[test]
    fn description_truncates_to_two_clauses() {
        assert_eq!(truncate_description("A. B. C."), Some("A. B.".to_string()));
        assert_eq!(truncate_description("One clause"), Some("One clause.".to_string()));
        assert_eq!(truncate_description(""), None);
        assert_eq!(truncate_description("   "), None);
    }
}
