// Cost records, anomaly detection and period roll-ups
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Percent above the baseline at which a daily cost counts as anomalous
pub const ANOMALY_THRESHOLD_PERCENT: f64 = 50.0;

/// One stored cost data point; `date` is `YYYY-MM-DD` for daily and
/// `YYYY-MM-DD` (first of month) for monthly records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Cost")]
    pub cost: f64,
}

impl CostRecord {
    pub fn new(date: impl Into<String>, cost: f64) -> Self {
        Self {
            date: date.into(),
            cost,
        }
    }
}

/// Flag anomalous points in a daily series.
///
/// The baseline is the mean of every point except the most recent one (0 for
/// fewer than two points). A point is flagged when the baseline is positive
/// and the point exceeds it by more than [`ANOMALY_THRESHOLD_PERCENT`].
pub fn detect_anomalies(records: &[CostRecord]) -> Vec<bool> {
    let baseline = if records.len() > 1 {
        let history = &records[..records.len() - 1];
        history.iter().map(|r| r.cost).sum::<f64>() / history.len() as f64
    } else {
        0.0
    };

    records
        .iter()
        .map(|r| baseline > 0.0 && (r.cost - baseline) / baseline * 100.0 > ANOMALY_THRESHOLD_PERCENT)
        .collect()
}

/// Sum daily records by ISO week, labelled `YYYY-Www`, ascending.
///
/// Records with unparseable dates are skipped.
pub fn roll_up_weekly(daily: &[CostRecord]) -> Vec<CostRecord> {
    let mut weeks: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for record in daily {
        match NaiveDate::parse_from_str(&record.date, "%Y-%m-%d") {
            Ok(date) => {
                let week = date.iso_week();
                *weeks.entry((week.year(), week.week())).or_default() += record.cost;
            }
            Err(e) => {
                tracing::warn!("Skipping cost record with bad date {:?}: {}", record.date, e);
            }
        }
    }

    weeks
        .into_iter()
        .map(|((year, week), cost)| CostRecord::new(format!("{}-W{:02}", year, week), cost))
        .collect()
}

/// Sum monthly records by calendar year (first four characters of the date).
pub fn roll_up_yearly(monthly: &[CostRecord]) -> Vec<CostRecord> {
    let mut years: BTreeMap<String, f64> = BTreeMap::new();
    for record in monthly {
        let year: String = record.date.chars().take(4).collect();
        *years.entry(year).or_default() += record.cost;
    }

    years
        .into_iter()
        .map(|(year, cost)| CostRecord::new(year, cost))
        .collect()
}

/// Sort ascending by date and keep the most recent `limit` records
pub fn most_recent(mut records: Vec<CostRecord>, limit: usize) -> Vec<CostRecord> {
    records.sort_by(|a, b| a.date.cmp(&b.date));
    let skip = records.len().saturating_sub(limit);
    records.split_off(skip)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily(costs: &[f64]) -> Vec<CostRecord> {
        costs
            .iter()
            .enumerate()
            .map(|(i, c)| CostRecord::new(format!("2024-03-{:02}", i + 1), *c))
            .collect()
    }

    #[test]
    fn test_detect_anomalies_flags_spike_over_baseline() {
        // baseline over the first four = 10.0; 16 is +60%, 15 is exactly +50%
        let records = daily(&[10.0, 10.0, 10.0, 10.0, 16.0]);
        assert_eq!(detect_anomalies(&records), vec![false, false, false, false, true]);

        let records = daily(&[10.0, 10.0, 10.0, 10.0, 15.0]);
        assert_eq!(detect_anomalies(&records), vec![false; 5]);
    }

    #[test]
    fn test_detect_anomalies_short_or_zero_series() {
        assert!(detect_anomalies(&[]).is_empty());
        assert_eq!(detect_anomalies(&daily(&[100.0])), vec![false]);
        assert_eq!(detect_anomalies(&daily(&[0.0, 0.0, 5.0])), vec![false; 3]);
    }

    #[test]
    fn test_roll_up_weekly_groups_by_iso_week() {
        // 2024-03-03 is a Sunday (week 9), 2024-03-04 is a Monday (week 10)
        let records = vec![
            CostRecord::new("2024-03-02", 1.0),
            CostRecord::new("2024-03-03", 2.0),
            CostRecord::new("2024-03-04", 4.0),
            CostRecord::new("bogus", 100.0),
        ];
        let weeks = roll_up_weekly(&records);
        assert_eq!(
            weeks,
            vec![CostRecord::new("2024-W09", 3.0), CostRecord::new("2024-W10", 4.0)]
        );
    }

    #[test]
    fn test_roll_up_yearly_sums_months() {
        let records = vec![
            CostRecord::new("2023-11-01", 10.0),
            CostRecord::new("2023-12-01", 20.0),
            CostRecord::new("2024-01-01", 5.0),
        ];
        let years = roll_up_yearly(&records);
        assert_eq!(
            years,
            vec![CostRecord::new("2023", 30.0), CostRecord::new("2024", 5.0)]
        );
    }

    #[test]
    fn test_most_recent_keeps_tail_in_order() {
        let records = vec![
            CostRecord::new("2024-01-03", 3.0),
            CostRecord::new("2024-01-01", 1.0),
            CostRecord::new("2024-01-02", 2.0),
        ];
        let recent = most_recent(records, 2);
        assert_eq!(
            recent,
            vec![CostRecord::new("2024-01-02", 2.0), CostRecord::new("2024-01-03", 3.0)]
        );
    }
}
