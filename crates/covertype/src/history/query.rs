#![forbid(unsafe_code)]

use crate::clock::{COMPACT_FORMAT, TIMESTAMP_FORMAT};
use crate::history::HistoryRecord;
use chrono::{NaiveDate, NaiveDateTime};

/// Parse a record timestamp in either of the two formats records carry.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, COMPACT_FORMAT))
        .ok()
}

/// Filters applied to one kind of history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Case-insensitive substring matched against the record's JSON form.
    pub text: Option<String>,
    /// Inclusive lower bound on the record date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the record date.
    pub to: Option<NaiveDate>,
    /// Only the most recent `window` records are considered.
    pub window: Option<usize>,
}

impl HistoryQuery {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn since(mut self, date: NaiveDate) -> Self {
        self.from = Some(date);
        self
    }

    pub fn until(mut self, date: NaiveDate) -> Self {
        self.to = Some(date);
        self
    }

    pub fn window(mut self, window: usize) -> Self {
        self.window = Some(window);
        self
    }

    /// Filter records given oldest first; the result is most recent first.
    pub fn apply(&self, records: Vec<HistoryRecord>) -> Vec<HistoryRecord> {
        let skip = match self.window {
            Some(window) => records.len().saturating_sub(window),
            None => 0,
        };
        let needle = self
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        records
            .into_iter()
            .skip(skip)
            .rev()
            .filter(|record| needle.as_deref().is_none_or(|n| matches_text(record, n)))
            .filter(|record| self.matches_dates(record))
            .collect()
    }

    /// Records without a parseable timestamp pass date filters.
    fn matches_dates(&self, record: &HistoryRecord) -> bool {
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        let Some(date) = record.timestamp().and_then(parse_timestamp).map(|ts| ts.date()) else {
            return true;
        };
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

fn matches_text(record: &HistoryRecord, needle: &str) -> bool {
    serde_json::to_string(record)
        .map(|blob| blob.to_lowercase().contains(needle))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{BatchRecord, SingleRecord};

    fn single(ts: &str, name: &str) -> HistoryRecord {
        SingleRecord {
            timestamp: Some(ts.to_owned()),
            prediction_name: Some(name.to_owned()),
            ..SingleRecord::default()
        }
        .into()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_both_timestamp_formats() {
        let expected = date(2024, 3, 9).and_hms_opt(14, 5, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-09 14:05:00"), Some(expected));
        assert_eq!(parse_timestamp("20240309_140500"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn results_are_most_recent_first() {
        let records = vec![
            single("2024-01-01 00:00:00", "Aspen"),
            single("2024-01-02 00:00:00", "Krummholz"),
        ];
        let found = HistoryQuery::default().apply(records);
        assert_eq!(found[0].timestamp(), Some("2024-01-02 00:00:00"));
    }

    #[test]
    fn text_matches_any_field_ignoring_case() {
        let records = vec![
            single("2024-01-01 00:00:00", "Aspen"),
            single("2024-01-02 00:00:00", "Krummholz"),
            BatchRecord::new("aspen_plots.csv", 4, vec![5]).into(),
        ];
        let found = HistoryQuery::default().text("ASPEN").apply(records);
        assert_eq!(found.len(), 2);

        let records = vec![single("2024-01-01 00:00:00", "Aspen")];
        let found = HistoryQuery::default().text("soil_type1").apply(records);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn date_range_is_inclusive() {
        let records = vec![
            single("2024-01-01 23:59:59", "a"),
            single("20240102_000000", "b"),
            single("2024-01-03 08:00:00", "c"),
            single("2024-01-04 08:00:00", "d"),
        ];
        let found = HistoryQuery::default()
            .since(date(2024, 1, 2))
            .until(date(2024, 1, 3))
            .apply(records);
        let timestamps: Vec<_> = found.iter().filter_map(HistoryRecord::timestamp).collect();
        assert_eq!(timestamps, vec!["2024-01-03 08:00:00", "20240102_000000"]);
    }

    #[test]
    fn unparseable_timestamps_pass_date_filters() {
        let records = vec![single("not a date", "a"), BatchRecord::default().into()];
        let found = HistoryQuery::default().since(date(2030, 1, 1)).apply(records);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn window_limits_to_most_recent() {
        let records: Vec<HistoryRecord> = (0..10)
            .map(|i| single(&format!("2024-01-01 00:00:0{i}"), "x"))
            .collect();
        let found = HistoryQuery::default().window(3).apply(records);
        let timestamps: Vec<_> = found.iter().filter_map(HistoryRecord::timestamp).collect();
        assert_eq!(
            timestamps,
            vec!["2024-01-01 00:00:09", "2024-01-01 00:00:08", "2024-01-01 00:00:07"]
        );
    }
}
