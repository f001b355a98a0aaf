#![forbid(unsafe_code)]

use crate::domain::{FeatureVector, SOIL_RANGE, WILDERNESS_RANGE, block_sum};
use crate::error::{BatchValidationError, OneHotBlock};
use crate::tabular;
use rustc_hash::FxHashMap;
use tracing::debug;

/// How many offending row indices a one-hot error lists.
pub const MAX_REPORTED_ROWS: usize = 10;

/// Validated batch upload: one feature vector per data row, already in
/// classifier column order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchInput {
    pub rows: Vec<FeatureVector>,
}

impl BatchInput {
    /// Parse and validate CSV text against the classifier's column names.
    ///
    /// Columns not named by the classifier (such as a serial-number column)
    /// are ignored. Checks run in order: emptiness, missing columns, cell
    /// values, then the soil and wilderness one-hot blocks. Row indices in
    /// errors are zero-based and count data rows only.
    pub fn from_csv(text: &str, feature_names: &[String]) -> Result<Self, BatchValidationError> {
        let mut records = tabular::parse(text)
            .map_err(BatchValidationError::Malformed)?
            .into_iter();
        let header: Vec<String> = match records.next() {
            Some(header) => header.into_iter().map(|h| h.trim().to_owned()).collect(),
            None => return Err(BatchValidationError::Empty),
        };
        let records: Vec<Vec<String>> = records.collect();
        if records.is_empty() {
            return Err(BatchValidationError::Empty);
        }

        let mut positions: FxHashMap<&str, usize> = FxHashMap::default();
        for (ix, name) in header.iter().enumerate() {
            positions.entry(name.as_str()).or_insert(ix);
        }

        let mut missing: Vec<String> = feature_names
            .iter()
            .filter(|name| !positions.contains_key(name.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(BatchValidationError::MissingColumns(missing));
        }
        let columns: Vec<usize> = feature_names
            .iter()
            .map(|name| positions[name.as_str()])
            .collect();

        let mut rows = Vec::with_capacity(records.len());
        for (row_ix, record) in records.iter().enumerate() {
            if record.len() != header.len() {
                return Err(BatchValidationError::RaggedRow {
                    row: row_ix,
                    expected: header.len(),
                    actual: record.len(),
                });
            }
            let mut values = Vec::with_capacity(columns.len());
            for (feature_ix, &col) in columns.iter().enumerate() {
                let raw = record[col].trim();
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| BatchValidationError::InvalidCell {
                        row: row_ix,
                        column: feature_names[feature_ix].clone(),
                        value: raw.to_owned(),
                    })?;
                values.push(value);
            }
            let vector = FeatureVector::from_values(values).map_err(|err| {
                BatchValidationError::Malformed(format!("row {row_ix}: {err}"))
            })?;
            rows.push(vector);
        }

        check_block(&rows, OneHotBlock::Soil)?;
        check_block(&rows, OneHotBlock::Wilderness)?;

        debug!(rows = rows.len(), "batch input validated");
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn check_block(rows: &[FeatureVector], block: OneHotBlock) -> Result<(), BatchValidationError> {
    let range = match block {
        OneHotBlock::Wilderness => WILDERNESS_RANGE,
        OneHotBlock::Soil => SOIL_RANGE,
    };
    let bad: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| block_sum(&row.as_slice()[range.clone()]) != 1.0)
        .map(|(ix, _)| ix)
        .collect();
    if bad.is_empty() {
        return Ok(());
    }
    Err(BatchValidationError::InvalidOneHot {
        block,
        total: bad.len(),
        rows: bad.into_iter().take(MAX_REPORTED_ROWS).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FEATURE_COUNT, FEATURE_NAMES};

    fn names() -> Vec<String> {
        FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
    }

    fn valid_row(wilderness: usize, soil: usize) -> Vec<String> {
        let mut row = vec!["0".to_string(); FEATURE_COUNT];
        row[0] = "2596".into();
        row[4] = "-6".into();
        row[WILDERNESS_RANGE.start + wilderness] = "1".into();
        row[SOIL_RANGE.start + soil] = "1".into();
        row
    }

    fn csv(header: &[String], rows: &[Vec<String>]) -> String {
        let mut out = String::new();
        tabular::write_record(&mut out, header);
        for row in rows {
            tabular::write_record(&mut out, row);
        }
        out
    }

    #[test]
    fn accepts_valid_rows() {
        let text = csv(&names(), &[valid_row(0, 0), valid_row(3, 39)]);
        let input = BatchInput::from_csv(&text, &names()).unwrap();

        assert_eq!(input.len(), 2);
        assert_eq!(input.rows[0].get(0), Some(2596.0));
        assert_eq!(input.rows[0].get(4), Some(-6.0));
        assert!(input.rows.iter().all(FeatureVector::has_valid_one_hot));
    }

    #[test]
    fn ignores_extra_columns_and_reorders() {
        let mut header = names();
        header.reverse();
        header.insert(0, "S_No".into());
        let mut row = valid_row(1, 2);
        row.reverse();
        row.insert(0, "1".into());

        let input = BatchInput::from_csv(&csv(&header, &[row]), &names()).unwrap();
        assert_eq!(input.rows[0].get(0), Some(2596.0));
        assert_eq!(input.rows[0].wilderness_block(), &[0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn header_only_is_empty() {
        let text = csv(&names(), &[]);
        assert_eq!(
            BatchInput::from_csv(&text, &names()),
            Err(BatchValidationError::Empty)
        );
        assert_eq!(BatchInput::from_csv("", &names()), Err(BatchValidationError::Empty));
    }

    #[test]
    fn reports_missing_columns_sorted() {
        let header: Vec<String> = names()
            .into_iter()
            .filter(|n| n != "Soil_Type7" && n != "Aspect")
            .collect();
        let row = vec!["0".to_string(); header.len()];
        let err = BatchInput::from_csv(&csv(&header, &[row]), &names()).unwrap_err();
        assert_eq!(
            err,
            BatchValidationError::MissingColumns(vec!["Aspect".into(), "Soil_Type7".into()])
        );
    }

    #[test]
    fn reports_blank_cells() {
        let mut row = valid_row(0, 0);
        row[2] = " ".into();
        let err = BatchInput::from_csv(&csv(&names(), &[row]), &names()).unwrap_err();
        assert_eq!(
            err,
            BatchValidationError::InvalidCell {
                row: 0,
                column: "Slope".into(),
                value: String::new(),
            }
        );
    }

    #[test]
    fn reports_ragged_rows() {
        let mut row = valid_row(0, 0);
        row.pop();
        let err = BatchInput::from_csv(&csv(&names(), &[valid_row(0, 0), row]), &names())
            .unwrap_err();
        assert!(matches!(err, BatchValidationError::RaggedRow { row: 1, .. }));
    }

    #[test]
    fn two_soil_types_reject_the_row() {
        let mut bad = valid_row(0, 0);
        bad[SOIL_RANGE.start + 5] = "1".into();
        let rows = vec![valid_row(0, 0), bad, valid_row(2, 2)];

        let err = BatchInput::from_csv(&csv(&names(), &rows), &names()).unwrap_err();
        assert_eq!(
            err,
            BatchValidationError::InvalidOneHot {
                block: OneHotBlock::Soil,
                total: 1,
                rows: vec![1],
            }
        );
    }

    #[test]
    fn wilderness_checked_after_soil() {
        let mut bad = valid_row(0, 0);
        bad[WILDERNESS_RANGE.start] = "0".into();
        let err = BatchInput::from_csv(&csv(&names(), &[bad]), &names()).unwrap_err();
        assert!(matches!(
            err,
            BatchValidationError::InvalidOneHot {
                block: OneHotBlock::Wilderness,
                ..
            }
        ));
    }

    #[test]
    fn lists_only_first_ten_offenders() {
        let mut bad = valid_row(0, 0);
        bad[SOIL_RANGE.start] = "0".into();
        let rows = vec![bad; 15];

        let err = BatchInput::from_csv(&csv(&names(), &rows), &names()).unwrap_err();
        match err {
            BatchValidationError::InvalidOneHot { total, rows, .. } => {
                assert_eq!(total, 15);
                assert_eq!(rows, (0..10).collect::<Vec<_>>());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
