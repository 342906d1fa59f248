//! Category/value aggregation and Top-N grouping for the pie page.

use crate::pie::error::PieError;
use polars::prelude::*;
use std::ops::RangeInclusive;

/// Label of the bucket that collects everything outside the top N.
pub const OTHER_LABEL: &str = "Other";
/// Upper bound of the top-N slider.
pub const MAX_TOP_N: usize = 12;
/// Initial top-N when the user has not picked one.
pub const DEFAULT_TOP_N: usize = 6;

const CATEGORY: &str = "Category";
const VALUE: &str = "Value";

/// One labelled share of the pie.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
}

impl Slice {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Category totals in display order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregatedSeries {
    pub slices: Vec<Slice>,
}

impl AggregatedSeries {
    pub fn new(slices: Vec<Slice>) -> Self {
        Self { slices }
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.slices.iter().map(|slice| slice.value).sum()
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.slices
            .iter()
            .find(|slice| slice.label == label)
            .map(|slice| slice.value)
    }

    /// Keeps the first `n` slices and folds the rest into [`OTHER_LABEL`].
    ///
    /// The folded bucket is only added when its sum is positive. If one of the kept
    /// slices is already labelled "Other", the remainder is added to it so labels stay unique.
    /// `n` is treated as at least 1.
    pub fn group_top_n(mut self, n: usize) -> Self {
        let n = n.max(1);
        if n >= self.slices.len() {
            return self;
        }

        let rest = self.slices.split_off(n);
        let other_sum: f64 = rest.iter().map(|slice| slice.value).sum();
        if other_sum > 0.0 {
            match self
                .slices
                .iter_mut()
                .find(|slice| slice.label == OTHER_LABEL)
            {
                Some(existing) => existing.value += other_sum,
                None => self.slices.push(Slice::new(OTHER_LABEL, other_sum)),
            }
        }
        self
    }

    /// Two-column preview table (`Category`, `Value`).
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let labels: Vec<&str> = self.slices.iter().map(|s| s.label.as_str()).collect();
        let values: Vec<f64> = self.slices.iter().map(|s| s.value).collect();
        df!(CATEGORY => labels, VALUE => values)
    }
}

/// Allowed range of the top-N control for a series with `group_count` groups.
pub fn top_n_range(group_count: usize) -> RangeInclusive<usize> {
    1..=MAX_TOP_N.min(group_count).max(1)
}

/// Clamps a requested top-N into [`top_n_range`], defaulting to [`DEFAULT_TOP_N`].
pub fn clamp_top_n(requested: Option<usize>, group_count: usize) -> usize {
    let range = top_n_range(group_count);
    requested
        .unwrap_or(DEFAULT_TOP_N.min(group_count))
        .clamp(*range.start(), *range.end())
}

/// Sums `value` per distinct `category` in `frame`.
///
/// The category column is cast to text and the value column to `f64`; entries that do not
/// convert, are null or NaN are dropped together with their row. With `sort_desc` the
/// result is ordered by value descending (ties by label), otherwise by label ascending.
///
/// # Errors
///
/// * [`PieError::ColumnNotFound`] if either column is absent.
/// * [`PieError::NoUsableRows`] if no row survives cleaning.
/// * [`PieError::DataFrameProcessing`] for polars failures.
pub fn aggregate(
    frame: &DataFrame,
    category: &str,
    value: &str,
    sort_desc: bool,
) -> Result<AggregatedSeries, PieError> {
    for name in [category, value] {
        if !frame
            .get_column_names()
            .iter()
            .any(|column| column.as_str() == name)
        {
            return Err(PieError::ColumnNotFound(name.to_string()));
        }
    }

    let grouped = frame
        .clone()
        .lazy()
        .select([
            col(category).cast(DataType::String).alias(CATEGORY),
            col(value).cast(DataType::Float64).alias(VALUE),
        ])
        .filter(
            col(CATEGORY)
                .is_not_null()
                .and(col(VALUE).is_not_null())
                .and(col(VALUE).is_not_nan()),
        )
        .group_by([col(CATEGORY)])
        .agg([col(VALUE).sum()]);

    let ordered = if sort_desc {
        grouped.sort_by_exprs(
            [col(VALUE), col(CATEGORY)],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
    } else {
        grouped.sort([CATEGORY], SortMultipleOptions::default())
    };

    let df = ordered.collect()?;
    let labels = df.column(CATEGORY)?.str()?;
    let values = df.column(VALUE)?.f64()?;

    let slices: Vec<Slice> = labels
        .into_iter()
        .zip(values.into_iter())
        .filter_map(|(label, value)| Some(Slice::new(label?, value?)))
        .collect();

    if slices.is_empty() {
        return Err(PieError::NoUsableRows);
    }
    Ok(AggregatedSeries::new(slices))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abcd() -> PolarsResult<DataFrame> {
        df!(
            "name" => ["A", "B", "C", "D"],
            "amount" => [10i64, 5, 3, 2],
        )
    }

    #[test]
    fn test_top_two_with_other() -> Result<(), Box<dyn std::error::Error>> {
        let series = aggregate(&abcd()?, "name", "amount", true)?.group_top_n(2);

        assert_eq!(
            series.slices,
            vec![
                Slice::new("A", 10.0),
                Slice::new("B", 5.0),
                Slice::new(OTHER_LABEL, 5.0)
            ]
        );
        assert_eq!(crate::utils::format_total(series.total()), "20.00");
        Ok(())
    }

    #[test]
    fn test_groups_and_drops_unusable_rows() -> Result<(), Box<dyn std::error::Error>> {
        let frame = df!(
            "fruit" => [Some("apple"), Some("pear"), Some("apple"), None, Some("fig"), Some("pear")],
            "kg" => [Some("1.5"), Some("2"), Some("oops"), Some("9"), None, Some("0.5")],
        )?;
        let series = aggregate(&frame, "fruit", "kg", false)?;

        // Sorted by label when not sorting by value.
        assert_eq!(
            series.slices,
            vec![Slice::new("apple", 1.5), Slice::new("pear", 2.5)]
        );
        // Valid values: 1.5 + 2 + 0.5
        assert_eq!(series.total(), 4.0);
        Ok(())
    }

    #[test]
    fn test_sort_desc_breaks_ties_by_label() -> Result<(), Box<dyn std::error::Error>> {
        let frame = df!(
            "c" => ["z", "y", "x", "x"],
            "v" => [4.0, 4.0, 1.0, 1.0],
        )?;
        let series = aggregate(&frame, "c", "v", true)?;
        let labels: Vec<&str> = series.slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["y", "z", "x"]);
        Ok(())
    }

    #[test]
    fn test_no_usable_rows() -> Result<(), Box<dyn std::error::Error>> {
        let frame = df!(
            "c" => ["a", "b"],
            "v" => ["n/a", "-"],
        )?;
        assert!(matches!(
            aggregate(&frame, "c", "v", true),
            Err(PieError::NoUsableRows)
        ));
        Ok(())
    }

    #[test]
    fn test_unknown_column() -> Result<(), Box<dyn std::error::Error>> {
        let result = aggregate(&abcd()?, "name", "missing", true);
        assert!(matches!(result, Err(PieError::ColumnNotFound(c)) if c == "missing"));
        Ok(())
    }

    #[test]
    fn test_top_n_invariants() -> Result<(), Box<dyn std::error::Error>> {
        let frame = df!(
            "c" => ["a", "b", "c", "d", "e", "f", "g", "a"],
            "v" => [1.0, 7.0, 3.0, 2.5, 9.0, 0.5, 4.0, 2.0],
        )?;
        let full = aggregate(&frame, "c", "v", true)?;
        let input_total: f64 = 1.0 + 7.0 + 3.0 + 2.5 + 9.0 + 0.5 + 4.0 + 2.0;

        for n in 1..full.len() {
            let grouped = full.clone().group_top_n(n);
            assert!(grouped.len() <= n + 1);
            assert!((grouped.total() - input_total).abs() < 1e-9);

            let excluded: f64 = full.slices[n..].iter().map(|s| s.value).sum();
            assert_eq!(grouped.get(OTHER_LABEL), Some(excluded));
            for slice in &grouped.slices {
                assert!(slice.label == OTHER_LABEL || full.get(&slice.label).is_some());
            }
        }
        Ok(())
    }

    #[test]
    fn test_other_skipped_when_remainder_not_positive() {
        let series = AggregatedSeries::new(vec![
            Slice::new("a", 5.0),
            Slice::new("b", 0.0),
            Slice::new("c", 0.0),
        ])
        .group_top_n(1);
        assert_eq!(series.slices, vec![Slice::new("a", 5.0)]);
    }

    #[test]
    fn test_existing_other_label_absorbs_remainder() {
        let series = AggregatedSeries::new(vec![
            Slice::new("Other", 5.0),
            Slice::new("a", 4.0),
            Slice::new("b", 1.0),
        ])
        .group_top_n(2);
        assert_eq!(
            series.slices,
            vec![Slice::new("Other", 6.0), Slice::new("a", 4.0)]
        );
    }

    #[test]
    fn test_top_n_range_and_clamp() {
        assert_eq!(top_n_range(20), 1..=12);
        assert_eq!(top_n_range(4), 1..=4);
        assert_eq!(top_n_range(0), 1..=1);
        assert_eq!(clamp_top_n(None, 20), 6);
        assert_eq!(clamp_top_n(None, 3), 3);
        assert_eq!(clamp_top_n(Some(50), 8), 8);
        assert_eq!(clamp_top_n(Some(0), 8), 1);
    }

    #[test]
    fn test_preview_frame() -> Result<(), Box<dyn std::error::Error>> {
        let series = AggregatedSeries::new(vec![Slice::new("a", 1.0), Slice::new("b", 2.0)]);
        let frame = series.to_frame()?;
        assert_eq!(frame.shape(), (2, 2));
        assert_eq!(frame.column("Value")?.f64()?.sum(), Some(3.0));
        Ok(())
    }
}
