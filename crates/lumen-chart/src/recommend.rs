use serde::{Deserialize, Serialize};

use crate::types::{ChartType, Record};

/// Fields that describe a row rather than a plotted series.
const RESERVED_FIELDS: [&str; 4] = ["name", "date", "value", "color"];

/// Above this many series a time series is drawn as lines.
const MAX_STACKED_TIME_SERIES: usize = 3;
/// Above this many series a categorical dataset is stacked, not grouped.
const MAX_GROUPED_SERIES: usize = 4;

/// Options for [`recommend_with`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendOptions {
    /// Allow pie charts for small single-value categorical datasets.
    #[serde(default)]
    pub allow_pie: bool,
    #[serde(default = "default_pie_max_slices")]
    pub pie_max_slices: usize,
}

fn default_pie_max_slices() -> usize {
    6
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            allow_pie: false,
            pie_max_slices: default_pie_max_slices(),
        }
    }
}

/// The shape features the recommendation is based on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetShape {
    /// The first record has a `date` field.
    pub is_time_series: bool,
    /// Non-reserved field names of the first record.
    pub series_keys: Vec<String>,
    pub record_count: usize,
}

impl DatasetShape {
    /// Returns `None` for an empty sample.
    pub fn inspect(sample: &[Record]) -> Option<Self> {
        let first = sample.first()?;
        Some(Self {
            is_time_series: first.contains_key("date"),
            series_keys: first
                .keys()
                .filter(|k| !RESERVED_FIELDS.contains(&k.as_str()))
                .cloned()
                .collect(),
            record_count: sample.len(),
        })
    }
}

/// Picks the default chart type for `sample`. Never returns
/// [`ChartType::Pie`]; see [`recommend_with`].
pub fn recommend(sample: &[Record]) -> ChartType {
    recommend_with(sample, &RecommendOptions::default())
}

pub fn recommend_with(sample: &[Record], options: &RecommendOptions) -> ChartType {
    let Some(shape) = DatasetShape::inspect(sample) else {
        return ChartType::Bar;
    };
    let keys = shape.series_keys.len();

    if shape.is_time_series {
        return match keys {
            0 => ChartType::Area,
            k if k > MAX_STACKED_TIME_SERIES => ChartType::Line,
            _ => ChartType::StackedBar,
        };
    }

    match keys {
        0 if options.allow_pie && (2..=options.pie_max_slices).contains(&shape.record_count) => {
            ChartType::Pie
        }
        0 => ChartType::Bar,
        k if k > MAX_GROUPED_SERIES => ChartType::StackedBar,
        _ => ChartType::GroupedBar,
    }
}
