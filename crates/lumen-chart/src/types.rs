use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One dataset row: field name to value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Ordered rows handed to the recommender.
pub type DatasetSample = Vec<Record>;

/// Visualization family chosen for a dataset.
///
/// # Examples
///
/// ```
/// use lumen_chart::ChartType;
///
/// let t: ChartType = "stackedBar".parse().unwrap();
/// assert_eq!(t, ChartType::StackedBar);
/// assert_eq!(serde_json::to_string(&t).unwrap(), "\"stackedBar\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    Line,
    Bar,
    StackedBar,
    GroupedBar,
    Area,
    Pie,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
            Self::StackedBar => "stackedBar",
            Self::GroupedBar => "groupedBar",
            Self::Area => "area",
            Self::Pie => "pie",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown chart type: {0}")]
pub struct UnknownChartType(pub String);

impl FromStr for ChartType {
    type Err = UnknownChartType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(Self::Line),
            "bar" => Ok(Self::Bar),
            "stackedBar" => Ok(Self::StackedBar),
            "groupedBar" => Ok(Self::GroupedBar),
            "area" => Ok(Self::Area),
            "pie" => Ok(Self::Pie),
            _ => Err(UnknownChartType(s.to_string())),
        }
    }
}
