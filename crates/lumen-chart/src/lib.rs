//! Default chart-type selection for dashboard datasets.
//!
//! [`recommend`] inspects the shape of a [`DatasetSample`] (time-indexed or
//! categorical, how many series columns) and picks a [`ChartType`]. The
//! choice is advisory; renderers may override it.

pub mod recommend;
pub mod types;


pub use recommend::{recommend, recommend_with, DatasetShape, RecommendOptions};
pub use types::{ChartType, DatasetSample, Record};
