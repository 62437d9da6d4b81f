use anyhow::Result;
use lumen_chart::{recommend_with, ChartType, DatasetSample, RecommendOptions};
use serde::Deserialize;

/// Either a bare array of records or `{"data": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetFile {
    Records(DatasetSample),
    Wrapped { data: DatasetSample },
}

pub fn parse_sample(content: &str) -> Result<DatasetSample> {
    let file: DatasetFile = serde_json::from_str(content)
        .map_err(|e| anyhow::anyhow!("expected an array of objects or {{\"data\": [...]}}: {e}"))?;
    Ok(match file {
        DatasetFile::Records(records) | DatasetFile::Wrapped { data: records } => records,
    })
}

pub fn recommend_file(path: &str, options: &RecommendOptions) -> Result<ChartType> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read dataset file '{}': {}", path, e))?;
    let sample = parse_sample(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse dataset file '{}': {}", path, e))?;
    let chart = recommend_with(&sample, options);
    tracing::debug!(path = %path, records = sample.len(), chart = %chart, "Chart type recommended");
    Ok(chart)
}
