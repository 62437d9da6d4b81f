mod common;

use anyhow::Result;
use common::write_file;
use serde_json::{json, Value};
use std::process::Command;

fn lumen_server() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lumen-server"))
}

#[test]
fn evaluate_prints_only_json_on_stdout() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let rules = json!({
        "rules": [{
            "id": "orders-high",
            "name": "Orders spike",
            "conditions": [{"metric_id": "orders", "operator": ">", "value": 150}]
        }]
    });
    let rules_file = write_file(dir.path(), "rules.json", &rules.to_string())?;
    let metrics_file = write_file(
        dir.path(),
        "metrics.json",
        &json!({"metrics": {"orders": {"value": 200}}}).to_string(),
    )?;
    let config = write_file(
        dir.path(),
        "server.toml",
        &format!(
            "rules_file = {}\nmetrics_file = {}\nlog_filter = \"lumen=debug\"\n",
            toml_string(&rules_file),
            toml_string(&metrics_file)
        ),
    )?;

    let output = lumen_server().args(["evaluate", &config]).output()?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let statuses: Value = serde_json::from_slice(&output.stdout)?;
    let statuses = statuses.as_array().cloned().unwrap_or_default();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0]["rule_id"], "orders-high");
    assert_eq!(statuses[0]["triggered"], true);

    // logs still go somewhere
    assert!(String::from_utf8_lossy(&output.stderr).contains("Rule triggered"));
    Ok(())
}

#[test]
fn recommend_chart_prints_chart_type() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let dataset = write_file(
        dir.path(),
        "dataset.json",
        r#"[{"name": "A", "value": 1}, {"name": "B", "value": 2}]"#,
    )?;

    let output = lumen_server()
        .args(["recommend-chart", &dataset, "--allow-pie"])
        .output()?;
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "pie");
    Ok(())
}

/// Quotes a path as a TOML basic string.
fn toml_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}
