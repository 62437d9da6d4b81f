use anyhow::Result;
use chrono::Utc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use lumen_server::config::ServerConfig;
use lumen_server::dataset;
use lumen_server::scheduler::EvaluationScheduler;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  lumen-server [config.toml]                                              Run the evaluation scheduler");
    eprintln!("  lumen-server evaluate <config.toml>                                     Run one cycle and print statuses as JSON");
    eprintln!("  lumen-server recommend-chart <dataset.json> [--allow-pie] [--config <config.toml>]");
    eprintln!("                                                                          Print the recommended chart type");
}

fn init_tracing(default_directive: &str) -> Result<()> {
    // stdout carries command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_directive.parse()?))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    lumen_common::id::init(1, 1);

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("evaluate") => {
            let config_path = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("evaluate requires <config.toml> argument")
            })?;
            run_evaluate(config_path)
        }
        Some("recommend-chart") => {
            let dataset_path = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("recommend-chart requires <dataset.json> argument")
            })?;
            run_recommend_chart(dataset_path, &args[3..])
        }
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        _ => {
            let config_path = args
                .get(1)
                .map(|s| s.as_str())
                .unwrap_or("config/server.toml");
            run_server(config_path).await
        }
    }
}

async fn run_server(config_path: &str) -> Result<()> {
    let config = ServerConfig::load(config_path)?;
    init_tracing(&config.log_filter)?;

    let scheduler = EvaluationScheduler::from_config(&config)?;
    tracing::info!(
        config = %config_path,
        rules = scheduler.rule_store().len(),
        "Lumen server starting"
    );

    tokio::select! {
        _ = scheduler.run() => {}
        result = signal::ctrl_c() => {
            result?;
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!(
        recorded = scheduler.alert_store().len(),
        open = scheduler.alert_store().open_count(),
        "Lumen server stopped"
    );
    Ok(())
}

#[allow(clippy::print_stdout)]
fn run_evaluate(config_path: &str) -> Result<()> {
    let config = ServerConfig::load(config_path)?;
    init_tracing(&config.log_filter)?;

    let scheduler = EvaluationScheduler::from_config(&config)?;
    let report = scheduler.run_cycle(Utc::now());
    for failure in &report.failures {
        tracing::error!(rule_id = %failure.rule_id, error = %failure.error, "Rule evaluation failed");
    }

    println!("{}", serde_json::to_string_pretty(&report.statuses)?);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn run_recommend_chart(dataset_path: &str, flags: &[String]) -> Result<()> {
    let mut allow_pie = false;
    let mut config_path = None;
    let mut flags = flags.iter();
    while let Some(flag) = flags.next() {
        match flag.as_str() {
            "--allow-pie" => allow_pie = true,
            "--config" => {
                config_path = Some(flags.next().ok_or_else(|| {
                    print_usage();
                    anyhow::anyhow!("--config requires <config.toml> argument")
                })?);
            }
            other => {
                print_usage();
                anyhow::bail!("unknown recommend-chart option: {other}");
            }
        }
    }

    let config = match config_path {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    init_tracing(&config.log_filter)?;

    let mut options = config.chart;
    options.allow_pie |= allow_pie;

    let chart = dataset::recommend_file(dataset_path, &options)?;
    println!("{chart}");
    Ok(())
}
