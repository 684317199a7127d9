use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use instance_first_post::api::ApiClient;
use instance_first_post::config::Config;
use instance_first_post::{hosts, snapshot, speed, HostSurveyor, SurveyOptions};

const USAGE: &str = "usage: instance-first-post [survey|speed]";

#[derive(Debug, Clone, Copy)]
enum Mode {
    /// Locate each host's oldest post and rank by freshness.
    Survey,
    /// Sample each host's posting throughput.
    Speed,
}

/// Exits 0 whenever the arguments parse. A bad configuration or an
/// unreachable host list is logged and ends the run with no hosts surveyed;
/// an unknown mode prints usage and exits 2.
#[tokio::main]
async fn main() {
    let mode = match std::env::args().nth(1).as_deref() {
        None | Some("survey") => Mode::Survey,
        Some("speed") => Mode::Speed,
        Some(_) => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(mode).await {
        error!("Run ended before surveying: {e:#}");
    }
}

async fn run(mode: Mode) -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(?mode, page_size = config.page_size, "Starting instance-first-post");

    let client = ApiClient::new(&config).context("Failed to build HTTP client")?;
    let domains = hosts::load_hosts(client.http(), &config).await?;

    match mode {
        Mode::Survey => {
            let options = SurveyOptions {
                page_size: config.page_size,
            };
            let surveyed = HostSurveyor::new(&client, options).survey(&domains).await;
            ensure_parent_dir(&config.snapshot_path).await;
            snapshot::write(&surveyed, &config.snapshot_path).await;
        }
        Mode::Speed => {
            if let Err(e) = tokio::fs::create_dir_all(&config.speed_history_dir).await {
                warn!(
                    path = %config.speed_history_dir.display(),
                    "Failed to create speed history directory: {e}"
                );
            }
            let samples = speed::survey(
                &client,
                &domains,
                config.speed_min_posts,
                &config.speed_history_dir,
                Utc::now(),
            )
            .await;
            ensure_parent_dir(&config.speed_snapshot_path).await;
            speed::write(&samples, &config.speed_snapshot_path).await;
        }
    }

    Ok(())
}

/// Best-effort creation of the directory holding an output file.
async fn ensure_parent_dir(path: &Path) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            warn!(path = %parent.display(), "Failed to create output directory: {e}");
        }
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,instance_first_post=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
