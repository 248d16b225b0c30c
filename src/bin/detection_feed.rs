//! Feeds detector output into a running inventory service.
//!
//! Reads one detection frame per line (NDJSON) from a file or stdin, applies
//! each frame through the inventory API and prints one JSON frame report per
//! line. Frames are processed strictly in order; closing the input stops the
//! feed.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kitchen_inventory::{
    client::HttpInventoryClient,
    config::{parse_label_list, DetectionConfig},
    services::detection::{
        Detection, DetectionAdapter, DetectionFrame, DetectionSettings, StatusBasis,
    },
};

#[derive(Parser, Debug)]
#[command(
    name = "detection-feed",
    about = "Apply detector frames (NDJSON) to the kitchen inventory API",
    version
)]
struct Cli {
    /// Base URL of the inventory service
    #[arg(long, default_value = "http://localhost:5000")]
    api_url: String,

    /// NDJSON file of frames; reads stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,

    /// Comma-separated labels that may restock inventory
    #[arg(long)]
    labels: Option<String>,

    /// Cost written for detector-created items
    #[arg(long)]
    placeholder_cost: Option<String>,

    /// Expiry of detected items, in days from today
    #[arg(long)]
    expiry_days: Option<u64>,

    /// Ignore detections below this confidence
    #[arg(long)]
    min_confidence: Option<f32>,

    /// Derive status from the stored total or from the frame count
    #[arg(long, value_enum, default_value_t = BasisArg::Merged)]
    status_basis: BasisArg,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum BasisArg {
    Merged,
    Frame,
}

impl From<BasisArg> for StatusBasis {
    fn from(arg: BasisArg) -> Self {
        match arg {
            BasisArg::Merged => StatusBasis::Merged,
            BasisArg::Frame => StatusBasis::Frame,
        }
    }
}

/// A line is either `{"detections": [...]}` or a bare array of detections.
#[derive(Deserialize)]
#[serde(untagged)]
enum FrameLine {
    Frame(DetectionFrame),
    Bare(Vec<Detection>),
}

impl From<FrameLine> for DetectionFrame {
    fn from(line: FrameLine) -> Self {
        match line {
            FrameLine::Frame(frame) => frame,
            FrameLine::Bare(detections) => detections.into(),
        }
    }
}

impl Cli {
    fn settings(&self) -> DetectionSettings {
        let mut settings = DetectionSettings::from(&DetectionConfig::default());
        if let Some(labels) = &self.labels {
            settings.allow_list = parse_label_list(labels);
        }
        if let Some(cost) = &self.placeholder_cost {
            settings.placeholder_cost = cost.trim().to_string();
        }
        if let Some(days) = self.expiry_days {
            settings.expiry_days = days;
        }
        if let Some(min) = self.min_confidence {
            settings.min_confidence = min;
        }
        settings.status_basis = self.status_basis.into();
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Reports go to stdout; logs stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kitchen_inventory=info,detection_feed=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings();
    anyhow::ensure!(
        !settings.allow_list.is_empty(),
        "at least one label must be allowed"
    );
    kitchen_inventory::dto::parse_cost(&settings.placeholder_cost)
        .context("placeholder cost must be a non-negative decimal")?;

    let client = HttpInventoryClient::new(&cli.api_url, Duration::from_secs(cli.timeout_secs))
        .context("failed to build inventory client")?;
    let adapter = DetectionAdapter::new(Arc::new(client), settings);

    let frames = match &cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            run(&adapter, BufReader::new(file)).await?
        }
        None => run(&adapter, BufReader::new(tokio::io::stdin())).await?,
    };

    info!(frames, "input exhausted");
    Ok(())
}

async fn run<R>(adapter: &DetectionAdapter, reader: R) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut processed = 0usize;
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let frame: DetectionFrame = match serde_json::from_str::<FrameLine>(&line) {
            Ok(parsed) => parsed.into(),
            Err(e) => {
                warn!(line = line_no, error = %e, "skipping malformed frame");
                continue;
            }
        };

        let report = adapter.process_frame(&frame).await;
        println!("{}", serde_json::to_string(&report)?);
        processed += 1;
    }

    Ok(processed)
}
