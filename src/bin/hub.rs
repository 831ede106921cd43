use std::sync::Arc;

use clap::Parser;
use netlab_monitoring::{
    actors::monitor::{MonitorHandle, MonitorIntervals},
    classifier::HeuristicModel,
    config::read_config_file,
    gns3::Gns3Client,
    sampler::MetricsSampler,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short)]
    file: String,
}

fn init() {
    dotenv::dotenv().ok();

    let filter = filter::Targets::new().with_targets(vec![
        ("netlab_monitoring", LevelFilter::TRACE),
        ("hub", LevelFilter::TRACE),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = read_config_file(&args.file)?;
    let Some(monitor) = config.monitor else {
        anyhow::bail!("configuration has no \"monitor\" section");
    };

    let client = Gns3Client::new(&config.emulator);

    let projects = client.list_projects().await?;
    let project = projects
        .into_iter()
        .find(|project| project.name.as_deref() == Some(monitor.project.as_str()))
        .ok_or_else(|| {
            anyhow::anyhow!("no project named '{}' on the emulator", monitor.project)
        })?;
    info!(
        project = %monitor.project,
        project_id = %project.project_id,
        "monitoring project"
    );

    let handle = MonitorHandle::spawn(
        client,
        MetricsSampler::synthetic(),
        Some(Arc::new(HeuristicModel)),
        MonitorIntervals::from(&monitor),
    );
    let mut telemetry = handle.subscribe();
    handle.select_project(project.project_id).await?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = telemetry.recv() => {
                match event {
                    Ok(event) => {
                        info!(
                            verdict = ?event.verdict,
                            alerts = event.alerts.len(),
                            devices = event.sample.devices.len(),
                            "tick"
                        );
                        if let Ok(json) = serde_json::to_string(&event) {
                            debug!("telemetry: {json}");
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!("telemetry receiver lagged by {n} events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            _ = &mut ctrl_c => {
                info!("shutting down");
                handle.shutdown().await?;
                break;
            }
        }
    }

    Ok(())
}
