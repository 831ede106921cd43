use clap::Parser;
use netlab_monitoring::{
    config::read_config_file,
    gns3::Gns3Client,
    topology::{
        builder::TopologyBuilder,
        planner,
        report::{ConfigOutcome, LinkOutcome, NodeOutcome},
    },
};
use tracing::{error, info, level_filters::LevelFilter, trace, warn};
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
        ("builder", LevelFilter::TRACE),
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
    let Some(build) = config.build else {
        anyhow::bail!("configuration has no \"build\" section");
    };
    build.validate()?;

    let plan = planner::plan(&build);
    info!(
        project = %plan.project_name,
        switches = plan.switch_count(),
        endpoints = plan.endpoint_count(),
        links = plan.links.len(),
        "planned topology"
    );

    let client = Gns3Client::new(&config.emulator);
    let report = TopologyBuilder::new(&client, &build).build(&plan).await;

    for (name, outcome) in &report.nodes {
        if let NodeOutcome::Failed { error } = outcome {
            warn!("device {name}: {error}");
        }
    }
    for (key, outcome) in &report.links {
        match outcome {
            LinkOutcome::Failed { error } => warn!("link {key}: {error}"),
            LinkOutcome::Skipped { missing_node } => {
                warn!("link {key}: skipped, {missing_node} does not exist")
            }
            LinkOutcome::Created { .. } => {}
        }
    }
    for (device, outcome) in &report.configs {
        match outcome {
            ConfigOutcome::Failed { error } => warn!("config for {device}: {error}"),
            ConfigOutcome::Skipped { .. } => {
                warn!("config for {device}: skipped, device or uplink missing")
            }
            ConfigOutcome::Pushed => {}
        }
    }

    let summary = report.summary();
    info!(
        devices = summary.nodes_created,
        failed_devices = summary.nodes_failed,
        links = summary.links_created,
        failed_links = summary.links_failed + summary.links_skipped,
        configs = summary.configs_pushed,
        failed_configs = summary.configs_failed + summary.configs_skipped,
        "build report"
    );
    if let (Some(first), Some(last)) = (plan.addresses.first(), plan.addresses.last()) {
        info!(
            "assigned addresses {} - {}, gateway {}",
            first.address,
            last.address,
            build.gateway_ip()
        );
    }

    if let Some(abort) = report.aborted {
        error!("{abort}");
        return Err(abort.into());
    }

    if report.is_complete() {
        info!("topology is complete");
    } else {
        warn!("topology was built with gaps, see the report above");
    }

    Ok(())
}
