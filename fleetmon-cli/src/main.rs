// SPDX-License-Identifier: MIT

mod config;
mod rest;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use fleetmon_cache::CacheStore;
use fleetmon_directory::Directory;
use fleetmon_model::Instance;
use fleetmon_probe::{evaluate, TelemetryProber};
use rest::RestDirectoryClient;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const WEEKDAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

#[derive(Parser)]
#[command(name = "fleetmon", version)]
#[command(about = "Database fleet directory and telemetry monitor")]
struct Cli {
    /// Bypass cached directory lookups for this run
    #[arg(short, long)]
    refresh: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the instances belonging to the configured customers
    List,
    /// Show the resolved node topology of one instance
    Topology { instance: String },
    /// Probe an instance's nodes and report anomalies
    Report { instance: String },
    /// Run the anomaly report over a weekday's batch of instances
    Day { day: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let client = Arc::new(RestDirectoryClient::new(
        &config.directory_url,
        &config.username,
        config.password.clone(),
    )?);
    let cache = CacheStore::open(&config.cache_path, env!("CARGO_PKG_VERSION"), !cli.refresh);
    let mut directory = Directory::new(client, cache);

    match &cli.command {
        Commands::List => cmd_list(&mut directory, &config).await?,
        Commands::Topology { instance } => cmd_topology(&mut directory, &config, instance).await?,
        Commands::Report { instance } => cmd_report(&mut directory, &config, instance).await?,
        Commands::Day { day } => cmd_day(&mut directory, &config, day).await?,
    }

    directory.flush()?;
    Ok(())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

async fn cmd_list(directory: &mut Directory, config: &Config) -> Result<()> {
    let instances = directory.list_instances(&config.customer_ids).await?;
    for (i, instance) in instances.iter().enumerate() {
        println!("{:>3}) {}", i + 1, instance.display_label());
    }
    Ok(())
}

async fn cmd_topology(directory: &mut Directory, config: &Config, wanted: &str) -> Result<()> {
    let instance = find_instance(directory, config, wanted).await?;
    let topology = directory.resolve_topology(&instance).await?;

    println!("Primary:");
    println!("\tP) {}:{}", topology.primary.host, topology.primary.port);
    if let Some(standby) = &topology.standby {
        println!("Standby:");
        println!("\tS) {}:{}", standby.host, standby.port);
    }
    if !topology.replicas.is_empty() {
        println!("Read replicas:");
        for (i, replica) in topology.replicas.iter().enumerate() {
            println!("\t{}) {}:{}", i + 1, replica.host, replica.port);
        }
    }
    Ok(())
}

async fn cmd_report(directory: &mut Directory, config: &Config, wanted: &str) -> Result<()> {
    let instance = find_instance(directory, config, wanted).await?;
    report_anomalies(directory, &instance).await
}

async fn cmd_day(directory: &mut Directory, config: &Config, day: &str) -> Result<()> {
    let Some(column) = weekday_column(day) else {
        bail!("unknown weekday: {} (expected Mon..Fri)", day);
    };
    let instances = directory.list_instances(&config.customer_ids).await?;
    for instance in day_batch(&instances, column) {
        report_anomalies(directory, &instance).await?;
    }
    Ok(())
}

async fn find_instance(
    directory: &mut Directory,
    config: &Config,
    wanted: &str,
) -> Result<Instance> {
    let instances = directory.list_instances(&config.customer_ids).await?;
    instances
        .into_iter()
        .find(|i| i.name == wanted || i.instance_id == wanted)
        .with_context(|| format!("no instance named {}", wanted))
}

async fn report_anomalies(directory: &mut Directory, instance: &Instance) -> Result<()> {
    let topology = directory.resolve_topology(instance).await?;
    println!(
        "[{}] checking transaction rates... ({} nodes)",
        instance.name,
        topology.nodes.len()
    );
    let samples = TelemetryProber::new().probe(&topology).await;
    for anomaly in evaluate(&topology, &samples) {
        println!("[{}] {}", instance.name, anomaly);
    }
    Ok(())
}

/// 1-based weekday column; accepts full names and Mon/Tue/... prefixes.
fn weekday_column(day: &str) -> Option<usize> {
    WEEKDAYS
        .iter()
        .position(|full| full.eq_ignore_ascii_case(day) || full[..3].eq_ignore_ascii_case(day))
        .map(|i| i + 1)
}

/// The instances whose 1-based ordinal lands in the given weekday
/// column. Five columns, so Friday takes every ordinal divisible by 5.
fn day_batch(instances: &[Instance], column: usize) -> Vec<Instance> {
    instances
        .iter()
        .enumerate()
        .filter(|(i, _)| (i + 1) % WEEKDAYS.len() == column % WEEKDAYS.len())
        .map(|(_, instance)| instance.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(name: &str) -> Instance {
        Instance {
            name: name.to_string(),
            customer: "C1".to_string(),
            instance_id: format!("id-{}", name),
        }
    }

    #[test]
    fn weekday_names_and_prefixes_resolve() {
        assert_eq!(weekday_column("Monday"), Some(1));
        assert_eq!(weekday_column("mon"), Some(1));
        assert_eq!(weekday_column("FRI"), Some(5));
        assert_eq!(weekday_column("Sunday"), None);
    }

    #[test]
    fn day_batches_cover_all_instances_exactly_once() {
        let instances: Vec<Instance> =
            (1..=12).map(|i| instance(&format!("db{}", i))).collect();

        let mut seen = Vec::new();
        for column in 1..=5 {
            seen.extend(day_batch(&instances, column));
        }
        assert_eq!(seen.len(), instances.len());

        // Monday takes ordinals 1, 6, 11; Friday takes 5 and 10.
        let monday: Vec<_> = day_batch(&instances, 1)
            .iter()
            .map(|i| i.name.clone())
            .collect();
        assert_eq!(monday, vec!["db1", "db6", "db11"]);
        let friday: Vec<_> = day_batch(&instances, 5)
            .iter()
            .map(|i| i.name.clone())
            .collect();
        assert_eq!(friday, vec!["db5", "db10"]);
    }
}
