use crate::{
    schema::{parse_document, parse_validated, DocumentSchema},
    AlertBatch, AssemblerConfig, Clock, FixedClock, Itinerary, ItineraryAssembler, MonitorConfig,
    MonitoringEngine, Providers, SnapshotCatalog, SystemClock, TripPreferences,
};
use anyhow::{bail, Context};
use chrono::NaiveDateTime;
use clap::{Arg, ArgMatches, Command};
use std::sync::Arc;
use tracing::info;

/// CLI entry point for the itinerary planner
pub async fn run() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let matches = Command::new("itinerary-planner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Plans multi-day trips offline and checks them against live conditions")
        .subcommand_required(true)
        .subcommand(
            Command::new("plan")
                .about("Assemble an itinerary from trip preferences")
                .arg(
                    Arg::new("preferences")
                        .short('p')
                        .long("preferences")
                        .value_name("FILE")
                        .help("Trip preferences JSON")
                        .required(true),
                )
                .arg(catalog_arg())
                .arg(
                    Arg::new("user")
                        .short('u')
                        .long("user")
                        .value_name("ID")
                        .help("Owner of the itinerary"),
                )
                .arg(
                    Arg::new("out")
                        .short('o')
                        .long("out")
                        .value_name("FILE")
                        .help("Write the itinerary JSON here"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Run one monitoring cycle against an itinerary")
                .arg(
                    Arg::new("itinerary")
                        .short('i')
                        .long("itinerary")
                        .value_name("FILE")
                        .help("Itinerary JSON written by `plan`")
                        .required(true),
                )
                .arg(catalog_arg())
                .arg(
                    Arg::new("now")
                        .long("now")
                        .value_name("YYYY-MM-DDTHH:MM")
                        .help("Local time to evaluate at (defaults to the current time)"),
                ),
        )
        .subcommand(
            Command::new("schema").about("Print a document JSON schema").arg(
                Arg::new("document")
                    .short('d')
                    .long("document")
                    .value_name("NAME")
                    .value_parser(["itinerary", "preferences", "alerts"])
                    .default_value("itinerary"),
            ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("plan", args)) => plan(args).await,
        Some(("check", args)) => check(args).await,
        Some(("schema", args)) => schema(args),
        _ => bail!("unknown command"),
    }
}

fn catalog_arg() -> Arg {
    Arg::new("catalog")
        .short('c')
        .long("catalog")
        .value_name("FILE")
        .help("Offline catalog of places, weather, traffic and prices")
        .required(true)
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("--{} is required", name))
}

async fn load_catalog(args: &ArgMatches) -> anyhow::Result<Arc<SnapshotCatalog>> {
    let path = required(args, "catalog")?;
    let catalog = SnapshotCatalog::load(path)
        .await
        .with_context(|| format!("failed to load catalog {}", path))?;
    Ok(Arc::new(catalog))
}

async fn plan(args: &ArgMatches) -> anyhow::Result<()> {
    let path = required(args, "preferences")?;
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path))?;
    let preferences: TripPreferences =
        parse_validated(&text).with_context(|| format!("invalid preferences in {}", path))?;

    let config = AssemblerConfig::from_env()?;
    let providers = Providers::from_catalog(load_catalog(args).await?);
    let assembler = ItineraryAssembler::new(providers).with_config(config);

    let user = args.get_one::<String>("user").map(String::as_str);
    let itinerary = assembler.assemble(preferences, user).await?;
    info!("Assembled itinerary {}", itinerary.id);
    println!("{}", itinerary.render());

    if let Some(out) = args.get_one::<String>("out") {
        let json = serde_json::to_string_pretty(&itinerary)?;
        tokio::fs::write(out, json)
            .await
            .with_context(|| format!("failed to write {}", out))?;
        info!("Itinerary written to {}", out);
    }
    Ok(())
}

async fn check(args: &ArgMatches) -> anyhow::Result<()> {
    let path = required(args, "itinerary")?;
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path))?;
    let itinerary: Itinerary =
        parse_document(&text).with_context(|| format!("invalid itinerary in {}", path))?;

    let clock: Arc<dyn Clock> = match args.get_one::<String>("now") {
        Some(now) => {
            let local = NaiveDateTime::parse_from_str(now, "%Y-%m-%dT%H:%M")
                .with_context(|| format!("--now must look like 2026-10-20T09:30, got {}", now))?;
            Arc::new(FixedClock::new(local))
        }
        None => Arc::new(SystemClock::default()),
    };

    let providers = Providers::from_catalog(load_catalog(args).await?);
    let engine = MonitoringEngine::new(providers, MonitorConfig::from_env()?, clock);
    let report = engine.evaluate_once(&itinerary).await;

    if report.alerts.is_empty() {
        println!("Không có cảnh báo nào cho chuyến đi {}", itinerary.header.destination);
    }
    for alert in &report.alerts {
        println!("{}", alert.describe());
        for action in &alert.suggested_actions {
            println!("    - {}", action);
        }
    }
    for proposal in &report.proposals {
        println!("{}", proposal.describe());
        for alternative in &proposal.alternatives {
            println!("    • {}", alternative.name);
        }
    }
    for detector in &report.failed_detectors {
        println!("(không kiểm tra được: {})", detector);
    }
    Ok(())
}

fn schema(args: &ArgMatches) -> anyhow::Result<()> {
    let handle = match required(args, "document")? {
        "preferences" => TripPreferences::schema(),
        "alerts" => AlertBatch::schema(),
        _ => Itinerary::schema(),
    };
    println!("{}", serde_json::to_string_pretty(handle.schema_json())?);
    Ok(())
}
