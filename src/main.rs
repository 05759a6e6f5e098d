use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use shorts_harvester::{
    BatchDriver, BatchPlan, HarvestError, HarvesterConfig, Pipeline, SearchCriteria, YouTubeClient,
};

fn cli() -> Command {
    Command::new("shorts-harvester")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Collect short-form video search results into CSV files")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (default: shorts-harvester.toml)")
                .global(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("search")
                .about("Search one keyword and export the shorts found")
                .arg(
                    Arg::new("keyword")
                        .value_name("KEYWORD")
                        .help("Search keyword"),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .help("Search without a keyword")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("keyword"),
                )
                .arg(
                    Arg::new("days")
                        .short('d')
                        .long("days")
                        .value_name("DAYS")
                        .help("Lookback window in days (non-positive values use the default)")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(
                    Arg::new("max-results")
                        .short('n')
                        .long("max-results")
                        .value_name("NUM")
                        .help("Search page size, at most 50")
                        .value_parser(value_parser!(u32)),
                )
                .arg(output_dir_arg()),
        )
        .subcommand(
            Command::new("batch")
                .about("Run every keyword × period combination in sequence")
                .arg(
                    Arg::new("keyword")
                        .short('k')
                        .long("keyword")
                        .value_name("KEYWORD")
                        .help("Keyword to include (repeatable; default: configured list)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("period")
                        .short('p')
                        .long("period")
                        .value_name("DAYS")
                        .help("Lookback period in days (repeatable; default: configured list)")
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(u32).range(1..)),
                )
                .arg(output_dir_arg()),
        )
        .subcommand(
            Command::new("config")
                .about("Show the effective configuration")
                .arg(
                    Arg::new("write")
                        .long("write")
                        .value_name("FILE")
                        .help("Write the effective configuration as TOML")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
}

fn output_dir_arg() -> Arg {
    Arg::new("output-dir")
        .short('o')
        .long("output-dir")
        .value_name("DIR")
        .help("Directory for CSV results")
        .value_parser(value_parser!(PathBuf))
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "shorts_harvester=debug,shorts_core=debug,info"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<HarvesterConfig> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => HarvesterConfig::load_from(path)?,
        None => HarvesterConfig::load()?,
    };
    Ok(config)
}

fn build_client(config: &HarvesterConfig) -> Result<YouTubeClient> {
    let api_key = config.api.resolve_api_key()?;
    YouTubeClient::new(&config.api, api_key).context("Failed to build API client")
}

async fn run_search(mut config: HarvesterConfig, matches: &ArgMatches) -> Result<()> {
    // Blank keywords count as missing; only --all searches without one
    let keyword = matches
        .get_one::<String>("keyword")
        .map(|k| k.trim())
        .filter(|k| !k.is_empty());
    if keyword.is_none() && !matches.get_flag("all") {
        return Err(HarvestError::MissingKeyword.into());
    }

    if let Some(dir) = matches.get_one::<PathBuf>("output-dir") {
        config.output.results_dir = dir.clone();
    }
    config.validate()?;

    let days = matches
        .get_one::<i64>("days")
        .copied()
        .unwrap_or(i64::from(config.search.default_lookback_days));
    let max_results = matches
        .get_one::<u32>("max-results")
        .copied()
        .unwrap_or(config.search.max_results);

    let criteria = SearchCriteria::builder()
        .keyword(keyword)
        .lookback_days(Some(days))
        .max_results(Some(max_results))
        .build();

    info!(
        "🔍 Searching: Keyword={:?}, Period={} days, Page size={}",
        criteria.keyword().unwrap_or("(all)"),
        criteria.lookback_days(),
        criteria.max_results()
    );

    let client = build_client(&config)?;
    let report = Pipeline::from_config(&client, &config).run(&criteria).await?;

    info!(
        "📊 {} found, {} with details, {} shorts written",
        report.searched, report.fetched, report.kept
    );
    Ok(())
}

async fn run_batch(mut config: HarvesterConfig, matches: &ArgMatches) -> Result<()> {
    if let Some(keywords) = matches.get_many::<String>("keyword") {
        config.batch.keywords = keywords.cloned().collect();
    }
    if let Some(periods) = matches.get_many::<u32>("period") {
        config.batch.periods_days = periods.copied().collect();
    }
    if let Some(dir) = matches.get_one::<PathBuf>("output-dir") {
        config.output.results_dir = dir.clone();
    }
    config.validate()?;
    config.validate_batch()?;

    let client = build_client(&config)?;
    let plan = BatchPlan::new(config.batch.keywords.clone(), config.batch.periods_days.clone());
    let driver = BatchDriver::new(Pipeline::from_config(&client, &config), config.search.max_results);

    let summary = driver.run(&plan).await;
    for (combination, _) in summary.failures() {
        info!(
            "   Failed: Keyword=\"{}\", Period={} days",
            combination.keyword, combination.period_days
        );
    }
    Ok(())
}

fn run_config(config: &HarvesterConfig, matches: &ArgMatches) -> Result<()> {
    match matches.get_one::<PathBuf>("write") {
        Some(path) => config.save(path)?,
        None => println!("{}", config.summary()),
    }
    Ok(())
}

async fn run(matches: ArgMatches) -> Result<()> {
    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("search", sub)) => run_search(config, sub).await,
        Some(("batch", sub)) => run_batch(config, sub).await,
        Some(("config", sub)) => run_config(&config, sub),
        _ => unreachable!("subcommand is required"),
    }
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    // Credentials may live in a local .env file
    dotenv::dotenv().ok();
    init_logging(matches.get_flag("verbose"));

    if let Err(e) = run(matches).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
