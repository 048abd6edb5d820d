mod config;

use clap::{Parser, Subcommand};
use config::{S3Config, TalonConfig};
use std::path::Path;
use talon_archive::{GzJsonDirSource, JsonFileSink, S3EventSource, S3Store, S3SummarySink};
use talon_core::ActorSummary;
use talon_pipeline::{run_batch, BatchOutcome};

#[derive(Parser)]
#[command(name = "talon")]
#[command(about = "Summarize GitHub Archive actor activity and flag likely bots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one batch: read a day of archive events, publish the summary
    Run {
        #[arg(short = 'f', long, default_value = "talon.toml", help = "Path to config file")]
        config: String,
        #[arg(long, help = "Partition date (YYYY-MM-DD), overrides the config value")]
        date: Option<String>,
    },
    /// Check one actor name against the bot heuristic
    Classify {
        #[arg(help = "Actor name to test")]
        username: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talon=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, date } => run_once(&config, date).await,
        Commands::Classify { username } => {
            run_classify(&username);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn open_store(s3: &S3Config) -> Result<S3Store, Box<dyn std::error::Error>> {
    Ok(S3Store::new(
        &s3.bucket,
        &s3.region,
        &s3.endpoint,
        &s3.access_key_id,
        &s3.secret_access_key,
    )?)
}

async fn run_once(config_path: &str, date: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = TalonConfig::from_file(config_path)
        .map_err(|e| format!("failed to load config {}: {}", config_path, e))?;

    let date = match date.or_else(|| cfg.input.date.clone()) {
        Some(d) => d,
        None => return Err("partition date required (--date or [input].date)".into()),
    };

    let outcome = match &cfg.s3 {
        Some(s3) => {
            let key_prefix = format!("{}{}-", cfg.input.prefix, date);
            println!(
                "reading s3://{}/{}* -> s3://{}/{}",
                s3.bucket, key_prefix, s3.bucket, cfg.output.key
            );
            let mut source = S3EventSource::open(open_store(s3)?, &key_prefix).await?;
            let sink = S3SummarySink::new(open_store(s3)?, cfg.output.key.clone());
            run_batch(&mut source, &sink).await?
        }
        None => {
            let dir = cfg
                .input
                .local_dir
                .as_deref()
                .ok_or("either [s3] or [input].local_dir must be configured")?;
            println!("reading {}/{}-*.json.gz -> {}", dir, date, cfg.output.local_path);
            let mut source = GzJsonDirSource::open(Path::new(dir), &date)?;
            let sink = JsonFileSink::new(&cfg.output.local_path);
            run_batch(&mut source, &sink).await?
        }
    };

    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &BatchOutcome) {
    let report = &outcome.report;
    println!("\n--- run {} ---", report.run_id);
    println!("records read: {}", report.records_read);
    println!("records dropped: {}", report.records_dropped);
    println!("actors summarized: {}", report.actors);

    if !outcome.rows.is_empty() {
        println!("\nmost active actors:");
        for row in outcome.rows.iter().take(10) {
            print_row(row);
        }
    }
}

fn print_row(row: &ActorSummary) {
    let marker = if row.is_labeled_bot { "bot" } else { "   " };
    println!(
        "  [{}] {:<30} events={:<6} repos={}",
        marker, row.username, row.total_events, row.distinct_repos_touched
    );
}

fn run_classify(username: &str) {
    let verdict = talon_detect::is_bot(Some(username));
    println!(
        "{}: {}",
        username,
        if verdict { "labeled bot" } else { "not labeled" }
    );
}
