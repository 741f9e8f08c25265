//! Care-Team Experience - command line
//!
//! Builds the experience graphs of a note corpus and exports per-visit metrics.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use care_team_experience::metrics::{
    write_csv, write_json, DemographicTable, DepartmentTable, FirstNameTable,
};
use care_team_experience::{CorpusConfig, TeamworkCorpus};

#[derive(Parser)]
#[command(name = "teamwork")]
#[command(about = "Care-team collaboration graphs and experience metrics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every visit and export the metrics table
    Score {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Provider demographics CSV (author_prov_id, prov_name, sex, clinician_title)
        #[arg(long)]
        demographics: Option<PathBuf>,

        /// First-name dictionary CSV (name, gender) used to guess missing sex
        #[arg(long)]
        first_names: Option<PathBuf>,

        /// Per-visit department / outcome CSV merged into the output
        #[arg(long)]
        departments: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ReportFormat::Csv)]
        format: ReportFormat,
    },

    /// Print the team and graphs of one visit as JSON
    Inspect {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Visit id to inspect
        #[arg(long)]
        visit: String,
    },

    /// Log corpus counts
    Summary {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
}

#[derive(Args)]
struct CorpusArgs {
    /// Note table CSV
    #[arg(short, long)]
    notes: PathBuf,

    /// YAML config file (defaults to ./teamwork.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Lookback window for prior collaboration, in days
    #[arg(long)]
    teamwork_window: Option<i64>,

    /// Team window after admission, in days
    #[arg(long)]
    team_window: Option<i64>,

    /// Study start date (YYYY-MM-DD); earliest admission when omitted
    #[arg(long)]
    study_start: Option<NaiveDate>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Csv,
    Json,
}

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,care_team_experience=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            corpus,
            demographics,
            first_names,
            departments,
            output,
            format,
        } => {
            let (corpus, config) = load_corpus(&corpus)?;

            let guesser = match first_names {
                Some(path) => FirstNameTable::from_path(&path)
                    .with_context(|| format!("loading first names from {}", path.display()))?,
                None => FirstNameTable::new(),
            };
            let demographics = match demographics {
                Some(path) => DemographicTable::from_path(&path, &guesser)
                    .with_context(|| format!("loading demographics from {}", path.display()))?,
                None => DemographicTable::new(),
            };
            let departments = match departments {
                Some(path) => DepartmentTable::from_path(&path, &config.department_id_column)
                    .with_context(|| format!("loading departments from {}", path.display()))?,
                None => DepartmentTable::new(),
            };

            let rows = corpus.score(&demographics, &departments);
            let writer = open_output(output.as_deref())?;
            match format {
                ReportFormat::Csv => write_csv(&rows, writer)?,
                ReportFormat::Json => write_json(&rows, writer)?,
            }
            tracing::info!("Wrote {} metric rows", rows.len());
            Ok(())
        }
        Commands::Inspect { corpus, visit } => {
            let (corpus, _) = load_corpus(&corpus)?;
            let experience = corpus.team_experience_for(&visit).with_context(|| {
                format!("visit {} has no care team after the warm-up period", visit)
            })?;
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &experience.summary())?;
            writeln!(stdout)?;
            Ok(())
        }
        Commands::Summary { corpus } => {
            let (corpus, _) = load_corpus(&corpus)?;
            let edges = corpus.edges();
            tracing::info!(
                "Summary: {} notes, {} experience edges ({} condition-flagged), {} team edges",
                corpus.notes().len(),
                edges.experience.len(),
                edges.dx_experience().count(),
                edges.team.len()
            );
            tracing::info!(
                "Summary: {} scored visits, {} pairs with history, study start {}",
                corpus.team_experience().len(),
                corpus.index().experience_key_count(),
                corpus.study_start()
            );
            Ok(())
        }
    }
}

/// Resolve the config (CLI flag > env var > YAML > default) and build the corpus.
fn load_corpus(args: &CorpusArgs) -> Result<(TeamworkCorpus, CorpusConfig)> {
    let mut config = CorpusConfig::from_yaml_and_env(args.config.as_deref())
        .context("loading configuration")?;
    if let Some(days) = args.teamwork_window {
        config.teamwork_window_days = days;
    }
    if let Some(days) = args.team_window {
        config.team_window_days = days;
    }
    if let Some(start) = args.study_start {
        config.study_start = Some(start);
    }

    let corpus = TeamworkCorpus::from_csv(&args.notes, &config)
        .with_context(|| format!("building corpus from {}", args.notes.display()))?;
    Ok((corpus, config))
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating output file {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout()))),
    }
}
