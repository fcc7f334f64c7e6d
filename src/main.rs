mod error;
mod model;
mod parser;
mod present;
mod rank;
mod settings;
mod sheet;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use parser::Inspection;
use present::{CommandOpener, LinkOpener, PrintOpener};
use settings::Settings;

#[derive(Parser)]
#[command(name = "hn_digest", about = "Pick the most-discussed posts out of a Hacker News sheet export")]
struct Cli {
    /// Settings file (default: ./hn_digest.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Sheet export (.csv, .tsv or .json)
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Minimum comment count (inclusive)
    #[arg(short = 'c', long)]
    min_comments: Option<u64>,
    /// Minimum score (inclusive)
    #[arg(short = 's', long)]
    min_score: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the top posts that pass the thresholds
    Filter {
        #[command(flatten)]
        args: FilterArgs,
        /// Print JSON instead of a list
        #[arg(long)]
        json: bool,
    },
    /// Open the links of the top posts one after another
    Open {
        #[command(flatten)]
        args: FilterArgs,
        /// List positions to open, e.g. 1,3 (default: every post with a link)
        #[arg(short, long, value_delimiter = ',')]
        pick: Option<Vec<usize>>,
        /// Pause between links in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Print links instead of opening them
        #[arg(long)]
        dry_run: bool,
    },
    /// Show how the sheet is parsed: header row, column mapping, sample posts
    Inspect {
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

impl FilterArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(input) = &self.input {
            settings.input = input.clone();
        }
        if let Some(n) = self.min_comments {
            settings.min_comments = n;
        }
        if let Some(n) = self.min_score {
            settings.min_score = n;
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Filter { args, json } => {
            args.apply(&mut settings);
            let posts = run_pipeline(&settings)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else {
                println!("{}", present::render_list(&posts, settings.title_width).trim_end());
            }
            Ok(())
        }
        Commands::Open {
            args,
            pick,
            delay_ms,
            dry_run,
        } => {
            args.apply(&mut settings);
            if let Some(ms) = delay_ms {
                settings.open_delay_ms = ms;
            }
            let posts = run_pipeline(&settings)?;
            if posts.is_empty() {
                println!("{}", present::render_list(&posts, settings.title_width));
                return Ok(());
            }
            let links = present::select_links(&posts, pick.as_deref())?;
            if links.is_empty() {
                println!("None of the selected posts has a link to open.");
                return Ok(());
            }

            let mut opener: Box<dyn LinkOpener> = match (&settings.opener, dry_run) {
                (Some(cmd), false) => Box::new(CommandOpener::parse(cmd)?),
                _ => Box::new(PrintOpener::new(std::io::stdout())),
            };
            let delay = if dry_run { Duration::ZERO } else { settings.open_delay() };
            let opened = present::open_links(&links, opener.as_mut(), delay);
            println!("Opened {} of {} links.", opened, links.len());
            Ok(())
        }
        Commands::Inspect { input } => {
            if let Some(input) = input {
                settings.input = input;
            }
            let grid = sheet::load_grid(&settings.input)?;
            let report = parser::inspect(&grid)
                .with_context(|| format!("Cannot parse {}", settings.input.display()))?;
            print_inspection(&report);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

fn run_pipeline(settings: &Settings) -> anyhow::Result<Vec<model::PostRecord>> {
    let criteria = settings.criteria();
    info!(
        "Starting filter with min comments: {}, min score: {}",
        criteria.min_comments, criteria.min_score
    );
    let grid = sheet::load_grid(&settings.input)?;
    let posts = parser::reconstruct_and_filter(&grid, &criteria)
        .with_context(|| format!("Cannot parse {}", settings.input.display()))?;
    Ok(posts)
}

fn print_inspection(report: &Inspection) {
    println!("Sheet has {} rows", report.total_rows);

    println!("\n--- First {} rows ---", report.preview.len());
    for (i, row) in report.preview.iter().enumerate() {
        println!("Row {}: [{}]", i, row);
    }

    println!(
        "\nHeaders at row {}: [{}]",
        report.header.index,
        report.header.headers.join(", ")
    );

    println!("\n--- Column mapping ---");
    for (field, col) in &report.mapping {
        match col {
            Some(i) => println!("  {:<14} column {} ({})", field, i, report.header.headers[*i]),
            None => println!("  {:<14} not found", field),
        }
    }

    println!("\n--- Sample posts ---");
    if report.samples.is_empty() {
        println!("  (no ranked rows below the header)");
    }
    for s in &report.samples {
        println!("Post #{} (row {}):", s.rank, s.row);
        println!("  Title:    {}", s.title);
        println!("  Link:     {}", s.link);
        println!("  Domain:   {}", s.domain);
        println!("  Score:    {:?} -> {}", s.score_text, s.score);
        println!("  Comments: {:?} -> {}", s.comments_text, s.comments);
        println!("  Subline:  {}", s.subline);
    }
}
