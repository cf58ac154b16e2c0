//! roleboard - Roleplay training analytics from the command line

mod cli;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use roleboard_core::models::GroupBy;
use roleboard_core::{export_records_to_csv, export_view_to_json, Month, TableSort, TrainingStore};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::CliError;

#[derive(Parser)]
#[command(
    name = "roleboard",
    version,
    about = "Roleplay training analytics from CSV exports",
    long_about = "Loads a training CSV (date, org, account, group, player, category, level,\n\
                  lesson, score, speechTime, playTime) and prints rankings, monthly trends,\n\
                  grouped aggregates, player records and a paginated session log.\n\
                  \n\
                  By default only the 6 months ending at the latest session are included.\n\
                  \n\
                  Examples:\n\
                    roleboard --demo summary                     # Bundled sample data\n\
                    roleboard -f sessions.csv rankings -n 10     # Top 10 players\n\
                    roleboard -f sessions.csv --all-months trends\n\
                    roleboard -f sessions.csv aggregate --by level --sort avgScore\n\
                    roleboard -f sessions.csv --exclude-lesson 'Sales|Lv.1' players\n\
                    roleboard -f sessions.csv logs --page 2 --json\n\
                  \n\
                  Environment Variables:\n\
                    ROLEBOARD_CSV                 # Default CSV path\n\
                    ROLEBOARD_FORMAT              # Force output format: json|table\n\
                    ROLEBOARD_NO_COLOR            # Disable ANSI colors (log-friendly)\n\
                    ROLEBOARD_PAGE_SIZE           # Default log page size\n\
                    RUST_LOG                      # Log filter (default: warn)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Training CSV to load
    #[arg(long, short = 'f', env = "ROLEBOARD_CSV", global = true)]
    file: Option<PathBuf>,

    /// Use the bundled sample dataset instead of a file
    #[arg(long, global = true)]
    demo: bool,

    /// First month to include (YYYY-MM)
    #[arg(long, value_name = "YYYY-MM", global = true)]
    from: Option<Month>,

    /// Last month to include (YYYY-MM)
    #[arg(long, value_name = "YYYY-MM", global = true)]
    to: Option<Month>,

    /// Include every month instead of the default window
    #[arg(long, global = true, conflicts_with_all = ["from", "to"])]
    all_months: bool,

    /// Exclude a lesson key or branch (e.g. 'Sales|Lv.2|Closing' or 'Sales')
    #[arg(long, value_name = "KEY", global = true)]
    exclude_lesson: Vec<String>,

    /// Exclude a player key or branch (e.g. 'Acme|East|A|Alice' or 'Acme|East')
    #[arg(long, value_name = "KEY", global = true)]
    exclude_player: Vec<String>,

    /// Re-include a lesson key or branch (applied after exclusions)
    #[arg(long, value_name = "KEY", global = true)]
    include_lesson: Vec<String>,

    /// Re-include a player key or branch (applied after exclusions)
    #[arg(long, value_name = "KEY", global = true)]
    include_player: Vec<String>,

    /// Force output format (json|table)
    #[arg(long, env = "ROLEBOARD_FORMAT", value_parser = ["json", "table"], global = true)]
    format: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, env = "ROLEBOARD_NO_COLOR", global = true)]
    no_color: bool,

    /// Debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Dataset totals and the active filter
    Summary,
    /// First rows of the loaded file
    Preview {
        #[command(flatten)]
        sort: SortArgs,
    },
    /// Players ranked by average score
    Rankings {
        /// Show only the top N
        #[arg(long, short = 'n')]
        limit: Option<usize>,
        #[command(flatten)]
        sort: SortArgs,
    },
    /// Plays and average score per month
    Trends {
        #[command(flatten)]
        sort: SortArgs,
    },
    /// Statistics grouped by lesson, level or category
    Aggregate {
        /// Grouping dimension (lesson|level|category)
        #[arg(long, default_value = "lesson")]
        by: GroupBy,
        #[command(flatten)]
        sort: SortArgs,
    },
    /// Play count, average and last play date per player
    Players {
        #[command(flatten)]
        sort: SortArgs,
    },
    /// Session log, newest first
    Logs {
        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: usize,
        /// Rows per page (0 = default of 100)
        #[arg(long, env = "ROLEBOARD_PAGE_SIZE", default_value = "0")]
        page_size: usize,
        #[command(flatten)]
        sort: SortArgs,
    },
    /// Lesson or player tree with inclusion markers
    Hierarchy {
        #[arg(value_enum)]
        kind: TreeKind,
    },
    /// Write the filtered sessions to a file (.json for JSON, CSV otherwise)
    Export {
        /// Destination file
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TreeKind {
    Lessons,
    Players,
}

#[derive(Args, Clone, Default)]
struct SortArgs {
    /// Column to sort by (e.g. avgScore, playCount, date, player)
    #[arg(long, value_name = "COLUMN")]
    sort: Option<String>,

    /// Sort ascending (default is descending)
    #[arg(long, requires = "sort")]
    asc: bool,
}

impl SortArgs {
    /// One toggle lands on descending, a second flips to ascending
    fn table_sort(&self) -> TableSort {
        let mut sort = TableSort::new();
        if let Some(column) = &self.sort {
            sort.toggle_sort(column);
            if self.asc {
                sort.toggle_sort(column);
            }
        }
        sort
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.json || cli.format.as_deref() == Some("json");
    let no_color = cli.no_color;

    let store = load_store(&cli).await?;
    apply_filters(&store, &cli)?;

    match cli.command {
        Command::Summary => {
            let filtered = store.filtered_records().len();
            println!(
                "{}",
                cli::format_summary(&store.stats(), &store.filter_state(), filtered, json)
            );
        }
        Command::Preview { sort } => {
            println!(
                "{}",
                cli::format_records(&store.preview(), &sort.table_sort(), json, no_color)
            );
        }
        Command::Rankings { limit, sort } => {
            println!(
                "{}",
                cli::format_rankings(&store.rankings(), limit, &sort.table_sort(), json, no_color)
            );
        }
        Command::Trends { sort } => {
            println!(
                "{}",
                cli::format_trends(&store.monthly_trends(), &sort.table_sort(), json, no_color)
            );
        }
        Command::Aggregate { by, sort } => {
            println!(
                "{}",
                cli::format_aggregates(
                    &store.aggregates(by),
                    by,
                    &sort.table_sort(),
                    json,
                    no_color
                )
            );
        }
        Command::Players { sort } => {
            println!(
                "{}",
                cli::format_players(&store.player_records(), &sort.table_sort(), json, no_color)
            );
        }
        Command::Logs {
            page,
            page_size,
            sort,
        } => {
            let log = store.log_page(page, page_size);
            println!(
                "{}",
                cli::format_log_page(&log, page, &sort.table_sort(), json, no_color)
            );
        }
        Command::Hierarchy { kind } => {
            let tree = match kind {
                TreeKind::Lessons => store.annotated_lesson_hierarchy(),
                TreeKind::Players => store.annotated_player_hierarchy(),
            };
            println!("{}", cli::format_hierarchy(&tree, json));
        }
        Command::Export { path } => {
            run_export(&store, &path)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn load_store(cli: &Cli) -> Result<TrainingStore> {
    let store = TrainingStore::with_defaults();

    let report = if cli.demo {
        store.load_demo_data().await
    } else {
        let path = cli.file.as_ref().ok_or(CliError::NoInput)?;
        store.load_csv_file(path).await
    }
    .map_err(CliError::from)?;

    if report.has_skipped_rows() {
        warn!(
            rows_skipped = report.rows_skipped,
            lines_read = report.lines_read,
            "Some rows were skipped (short rows or unparsable dates)"
        );
    }

    Ok(store)
}

fn apply_filters(store: &TrainingStore, cli: &Cli) -> Result<()> {
    if cli.all_months {
        store.set_date_range(None, None);
    } else if cli.from.is_some() || cli.to.is_some() {
        let current = store.filter_state();
        store.set_date_range(
            cli.from.or(current.start_month),
            cli.to.or(current.end_month),
        );
    }

    let pins = [
        (&cli.exclude_lesson, false, "lesson"),
        (&cli.exclude_player, false, "player"),
        (&cli.include_lesson, true, "lesson"),
        (&cli.include_player, true, "player"),
    ];
    for (keys, included, kind) in pins {
        for key in keys {
            let labels: Vec<&str> = key.split('|').collect();
            let pinned = if kind == "lesson" {
                store.set_lesson_branch(&labels, included)
            } else {
                store.set_player_branch(&labels, included)
            };
            if pinned == 0 {
                return Err(CliError::UnknownKey {
                    kind,
                    key: key.clone(),
                }
                .into());
            }
        }
    }

    Ok(())
}

fn run_export(store: &TrainingStore, path: &Path) -> Result<()> {
    let records = store.filtered_records();
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let result = if is_json {
        export_view_to_json(records.as_slice(), path)
    } else {
        export_records_to_csv(&records, path)
    };
    result.with_context(|| format!("Failed to export to {}", path.display()))?;

    info!(path = %path.display(), records = records.len(), "Export complete");
    eprintln!("Exported {} sessions to {}", records.len(), path.display());
    Ok(())
}
