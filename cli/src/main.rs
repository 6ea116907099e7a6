use anyhow::Result;
use clap::{Parser, Subcommand};
use monster_core::config::EditorConfig;
use monster_core::editing::{
    add_row, delete_row, display_label, duplicate_indices, format_preview, preview_json, search_rows,
    update_row,
};
use monster_core::export::export_csv_file;
use monster_core::file_utils::{load_file_with, save_file_with, TextEncoding};
use monster_core::models::{Document, Field};
use monster_core::parsers::verify_round_trip;
use monster_core::transform::{apply_percentage, apply_percentage_to_all, parse_percent};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "monster",
    version = "0.1.0",
    about = "CLI tool for editing MU Online Monster.txt files",
    long_about = None
)]
struct Cli {
    /// Path to Monster.txt (overrides the config file)
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Path to editor TOML config
    #[arg(long, global = true, env = "MONSTER_EDITOR_CONFIG")]
    config: Option<PathBuf>,

    /// File encoding: utf-8 or windows-1252 (overrides the config file)
    #[arg(long, global = true)]
    encoding: Option<TextEncoding>,

    /// Path to log file
    #[arg(long, global = true, default_value = "/tmp/monster-editor.log")]
    log_file: PathBuf,

    /// Verbosity level (repeat for more verbose output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List monsters as "[Index] Name (Lv Level)"
    List {
        /// Only show monsters whose label contains this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Show every field of one monster
    Show {
        /// Row position (as printed by `list`)
        #[arg(long)]
        position: usize,
        /// Print the row as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Scale numeric fields by a percentage
    Apply {
        /// Percentage, e.g. 20 for +20% or -15.5
        #[arg(long, allow_hyphen_values = true)]
        percent: Option<String>,
        /// Comma-separated field names (Level onward)
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
        /// Comma-separated row positions
        #[arg(long, value_delimiter = ',', conflicts_with = "all")]
        rows: Vec<usize>,
        /// Apply to every monster
        #[arg(long, default_value_t = false)]
        all: bool,
        /// Use a preset from the config file for percent and fields
        #[arg(long, conflicts_with_all = ["percent", "fields"])]
        preset: Option<String>,
        /// Show what would change without writing the file
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Append a new monster with default values
    Add,

    /// Change fields of one monster
    Update {
        /// Row position (as printed by `list`)
        #[arg(long)]
        position: usize,
        /// Field assignments, e.g. --set MaxLife=500 --set Name="Elite Bull"
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        assignments: Vec<String>,
    },

    /// Remove one monster
    Delete {
        /// Row position (as printed by `list`)
        #[arg(long)]
        position: usize,
    },

    /// Export all monsters to CSV
    Export {
        #[arg(long)]
        output: PathBuf,
    },

    /// Report duplicate indices and rows that would not survive a save
    Check,
}

fn setup_logging(verbose: u8, log_file: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let filter_level = match verbose {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(filter_level.into());

    let file_appender = tracing_appender::rolling::never(
        log_file.parent().unwrap_or(Path::new(".")),
        log_file.file_name().unwrap_or(std::ffi::OsStr::new("monster-editor.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::Layer::new().with_writer(std::io::stderr).with_ansi(true))
        .with(fmt::Layer::new().with_writer(non_blocking).with_ansi(false));

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(guard)
}

/// Parse `Field=Value` pairs into (field, value).
fn parse_assignments(assignments: &[String]) -> Result<Vec<(Field, String)>> {
    assignments
        .iter()
        .map(|assignment| {
            let (name, value) = assignment
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Expected FIELD=VALUE, got {:?}", assignment))?;
            let field: Field = name.parse()?;
            Ok((field, value.to_string()))
        })
        .collect()
}

fn save(document: &Document, path: &Path, config: &EditorConfig) -> Result<()> {
    save_file_with(document, path, &config.save_options())?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = setup_logging(cli.verbose, &cli.log_file)?;

    info!("Starting monster editor");

    let mut config = match &cli.config {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {:?}", path);
            }
            EditorConfig::from_file(path)?
        }
        None => EditorConfig::default(),
    };
    if let Some(encoding) = cli.encoding {
        config.encoding = encoding;
    }
    let monster_path = cli.file.clone().unwrap_or_else(|| config.monster_file.clone());

    if !monster_path.exists() {
        anyhow::bail!("Monster file not found: {:?}", monster_path);
    }
    let mut document = load_file_with(&monster_path, config.encoding)?;

    match cli.command {
        Commands::List { search } => {
            let positions = search_rows(&document.rows, search.as_deref().unwrap_or(""));
            for position in &positions {
                println!("{:>5}  {}", position, display_label(&document.rows[*position]));
            }
            info!("Listed {} of {} monsters", positions.len(), document.rows.len());
        }
        Commands::Show { position, json } => {
            let row = document
                .rows
                .get(position)
                .ok_or_else(|| anyhow::anyhow!("No monster at position {}", position))?;
            if json {
                println!("{}", preview_json(row)?);
            } else {
                println!("{}", format_preview(row));
            }
        }
        Commands::Apply { percent, fields, rows, all, preset, dry_run } => {
            let (percent, fields) = match preset {
                Some(name) => {
                    let preset = config.preset(&name)?;
                    info!("Using preset {}", preset.name);
                    (preset.percent, preset.fields.clone())
                }
                None => {
                    let text = percent
                        .ok_or_else(|| anyhow::anyhow!("--percent or --preset is required"))?;
                    (parse_percent(&text)?, fields)
                }
            };

            let (summary, first) = if all {
                let summary = apply_percentage_to_all(&mut document.rows, &fields, percent)?;
                (summary, 0)
            } else {
                let summary = apply_percentage(&mut document.rows, &rows, &fields, percent)?;
                (summary, rows[0])
            };
            println!(
                "Applied {}% to {} monsters ({} values changed)",
                summary.percent, summary.affected_rows, summary.changed_cells
            );
            if let Some(row) = document.rows.get(first) {
                println!("{}", format_preview(row));
            }

            if dry_run {
                info!("(DRY RUN - no files were modified)");
            } else {
                save(&document, &monster_path, &config)?;
            }
        }
        Commands::Add => {
            let row = add_row(&mut document.rows);
            println!(
                "{:>5}  {}",
                document.rows.len() - 1,
                display_label(&row)
            );
            save(&document, &monster_path, &config)?;
        }
        Commands::Update { position, assignments } => {
            let row = document
                .rows
                .get(position)
                .ok_or_else(|| anyhow::anyhow!("No monster at position {}", position))?;
            let mut values: Vec<String> = row.values().to_vec();
            for (field, value) in parse_assignments(&assignments)? {
                values[field.position()] = value;
            }

            update_row(&mut document.rows, position, &values)?;
            println!("{}", display_label(&document.rows[position]));
            save(&document, &monster_path, &config)?;
        }
        Commands::Delete { position } => {
            let removed = delete_row(&mut document.rows, position)?;
            println!("Deleted {}", display_label(&removed));
            save(&document, &monster_path, &config)?;
        }
        Commands::Export { output } => {
            export_csv_file(&document.rows, &output)?;
            println!("Exported {} monsters to {:?}", document.rows.len(), output);
        }
        Commands::Check => {
            let duplicates = duplicate_indices(&document.rows);
            let broken = verify_round_trip(&document);

            println!("Monsters: {}", document.rows.len());
            println!("Header lines: {}", document.header.len());
            println!("Footer lines: {}", document.footer.len());
            println!("Duplicate indices: {}", duplicates.len());
            for (index, positions) in &duplicates {
                println!("  Index {} at positions {:?}", index, positions);
            }
            println!("Rows that would not survive a save: {}", broken.len());
            for position in &broken {
                warn!("Row {} does not round-trip: {}", position, display_label(&document.rows[*position]));
            }
        }
    }

    info!("Monster editor finished");
    Ok(())
}
