//! Command definitions and handlers.

use crate::assets::{DirImageFetcher, FileIconCatalog};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use lifeline_core::db::open_db;
use lifeline_core::export::{ExportFormat, NoIcons};
use lifeline_core::service::SaveOutcome;
use lifeline_core::{
    default_log_level, init_logging, EdgeId, IconCatalog, SceneError, Settings,
    SqliteTimelineRepository, TimelineData, TimelineRepository, TimelineService, TimelineSession,
};
use log::info;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "lifeline", version, about = "Life timeline import, export and storage")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings JSON (`timeline` and `export` sections, every field optional)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for rolling log files; logging is off without it
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add events from an `age, label` text file to a timeline document
    Import(ImportArgs),

    /// Write a timeline document as JSON, SVG, PNG or PDF
    Export(ExportArgs),

    /// Print a summary of a timeline document
    Info {
        /// Timeline JSON document
        document: PathBuf,
    },

    /// Move documents in and out of the SQLite store
    #[command(subcommand)]
    Store(StoreCommand),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Text file, one `age<sep>label` per line (`,` `;` or `:`)
    pub events: PathBuf,

    /// Timeline document to extend; created when missing
    #[arg(long)]
    pub into: PathBuf,

    /// Branch id to place the events on (main axis when omitted)
    #[arg(long)]
    pub branch: Option<String>,

    /// Answer yes to the branch extension prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Json,
    Svg,
    Png,
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Svg => ExportFormat::Svg,
            FormatArg::Png => ExportFormat::Png,
            FormatArg::Pdf => ExportFormat::Pdf,
        }
    }
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Timeline JSON document
    pub document: PathBuf,

    /// Output format; inferred from `--output` when omitted
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Output file (default: timestamped `timeline_<date>_<time>.<ext>`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory image hrefs are resolved against
    #[arg(long, default_value = ".")]
    pub assets: PathBuf,

    /// JSON object mapping icon ids to file names under `--assets`
    #[arg(long)]
    pub icons: Option<PathBuf>,

    /// Header line printed above the image in PDF output (repeatable)
    #[arg(long = "header")]
    pub header_lines: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum StoreCommand {
    /// Store a document under an owner id
    Save {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        owner: String,
        document: PathBuf,
    },
    /// Write an owner's stored document to a file (stdout when omitted)
    Load {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        owner: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List stored owners, most recently updated first
    List {
        #[arg(long)]
        db: PathBuf,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.log_dir.as_deref(), cli.log_level.as_deref())?;
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Import(args) => run_import(&settings, args),
        Commands::Export(args) => run_export(&settings, args),
        Commands::Info { document } => run_info(&settings, &document),
        Commands::Store(command) => run_store(&settings, command),
    }
}

fn setup_logging(log_dir: Option<&Path>, level: Option<&str>) -> Result<()> {
    let Some(log_dir) = log_dir else {
        return Ok(());
    };
    let absolute = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .context("cannot resolve current directory")?
            .join(log_dir)
    };
    let level = level.unwrap_or(default_log_level());
    init_logging(level, &absolute.to_string_lossy()).map_err(|message| anyhow!(message))
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read settings {}", path.display()))?;
    Settings::from_json(&text).with_context(|| format!("invalid settings {}", path.display()))
}

fn read_document(path: &Path) -> Result<TimelineData> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read timeline {}", path.display()))?;
    TimelineData::from_json(&text).with_context(|| format!("invalid timeline {}", path.display()))
}

fn open_session(settings: &Settings, path: &Path) -> Result<TimelineSession> {
    let data = read_document(path)?;
    TimelineSession::from_document(&data, settings)
        .with_context(|| format!("timeline {} is inconsistent", path.display()))
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("cannot write {}", path.display()))
}

fn run_import(settings: &Settings, args: ImportArgs) -> Result<()> {
    let text = fs::read_to_string(&args.events)
        .with_context(|| format!("cannot read events {}", args.events.display()))?;
    let mut session = if args.into.exists() {
        open_session(settings, &args.into)?
    } else {
        TimelineSession::empty(settings)
    };
    let branch = args
        .branch
        .as_deref()
        .map(|id| id.trim().parse::<EdgeId>())
        .transpose()
        .context("--branch is not a branch id")?;

    let confirm = |message: &str| args.yes || prompt_yes_no(message);
    let ids = match session.bulk_import(&text, branch, &confirm) {
        Ok(ids) => ids,
        Err(SceneError::Cancelled) => bail!("import cancelled; nothing was added"),
        Err(err) => return Err(anyhow::Error::new(err).context("import rejected")),
    };

    let json = session.export_json()?;
    write_output(&args.into, json.as_bytes())?;
    info!("event=cli_import module=cli status=ok count={}", ids.len());
    println!("added {} events to {}", ids.len(), args.into.display());
    Ok(())
}

fn run_export(settings: &Settings, args: ExportArgs) -> Result<()> {
    let session = open_session(settings, &args.document)?;
    let format = match (args.format, args.output.as_deref()) {
        (Some(format), _) => ExportFormat::from(format),
        (None, Some(output)) => output
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ExportFormat::from_extension)
            .ok_or_else(|| anyhow!("cannot infer format from {}", output.display()))?,
        (None, None) => bail!("pass --format or an --output with a known extension"),
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(lifeline_core::export::timestamped_filename(format)));

    let catalog = args.icons.as_deref().map(FileIconCatalog::load).transpose()?;
    let icons: &dyn IconCatalog = match &catalog {
        Some(catalog) => catalog,
        None => &NoIcons,
    };
    let fetcher = DirImageFetcher::new(args.assets.clone());

    let bytes = match format {
        ExportFormat::Json => session.export_json()?.into_bytes(),
        ExportFormat::Svg => session.export_svg(icons).markup.into_bytes(),
        ExportFormat::Png => session.export_png(icons, &fetcher)?,
        ExportFormat::Pdf => session.export_pdf(icons, &fetcher, &args.header_lines)?,
    };
    write_output(&output, &bytes)?;
    println!("wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}

fn run_info(settings: &Settings, path: &Path) -> Result<()> {
    let session = open_session(settings, path)?;
    let scene = session.scene();
    println!("events:        {}", scene.node_count());
    println!("branches:      {}", scene.edge_count());
    println!("current age:   {}", scene.current_age());
    println!("maximum age:   {}", scene.age_max());
    if let Some(periodization) = scene.selected_periodization() {
        println!("periodization: {periodization}");
    }
    let ages: Vec<f64> = scene.nodes().map(|node| node.age).collect();
    if let (Some(first), Some(last)) = (
        ages.iter().copied().reduce(f64::min),
        ages.iter().copied().reduce(f64::max),
    ) {
        println!("event ages:    {first} to {last}");
    }
    for edge in scene.edges() {
        println!(
            "branch {}: ages {} to {} ({} events)",
            edge.id,
            edge.start_age,
            edge.end_age,
            scene.nodes_on(edge.id).len()
        );
    }
    Ok(())
}

fn run_store(settings: &Settings, command: StoreCommand) -> Result<()> {
    match command {
        StoreCommand::Save {
            db,
            owner,
            document,
        } => {
            let data = read_document(&document)?;
            let conn = open_db(&db).with_context(|| format!("cannot open {}", db.display()))?;
            let service = TimelineService::new(SqliteTimelineRepository::new(&conn), settings.clone());
            // Validate by loading into a scene before anything is written.
            TimelineSession::from_document(&data, settings)
                .with_context(|| format!("timeline {} is inconsistent", document.display()))?;
            match service.save_document(&owner, &data)? {
                SaveOutcome::Saved => println!("stored timeline for {owner}"),
                SaveOutcome::SkippedEmpty => println!("timeline is empty; nothing stored"),
            }
        }
        StoreCommand::Load { db, owner, output } => {
            let conn = open_db(&db).with_context(|| format!("cannot open {}", db.display()))?;
            let repo = SqliteTimelineRepository::new(&conn);
            let data = repo
                .load(&owner)?
                .ok_or_else(|| anyhow!("no timeline stored for {owner}"))?;
            let json = lifeline_core::export::export_json(&data)?;
            match output {
                Some(path) => write_output(&path, json.as_bytes())?,
                None => println!("{json}"),
            }
        }
        StoreCommand::List { db } => {
            let conn = open_db(&db).with_context(|| format!("cannot open {}", db.display()))?;
            let repo = SqliteTimelineRepository::new(&conn);
            for stored in repo.list()? {
                println!("{}\tupdated_at={}", stored.owner_id, stored.updated_at);
            }
        }
    }
    Ok(())
}

fn prompt_yes_no(message: &str) -> bool {
    print!("{message} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, StoreCommand};
    use clap::Parser;

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from([
            "lifeline",
            "export",
            "timeline.json",
            "--format",
            "pdf",
            "--header",
            "My life",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Commands::Export(args) => assert_eq!(args.header_lines, vec!["My life".to_string()]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn store_subcommands_parse() {
        let cli = Cli::parse_from(["lifeline", "store", "list", "--db", "t.db"]);
        assert!(matches!(cli.command, Commands::Store(StoreCommand::List { .. })));
    }
}
