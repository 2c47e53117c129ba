use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use catview::controller::Controller;
use catview::dataset::{DatasetKind, load};
use catview::domain::{CatConfig, CatError, DEFAULT_BATCH_SIZE, expand_path};
use catview::html::render_document;
use catview::model::{Model, Status};
use catview::prefs::{FilePrefStore, Layout, Theme, UiPrefs};
use catview::source::{Source, SourceFormat};
use catview::ui::TableUI;
use catview::view::{SortDirection, SortState, ViewState};

/// Sortable, filterable and searchable views over video and channel catalogues.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the dataset as a standalone HTML page.
    Render(RenderArgs),
    /// Browse the dataset in the terminal.
    View(ViewArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// URL or local path of the dataset.
    source: String,
    #[arg(short, long, value_enum)]
    kind: DatasetKind,
    /// Skip format detection.
    #[arg(long, value_enum)]
    format: Option<SourceFormat>,
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
    /// Maximum fuzzy match score (0 exact .. 1 anything).
    #[arg(long)]
    threshold: Option<f64>,
    /// Directory relative image names resolve against.
    #[arg(long)]
    asset_dir: Option<String>,
    /// Commit history endpoint used for "Last Updated".
    #[arg(long)]
    commits_url: Option<String>,
}

impl SourceArgs {
    fn config(&self) -> CatConfig {
        let mut cfg = CatConfig::new(Source::parse(&self.source), self.kind)
            .with_batch_size(self.batch_size.max(1));
        if let Some(format) = self.format {
            cfg = cfg.with_format(format);
        }
        if let Some(threshold) = self.threshold {
            cfg = cfg.with_search_threshold(threshold.clamp(0.0, 1.0));
        }
        if let Some(dir) = &self.asset_dir {
            cfg = cfg.with_asset_dir(dir.clone());
        }
        if let Some(url) = &self.commits_url {
            cfg = cfg.with_commits_url(url.clone());
        }
        cfg
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Output file, stdout when absent.
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t)]
    theme: Theme,
    #[arg(long, value_enum, default_value_t)]
    layout: Layout,
    #[arg(long)]
    no_thumbs: bool,
    #[arg(short, long, default_value = "")]
    query: String,
    #[arg(long, default_value_t = 0)]
    min_views: i64,
    /// Minimum videos (channels) or duration in seconds (videos).
    #[arg(long, default_value_t = 0)]
    min_secondary: i64,
    #[arg(long)]
    category: Option<String>,
    /// Column key or label to sort by.
    #[arg(long)]
    sort: Option<String>,
    #[arg(long)]
    desc: bool,
}

#[derive(Args, Debug)]
struct ViewArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Write logs here; logging is off otherwise.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Preferences file.
    #[arg(long)]
    prefs: Option<String>,
    /// Input poll time in ms.
    #[arg(long, default_value_t = 50)]
    poll: u64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Render(args) => init_tracing("info", None).and_then(|_| render(args)),
        Command::View(args) => match &args.log_file {
            Some(path) => init_tracing("warn", Some(path)).and_then(|_| view(args)),
            None => view(args),
        },
    };
    match result {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_tracing(default_level: &str, log_file: Option<&Path>) -> Result<(), CatError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);
    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(ErrorLayer::default())
                .init();
        }
        None => {
            registry
                .with(fmt::layer().with_writer(io::stderr))
                .with(ErrorLayer::default())
                .init();
        }
    }
    Ok(())
}

fn render(args: RenderArgs) -> Result<(), CatError> {
    let start_time = Instant::now();
    let config = args.source.config();
    let loaded = load(&config);

    let sort = args.sort.as_deref().and_then(|key| {
        let field = config
            .kind
            .columns()
            .iter()
            .find(|f| f.key() == key || f.label().eq_ignore_ascii_case(key))
            .copied();
        if field.is_none() {
            warn!("Ignoring unknown sort column {key}");
        }
        field.map(|field| SortState {
            field,
            direction: if args.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            },
        })
    });
    let view = ViewState {
        query: args.query,
        min_views: args.min_views,
        min_secondary: args.min_secondary,
        category: args.category,
        sort,
    };
    let prefs = UiPrefs {
        theme: args.theme,
        layout: args.layout,
        show_thumbs: !args.no_thumbs,
    };

    let document = render_document(&loaded, &view, prefs, &config);
    match &args.output {
        Some(path) => fs::write(path, document)?,
        None => io::stdout().write_all(document.as_bytes())?,
    }
    info!(
        "Rendering {} took {}ms ...",
        config.source.name(),
        start_time.elapsed().as_millis()
    );
    Ok(())
}

fn view(args: ViewArgs) -> Result<(), CatError> {
    let mut config = args.source.config().with_event_poll_time(args.poll);
    if let Some(path) = &args.prefs {
        config = config.with_prefs_path(expand_path(path));
    }
    let loaded = load(&config);
    let store = FilePrefStore::open(&config.prefs_path);

    let mut terminal = ratatui::try_init()?;
    let size = terminal.size()?;
    let mut model = Model::init(
        &config,
        loaded,
        Box::new(store),
        size.width as usize,
        size.height as usize,
    );
    let mut ui = TableUI::new();
    let controller = Controller::new(&config);

    let result = (|| -> Result<(), CatError> {
        while model.status != Status::QUITTING {
            terminal.draw(|f| ui.draw(&model, f))?;
            let message = controller.handle_event(&model)?;
            model.update(message)?;
        }
        Ok(())
    })();
    ratatui::restore();
    result
}
