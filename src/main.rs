use clap::{error::ErrorKind, CommandFactory, Parser};
use directories::ProjectDirs;
use markdslide::{
    CommandListener, Config, ConfigLoadError, DeckParser, Exporter, ParserOptions, PresentationStore, Presenter,
    PresenterOptions, TimerThresholds, SAMPLE_PRESENTATION,
};
use std::{
    env,
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const APP_NAME: &str = "markdslide";
const LOG_FILE_ENV: &str = "MARKDSLIDE_LOG_FILE";

/// Run timed markdown slideshows from your terminal.
#[derive(Parser)]
#[command(author, version, about = create_splash(), arg_required_else_help = true)]
struct Cli {
    /// The path to the markdown file that contains the presentation.
    #[clap(group = "target")]
    path: Option<PathBuf>,

    /// Export the presentation as an html file at the given path rather than displaying it.
    #[clap(long)]
    export_html: Option<PathBuf>,

    /// Print the parsed slides as JSON rather than displaying them.
    #[clap(long)]
    dump_slides: bool,

    /// Save the sample presentation into the storage directory under this name.
    #[clap(long, group = "target")]
    new: Option<String>,

    /// The number of seconds slides without a timing directive are shown for.
    #[clap(long)]
    default_timing: Option<u32>,

    /// Don't ring the terminal bell when the slide changes.
    #[clap(long)]
    mute: bool,

    /// Generate a JSON schema for the configuration file.
    #[cfg(feature = "json-schema")]
    #[clap(long)]
    generate_config_file_schema: bool,

    /// The path to the configuration file.
    #[clap(short, long, env = "MARKDSLIDE_CONFIG_FILE")]
    config_file: Option<PathBuf>,
}

fn create_splash() -> String {
    let crate_version = env!("CARGO_PKG_VERSION");

    format!(
        r#"
  ┌┬┐┌─┐┬─┐┬┌─┌┬┐┌─┐┬  ┬┌┬┐┌─┐
  │││├─┤├┬┘├┴┐ ││└─┐│  │ ││├┤
  ┴ ┴┴ ┴┴└─┴ ┴─┴┘└─┘┴─┘┴─┴┘└─┘ v{crate_version}
    Timed slideshows in your terminal
"#,
    )
}

fn configs_path() -> Option<PathBuf> {
    match env::var("XDG_CONFIG_HOME") {
        Ok(path) => Some(Path::new(&path).join(APP_NAME)),
        Err(_) => ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().into()),
    }
}

fn load_config(config_file_path: Option<PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    let (path, explicit) = match config_file_path {
        Some(path) => (path, true),
        None => match configs_path() {
            Some(path) => (path.join("config.yaml"), false),
            None => return Ok(Default::default()),
        },
    };
    match Config::load(&path) {
        Ok(config) => {
            info!(path = %path.display(), "loaded configuration");
            Ok(config)
        }
        Err(ConfigLoadError::NotFound) if !explicit => Ok(Default::default()),
        Err(ConfigLoadError::NotFound) => Err(format!("config file {} not found", path.display()).into()),
        Err(e) => Err(format!("failed to load config file {}: {e}", path.display()).into()),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (log_file, init_warnings) = open_log_file();
    let Some((log_path, file)) = log_file else {
        // Writing to stdout/stderr would corrupt the presentation, so log nothing instead.
        tracing_subscriber::registry().with(env_filter).init();
        return;
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(env_filter)
        .init();
    info!(path = %log_path.display(), "logging initialized");
    for warning in init_warnings {
        warn!("{warning}");
    }
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();
    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warnings.push(format!("failed to create log dir {}: {e}", parent.display()));
                continue;
            }
        }
        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => warnings.push(format!("failed to open log file {}: {e}", candidate.display())),
        }
    }
    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    if let Some(path) = env::var_os(LOG_FILE_ENV) {
        return vec![PathBuf::from(path)];
    }
    let mut candidates = Vec::new();
    if let Some(dirs) = ProjectDirs::from("", "", APP_NAME) {
        candidates.push(dirs.data_dir().join("markdslide.log"));
    }
    candidates.push(env::temp_dir().join("markdslide.log"));
    candidates
}

fn make_parser_options(cli: &Cli, config: &Config) -> ParserOptions {
    ParserOptions { default_timing: cli.default_timing.unwrap_or(config.defaults.slide_timing) }
}

fn run(mut cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "json-schema")]
    if cli.generate_config_file_schema {
        let schema = schemars::schema_for!(Config);
        serde_json::to_writer_pretty(std::io::stdout(), &schema).map_err(|e| format!("failed to write schema: {e}"))?;
        return Ok(());
    }

    let config = load_config(cli.config_file.take())?;
    if let Some(name) = &cli.new {
        let store = PresentationStore::new(&config.defaults.storage_dir);
        let path = store.save(name, SAMPLE_PRESENTATION)?;
        println!("sample presentation saved to {}", path.display());
        return Ok(());
    }

    let path = cli.path.take().unwrap_or_else(|| {
        Cli::command().error(ErrorKind::MissingRequiredArgument, "no path specified").exit();
    });
    let parser_options = make_parser_options(&cli, &config);
    if cli.dump_slides || cli.export_html.is_some() {
        let exporter = Exporter::new(DeckParser::new(parser_options));
        if let Some(output) = &cli.export_html {
            exporter.export_html(&path, output)?;
        }
        if cli.dump_slides {
            let metadata = exporter.generate_metadata(&path)?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
    } else {
        let commands = CommandListener::new(config.bindings, &path)?;
        let options = PresenterOptions {
            parser: parser_options,
            thresholds: TimerThresholds::from(&config.timer),
            sound: config.options.sound && !cli.mute,
        };
        let presenter = Presenter::new(commands, options);
        presenter.present(&path)?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing();
    if let Err(e) = run(cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
