use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use argh::FromArgs;
use tracing_subscriber::EnvFilter;

use edgetap::app::{self, App, RunOptions};
use edgetap::core::ScreenMetrics;
use edgetap::scenario::Scenario;
use edgetap::store::{ConfigStore, JsonFileStore};
use edgetap_config::OverlayConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// edgetap - invisible gesture strips over the screen
#[derive(FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Option<SubCommand>,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum SubCommand {
    Run(RunCmd),
    ShowConfig(ShowConfigCmd),
    ResetConfig(ResetConfigCmd),
    ImportConfig(ImportConfigCmd),
    Version(VersionCmd),
}

/// Replay a touch scenario against the overlay on a headless platform
#[derive(FromArgs)]
#[argh(subcommand, name = "run")]
struct RunCmd {
    /// scenario JSON file
    #[argh(positional)]
    scenario: PathBuf,
    /// screen size as WIDTHxHEIGHT (default 1080x2400)
    #[argh(option, default = "String::from(\"1080x2400\")")]
    screen: String,
    /// platform version reported to actions (default 33)
    #[argh(option, default = "33")]
    platform_version: u32,
    /// preferences file (default: user config dir)
    #[argh(option)]
    store: Option<PathBuf>,
}

/// Print the stored overlay config
#[derive(FromArgs)]
#[argh(subcommand, name = "show-config")]
struct ShowConfigCmd {
    /// preferences file (default: user config dir)
    #[argh(option)]
    store: Option<PathBuf>,
    /// print raw JSON
    #[argh(switch)]
    json: bool,
}

/// Remove the stored overlay config
#[derive(FromArgs)]
#[argh(subcommand, name = "reset-config")]
struct ResetConfigCmd {
    /// preferences file (default: user config dir)
    #[argh(option)]
    store: Option<PathBuf>,
}

/// Store an overlay config from a JSON file
#[derive(FromArgs)]
#[argh(subcommand, name = "import-config")]
struct ImportConfigCmd {
    /// config JSON file
    #[argh(positional)]
    file: PathBuf,
    /// preferences file (default: user config dir)
    #[argh(option)]
    store: Option<PathBuf>,
}

/// Show version information
#[derive(FromArgs)]
#[argh(subcommand, name = "version")]
struct VersionCmd {}

fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    match cli.command {
        None => {
            // No subcommand - show help (simulate --help)
            let args: Vec<&str> = vec!["edgetap", "--help"];
            if let Err(e) = Cli::from_args(&args[..1], &args[1..]) {
                println!("{}", e.output);
            }
            Ok(())
        }
        Some(SubCommand::Run(cmd)) => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .init();

            tracing::info!("edgetap {} starting", VERSION);
            let scenario = Scenario::load(&cmd.scenario)?;
            let options = RunOptions {
                screen: parse_screen(&cmd.screen)?,
                platform_version: cmd.platform_version,
                store_path: store_path(cmd.store)?,
            };
            App::run(scenario, options)
        }
        Some(SubCommand::ShowConfig(cmd)) => {
            let configs = open_configs(cmd.store)?;
            let config = match configs.load() {
                Some(config) => config,
                None => {
                    eprintln!("No stored config, showing defaults");
                    OverlayConfig::default()
                }
            };
            if cmd.json {
                println!("{}", config.to_json_pretty()?);
            } else {
                print!("{}", app::describe_config(&config));
            }
            Ok(())
        }
        Some(SubCommand::ResetConfig(cmd)) => {
            open_configs(cmd.store)?.reset()?;
            println!("Config reset to defaults");
            Ok(())
        }
        Some(SubCommand::ImportConfig(cmd)) => import_config(&cmd.file, cmd.store),
        Some(SubCommand::Version(_)) => {
            println!("edgetap {}", VERSION);
            Ok(())
        }
    }
}

fn import_config(file: &Path, store: Option<PathBuf>) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let config = OverlayConfig::from_json(&text)
        .with_context(|| format!("{} is not an overlay config", file.display()))?;
    open_configs(store)?.save(&config)?;
    println!("Imported {} segments", config.segments.len());
    Ok(())
}

fn open_configs(store: Option<PathBuf>) -> Result<ConfigStore> {
    let store = JsonFileStore::open(store_path(store)?)?;
    Ok(ConfigStore::new(Rc::new(store)))
}

fn store_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit.or_else(JsonFileStore::default_path) {
        Some(path) => Ok(path),
        None => bail!("No config directory available; pass --store"),
    }
}

fn parse_screen(s: &str) -> Result<ScreenMetrics> {
    let Some((w, h)) = s.split_once(['x', 'X']) else {
        bail!("Invalid screen size '{}', expected WIDTHxHEIGHT", s);
    };
    let width: u32 = w.trim().parse().with_context(|| format!("Invalid width '{}'", w))?;
    let height: u32 = h
        .trim()
        .parse()
        .with_context(|| format!("Invalid height '{}'", h))?;
    if width == 0 || height == 0 {
        bail!("Screen size must be positive: {}", s);
    }
    Ok(ScreenMetrics::new(width, height))
}
