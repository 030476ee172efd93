//! rebind - rebindable input actions demo
//!
//! Shows live action state for the built-in profiles while keys are pressed,
//! profiles are switched and bindings are changed.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use rebind::config::Config;
use rebind::Application;
use std::fs::File;
use std::path::PathBuf;

fn command() -> Command {
    Command::new("rebind")
        .version(rebind::VERSION)
        .about("Interactive demo of rebindable input actions")
        .long_about(
            "rebind maps logical actions to keys, mouse buttons and virtual axes. \
             Tab cycles profiles, r rebinds Jump, t removes or restores Fire, \
             Esc (Arrows) or q (Vim) quits.",
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Host configuration file (defaults to the user config directory)"),
        )
        .arg(
            Arg::new("profile")
                .long("profile")
                .short('p')
                .value_name("NAME")
                .help("Profile to start with"),
        )
        .arg(
            Arg::new("tick-ms")
                .long("tick-ms")
                .value_name("MS")
                .value_parser(value_parser!(u64).range(1..))
                .help("Frame period in milliseconds"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Write logs to this file (RUST_LOG sets the filter)"),
        )
}

/// The terminal is in raw mode while the demo runs, so logs only go to a file.
fn init_logging(matches: &ArgMatches) -> Result<()> {
    let Some(path) = matches.get_one::<PathBuf>("log-file") else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("Cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

#[cfg(feature = "config")]
fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    Ok(config)
}

#[cfg(not(feature = "config"))]
fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    if path.is_some() {
        anyhow::bail!("--config requires the `config` feature");
    }
    Ok(Config::default())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = command().get_matches();
    init_logging(&matches)?;

    let mut config = load_config(matches.get_one::<PathBuf>("config"))?;
    if let Some(&tick_ms) = matches.get_one::<u64>("tick-ms") {
        config.tick_ms = tick_ms;
    }

    let mut app = Application::new(config, rebind::app::default_profiles())?;
    if let Some(name) = matches.get_one::<String>("profile") {
        if !app.manager_mut().select_profile(name) {
            let known: Vec<&str> = app
                .manager()
                .profiles()
                .iter()
                .map(|profile| profile.name())
                .collect();
            anyhow::bail!("Unknown profile '{}' (available: {})", name, known.join(", "));
        }
    }

    app.run().await?;

    Ok(())
}
