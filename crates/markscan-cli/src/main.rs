use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use markscan_config::Config;
use markscan_engine::markup_engine;
use std::{
    fs,
    io::{self, Read, Write},
    path::PathBuf,
};

mod render;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Styled terminal output
    Ansi,
    /// Final text followed by one line per span
    Plain,
    /// `{text, spans}` as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "markscan", author, version, about, long_about = None)]
struct Args {
    /// File to scan (reads stdin when omitted)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Config file (defaults to ~/.config/markscan/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Skip the built-in markup rules
    #[arg(long)]
    no_defaults: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Ansi)]
    format: Format,
}

fn load_config(args: &Args) -> Result<Config> {
    let config_path = match &args.config {
        Some(path) => Config::expand_path(path).unwrap_or_else(|| path.clone()),
        None => Config::config_path(),
    };
    log::debug!("Config path: {}", config_path.display());

    let mut config = match Config::load_from_path(&config_path)? {
        Some(config) => config,
        None if args.config.is_some() => {
            anyhow::bail!("config file not found: {}", config_path.display())
        }
        None => Config::default(),
    };
    if args.no_defaults {
        config.use_default_rules = false;
    }
    Ok(config)
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let rules = config.effective_rules();
    if rules.is_empty() {
        log::warn!("No markup rules configured; output will equal input");
    }

    let engine = markup_engine(&rules).context("Invalid markup rule in config")?;
    log::info!("Registered {} markup rule(s)", engine.pattern_count());

    let input = read_input(args.file.as_ref())?;
    let styled = engine.process(&input);
    log::info!(
        "Scanned {} char(s), {} span(s)",
        styled.char_len(),
        styled.spans.len()
    );

    let output = match args.format {
        Format::Ansi => render::ansi(&styled),
        Format::Plain => render::plain(&styled),
        Format::Json => render::json(&styled)?,
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if args.format == Format::Json {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
