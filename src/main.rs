use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use serde_json::json;

use screen_color_picker::{
    format_hex_color, format_rgb_color, picker, ClipboardFormat, Color, PickOutcome, PickerConfig,
    ScreenPoint,
};

#[derive(Parser, Debug)]
#[command(name = "screen-color-picker")]
#[command(version, about = "Pick the color of any on-screen pixel")]
struct Cli {
    /// TOML file overriding the default picker settings
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// Delay between minimizing the console and capturing the screen
    #[arg(long, value_name = "MS")]
    settle_ms: Option<u64>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Hex)]
    format: OutputFormat,

    /// Sample one point without the overlay: `X,Y` or `cursor`
    #[arg(long, value_name = "X,Y|cursor", value_parser = parse_target)]
    at: Option<Target>,

    /// Verbose logging (debug level unless RUST_LOG is set)
    #[arg(long, short = 'v', action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Hex,
    Rgb,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Cursor,
    Point(ScreenPoint),
}

fn parse_target(text: &str) -> Result<Target, String> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("cursor") {
        return Ok(Target::Cursor);
    }
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y or `cursor`, got `{text}`"))?;
    let coord = |s: &str| {
        s.trim()
            .parse::<i32>()
            .map_err(|err| format!("invalid coordinate `{}`: {err}", s.trim()))
    };
    Ok(Target::Point(ScreenPoint::new(coord(x)?, coord(y)?)))
}

fn render_color(format: OutputFormat, color: Color) -> String {
    match format {
        OutputFormat::Hex => ClipboardFormat::Hex.render(color),
        OutputFormat::Rgb => ClipboardFormat::Rgb.render(color),
        OutputFormat::Json => json!({
            "hex": format_hex_color(color),
            "rgb": format_rgb_color(color),
            "color": color,
        })
        .to_string(),
    }
}

fn render_outcome(format: OutputFormat, outcome: &PickOutcome) -> Option<String> {
    match (format, outcome) {
        (OutputFormat::Json, PickOutcome::Picked { color, .. }) => {
            let mut value = serde_json::to_value(outcome).ok()?;
            value["hex"] = json!(format_hex_color(*color));
            Some(value.to_string())
        }
        (OutputFormat::Json, PickOutcome::Cancelled) => serde_json::to_string(outcome).ok(),
        (_, PickOutcome::Picked { color, .. }) => Some(render_color(format, *color)),
        (_, PickOutcome::Cancelled) => None,
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<PickerConfig> {
    let mut config = match &cli.config {
        Some(path) => PickerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PickerConfig::default(),
    };
    if let Some(ms) = cli.settle_ms {
        config.settle_delay_ms = ms;
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(cli)?;
    log::debug!("picker config: {config:?}");

    if let Some(target) = cli.at {
        let at = match target {
            Target::Cursor => None,
            Target::Point(point) => Some(point),
        };
        let color = picker::pick_point(at, &config).context("sampling a single point")?;
        log::info!("sampled {color} at {target:?}");
        println!("{}", render_color(cli.format, color));
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = picker::run(&config).context("color picking session")?;

    if let Some(text) = render_outcome(cli.format, &outcome) {
        println!("{text}");
    }
    match outcome {
        PickOutcome::Picked { .. } => Ok(ExitCode::SUCCESS),
        PickOutcome::Cancelled => {
            log::info!("no color selected");
            Ok(ExitCode::from(1))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}
