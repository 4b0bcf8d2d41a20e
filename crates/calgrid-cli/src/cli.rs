use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use calgrid_engine::{
    compute_layout, CalendarEvent, CalendarView, LayoutConfig, ViewLayout, ViewSettings,
};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "calgrid",
    version,
    about = "Lay out calendar events into month, week, and day grids"
)]
pub struct Cli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the layout of a view as JSON
    Layout(LayoutArgs),
    /// Print the visible and overflowing chips of one month cell as JSON
    Overflow(OverflowArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ViewKind {
    Month,
    Week,
    Day,
}

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// IANA display time zone
    #[arg(long = "tz", default_value = "UTC")]
    pub time_zone: String,

    /// First day of the week: 1 = Monday ... 6 = Saturday, 0 or 7 = Sunday
    #[arg(long = "week-start", default_value_t = 1)]
    pub week_start: u8,

    #[arg(long = "hide-weekends")]
    pub hide_weekends: bool,

    /// JSON file with layout sizes; defaults apply to missing fields
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Print JSON on a single line
    #[arg(long = "compact")]
    pub compact: bool,

    /// JSON array of events; `-` or nothing reads stdin
    pub events: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct LayoutArgs {
    #[arg(long = "view", value_enum, default_value = "week")]
    pub view: ViewKind,

    /// Any date inside the view, YYYY-MM-DD
    #[arg(long = "date")]
    pub date: NaiveDate,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug)]
pub struct OverflowArgs {
    /// The cell's date, YYYY-MM-DD
    #[arg(long = "date")]
    pub date: NaiveDate,

    /// Measured height of the cell's chip area in pixels
    #[arg(long = "height")]
    pub height: f64,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    // Logs go to stderr; stdout carries only the JSON result.
    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    init_tracing(cli.verbose, cli.quiet)?;

    let output = match cli.command {
        Command::Layout(args) => {
            let (events, settings, config) = load(&args.common)?;
            let view = match args.view {
                ViewKind::Month => CalendarView::Month { date: args.date },
                ViewKind::Week => CalendarView::Week { date: args.date },
                ViewKind::Day => CalendarView::Day { date: args.date },
            };
            let layout = compute_layout(&events, &view, &settings, &config)
                .context("failed to compute layout")?;
            render(&layout, args.common.compact)?
        }
        Command::Overflow(args) => {
            let (events, settings, config) = load(&args.common)?;
            let layout = compute_layout(
                &events,
                &CalendarView::Month { date: args.date },
                &settings,
                &config,
            )
            .context("failed to compute month layout")?;
            let ViewLayout::Month(month) = layout else {
                return Err(anyhow!("month view produced a non-month layout"));
            };
            let tz = settings.timezone()?;
            let info = month.capacity(args.date, args.height, &tz, &config.overflow_options());
            info!(
                visible = info.visible_count(),
                overflow = info.overflow_count,
                "fitted cell"
            );
            render(&info, args.common.compact)?
        }
    };

    println!("{output}");
    Ok(())
}

fn load(args: &CommonArgs) -> anyhow::Result<(Vec<CalendarEvent>, ViewSettings, LayoutConfig)> {
    let config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            LayoutConfig::from_json_str(&raw)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => LayoutConfig::default(),
    };

    let raw = match &args.events {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read events {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read events from stdin")?;
            buf
        }
    };
    let events = CalendarEvent::list_from_json(&raw).context("invalid events JSON")?;
    debug!(count = events.len(), "loaded events");

    let settings = ViewSettings::new(args.time_zone.clone())
        .with_week_start(args.week_start)
        .with_weekends(!args.hide_weekends);

    Ok((events, settings, config))
}

fn render<T: serde::Serialize>(value: &T, compact: bool) -> anyhow::Result<String> {
    let json = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    json.context("failed to serialize output")
}
