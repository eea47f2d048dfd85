use anyhow::{Context, Result};
use chartbook::config::{self, WindowUnit};
use chartbook::core::ChartDataset;
use chartbook::model::{ChartRow, EntityKind, PeakStatus, PlayChange, RawListen, Status};
use chartbook::weeks;
use std::fs;
use time::Date;

#[derive(Debug, Default)]
struct CliArgs {
    input: Option<String>,
    window: Option<(WindowUnit, u32)>,
    chart_size: Option<u32>,
    week: Option<Date>,
    artists: bool,
    history: Option<String>,
}

fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;
    let Some(input) = args.input.clone() else {
        print_help();
        return Ok(());
    };

    let mut settings = config::load_settings()?;
    if let Some((unit, duration)) = args.window {
        settings.window_unit = unit;
        settings.window_duration = duration;
    }
    if let Some(size) = args.chart_size {
        settings.chart_size = size;
    }

    let raw = fs::read_to_string(&input).with_context(|| format!("failed to read {input}"))?;
    let rows: Vec<RawListen> =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {input}"))?;

    let dataset = ChartDataset::from_rows(&rows, &settings.ranking())?;

    if let Some(key) = args.history {
        return print_history(&dataset, &key, args.artists);
    }

    let week = match args.week {
        Some(week) => week,
        None => dataset.last_week().context("dataset has no weeks")?,
    };
    let kind = if args.artists {
        EntityKind::Artists
    } else {
        EntityKind::Tracks
    };

    let chart = dataset.chart_for_week(week, kind);
    if chart.is_empty() {
        anyhow::bail!(
            "no {} chart for week {} (dataset spans {} to {})",
            kind.label(),
            weeks::week_key(week),
            dataset.first_week().map(weeks::week_key).unwrap_or_default(),
            dataset.last_week().map(weeks::week_key).unwrap_or_default()
        );
    }

    println!("{} — week of {}", kind.label(), weeks::week_key(week));
    for row in &chart {
        println!("{}", format_row(row));
    }
    Ok(())
}

fn print_history(dataset: &ChartDataset, key: &str, artists: bool) -> Result<()> {
    let (name, history) = if artists {
        let charted = dataset
            .artist(key)
            .with_context(|| format!("no charted artist {key}"))?;
        (charted.details.artist_name.clone(), &charted.history)
    } else {
        let charted = dataset
            .track(key)
            .with_context(|| format!("no charted track {key}"))?;
        (charted.details.track_name.clone(), &charted.history)
    };

    println!("{name}");
    for entry in history {
        println!(
            "{}  #{:<3} {:>6} plays  {:<4} wk {}",
            weeks::week_key(entry.week),
            entry.rank,
            entry.plays_in_window,
            status_label(entry.status),
            entry.weeks_on_chart
        );
    }
    Ok(())
}

fn format_row(row: &ChartRow) -> String {
    let name = match &row.artist_name {
        Some(artist) => format!("{} — {}", row.name, artist),
        None => row.name.clone(),
    };
    let peak = row
        .peak
        .map(|peak| peak.to_string())
        .unwrap_or_else(|| String::from("-"));
    let peak_marker = match row.peak_status {
        Some(PeakStatus::Peak) => " *",
        Some(PeakStatus::RePeak) => " ^",
        None => "",
    };
    format!(
        "{:>3}. {:<4} {}  ({} plays, peak {}{}, {} wks, {})",
        row.rank,
        status_label(row.status),
        name,
        row.plays,
        peak,
        peak_marker,
        row.weeks_on_chart,
        change_label(row.play_percent_change)
    )
}

fn status_label(status: Status) -> String {
    match status {
        Status::New => String::from("NEW"),
        Status::ReEntry => String::from("RE"),
        Status::Delta(0) => String::from("="),
        Status::Delta(delta) if delta > 0 => format!("+{delta}"),
        Status::Delta(delta) => delta.to_string(),
    }
}

fn change_label(change: PlayChange) -> String {
    match change {
        PlayChange::Finite(value) => format!("{value:+.1}%"),
        PlayChange::InfiniteIncrease => String::from("+inf%"),
    }
}

fn parse_args(args: Vec<String>) -> Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--weeks" | "--months" | "--years" => {
                let flag = args[index].clone();
                index += 1;
                let value: u32 = args
                    .get(index)
                    .with_context(|| format!("{flag} requires a number"))?
                    .parse()
                    .with_context(|| format!("{flag} requires a number"))?;
                let unit = match flag.as_str() {
                    "--weeks" => WindowUnit::Weeks,
                    "--months" => WindowUnit::Months,
                    _ => WindowUnit::Years,
                };
                out.window = Some((unit, value));
            }
            "--all-time" => out.window = Some((WindowUnit::AllTime, 1)),
            "--ytd" => out.window = Some((WindowUnit::YearToDate, 1)),
            "--size" => {
                index += 1;
                let value: u32 = args
                    .get(index)
                    .context("--size requires a number")?
                    .parse()
                    .context("--size requires a number")?;
                out.chart_size = Some(value);
            }
            "--week" => {
                index += 1;
                let value = args.get(index).context("--week requires YYYY-MM-DD")?;
                let Some(week) = weeks::parse_week_key(value) else {
                    anyhow::bail!("--week requires YYYY-MM-DD, got {value}");
                };
                out.week = Some(week);
            }
            "--artists" => out.artists = true,
            "--history" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--history requires an entity key");
                };
                out.history = Some(value.clone());
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other if out.input.is_none() && !other.starts_with('-') => {
                out.input = Some(other.to_string());
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        index += 1;
    }
    Ok(out)
}

fn print_help() {
    println!("chartbook <listens.json>");
    println!("  --weeks N | --months N | --years N   Sliding ranking window");
    println!("  --all-time                           Cumulative ranking");
    println!("  --ytd                                Year-to-date ranking");
    println!("  --size N                             Chart size (top N)");
    println!("  --week YYYY-MM-DD                    Week to print (default: latest)");
    println!("  --artists                            Artist chart instead of tracks");
    println!("  --history KEY                        Print an entity's chart history");
}
