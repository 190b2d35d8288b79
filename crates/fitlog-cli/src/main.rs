mod palette;
mod settings;
mod themes;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use colored::Colorize;
use fitlog_core::calendar::{month_calendar, MonthCalendar};
use fitlog_core::clock::{FixedClock, ReferenceClock, SystemClock};
use fitlog_core::summary::{
    dashboard_stats, recent_records, search_records, weight_series, weight_trend, RecordEntry,
    Trend,
};
use fitlog_core::{
    aggregate, compute_streak, longest_streak, order_categories, priority_rank, ActivityCategory,
    CategoryFilter, DayBucket, IntensityThresholds, IntensityTier, Snapshot, StreakPolicy, Window,
};
use palette::{PaletteConfig, Rgb};
use settings::Settings;
use themes::{Theme, ThemeName};

const DEFAULT_SNAPSHOT: &str = "snapshot.json";

#[derive(Parser)]
#[command(name = "fitlog")]
#[command(author, version, about = "Activity and body-weight tracking dashboards")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        short,
        long,
        global = true,
        help = "Snapshot file exported from storage (default: $FITLOG_SNAPSHOT or ./snapshot.json)"
    )]
    snapshot: Option<PathBuf>,

    #[arg(long, global = true, help = "Reference date (YYYY-MM-DD), defaults to today")]
    today: Option<String>,

    #[arg(long, global = true, help = "Output as JSON")]
    json: bool,

    #[arg(long, global = true, help = "Enable debug logging")]
    debug: bool,

    #[arg(short, long, global = true, default_value = "green", help = "Heatmap color theme")]
    theme: String,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show daily totals for the last N days")]
    Daily {
        #[arg(long, allow_negative_numbers = true, help = "Window length in days")]
        days: Option<i64>,
        #[arg(long, help = "Only count one category (id or name)")]
        category: Option<String>,
    },
    #[command(about = "Show the current month as a calendar heatmap")]
    Month {
        #[arg(long, help = "Only count one category (id or name)")]
        category: Option<String>,
    },
    #[command(about = "Show dashboard statistics")]
    Stats,
    #[command(about = "Show current and longest streak")]
    Streak,
    #[command(about = "Show body-weight trend")]
    Weight,
    #[command(about = "List categories in display order")]
    Categories,
    #[command(about = "List recent records")]
    Recent {
        #[arg(long, default_value = "6", help = "Maximum number of records")]
        limit: usize,
        #[arg(long, help = "Filter by category name or note")]
        search: Option<String>,
    },
    #[command(about = "Show effective settings")]
    Config {
        #[arg(long, help = "Write the effective settings to settings.json")]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let settings = Settings::load();
    let theme_name: ThemeName = cli.theme.parse().map_err(anyhow::Error::msg)?;
    let theme = Theme::from_name(theme_name);
    let clock = reference_clock(cli.today.as_deref())?;
    let reference = clock.today();
    tracing::debug!(
        core = %fitlog_core::version(),
        %reference,
        theme = theme.name.as_str(),
        "starting"
    );

    if let Commands::Config { init } = cli.command {
        return run_config_command(&settings, init, cli.json);
    }

    let snapshot = load_snapshot(&snapshot_path(cli.snapshot))?;
    let ordered = order_categories(&snapshot.categories, &settings.priority_categories);

    match cli.command {
        Commands::Daily { days, category } => {
            let filter = resolve_category_filter(&snapshot, category)?;
            let days = settings.window_days(days);
            run_daily_report(
                &snapshot,
                &ordered,
                &settings.thresholds(),
                reference,
                days,
                &filter,
                cli.json,
            )
        }
        Commands::Month { category } => {
            let filter = resolve_category_filter(&snapshot, category)?;
            run_month_report(
                &snapshot,
                &ordered,
                &settings.thresholds(),
                &theme,
                reference,
                &filter,
                cli.json,
            )
        }
        Commands::Stats => {
            run_stats_report(&snapshot, settings.streak_policy(), reference, cli.json)
        }
        Commands::Streak => {
            run_streak_report(&snapshot, settings.streak_policy(), reference, cli.json)
        }
        Commands::Weight => run_weight_report(&snapshot, cli.json),
        Commands::Categories => {
            run_categories_report(&ordered, &settings.priority_categories, cli.json)
        }
        Commands::Recent { limit, search } => {
            run_recent_report(&snapshot, limit, search.as_deref(), cli.json)
        }
        Commands::Config { .. } => Ok(()),
    }
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // stderr keeps --json output on stdout parseable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn reference_clock(today: Option<&str>) -> Result<Box<dyn ReferenceClock>> {
    match today {
        Some(value) => {
            let key = fitlog_core::normalize(value)
                .with_context(|| format!("Invalid --today value '{}'", value))?;
            Ok(Box::new(FixedClock(key.date())))
        }
        None => Ok(Box::new(SystemClock)),
    }
}

fn snapshot_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("FITLOG_SNAPSHOT").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT))
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot = Snapshot::from_json(&content)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        categories = snapshot.categories.len(),
        records = snapshot.records.len(),
        weights = snapshot.weights.len(),
        "loaded snapshot"
    );
    if snapshot.is_empty() {
        tracing::warn!(path = %path.display(), "snapshot holds no categories, records or weights");
    }
    Ok(snapshot)
}

/// Accept a category id, or failing that a case-insensitive display name.
fn resolve_category_filter(snapshot: &Snapshot, category: Option<String>) -> Result<CategoryFilter> {
    let id = match category {
        None => None,
        Some(wanted) if snapshot.category(&wanted).is_some() => Some(wanted),
        Some(wanted) => {
            let lower = wanted.to_lowercase();
            let found = snapshot
                .categories
                .iter()
                .find(|c| c.display_name.to_lowercase() == lower)
                .ok_or_else(|| anyhow::anyhow!("Unknown category: {}", wanted))?;
            Some(found.id.clone())
        }
    };
    Ok(CategoryFilter::from_option(id))
}

fn run_daily_report(
    snapshot: &Snapshot,
    ordered: &[ActivityCategory],
    thresholds: &IntensityThresholds,
    reference: NaiveDate,
    days: i64,
    filter: &CategoryFilter,
    json: bool,
) -> Result<()> {
    let buckets = aggregate(
        &snapshot.records,
        ordered,
        Window::trailing(days),
        reference,
        filter,
    );

    if json {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct DailyRowJson<'a> {
            #[serde(flatten)]
            bucket: &'a DayBucket,
            tier: IntensityTier,
        }

        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct DailyReportJson<'a> {
            reference_date: String,
            window_days: i64,
            filter: &'a CategoryFilter,
            buckets: Vec<DailyRowJson<'a>>,
        }

        let output = DailyReportJson {
            reference_date: reference.format("%Y-%m-%d").to_string(),
            window_days: days,
            filter,
            buckets: buckets
                .iter()
                .map(|bucket| DailyRowJson {
                    bucket,
                    tier: thresholds.classify(bucket.total_magnitude),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if buckets.is_empty() {
        println!("No days in window ({} days requested).", days);
        return Ok(());
    }

    use comfy_table::{ContentArrangement, Table};

    let per_category = matches!(filter, CategoryFilter::All);
    let mut header = vec![
        "Date".to_string(),
        "Records".to_string(),
        "Total".to_string(),
        "Tier".to_string(),
    ];
    if per_category {
        header.extend(ordered.iter().map(|c| c.display_name.clone()));
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);

    for bucket in &buckets {
        let mut row = vec![
            bucket.date_key.to_string(),
            bucket.record_count.to_string(),
            format_magnitude(bucket.total_magnitude),
            thresholds.classify(bucket.total_magnitude).as_str().to_string(),
        ];
        if let Some(breakdown) = &bucket.per_category_magnitude {
            row.extend(breakdown.iter().map(|c| format_magnitude(c.magnitude)));
        }
        table.add_row(row);
    }

    println!("{table}");

    let records: u32 = buckets.iter().map(|b| b.record_count).sum();
    let total = buckets.iter().fold(0.0, |acc, b| acc + b.total_magnitude);
    let active = buckets.iter().filter(|b| b.is_active()).count();
    println!(
        "\nRecords: {} | Total: {} | Active days: {}/{}",
        records,
        format_magnitude(total),
        active,
        buckets.len()
    );

    Ok(())
}

fn run_month_report(
    snapshot: &Snapshot,
    ordered: &[ActivityCategory],
    thresholds: &IntensityThresholds,
    theme: &Theme,
    reference: NaiveDate,
    filter: &CategoryFilter,
    json: bool,
) -> Result<()> {
    let calendar = month_calendar(&snapshot.records, ordered, reference, filter, thresholds);

    if json {
        println!("{}", serde_json::to_string_pretty(&calendar)?);
        return Ok(());
    }

    print!("{}", render_month(&calendar, reference, theme));
    Ok(())
}

fn render_month(calendar: &MonthCalendar, reference: NaiveDate, theme: &Theme) -> String {
    let mut out = String::new();
    out.push_str(&format!("  {}\n", reference.format("%B %Y").to_string().bold()));
    out.push_str("  Su Mo Tu We Th Fr Sa\n");

    for week in &calendar.weeks {
        out.push_str(" ");
        for cell in week {
            match cell {
                Some(day) => {
                    let label = format!("{:>2}", day.bucket.date_key.date().day());
                    let Rgb(r, g, b) = theme.tier_color(day.tier);
                    let styled = if day.is_future {
                        label.truecolor(theme.muted.0, theme.muted.1, theme.muted.2)
                    } else {
                        label.on_truecolor(r, g, b)
                    };
                    let styled = if day.is_reference { styled.bold().underline() } else { styled };
                    out.push_str(&format!(" {}", styled));
                }
                None => out.push_str("   "),
            }
        }
        out.push('\n');
    }

    out.push_str("\n  Less ");
    for tier in IntensityTier::all() {
        let Rgb(r, g, b) = theme.tier_color(*tier);
        out.push_str(&format!("{}", "  ".on_truecolor(r, g, b)));
        out.push(' ');
    }
    out.push_str("More\n");

    out.push_str(&format!(
        "\n  Active days: {} | Total: {}\n",
        calendar.active_days,
        format_magnitude(calendar.total_magnitude)
    ));
    out
}

fn run_stats_report(
    snapshot: &Snapshot,
    policy: StreakPolicy,
    reference: NaiveDate,
    json: bool,
) -> Result<()> {
    let stats = dashboard_stats(&snapshot.records, reference, policy);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    use comfy_table::{ContentArrangement, Table};

    let mut summary = Table::new();
    summary.set_content_arrangement(ContentArrangement::Dynamic);
    summary.set_header(vec!["Today", "Total", "Score", "Streak", "Longest streak"]);
    summary.add_row(vec![
        stats.today_count.to_string(),
        stats.total.to_string(),
        stats.score.to_string(),
        stats.streak.to_string(),
        stats.longest_streak.to_string(),
    ]);
    println!("{summary}");

    let mut week = Table::new();
    week.set_content_arrangement(ContentArrangement::Dynamic);
    week.set_header(vec!["Date", "Day", "Records"]);
    for bucket in &stats.last_7_days {
        week.add_row(vec![
            bucket.date_key.to_string(),
            bucket.date_key.date().format("%a").to_string(),
            bucket.record_count.to_string(),
        ]);
    }
    println!("\n{week}");

    Ok(())
}

fn run_streak_report(
    snapshot: &Snapshot,
    policy: StreakPolicy,
    reference: NaiveDate,
    json: bool,
) -> Result<()> {
    let current = compute_streak(&snapshot.records, reference, policy);
    let longest = longest_streak(&snapshot.records);

    if json {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct StreakJson {
            streak: u32,
            longest_streak: u32,
            policy: StreakPolicy,
        }

        let output = StreakJson {
            streak: current,
            longest_streak: longest,
            policy,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let policy_label = match policy {
        StreakPolicy::Capped { cap } => format!("records logged, capped at {}", cap),
        StreakPolicy::Contiguous => "consecutive active days".to_string(),
    };
    println!("Current streak: {} ({})", current, policy_label);
    println!("Longest streak: {} days", longest);
    Ok(())
}

fn run_weight_report(snapshot: &Snapshot, json: bool) -> Result<()> {
    let trend = weight_trend(&snapshot.weights);
    let series = weight_series(&snapshot.weights);

    if json {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct WeightJson<'a> {
            #[serde(flatten)]
            trend: &'a fitlog_core::summary::WeightTrend,
            series: &'a [fitlog_core::summary::WeightPoint],
        }

        let output = WeightJson {
            trend: &trend,
            series: &series,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if series.is_empty() {
        println!("No weight entries found.");
        return Ok(());
    }

    let direction = match trend.trend {
        Trend::Down => "down".green(),
        Trend::Up => "up".red(),
        Trend::Stable => "stable".normal(),
    };
    println!(
        "Current: {:.1} kg | Start: {:.1} kg | Change: {:+.1} kg ({})",
        trend.current, trend.start, trend.change, direction
    );

    use comfy_table::{ContentArrangement, Table};

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Date", "Weight"]);
    for point in series.iter().rev() {
        table.add_row(vec![point.date_key.to_string(), format!("{:.1}", point.weight)]);
    }
    println!("\n{table}");
    Ok(())
}

fn run_categories_report(
    ordered: &[ActivityCategory],
    priorities: &[String],
    json: bool,
) -> Result<()> {
    let palette = PaletteConfig::load();

    if json {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct CategoryJson<'a> {
            id: &'a str,
            display_name: &'a str,
            unit: &'a str,
            color: String,
            priority_rank: Option<usize>,
        }

        let output: Vec<CategoryJson> = ordered
            .iter()
            .enumerate()
            .map(|(i, c)| CategoryJson {
                id: &c.id,
                display_name: &c.display_name,
                unit: &c.unit,
                color: palette.category_color(&c.display_name, i).to_string(),
                priority_rank: priority_rank(&c.display_name, priorities),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if ordered.is_empty() {
        println!("No categories found.");
        return Ok(());
    }

    use comfy_table::{ContentArrangement, Table};

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Name", "Unit", "Color"]);
    for (i, category) in ordered.iter().enumerate() {
        let color = palette.category_color(&category.display_name, i);
        table.add_row(vec![
            (i + 1).to_string(),
            category.display_name.clone(),
            category.unit.clone(),
            color.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn run_recent_report(
    snapshot: &Snapshot,
    limit: usize,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let resolved = snapshot.resolve();
    let mut entries: Vec<RecordEntry> = match search {
        Some(needle) => search_records(&resolved, needle),
        None => recent_records(&resolved, limit),
    };
    entries.truncate(limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No records found.");
        return Ok(());
    }

    use comfy_table::{ContentArrangement, Table};

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Date", "Activity", "Value", "Unit", "Note"]);
    for entry in &entries {
        table.add_row(vec![
            entry.date_key.to_string(),
            entry.category.display_name.clone(),
            format_magnitude(entry.record.magnitude),
            entry.category.unit.clone(),
            entry.record.note.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn run_config_command(settings: &Settings, init: bool, json: bool) -> Result<()> {
    if init {
        let path = settings.save()?;
        println!("Settings written to {}", path.display());
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(settings)?);
        return Ok(());
    }

    let path = Settings::config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "(unavailable)".to_string());
    println!("Settings file: {}", path);
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

fn format_magnitude(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        let s = format!("{:.2}", n);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
