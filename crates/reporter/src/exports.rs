use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use reporter_export::{Answer, Export, ExportStats, ReporterApp, Snapshot};

#[derive(Subcommand, Debug)]
pub enum ExportsAction {
    /// List all exports, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the snapshots of one export
    Show {
        /// Export date (YYYY-MM-DD); launches interactive picker if omitted
        date: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the question definitions of one export
    Questions {
        /// Export date (YYYY-MM-DD); defaults to the latest export
        date: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show aggregate statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// One row of `reporter list --json`.
#[derive(Debug, Serialize)]
struct ExportSummary {
    date: NaiveDate,
    snapshots: usize,
    responses: usize,
    questions: usize,
}

impl From<&Export> for ExportSummary {
    fn from(export: &Export) -> Self {
        Self {
            date: export.date(),
            snapshots: export.snapshots().len(),
            responses: export.responses().count(),
            questions: export.questions().len(),
        }
    }
}

/// A question with its fingerprint, for `reporter questions --json`.
#[derive(Debug, Serialize)]
struct QuestionRow<'a> {
    md5: Option<String>,
    prompt: Option<&'a str>,
    placeholder: Option<&'a str>,
    multiple: Option<bool>,
}

pub fn handle_exports_command(mut app: ReporterApp, action: ExportsAction) -> Result<()> {
    match action {
        ExportsAction::List { json } => {
            app.load_all()
                .with_context(|| format!("Failed to load exports from {:?}", app.directory()))?;
            let summaries: Vec<ExportSummary> = app.exports().map(ExportSummary::from).collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else if summaries.is_empty() {
                println!("{}", "No exports found.".dimmed());
            } else {
                print_exports_table(&summaries);
            }
        }
        ExportsAction::Show { date, json } => {
            let date = resolve_date(&mut app, date)?;
            let export = app.get(date)?;

            if json {
                println!("{}", serde_json::to_string_pretty(export)?);
            } else {
                print_export_detail(export);
            }
        }
        ExportsAction::Questions { date, json } => {
            let export = match date {
                Some(date) => app.get(parse_date(&date)?)?,
                None => {
                    app.load_all()?;
                    app.latest().context("No exports found.")?
                }
            };

            let rows: Vec<QuestionRow> = export
                .questions()
                .iter()
                .map(|q| QuestionRow {
                    md5: q.md5().ok(),
                    prompt: q.prompt(),
                    placeholder: q.placeholder_string(),
                    multiple: q.allow_multiple_selection(),
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_questions(export, &rows);
            }
        }
        ExportsAction::Stats { json } => {
            app.load_all()?;
            let stats = app.stats();

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats);
            }
        }
    }

    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("Invalid date '{}' (expected YYYY-MM-DD): {}", s, e))
}

fn resolve_date(app: &mut ReporterApp, date: Option<String>) -> Result<NaiveDate> {
    if let Some(date) = date {
        return parse_date(&date);
    }

    // Interactive picker
    app.load_all()?;
    if app.is_empty() {
        anyhow::bail!("No exports found in {:?}.", app.directory());
    }

    let dates = app.dates();
    let items: Vec<String> = app
        .exports()
        .map(|e| {
            format!(
                "{} | {} snapshots, {} responses",
                e.date(),
                e.snapshots().len(),
                e.responses().count()
            )
        })
        .collect();

    let selection = dialoguer::FuzzySelect::new()
        .with_prompt("Select an export")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(dates[selection])
}

fn print_exports_table(summaries: &[ExportSummary]) {
    println!(
        "{:<12} {:<10} {:<10} {}",
        "DATE".dimmed(),
        "SNAPSHOTS".dimmed(),
        "RESPONSES".dimmed(),
        "QUESTIONS".dimmed(),
    );

    for s in summaries {
        println!(
            "{:<12} {:<10} {:<10} {}",
            s.date.format("%Y-%m-%d"),
            s.snapshots,
            s.responses,
            s.questions
        );
    }
}

fn print_export_detail(export: &Export) {
    println!("{}", "=== Export Detail ===".bright_blue().bold());
    println!("{}  {}", "Date:".dimmed(), export.date().format("%Y-%m-%d"));
    println!("{}  {}", "Snapshots:".dimmed(), export.snapshots().len());
    println!("{}  {}", "Questions:".dimmed(), export.questions().len());

    for (i, snapshot) in export.snapshots().iter().enumerate() {
        println!();
        println!(
            "  {} {}",
            format!("[{}]", i + 1).bright_blue(),
            snapshot
                .date()
                .map(display_value)
                .unwrap_or_else(|| "unknown time".to_string())
        );
        print_snapshot(snapshot);
    }
}

fn print_snapshot(snapshot: &Snapshot) {
    if let Ok(text) = snapshot.report_impetus_text() {
        println!("    {} {}", "Impetus:".dimmed(), text);
    }
    if let Some(battery) = snapshot.battery() {
        println!("    {} {:.0}%", "Battery:".dimmed(), battery);
    }
    if let Ok(text) = snapshot.connection_text() {
        println!("    {} {}", "Connection:".dimmed(), text);
    }
    if let Some(steps) = snapshot.steps() {
        println!("    {} {}", "Steps:".dimmed(), display_value(steps));
    }
    if let Some(location) = snapshot.location() {
        let place = location
            .placemark()
            .and_then(|p| p.name().or(p.locality()))
            .map(str::to_string);
        let coords = match (location.latitude(), location.longitude()) {
            (Some(lat), Some(lon)) => Some(format!("{:.4}, {:.4}", lat, lon)),
            _ => None,
        };
        let text = [place, coords].into_iter().flatten().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            println!("    {} {}", "Location:".dimmed(), text);
        }
    }
    if let Some(weather) = snapshot.weather() {
        match (weather.summary(), weather.temp_c()) {
            (Some(summary), Some(temp)) => {
                println!("    {} {}, {:.1}°C", "Weather:".dimmed(), summary, temp)
            }
            (Some(summary), None) => println!("    {} {}", "Weather:".dimmed(), summary),
            (None, Some(temp)) => println!("    {} {:.1}°C", "Weather:".dimmed(), temp),
            (None, None) => {}
        }
    }
    if let Some(audio) = snapshot.audio() {
        if let (Some(avg), Some(peak)) = (audio.avg(), audio.peak()) {
            println!("    {} avg {:.1} dB, peak {:.1} dB", "Audio:".dimmed(), avg, peak);
        }
    }

    for response in snapshot.responses() {
        let question = response.question().unwrap_or("(no prompt)");
        let answer = match response.answer() {
            Answer::None => "-".dimmed().to_string(),
            other => other.value().map(display_value).unwrap_or_default(),
        };
        println!(
            "    {} {} {}",
            format!("{:>8}", response.kind()).bright_cyan(),
            question,
            answer.bright_green()
        );
    }
}

fn print_questions(export: &Export, rows: &[QuestionRow]) {
    println!(
        "{}",
        format!("=== Questions ({}) ===", export.date().format("%Y-%m-%d"))
            .bright_blue()
            .bold()
    );

    for row in rows {
        let md5 = row.md5.as_deref().unwrap_or("-");
        let prompt = row.prompt.unwrap_or("(no prompt)");
        let multiple = if row.multiple == Some(true) {
            " (multiple)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("{}  {}{}", md5.dimmed(), prompt, multiple);
    }
}

fn print_stats(stats: &ExportStats) {
    println!("{}", "=== Export Statistics ===".bright_blue().bold());
    println!("{}  {}", "Exports:".dimmed(), stats.total_exports);
    if let (Some(first), Some(last)) = (stats.first_date, stats.last_date) {
        println!("{}  {} to {}", "Range:".dimmed(), first, last);
    }
    println!("{}  {}", "Snapshots:".dimmed(), stats.total_snapshots);
    println!("{}  {}", "Responses:".dimmed(), stats.total_responses);
    println!("{}  {}", "Questions:".dimmed(), stats.distinct_questions);
    if let Some(battery) = stats.avg_battery {
        println!("{}  {:.0}%", "Avg Battery:".dimmed(), battery);
    }

    if !stats.responses_by_kind.is_empty() {
        println!();
        println!("{}", "--- Responses by kind ---".dimmed());
        for (kind, count) in &stats.responses_by_kind {
            println!("  {:<10} {}", kind, count);
        }
    }
}

/// Render a JSON value for a terminal line: bare strings, joined lists,
/// and the `text` field of token and venue objects.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(", "),
        Value::Object(map) => match map.get("text") {
            Some(text) => display_value(text),
            None => value.to_string(),
        },
        other => other.to_string(),
    }
}
