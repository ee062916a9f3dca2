//! Record commands: add, run, delete, deleteuser, list

use anyhow::Result;
use body_model::{format_date, Metric, RunRecord, Sample};
use body_store::{Entry, EntryKind, RecordStore, UpsertOutcome};
use chrono::NaiveDate;
use colored::*;
use errors::BodyLoggerError;
use tracing::info;

use crate::context::AppContext;
use crate::prompt::{date_or_prompt, measurement_or_prompt};

/// `[TAG] - detail`, with the tag colored
pub fn status_line(tag: &str, ok: bool, detail: &str) -> String {
    let tag = if ok {
        tag.green().bold()
    } else {
        tag.red().bold()
    };
    format!("[{}] - {}", tag, detail)
}

fn outcome_line(outcome: UpsertOutcome, detail: &str) -> String {
    status_line(outcome.as_str(), true, detail)
}

/// Format a stored value for listing
fn format_value(value: f64) -> String {
    // Keep what the user typed, without trailing zeros beyond one decimal
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// One line of `list` output
pub fn format_entry(entry: &Entry) -> String {
    match entry {
        Entry::Weight(sample) => {
            format!("{}: {}", format_date(sample.date), format_value(sample.value))
        },
        Entry::Run(run) => {
            let mut line = format!(
                "{}: {} {} in {} {}",
                format_date(run.date),
                format_value(run.distance),
                Metric::RunDistance.unit(),
                format_value(run.duration),
                Metric::RunDuration.unit(),
            );
            if let Some(pace) = run.pace() {
                line.push_str(&format!(
                    " ({:.2} {}/{})",
                    pace,
                    Metric::RunDuration.unit(),
                    Metric::RunDistance.unit()
                ));
            }
            line
        },
    }
}

/// Add or update a weight
pub async fn add_command(
    ctx: &AppContext,
    user: &str,
    date: Option<NaiveDate>,
    weight: Option<f64>,
) -> Result<()> {
    let date = date.unwrap_or(ctx.today);
    let weight = measurement_or_prompt(weight, "weight", "Weight")?;

    let store = ctx.users.open_or_create(user).await?;
    let outcome = store.upsert(Entry::Weight(Sample::new(date, weight))).await?;
    store.close().await;

    info!("{} weight for {} on {}", outcome.as_str(), user, date);
    println!(
        "{}",
        outcome_line(
            outcome,
            &format!(
                "user: {}, date: {}, weight: {}",
                user,
                format_date(date),
                weight
            )
        )
    );
    Ok(())
}

/// Add or update a run
pub async fn run_command(
    ctx: &AppContext,
    user: &str,
    date: Option<NaiveDate>,
    distance: Option<f64>,
    duration: Option<f64>,
) -> Result<()> {
    let date = date.unwrap_or(ctx.today);
    let distance = measurement_or_prompt(distance, "distance", "Distance")?;
    let duration = measurement_or_prompt(duration, "duration", "Duration (minutes)")?;

    let store = ctx.users.open_or_create(user).await?;
    let outcome = store
        .upsert(Entry::Run(RunRecord::new(date, distance, duration)))
        .await?;
    store.close().await;

    info!("{} run for {} on {}", outcome.as_str(), user, date);
    println!(
        "{}",
        outcome_line(
            outcome,
            &format!(
                "user: {}, date: {}, distance: {}, duration: {}",
                user,
                format_date(date),
                distance,
                duration
            )
        )
    );
    Ok(())
}

/// Delete the record for one date
pub async fn delete_command(
    ctx: &AppContext,
    user: &str,
    date: Option<NaiveDate>,
    runs: bool,
) -> Result<()> {
    let store = ctx.users.open_existing(user).await?;
    let date = date_or_prompt(date, "What day would you like to delete (YYYY-mm-dd)")?;
    let kind = if runs { EntryKind::Run } else { EntryKind::Weight };

    let deleted = store.delete(kind, date).await?;
    store.close().await;

    if !deleted {
        return Err(BodyLoggerError::record_not_found(format_date(date)).into());
    }

    println!(
        "{}",
        status_line(
            "DELETED",
            true,
            &format!("user: {}, date: {}", user, format_date(date))
        )
    );
    Ok(())
}

/// Delete a user's whole database
pub fn delete_user_command(ctx: &AppContext, user: &str) -> Result<()> {
    ctx.users.remove_user(user)?;
    println!(
        "{}",
        status_line("DELETED USER", true, &format!("user: {}", user))
    );
    Ok(())
}

/// Print the latest records, newest first
pub async fn list_command(ctx: &AppContext, user: &str, count: usize, runs: bool) -> Result<()> {
    let store = ctx.users.open_readonly(user).await?;
    let kind = if runs { EntryKind::Run } else { EntryKind::Weight };
    let entries = store.latest(kind, count).await?;
    store.close().await;

    let what = if runs { "RUNS" } else { "RECORDS" };
    println!(
        "[{}]",
        format!("DISPLAYING LAST {} {}", count, what).green()
    );
    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    if entries.is_empty() {
        println!("{}", "** NO RECORDS **".yellow());
    }
    Ok(())
}
