use std::fs;
use std::io::{self, Write};
use std::path::Path;
use crate::cli::CliContext;
use crate::models::{CombatantStats, HistoryEntry};
use crate::storage::KeyValueStore;
use crate::tracker::Submission;
use crate::utils::time::format_timestamp;

pub fn submit_file<S: KeyValueStore>(
    ctx: &mut CliContext<S>,
    path: &Path,
    out: &mut impl Write,
) -> io::Result<()> {
    match fs::read_to_string(path) {
        Ok(raw) => submit_text(ctx, &raw, out),
        Err(e) => writeln!(out, "Error: could not read {}: {e}", path.display()),
    }
}

pub fn submit_text<S: KeyValueStore>(
    ctx: &mut CliContext<S>,
    raw: &str,
    out: &mut impl Write,
) -> io::Result<()> {
    match ctx.tracker.submit(raw) {
        Ok(Submission::Accepted { entry, winner }) => {
            writeln!(out, "Added fight #{} to history.", entry.id)?;
            write_fight(out, &entry, winner.as_deref(), &ctx.settings.timestamp_format)
        }
        Ok(Submission::Rejected(rejection)) => writeln!(out, "{}", rejection.message()),
        Err(e) => {
            // Keep what was typed so it can be fixed and resubmitted.
            ctx.tracker.save_draft(raw);
            writeln!(out, "Error: {e}")
        }
    }
}

pub fn list_history<S: KeyValueStore>(ctx: &CliContext<S>, out: &mut impl Write) -> io::Result<()> {
    let history = ctx.tracker.history();
    if history.is_empty() {
        return writeln!(out, "No fights saved yet. Submit your first fight data to get started!");
    }

    writeln!(out, "Fight History ({})", history.len())?;
    let current = ctx.tracker.current().map(|entry| entry.id);
    for entry in history {
        let marker = if current == Some(entry.id) { '*' } else { ' ' };
        let winner = entry
            .winner()
            .map(|name| format!("  winner: {name}"))
            .unwrap_or_default();
        writeln!(
            out,
            "{marker} [{}] {} vs {}  {}{}  damage {} - {}  attacks {} - {}",
            entry.id,
            entry.competitor_name,
            entry.opponent_name,
            format_timestamp(entry.timestamp, &ctx.settings.timestamp_format),
            winner,
            entry.data.competitor.damage_dealt,
            entry.data.opponent.damage_dealt,
            entry.data.competitor.attack_count,
            entry.data.opponent.attack_count,
        )?;
    }
    Ok(())
}

pub fn show_entry<S: KeyValueStore>(
    ctx: &mut CliContext<S>,
    id: u64,
    out: &mut impl Write,
) -> io::Result<()> {
    let format = ctx.settings.timestamp_format.clone();
    match ctx.tracker.select(id) {
        Some(entry) => write_fight(out, entry, entry.winner(), &format),
        None => writeln!(out, "No fight with id {id}."),
    }
}

pub fn show_current<S: KeyValueStore>(ctx: &CliContext<S>, out: &mut impl Write) -> io::Result<()> {
    match ctx.tracker.current() {
        Some(entry) => write_fight(out, entry, entry.winner(), &ctx.settings.timestamp_format),
        None => writeln!(out, "Nothing is displayed."),
    }
}

pub fn delete_entry<S: KeyValueStore>(
    ctx: &mut CliContext<S>,
    id: u64,
    out: &mut impl Write,
) -> io::Result<()> {
    let deletion = ctx.tracker.delete_entry(id);
    if !deletion.removed {
        return writeln!(out, "No fight with id {id}.");
    }
    writeln!(out, "Deleted fight #{id}.")?;
    if deletion.display_cleared {
        writeln!(out, "Display cleared.")?;
    }
    Ok(())
}

pub fn clear_display<S: KeyValueStore>(ctx: &mut CliContext<S>, out: &mut impl Write) -> io::Result<()> {
    ctx.tracker.clear_display();
    writeln!(out, "Display cleared.")
}

pub fn clear_history<S: KeyValueStore>(ctx: &mut CliContext<S>, out: &mut impl Write) -> io::Result<()> {
    ctx.tracker.clear_history();
    writeln!(out, "Fight history cleared.")
}

pub fn clear_all<S: KeyValueStore>(ctx: &mut CliContext<S>, out: &mut impl Write) -> io::Result<()> {
    ctx.tracker.clear_all_storage();
    writeln!(out, "All stored data cleared.")
}

pub fn save_draft_file<S: KeyValueStore>(
    ctx: &mut CliContext<S>,
    path: &Path,
    out: &mut impl Write,
) -> io::Result<()> {
    match fs::read_to_string(path) {
        Ok(text) => {
            ctx.tracker.save_draft(&text);
            writeln!(out, "Draft saved.")
        }
        Err(e) => writeln!(out, "Error: could not read {}: {e}", path.display()),
    }
}

pub fn show_draft<S: KeyValueStore>(ctx: &CliContext<S>, out: &mut impl Write) -> io::Result<()> {
    match ctx.tracker.draft() {
        Some(draft) => writeln!(out, "{}", draft.trim_end()),
        None => writeln!(out, "No draft saved."),
    }
}

pub fn submit_draft<S: KeyValueStore>(ctx: &mut CliContext<S>, out: &mut impl Write) -> io::Result<()> {
    match ctx.tracker.draft() {
        Some(draft) => submit_text(ctx, &draft, out),
        None => writeln!(out, "No draft saved."),
    }
}

pub fn discard_draft<S: KeyValueStore>(ctx: &mut CliContext<S>, out: &mut impl Write) -> io::Result<()> {
    ctx.tracker.discard_draft();
    writeln!(out, "Draft discarded.")
}

pub fn show_settings<S: KeyValueStore>(ctx: &CliContext<S>, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "settings file:    {}", ctx.settings_path.display())?;
    writeln!(out, "storage dir:      {}", ctx.settings.storage_dir.display())?;
    writeln!(out, "restore draft:    {}", ctx.settings.restore_draft)?;
    writeln!(out, "timestamp format: {}", ctx.settings.timestamp_format)
}

fn write_fight(
    out: &mut impl Write,
    entry: &HistoryEntry,
    winner: Option<&str>,
    timestamp_format: &str,
) -> io::Result<()> {
    writeln!(
        out,
        "#{}  {} vs {}  ({})",
        entry.id,
        entry.competitor_name,
        entry.opponent_name,
        format_timestamp(entry.timestamp, timestamp_format)
    )?;
    match winner {
        Some(name) => writeln!(out, "Winner: {name}")?,
        None => writeln!(out, "No winner")?,
    }
    write_combatant(out, &entry.data.competitor)?;
    write_combatant(out, &entry.data.opponent)
}

fn write_combatant(out: &mut impl Write, stats: &CombatantStats) -> io::Result<()> {
    let status = if stats.dead { "dead" } else { "alive" };
    write!(
        out,
        "  {} ({status}): {} damage, {} attacks",
        stats.name, stats.damage_dealt, stats.attack_count
    )?;
    if let Some(average) = stats.average_hit {
        write!(out, ", avg hit {average:.1}")?;
    }
    if let Some(rate) = stats.off_pray_rate {
        write!(out, ", off-pray {rate:.1}%")?;
    }
    if let Some(accuracy) = stats.accuracy {
        write!(out, ", accuracy {accuracy:.1}%")?;
    }
    if let Some(delta) = stats.deserved_delta {
        write!(out, ", vs deserved {delta:+.1}")?;
    }
    if let Some(luck) = stats.magic_luck {
        write!(out, ", magic luck {luck:.1}%")?;
    }
    writeln!(out)
}
