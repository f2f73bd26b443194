pub mod commands;
pub mod repl;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use clap::{Parser, Subcommand};
use crate::models::TrackerSettings;
use crate::storage::{FileStore, KeyValueStore, StorageError};
use crate::tracker::Tracker;
use crate::utils::settings_persistence::{auto_save_settings, get_settings_file_path, load_settings};

pub use repl::readline;

/// Process arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Track PvP fight data and keep a history of past fights")]
pub struct Args {
    /// Settings file (created with defaults when missing)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Overrides the configured storage directory
    #[arg(short, long)]
    pub storage_dir: Option<PathBuf>,
}

/// One line typed at the prompt.
#[derive(Debug, Parser)]
#[command(no_binary_name = true)]
struct Line {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit fight data read from a file
    Submit { path: PathBuf },
    /// Submit fight data given inline (quote it)
    Paste { json: String },
    /// List the fight history, newest first
    List,
    /// Display a fight from the history
    Show { id: u64 },
    /// Show the currently displayed fight
    Current,
    /// Delete a fight from the history
    Delete { id: u64 },
    /// Clear the current display
    Clear,
    /// Delete the whole fight history
    ClearHistory,
    /// Erase every stored value, history and draft included
    ClearAll,
    /// Manage the saved draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
    /// Show the active settings
    Settings,
    Exit,
}

#[derive(Debug, Subcommand)]
enum DraftAction {
    /// Save the contents of a file as the draft
    Save { path: PathBuf },
    Show,
    /// Submit the saved draft
    Submit,
    Discard,
}

pub struct CliContext<S: KeyValueStore> {
    pub tracker: Tracker<S>,
    pub settings: TrackerSettings,
    pub settings_path: PathBuf,
}

impl CliContext<FileStore> {
    pub fn from_args(args: &Args) -> Result<Self, StorageError> {
        let settings_path = args.config.clone().unwrap_or_else(get_settings_file_path);
        let mut settings = load_settings(&settings_path);
        if !settings_path.exists() {
            auto_save_settings(&settings_path, &settings);
        }
        if let Some(dir) = &args.storage_dir {
            settings.storage_dir = dir.clone();
        }

        let storage = FileStore::open(&settings.storage_dir)?;
        Ok(Self::new(Tracker::new(storage), settings, settings_path))
    }
}

impl<S: KeyValueStore> CliContext<S> {
    pub fn new(tracker: Tracker<S>, settings: TrackerSettings, settings_path: PathBuf) -> Self {
        Self {
            tracker,
            settings,
            settings_path,
        }
    }
}

/// Runs the prompt until `exit` or end of input.
pub fn run<S: KeyValueStore>(
    ctx: &mut CliContext<S>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "PvP fight tracker: {} fights in history. Type 'help' for commands.", ctx.tracker.history().len())?;
    if ctx.settings.restore_draft && ctx.tracker.draft().is_some() {
        writeln!(out, "A draft from the last session is saved ('draft show', 'draft submit').")?;
    }

    while let Some(line) = readline(input, out)? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match respond(line, ctx, out) {
            Ok(true) => break,
            Ok(false) => {}
            Err(message) => writeln!(out, "{message}")?,
        }
    }
    Ok(())
}

/// Handles one prompt line. `Ok(true)` asks to quit; `Err` carries text to
/// show the user.
fn respond<S: KeyValueStore>(
    line: &str,
    ctx: &mut CliContext<S>,
    out: &mut impl Write,
) -> Result<bool, String> {
    let args = shlex::split(line).ok_or("error: Invalid quoting")?;
    let parsed = Line::try_parse_from(args).map_err(|e| e.to_string())?;

    let result = match parsed.command {
        Some(Command::Submit { path }) => commands::submit_file(ctx, &path, out),
        Some(Command::Paste { json }) => commands::submit_text(ctx, &json, out),
        Some(Command::List) => commands::list_history(ctx, out),
        Some(Command::Show { id }) => commands::show_entry(ctx, id, out),
        Some(Command::Current) => commands::show_current(ctx, out),
        Some(Command::Delete { id }) => commands::delete_entry(ctx, id, out),
        Some(Command::Clear) => commands::clear_display(ctx, out),
        Some(Command::ClearHistory) => commands::clear_history(ctx, out),
        Some(Command::ClearAll) => commands::clear_all(ctx, out),
        Some(Command::Draft { action }) => match action {
            DraftAction::Save { path } => commands::save_draft_file(ctx, &path, out),
            DraftAction::Show => commands::show_draft(ctx, out),
            DraftAction::Submit => commands::submit_draft(ctx, out),
            DraftAction::Discard => commands::discard_draft(ctx, out),
        },
        Some(Command::Settings) => commands::show_settings(ctx, out),
        Some(Command::Exit) => return Ok(true),
        None => Ok(()),
    };
    result.map(|()| false).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::tracker::DUPLICATE_MESSAGE;

    const FIGHT: &str = r#"{"competitor":{"name":"A","dead":false,"damageDealt":100,"attackCount":5},"opponent":{"name":"B","dead":true,"damageDealt":50,"attackCount":3}}"#;

    fn context() -> CliContext<MemoryStore> {
        CliContext::new(
            Tracker::new(MemoryStore::new()),
            TrackerSettings::default(),
            PathBuf::from("settings.json"),
        )
    }

    fn session(ctx: &mut CliContext<MemoryStore>, script: &str) -> String {
        let mut input = script.as_bytes();
        let mut out = Vec::new();
        run(ctx, &mut input, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn paste_twice_then_list() {
        let mut ctx = context();
        let script = format!("paste '{FIGHT}'\npaste '{FIGHT}'\nlist\n");
        let output = session(&mut ctx, &script);

        assert!(output.contains("Added fight #"));
        assert!(output.contains("Winner: A"));
        assert!(output.contains(DUPLICATE_MESSAGE));
        assert!(output.contains("Fight History (1)"));
        assert!(output.contains("A vs B"));
        assert!(output.contains("damage 100 - 50  attacks 5 - 3"));
        assert_eq!(ctx.tracker.history().len(), 1);
    }

    #[test]
    fn invalid_paste_is_reported_and_kept_as_draft() {
        let mut ctx = context();
        let output = session(&mut ctx, "paste '{\"competitor\": 1, \"opponent\": {}}'\n");

        assert!(output.contains("Error: Invalid competitor data: expected an object"));
        assert!(ctx.tracker.history().is_empty());
        assert_eq!(ctx.tracker.draft().as_deref(), Some("{\"competitor\": 1, \"opponent\": {}}"));
    }

    #[test]
    fn delete_displayed_fight_clears_display() {
        let mut ctx = context();
        session(&mut ctx, &format!("paste '{FIGHT}'\n"));
        let id = ctx.tracker.history()[0].id;

        let output = session(&mut ctx, &format!("delete {id}\ncurrent\n"));
        assert!(output.contains(&format!("Deleted fight #{id}.")));
        assert!(output.contains("Display cleared."));
        assert!(output.contains("Nothing is displayed."));
    }

    #[test]
    fn unknown_commands_and_bad_quoting_do_not_stop_the_prompt() {
        let mut ctx = context();
        let output = session(&mut ctx, "bogus\npaste '{\nlist\n");

        assert!(output.contains("error: Invalid quoting"));
        assert!(output.contains("No fights saved yet."));
    }

    #[test]
    fn exit_stops_reading() {
        let mut ctx = context();
        let output = session(&mut ctx, &format!("exit\npaste '{FIGHT}'\n"));

        assert!(!output.contains("Added fight"));
        assert!(ctx.tracker.history().is_empty());
    }

    #[test]
    fn saved_draft_can_be_submitted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fight.json");
        std::fs::write(&path, FIGHT).unwrap();

        let mut ctx = context();
        let output = session(&mut ctx, &format!("draft save {}\ndraft submit\ndraft show\n", path.display()));

        assert!(output.contains("Draft saved."));
        assert!(output.contains("Added fight #"));
        assert!(output.contains("No draft saved."));
        assert_eq!(ctx.tracker.history().len(), 1);
    }
}
