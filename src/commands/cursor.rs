use serde::Serialize;

use crate::cli::CursorArgs;
use crate::config::Config;
use crate::cursor::{CursorStore, FileCursorStore};
use crate::error::{LinearError, Result};
use crate::fetcher::cursor_key;
use crate::output::{self, format_timestamp};
use crate::trigger;

#[derive(Serialize)]
struct CursorView {
    key: String,
    cursor: Option<String>,
    timestamp: Option<u64>,
}

fn key_for(config: &Config, args: &CursorArgs) -> Result<String> {
    let definition = trigger::find(&args.trigger)
        .ok_or_else(|| LinearError::UnknownTrigger(args.trigger.clone()))?;
    let team = config
        .resolve_team(args.team.as_deref())
        .ok_or(LinearError::NoTeam)?;
    Ok(cursor_key(&team, definition.order_by))
}

pub fn show(config: &Config, args: CursorArgs) -> Result<()> {
    let key = key_for(config, &args)?;
    let store = FileCursorStore::open(config.cursor_path()?)?;
    let entry = store.entry(&key);

    let view = CursorView {
        cursor: entry.map(|e| e.value.clone()),
        timestamp: entry.map(|e| e.timestamp),
        key,
    };

    output::print_item(&view, |view| match (&view.cursor, view.timestamp) {
        (Some(cursor), Some(ts)) => {
            println!("{}: {} (saved {})", view.key, cursor, format_timestamp(ts));
        }
        _ => println!("{}: no cursor stored", view.key),
    });

    Ok(())
}

pub fn reset(config: &Config, args: CursorArgs) -> Result<()> {
    let key = key_for(config, &args)?;
    let mut store = FileCursorStore::open(config.cursor_path()?)?;
    store.delete(&key)?;

    output::print_message(&format!("Cleared cursor {key}"));
    Ok(())
}
