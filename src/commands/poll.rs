use tabled::Tabled;
use tracing::debug;

use crate::cli::PollArgs;
use crate::client::LinearClient;
use crate::config::Config;
use crate::cursor::{CursorStore, FileCursorStore, InMemoryCursorStore};
use crate::error::{LinearError, Result};
use crate::fetcher::{PollContext, PollMode};
use crate::output::{self, format_date, priority_colored, status_colored, truncate};
use crate::trigger::{self, IssueRecord, OrderField};

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Issue")]
    identifier: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "At")]
    at: String,
}

impl RecordRow {
    fn from_record(record: &IssueRecord, order_by: OrderField) -> Self {
        let fields = &record.fields;

        Self {
            identifier: fields.identifier.clone(),
            title: truncate(&fields.title, 50),
            status: status_colored(&fields.state.name, &fields.state.state_type),
            priority: priority_colored(&fields.priority_key()),
            assignee: fields
                .assignee
                .as_ref()
                .map(|u| u.name.clone())
                .unwrap_or_default(),
            at: format_date(order_by.value_of(fields)),
        }
    }
}

pub async fn run(client: &LinearClient, config: &Config, args: PollArgs) -> Result<()> {
    let definition =
        trigger::find(&args.key).ok_or_else(|| LinearError::UnknownTrigger(args.key.clone()))?;
    let input = args.to_input(config.resolve_team(args.team.as_deref()));

    let mut scratch = InMemoryCursorStore::new();
    let mut file_store;
    let store: &mut dyn CursorStore = if args.dry_run {
        &mut scratch
    } else {
        file_store = FileCursorStore::open(config.cursor_path()?)?;
        debug!(path = %file_store.path().display(), "using cursor file");
        &mut file_store
    };

    // Each poll starts at the head of the ordering. The stored cursor is only
    // read when asked for the next page of the same sequence.
    let mode = if args.next_page {
        PollMode::Subsequent
    } else {
        PollMode::Initial
    };
    debug!(
        trigger = definition.key,
        ?mode,
        dry_run = args.dry_run,
        "starting poll"
    );

    let records = definition
        .poll(PollContext {
            client,
            store,
            input: &input,
            mode,
        })
        .await?;

    if records.is_empty() {
        output::print_message("No matching issues");
        return Ok(());
    }

    let order_by = definition.order_by;
    output::print_table(&records, |r| RecordRow::from_record(r, order_by));

    Ok(())
}
