use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::trigger::{DynamicSource, TriggerInput};
use crate::types::Priority;

#[derive(Parser)]
#[command(name = "linear-triggers")]
#[command(about = "Polling triggers for new and updated Linear issues", version)]
#[command(after_help = "EXAMPLES:
    linear-triggers triggers                          List available triggers
    linear-triggers trigger new_issue                 Show input fields and sample payload
    linear-triggers poll new_issue --team <TEAM_ID>   Poll for new issues
    linear-triggers options teams                     List teams to pick from")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging and show error causes
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available triggers
    #[command(after_help = "EXAMPLES:
    linear-triggers triggers
    linear-triggers triggers --json")]
    Triggers,
    /// Show a trigger's input fields and sample payload
    #[command(after_help = "EXAMPLES:
    linear-triggers trigger new_issue
    linear-triggers trigger updated_issue --json")]
    Trigger {
        /// Trigger key (new_issue or updated_issue)
        key: String,
    },
    /// Run one poll of a trigger
    #[command(after_help = "EXAMPLES:
    linear-triggers poll new_issue --team <TEAM_ID>
    linear-triggers poll updated_issue --team <TEAM_ID> --priority high
    linear-triggers poll new_issue --team <TEAM_ID> --label <LABEL_ID>
    linear-triggers poll new_issue --team <TEAM_ID> --next-page")]
    Poll(PollArgs),
    /// List options for a dropdown input field
    #[command(after_help = "EXAMPLES:
    linear-triggers options teams
    linear-triggers options statuses --team <TEAM_ID>")]
    Options {
        /// Which lookup to run
        source: OptionSource,

        /// Team ID for team-scoped lookups (uses default if not specified)
        #[arg(long)]
        team: Option<String>,
    },
    /// Inspect or clear stored cursors
    Cursor {
        #[command(subcommand)]
        action: CursorCommands,
    },
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    linear-triggers completions bash > ~/.bash_completion.d/linear-triggers
    linear-triggers completions zsh > ~/.zfunc/_linear-triggers")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Initialize configuration file interactively
    Init,
}

#[derive(Subcommand)]
pub enum CursorCommands {
    /// Show the stored cursor for a trigger
    Show(CursorArgs),
    /// Forget the stored cursor so `--next-page` has nothing to continue from
    Reset(CursorArgs),
}

#[derive(Args)]
pub struct CursorArgs {
    /// Trigger key (new_issue or updated_issue)
    #[arg(long)]
    pub trigger: String,

    /// Team ID (uses default if not specified)
    #[arg(long)]
    pub team: Option<String>,
}

#[derive(Args)]
pub struct PollArgs {
    /// Trigger key (new_issue or updated_issue)
    pub key: String,

    /// Team ID (uses default if not specified)
    #[arg(long)]
    pub team: Option<String>,

    /// Only issues in this workflow state ID
    #[arg(long)]
    pub status: Option<String>,

    /// Only issues created by this user ID
    #[arg(long)]
    pub creator: Option<String>,

    /// Only issues assigned to this user ID
    #[arg(long)]
    pub assignee: Option<String>,

    /// Only issues with this priority
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,

    /// Only issues carrying this label ID
    #[arg(long)]
    pub label: Option<String>,

    /// Only issues in this project ID
    #[arg(long)]
    pub project: Option<String>,

    /// Fetch the page after the stored cursor instead of the newest issues
    #[arg(long)]
    pub next_page: bool,

    /// Fetch the newest issues without reading or saving any cursor
    #[arg(long, conflicts_with = "next_page")]
    pub dry_run: bool,
}

impl PollArgs {
    pub fn to_input(&self, team_id: Option<String>) -> TriggerInput {
        TriggerInput {
            team_id,
            status_id: self.status.clone(),
            creator_id: self.creator.clone(),
            assignee_id: self.assignee.clone(),
            priority: self.priority.map(|p| p.key().to_string()),
            label_id: self.label.clone(),
            project_id: self.project.clone(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OptionSource {
    Teams,
    Statuses,
    Users,
    Labels,
    Projects,
}

impl From<OptionSource> for DynamicSource {
    fn from(source: OptionSource) -> Self {
        match source {
            OptionSource::Teams => DynamicSource::Teams,
            OptionSource::Statuses => DynamicSource::Statuses,
            OptionSource::Users => DynamicSource::Users,
            OptionSource::Labels => DynamicSource::Labels,
            OptionSource::Projects => DynamicSource::Projects,
        }
    }
}
