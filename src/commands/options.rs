use tabled::Tabled;

use crate::cli::OptionSource;
use crate::config::Config;
use crate::error::Result;
use crate::lookup::{resolve_options, FieldOption, LookupProvider};
use crate::output;
use crate::trigger::TriggerInput;

#[derive(Tabled)]
struct OptionRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<&FieldOption> for OptionRow {
    fn from(option: &FieldOption) -> Self {
        Self {
            label: option.label.clone(),
            value: option.value.clone(),
        }
    }
}

pub async fn list(
    provider: &dyn LookupProvider,
    config: &Config,
    source: OptionSource,
    team: Option<String>,
) -> Result<()> {
    let input = TriggerInput {
        team_id: config.resolve_team(team.as_deref()),
        ..Default::default()
    };

    let options = resolve_options(provider, source.into(), &input).await?;

    if options.is_empty() {
        output::print_message("No options found");
        return Ok(());
    }

    output::print_table(&options, |o| OptionRow::from(o));

    Ok(())
}
