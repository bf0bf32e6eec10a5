use serde::Serialize;
use tabled::Tabled;

use crate::error::{LinearError, Result};
use crate::output::{self, truncate};
use crate::trigger::{self, FieldSource, InputField, IssueRecord, TriggerDefinition};

#[derive(Tabled)]
struct TriggerRow {
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Ordered by")]
    order_by: &'static str,
    #[tabled(rename = "Description")]
    description: &'static str,
}

impl From<&TriggerDefinition> for TriggerRow {
    fn from(def: &TriggerDefinition) -> Self {
        Self {
            key: def.key,
            name: def.display_name,
            order_by: def.order_by.as_str(),
            description: def.description,
        }
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Required")]
    required: &'static str,
    #[tabled(rename = "Options")]
    options: String,
}

impl From<&InputField> for FieldRow {
    fn from(field: &InputField) -> Self {
        let options = match field.source {
            FieldSource::Dynamic { source } => format!("lookup: {}", source.as_str()),
            FieldSource::StaticChoices { choices } => {
                let listed: Vec<String> = choices
                    .iter()
                    .map(|c| format!("{}={}", c.value, c.label))
                    .collect();
                truncate(&listed.join(", "), 60)
            }
        };

        Self {
            key: field.key,
            name: field.display_name,
            required: if field.required { "yes" } else { "" },
            options,
        }
    }
}

#[derive(Serialize)]
struct TriggerDetail {
    #[serde(flatten)]
    definition: TriggerDefinition,
    fields: &'static [InputField],
    sample: IssueRecord,
}

pub fn list() {
    output::print_table(&trigger::definitions(), |d| TriggerRow::from(d));
}

pub fn show(key: &str) -> Result<()> {
    let definition =
        trigger::find(key).ok_or_else(|| LinearError::UnknownTrigger(key.to_string()))?;

    let detail = TriggerDetail {
        definition,
        fields: definition.fields,
        sample: definition.sample(),
    };

    output::print_item(&detail, |detail| {
        let def = &detail.definition;
        println!("{} ({})", def.display_name, def.key);
        println!("{}", def.description);
        println!();
        println!("Ordered by: {}", def.order_by);
        println!();
        output::print_table(detail.fields, |f| FieldRow::from(f));
        println!();
        println!("Sample payload:");
        println!(
            "{}",
            serde_json::to_string_pretty(&detail.sample).unwrap_or_default()
        );
    });

    Ok(())
}
