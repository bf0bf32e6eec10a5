//! Trigger definitions and the record shapes they exchange with the host.
//!
//! Both triggers run the same fetch and differ only in the ordering field,
//! so each one is a plain configuration record pointing at [`OrderField`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fetcher::{self, PollContext};
use crate::responses::Connection;
use crate::types::{Issue, IssueFields, Label, Priority, Project, User, WorkflowState};

/// Timestamp field used both for remote ordering and for composite ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderField {
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "updatedAt")]
    UpdatedAt,
}

impl OrderField {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderField::CreatedAt => "createdAt",
            OrderField::UpdatedAt => "updatedAt",
        }
    }

    pub fn value_of(self, fields: &IssueFields) -> &str {
        match self {
            OrderField::CreatedAt => &fields.created_at,
            OrderField::UpdatedAt => &fields.updated_at,
        }
    }
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values the host collected from the trigger's input fields.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct TriggerInput {
    pub team_id: Option<String>,
    pub status_id: Option<String>,
    pub creator_id: Option<String>,
    pub assignee_id: Option<String>,
    pub priority: Option<String>,
    pub label_id: Option<String>,
    pub project_id: Option<String>,
}

impl TriggerInput {
    /// The selected team, treating blank input as unset.
    pub fn team(&self) -> Option<&str> {
        non_blank(self.team_id.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Client-side filters applied to a fetched page. Unset filters pass everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueFilter {
    pub status_id: Option<String>,
    pub creator_id: Option<String>,
    pub assignee_id: Option<String>,
    pub priority: Option<String>,
    pub label_id: Option<String>,
    pub project_id: Option<String>,
}

impl IssueFilter {
    pub fn from_input(input: &TriggerInput) -> Self {
        let owned = |v: &Option<String>| non_blank(v.as_deref()).map(String::from);
        Self {
            status_id: owned(&input.status_id),
            creator_id: owned(&input.creator_id),
            assignee_id: owned(&input.assignee_id),
            priority: owned(&input.priority),
            label_id: owned(&input.label_id),
            project_id: owned(&input.project_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when the issue passes every configured filter.
    pub fn matches(&self, issue: &IssueFields) -> bool {
        if let Some(status_id) = &self.status_id {
            if issue.state.id != *status_id {
                return false;
            }
        }

        if let Some(creator_id) = &self.creator_id {
            if issue.creator.as_ref().map(|u| &u.id) != Some(creator_id) {
                return false;
            }
        }

        // Unassigned issues never pass an assignee filter.
        if let Some(assignee_id) = &self.assignee_id {
            if issue.assignee.as_ref().map(|u| &u.id) != Some(assignee_id) {
                return false;
            }
        }

        if let Some(priority) = &self.priority {
            if issue.priority_key() != *priority {
                return false;
            }
        }

        if let Some(label_id) = &self.label_id {
            if !issue.has_label(label_id) {
                return false;
            }
        }

        if let Some(project_id) = &self.project_id {
            if issue.project.as_ref().map(|p| &p.id) != Some(project_id) {
                return false;
            }
        }

        true
    }
}

/// An issue as handed back to the host.
///
/// `id` is `{issueId}-{ordering field value}` so that each new state of an
/// issue is a distinct item to the host's deduplication.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IssueRecord {
    pub id: String,
    #[serde(rename = "issueId")]
    pub issue_id: String,
    #[serde(flatten)]
    pub fields: IssueFields,
}

impl IssueRecord {
    pub fn from_issue(issue: Issue, order_by: OrderField) -> Self {
        let id = format!("{}-{}", issue.id, order_by.value_of(&issue.fields));
        Self {
            id,
            issue_id: issue.id,
            fields: issue.fields,
        }
    }
}

/// Lookup backing a dropdown input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicSource {
    Teams,
    Statuses,
    Users,
    Labels,
    Projects,
}

impl DynamicSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DynamicSource::Teams => "teams",
            DynamicSource::Statuses => "statuses",
            DynamicSource::Users => "users",
            DynamicSource::Labels => "labels",
            DynamicSource::Projects => "projects",
        }
    }

    /// Sources scoped to the selected team are refreshed when it changes.
    pub fn requires_team(self) -> bool {
        matches!(
            self,
            DynamicSource::Statuses | DynamicSource::Labels | DynamicSource::Projects
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldSource {
    Dynamic { source: DynamicSource },
    StaticChoices { choices: &'static [Choice] },
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct InputField {
    pub key: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub source: FieldSource,
}

pub const PRIORITY_CHOICES: &[Choice] = &[
    Choice {
        value: "0",
        label: "No priority",
    },
    Choice {
        value: "1",
        label: "Urgent",
    },
    Choice {
        value: "2",
        label: "High",
    },
    Choice {
        value: "3",
        label: "Medium",
    },
    Choice {
        value: "4",
        label: "Low",
    },
];

pub const INPUT_FIELDS: &[InputField] = &[
    InputField {
        key: "team_id",
        display_name: "Team",
        description: "The team whose issues are watched.",
        required: true,
        source: FieldSource::Dynamic {
            source: DynamicSource::Teams,
        },
    },
    InputField {
        key: "status_id",
        display_name: "Status",
        description: "Only issues in this workflow state.",
        required: false,
        source: FieldSource::Dynamic {
            source: DynamicSource::Statuses,
        },
    },
    InputField {
        key: "creator_id",
        display_name: "Creator",
        description: "Only issues created by this user.",
        required: false,
        source: FieldSource::Dynamic {
            source: DynamicSource::Users,
        },
    },
    InputField {
        key: "assignee_id",
        display_name: "Assignee",
        description: "Only issues assigned to this user.",
        required: false,
        source: FieldSource::Dynamic {
            source: DynamicSource::Users,
        },
    },
    InputField {
        key: "priority",
        display_name: "Priority",
        description: "Only issues with this priority.",
        required: false,
        source: FieldSource::StaticChoices {
            choices: PRIORITY_CHOICES,
        },
    },
    InputField {
        key: "label_id",
        display_name: "Label",
        description: "Only issues carrying this label.",
        required: false,
        source: FieldSource::Dynamic {
            source: DynamicSource::Labels,
        },
    },
    InputField {
        key: "project_id",
        display_name: "Project",
        description: "Only issues in this project.",
        required: false,
        source: FieldSource::Dynamic {
            source: DynamicSource::Projects,
        },
    },
];

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TriggerDefinition {
    pub key: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub order_by: OrderField,
    #[serde(skip)]
    pub fields: &'static [InputField],
}

pub const NEW_ISSUE: TriggerDefinition = TriggerDefinition {
    key: "new_issue",
    display_name: "New Issue",
    description: "Triggers when a new issue is created.",
    order_by: OrderField::CreatedAt,
    fields: INPUT_FIELDS,
};

pub const UPDATED_ISSUE: TriggerDefinition = TriggerDefinition {
    key: "updated_issue",
    display_name: "Updated Issue",
    description: "Triggers when an issue is updated.",
    order_by: OrderField::UpdatedAt,
    fields: INPUT_FIELDS,
};

pub fn definitions() -> [TriggerDefinition; 2] {
    [NEW_ISSUE, UPDATED_ISSUE]
}

pub fn find(key: &str) -> Option<TriggerDefinition> {
    definitions().into_iter().find(|d| d.key == key)
}

impl TriggerDefinition {
    pub async fn poll(&self, ctx: PollContext<'_>) -> Result<Vec<IssueRecord>> {
        fetcher::fetch_issues(self.order_by, ctx).await
    }

    pub fn sample(&self) -> IssueRecord {
        sample_record()
    }
}

/// Example payload shown to users while they configure either trigger.
pub fn sample_record() -> IssueRecord {
    let issue = Issue {
        id: "9cfb482a-81e3-4154-b5b9-2c805e70a02d".to_string(),
        fields: IssueFields {
            identifier: "ENG-42".to_string(),
            url: "https://linear.app/acme/issue/ENG-42/login-button-unresponsive".to_string(),
            title: "Login button unresponsive".to_string(),
            description: Some("Clicking login on Safari does nothing.".to_string()),
            priority: serde_json::Number::from(Priority::High as i64),
            estimate: Some(serde_json::Number::from(2)),
            due_date: Some("2024-06-30".to_string()),
            created_at: "2024-06-01T09:15:00.000Z".to_string(),
            updated_at: "2024-06-03T14:02:11.000Z".to_string(),
            creator: Some(User {
                id: "2e9a5d4c-0d2b-4b7e-9c1a-7f0e8b3d6a51".to_string(),
                name: "Ada Lovelace".to_string(),
                email: Some("ada@acme.dev".to_string()),
            }),
            assignee: Some(User {
                id: "6b1c3f7e-5a2d-4e9b-8c0f-1d4a7e2b9c36".to_string(),
                name: "Grace Hopper".to_string(),
                email: Some("grace@acme.dev".to_string()),
            }),
            state: WorkflowState {
                id: "c4d8e2f1-3b6a-4d9c-a7e5-0f2b8c1d6e94".to_string(),
                name: "In Progress".to_string(),
                state_type: "started".to_string(),
            },
            labels: Connection {
                nodes: vec![Label {
                    id: "f0a7b3c9-8e1d-4c2b-9a6f-5d3e7b1c0a28".to_string(),
                    name: "Bug".to_string(),
                }],
            },
            project: Some(Project {
                id: "1a2b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d".to_string(),
                name: "Web App".to_string(),
            }),
        },
    };

    IssueRecord::from_issue(issue, OrderField::CreatedAt)
}
