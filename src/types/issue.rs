use serde::{Deserialize, Serialize};

use super::{Label, Project, User};
use crate::responses::Connection;

/// An issue node as returned by the team issues query.
///
/// The identifier is kept apart from the remaining fields so that trigger
/// records can replace it while carrying every other field through untouched.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Issue {
    pub id: String,
    #[serde(flatten)]
    pub fields: IssueFields,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct IssueFields {
    pub identifier: String,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: serde_json::Number,
    pub estimate: Option<serde_json::Number>,
    #[serde(rename = "dueDate")]
    pub due_date: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    pub creator: Option<User>,
    pub assignee: Option<User>,
    pub state: WorkflowState,
    pub labels: Connection<Label>,
    pub project: Option<Project>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct WorkflowState {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub state_type: String,
}

impl IssueFields {
    /// Priority in its canonical string form ("2", not "2.0").
    pub fn priority_key(&self) -> String {
        number_key(&self.priority)
    }

    pub fn has_label(&self, label_id: &str) -> bool {
        self.labels.nodes.iter().any(|l| l.id == label_id)
    }
}

fn number_key(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}
