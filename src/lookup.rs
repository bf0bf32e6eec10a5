//! Options for the dropdown input fields.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::LinearClient;
use crate::error::{LinearError, Result};
use crate::responses::Connection;
use crate::trigger::{DynamicSource, TriggerInput};
use crate::types::{Label, Project, Team, User};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Source of dropdown options. The host platform renders these; the
/// triggers only name which lookup a field uses.
#[async_trait]
pub trait LookupProvider: Send + Sync {
    async fn teams(&self) -> Result<Vec<FieldOption>>;
    async fn statuses(&self, team_id: &str) -> Result<Vec<FieldOption>>;
    async fn users(&self) -> Result<Vec<FieldOption>>;
    async fn labels(&self, team_id: &str) -> Result<Vec<FieldOption>>;
    async fn projects(&self, team_id: &str) -> Result<Vec<FieldOption>>;
}

/// Resolve the options for `source`, scoping team-bound lookups to the
/// team selected in `input`.
pub async fn resolve_options(
    provider: &dyn LookupProvider,
    source: DynamicSource,
    input: &TriggerInput,
) -> Result<Vec<FieldOption>> {
    let team = if source.requires_team() {
        Some(input.team().ok_or_else(LinearError::missing_team)?)
    } else {
        None
    };

    match (source, team) {
        (DynamicSource::Teams, _) => provider.teams().await,
        (DynamicSource::Users, _) => provider.users().await,
        (DynamicSource::Statuses, Some(team)) => provider.statuses(team).await,
        (DynamicSource::Labels, Some(team)) => provider.labels(team).await,
        (DynamicSource::Projects, Some(team)) => provider.projects(team).await,
        (_, None) => Err(LinearError::missing_team()),
    }
}

const LIST_TEAMS_QUERY: &str = r#"
query ListTeams {
    teams {
        nodes {
            id
            key
            name
        }
    }
}
"#;

const LIST_USERS_QUERY: &str = r#"
query ListUsers {
    users {
        nodes {
            id
            name
            email
        }
    }
}
"#;

const TEAM_STATES_QUERY: &str = r#"
query TeamStates($teamId: String!) {
    team(id: $teamId) {
        states {
            nodes {
                id
                name
            }
        }
    }
}
"#;

const TEAM_LABELS_QUERY: &str = r#"
query TeamLabels($teamId: String!) {
    team(id: $teamId) {
        labels {
            nodes {
                id
                name
            }
        }
    }
}
"#;

const TEAM_PROJECTS_QUERY: &str = r#"
query TeamProjects($teamId: String!) {
    team(id: $teamId) {
        projects {
            nodes {
                id
                name
            }
        }
    }
}
"#;

#[derive(Deserialize)]
struct TeamsResponse {
    teams: Connection<Team>,
}

#[derive(Deserialize)]
struct UsersResponse {
    users: Connection<User>,
}

#[derive(Deserialize)]
struct StateNode {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct TeamScoped<T> {
    team: Option<T>,
}

#[derive(Deserialize)]
struct TeamStates {
    states: Connection<StateNode>,
}

#[derive(Deserialize)]
struct TeamLabels {
    labels: Connection<Label>,
}

#[derive(Deserialize)]
struct TeamProjects {
    projects: Connection<Project>,
}

impl LinearClient {
    async fn team_scoped<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        team_id: &str,
    ) -> Result<T> {
        let response: TeamScoped<T> = self.query(query, Some(json!({ "teamId": team_id }))).await?;
        response
            .team
            .ok_or_else(|| LinearError::ResponseShape("missing data.team".to_string()))
    }
}

#[async_trait]
impl LookupProvider for LinearClient {
    async fn teams(&self) -> Result<Vec<FieldOption>> {
        let response: TeamsResponse = self.query(LIST_TEAMS_QUERY, None).await?;
        Ok(response
            .teams
            .nodes
            .into_iter()
            .map(|t| FieldOption::new(t.id, format!("{} ({})", t.name, t.key)))
            .collect())
    }

    async fn statuses(&self, team_id: &str) -> Result<Vec<FieldOption>> {
        let team: TeamStates = self.team_scoped(TEAM_STATES_QUERY, team_id).await?;
        Ok(team
            .states
            .nodes
            .into_iter()
            .map(|s| FieldOption::new(s.id, s.name))
            .collect())
    }

    async fn users(&self) -> Result<Vec<FieldOption>> {
        let response: UsersResponse = self.query(LIST_USERS_QUERY, None).await?;
        Ok(response
            .users
            .nodes
            .into_iter()
            .map(|u| FieldOption::new(u.id, u.name))
            .collect())
    }

    async fn labels(&self, team_id: &str) -> Result<Vec<FieldOption>> {
        let team: TeamLabels = self.team_scoped(TEAM_LABELS_QUERY, team_id).await?;
        Ok(team
            .labels
            .nodes
            .into_iter()
            .map(|l| FieldOption::new(l.id, l.name))
            .collect())
    }

    async fn projects(&self, team_id: &str) -> Result<Vec<FieldOption>> {
        let team: TeamProjects = self.team_scoped(TEAM_PROJECTS_QUERY, team_id).await?;
        Ok(team
            .projects
            .nodes
            .into_iter()
            .map(|p| FieldOption::new(p.id, p.name))
            .collect())
    }
}
