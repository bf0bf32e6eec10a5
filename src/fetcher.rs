//! The shared poll behind both issue triggers.

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::client::LinearClient;
use crate::cursor::CursorStore;
use crate::error::{LinearError, Result};
use crate::responses::Connection;
use crate::trigger::{IssueFilter, IssueRecord, OrderField, TriggerInput};
use crate::types::Issue;

/// Issues fetched per poll. Filtered-out issues are not made up for.
pub const PAGE_SIZE: u32 = 5;

const TEAM_ISSUES_QUERY: &str = r#"
query TriggerIssues($teamId: String!, $first: Int, $orderBy: PaginationOrderBy, $after: String) {
    team(id: $teamId) {
        issues(first: $first, orderBy: $orderBy, after: $after) {
            nodes {
                id
                identifier
                url
                title
                description
                priority
                estimate
                dueDate
                createdAt
                updatedAt
                creator {
                    id
                    name
                    email
                }
                assignee {
                    id
                    name
                    email
                }
                state {
                    id
                    name
                    type
                }
                labels {
                    nodes {
                        id
                        name
                    }
                }
                project {
                    id
                    name
                }
            }
        }
    }
}
"#;

#[derive(Deserialize)]
struct TeamIssuesResponse {
    team: Option<TeamIssues>,
}

#[derive(Deserialize)]
struct TeamIssues {
    issues: Option<Connection<Issue>>,
}

/// Whether the host is starting a new polling sequence or continuing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// No cursor is read; the page starts at the head of the ordering.
    Initial,
    /// The stored cursor, if any, is passed as `after`.
    Subsequent,
}

/// Everything one invocation needs from the host.
pub struct PollContext<'a> {
    pub client: &'a LinearClient,
    pub store: &'a mut dyn CursorStore,
    pub input: &'a TriggerInput,
    pub mode: PollMode,
}

/// Key under which the cursor for a team and ordering is stored.
pub fn cursor_key(team_id: &str, order_by: OrderField) -> String {
    format!("{team_id}:{order_by}")
}

/// Fetch one page of the team's issues ordered by `order_by`, advance the
/// cursor past it, and return the issues that pass the configured filters.
pub async fn fetch_issues(
    order_by: OrderField,
    ctx: PollContext<'_>,
) -> Result<Vec<IssueRecord>> {
    let PollContext {
        client,
        store,
        input,
        mode,
    } = ctx;

    let team_id = input.team().ok_or_else(LinearError::missing_team)?;
    let key = cursor_key(team_id, order_by);

    let after = match mode {
        PollMode::Initial => None,
        PollMode::Subsequent => store.get(&key)?,
    };
    debug!(team_id, %order_by, after = ?after, "resolved cursor");

    let variables = json!({
        "teamId": team_id,
        "first": PAGE_SIZE,
        "orderBy": order_by.as_str(),
        "after": after,
    });

    let response: TeamIssuesResponse = client.query(TEAM_ISSUES_QUERY, Some(variables)).await?;
    let nodes = response
        .team
        .ok_or_else(|| LinearError::ResponseShape("missing data.team".to_string()))?
        .issues
        .ok_or_else(|| LinearError::ResponseShape("missing data.team.issues".to_string()))?
        .nodes;

    // The cursor follows the unfiltered page so paging keeps moving even when
    // every issue is filtered out.
    if let Some(last) = nodes.last() {
        store.set(&key, last.id.clone())?;
        debug!(cursor = %last.id, "advanced cursor");
    }

    let filter = IssueFilter::from_input(input);
    if !filter.is_empty() {
        debug!(?filter, "applying filters");
    }

    let fetched = nodes.len();
    let records = select(nodes, &filter, order_by);

    info!(
        team_id,
        %order_by,
        fetched,
        returned = records.len(),
        "polled issues"
    );

    Ok(records)
}

/// Filter a fetched page and reshape the survivors, keeping remote order.
pub fn select(nodes: Vec<Issue>, filter: &IssueFilter, order_by: OrderField) -> Vec<IssueRecord> {
    nodes
        .into_iter()
        .filter(|issue| filter.matches(&issue.fields))
        .map(|issue| IssueRecord::from_issue(issue, order_by))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::InMemoryCursorStore;
    use httpmock::prelude::*;
    use serde_json::{json, Value};

    struct Node<'a> {
        id: &'a str,
        priority: u8,
        assignee: Option<&'a str>,
        labels: &'a [&'a str],
        project: Option<&'a str>,
    }

    impl<'a> Node<'a> {
        fn new(id: &'a str) -> Self {
            Self {
                id,
                priority: 0,
                assignee: Some("u-assignee"),
                labels: &[],
                project: None,
            }
        }

        fn to_json(&self, n: usize) -> Value {
            let labels: Vec<Value> = self
                .labels
                .iter()
                .map(|id| json!({ "id": id, "name": id }))
                .collect();

            json!({
                "id": self.id,
                "identifier": format!("ENG-{n}"),
                "url": format!("https://linear.app/acme/issue/ENG-{n}"),
                "title": format!("Issue {n}"),
                "description": null,
                "priority": self.priority,
                "estimate": null,
                "dueDate": null,
                "createdAt": format!("2024-05-0{n}T08:00:00.000Z"),
                "updatedAt": format!("2024-06-0{n}T08:00:00.000Z"),
                "creator": { "id": "u-creator", "name": "Ada", "email": "ada@acme.dev" },
                "assignee": self
                    .assignee
                    .map(|id| json!({ "id": id, "name": "Grace", "email": null })),
                "state": { "id": "s-todo", "name": "Todo", "type": "unstarted" },
                "labels": { "nodes": labels },
                "project": self.project.map(|id| json!({ "id": id, "name": "Web" }))
            })
        }
    }

    fn page(nodes: &[Node<'_>]) -> Value {
        let nodes: Vec<Value> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| n.to_json(i + 1))
            .collect();
        json!({ "data": { "team": { "issues": { "nodes": nodes } } } })
    }

    fn five_issues() -> Vec<Node<'static>> {
        ["i-1", "i-2", "i-3", "i-4", "i-5"]
            .into_iter()
            .map(Node::new)
            .collect()
    }

    fn input(team: &str) -> TriggerInput {
        TriggerInput {
            team_id: Some(team.to_string()),
            ..Default::default()
        }
    }

    async fn poll(
        client: &LinearClient,
        store: &mut InMemoryCursorStore,
        input: &TriggerInput,
        order_by: OrderField,
        mode: PollMode,
    ) -> Result<Vec<IssueRecord>> {
        fetch_issues(
            order_by,
            PollContext {
                client,
                store,
                input,
                mode,
            },
        )
        .await
    }

    #[tokio::test]
    async fn test_missing_team_halts_before_request() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(page(&five_issues()));
        });

        let client = LinearClient::with_endpoint("key".to_string(), server.url("/graphql"));
        let mut store = InMemoryCursorStore::new();

        for team in [None, Some("".to_string()), Some("   ".to_string())] {
            let input = TriggerInput {
                team_id: team,
                priority: Some("2".to_string()),
                ..Default::default()
            };
            let err = poll(
                &client,
                &mut store,
                &input,
                OrderField::CreatedAt,
                PollMode::Initial,
            )
            .await
            .unwrap_err();

            assert!(err.is_halted());
            assert_eq!(err.to_string(), "Please select the team first.");
        }

        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn test_unfiltered_page_returns_all_and_advances_cursor() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_includes(r#""teamId":"team-1""#)
                .body_includes(r#""orderBy":"createdAt""#)
                .body_includes(r#""first":5"#)
                .body_includes(r#""after":null"#);
            then.status(200).json_body(page(&five_issues()));
        });

        let client = LinearClient::with_endpoint("key".to_string(), server.url("/graphql"));
        let mut store = InMemoryCursorStore::new();

        let records = poll(
            &client,
            &mut store,
            &input("team-1"),
            OrderField::CreatedAt,
            PollMode::Initial,
        )
        .await
        .unwrap();

        mock.assert_calls(1);
        assert_eq!(records.len(), 5);
        for (i, record) in records.iter().enumerate() {
            let n = i + 1;
            assert_eq!(record.issue_id, format!("i-{n}"));
            assert_eq!(record.id, format!("i-{n}-2024-05-0{n}T08:00:00.000Z"));
            assert_eq!(
                record.id,
                format!("{}-{}", record.issue_id, record.fields.created_at)
            );
        }
        assert_eq!(
            store.get(&cursor_key("team-1", OrderField::CreatedAt)).unwrap(),
            Some("i-5".to_string())
        );
    }

    #[tokio::test]
    async fn test_updated_trigger_uses_updated_at() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_includes(r#""orderBy":"updatedAt""#);
            then.status(200).json_body(page(&five_issues()[..1]));
        });

        let client = LinearClient::with_endpoint("key".to_string(), server.url("/graphql"));
        let mut store = InMemoryCursorStore::new();

        let records = poll(
            &client,
            &mut store,
            &input("team-1"),
            OrderField::UpdatedAt,
            PollMode::Initial,
        )
        .await
        .unwrap();

        assert_eq!(records[0].id, "i-1-2024-06-01T08:00:00.000Z");
        assert_eq!(
            store.get(&cursor_key("team-1", OrderField::UpdatedAt)).unwrap(),
            Some("i-1".to_string())
        );
        assert_eq!(
            store.get(&cursor_key("team-1", OrderField::CreatedAt)).unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_priority_filter_keeps_matches_and_cursor_follows_page() {
        let mut nodes = five_issues();
        nodes[1].priority = 2;
        nodes[3].priority = 2;
        nodes[4].priority = 3;

        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(page(&nodes));
        });

        let client = LinearClient::with_endpoint("key".to_string(), server.url("/graphql"));
        let mut store = InMemoryCursorStore::new();
        let input = TriggerInput {
            priority: Some("2".to_string()),
            ..input("team-1")
        };

        let records = poll(
            &client,
            &mut store,
            &input,
            OrderField::CreatedAt,
            PollMode::Initial,
        )
        .await
        .unwrap();

        let ids: Vec<_> = records.iter().map(|r| r.issue_id.as_str()).collect();
        assert_eq!(ids, vec!["i-2", "i-4"]);
        assert_eq!(
            store.get(&cursor_key("team-1", OrderField::CreatedAt)).unwrap(),
            Some("i-5".to_string())
        );
    }

    #[tokio::test]
    async fn test_cursor_advances_when_everything_is_filtered_out() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(page(&five_issues()));
        });

        let client = LinearClient::with_endpoint("key".to_string(), server.url("/graphql"));
        let mut store = InMemoryCursorStore::new();
        let input = TriggerInput {
            label_id: Some("l-none".to_string()),
            ..input("team-1")
        };

        let records = poll(
            &client,
            &mut store,
            &input,
            OrderField::CreatedAt,
            PollMode::Initial,
        )
        .await
        .unwrap();

        assert!(records.is_empty());
        assert_eq!(
            store.get(&cursor_key("team-1", OrderField::CreatedAt)).unwrap(),
            Some("i-5".to_string())
        );
    }

    #[tokio::test]
    async fn test_assignee_filter_excludes_unassigned() {
        let mut nodes = five_issues();
        nodes[0].assignee = None;
        nodes[2].assignee = Some("u-other");

        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(page(&nodes));
        });

        let client = LinearClient::with_endpoint("key".to_string(), server.url("/graphql"));
        let mut store = InMemoryCursorStore::new();
        let input = TriggerInput {
            assignee_id: Some("u-assignee".to_string()),
            ..input("team-1")
        };

        let records = poll(
            &client,
            &mut store,
            &input,
            OrderField::CreatedAt,
            PollMode::Initial,
        )
        .await
        .unwrap();

        let ids: Vec<_> = records.iter().map(|r| r.issue_id.as_str()).collect();
        assert_eq!(ids, vec!["i-2", "i-4", "i-5"]);
    }

    #[tokio::test]
    async fn test_combined_filters() {
        let mut nodes = five_issues();
        nodes[0].labels = &["l-bug"];
        nodes[0].project = Some("p-web");
        nodes[1].labels = &["l-bug", "l-ui"];
        nodes[2].labels = &["l-ui"];
        nodes[2].project = Some("p-web");
        nodes[3].labels = &["l-ui", "l-bug"];
        nodes[3].project = Some("p-web");

        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(page(&nodes));
        });

        let client = LinearClient::with_endpoint("key".to_string(), server.url("/graphql"));
        let mut store = InMemoryCursorStore::new();
        let input = TriggerInput {
            label_id: Some("l-bug".to_string()),
            project_id: Some("p-web".to_string()),
            status_id: Some("s-todo".to_string()),
            creator_id: Some("u-creator".to_string()),
            ..input("team-1")
        };

        let records = poll(
            &client,
            &mut store,
            &input,
            OrderField::CreatedAt,
            PollMode::Initial,
        )
        .await
        .unwrap();

        let ids: Vec<_> = records.iter().map(|r| r.issue_id.as_str()).collect();
        assert_eq!(ids, vec!["i-1", "i-4"]);
    }

    #[tokio::test]
    async fn test_subsequent_poll_sends_stored_cursor() {
        let server = MockServer::start_async().await;
        let first = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_includes(r#""after":null"#);
            then.status(200).json_body(page(&five_issues()));
        });
        let second = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_includes(r#""after":"i-5""#);
            then.status(200).json_body(page(&[]));
        });

        let client = LinearClient::with_endpoint("key".to_string(), server.url("/graphql"));
        let mut store = InMemoryCursorStore::new();
        let input = input("team-1");

        poll(
            &client,
            &mut store,
            &input,
            OrderField::CreatedAt,
            PollMode::Initial,
        )
        .await
        .unwrap();
        let records = poll(
            &client,
            &mut store,
            &input,
            OrderField::CreatedAt,
            PollMode::Subsequent,
        )
        .await
        .unwrap();

        first.assert_calls(1);
        second.assert_calls(1);
        assert!(records.is_empty());
        // An empty page leaves the cursor where it was.
        assert_eq!(
            store.get(&cursor_key("team-1", OrderField::CreatedAt)).unwrap(),
            Some("i-5".to_string())
        );
    }

    #[tokio::test]
    async fn test_initial_poll_ignores_stored_cursor_and_is_repeatable() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_includes(r#""after":null"#);
            then.status(200).json_body(page(&five_issues()));
        });

        let client = LinearClient::with_endpoint("key".to_string(), server.url("/graphql"));
        let mut store = InMemoryCursorStore::new();
        store
            .set(
                &cursor_key("team-1", OrderField::CreatedAt),
                "stale".to_string(),
            )
            .unwrap();
        let input = input("team-1");

        let first = poll(
            &client,
            &mut store,
            &input,
            OrderField::CreatedAt,
            PollMode::Initial,
        )
        .await
        .unwrap();
        let second = poll(
            &client,
            &mut store,
            &input,
            OrderField::CreatedAt,
            PollMode::Initial,
        )
        .await
        .unwrap();

        mock.assert_calls(2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_team_in_response_is_shape_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200)
                .json_body(json!({ "data": { "team": null } }));
        });

        let client = LinearClient::with_endpoint("key".to_string(), server.url("/graphql"));
        let mut store = InMemoryCursorStore::new();

        let err = poll(
            &client,
            &mut store,
            &input("team-1"),
            OrderField::CreatedAt,
            PollMode::Initial,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, LinearError::ResponseShape(_)));
        assert!(!err.is_halted());
        assert_eq!(
            store.get(&cursor_key("team-1", OrderField::CreatedAt)).unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(500).body("boom");
        });

        let client = LinearClient::with_endpoint("key".to_string(), server.url("/graphql"));
        let mut store = InMemoryCursorStore::new();

        let err = poll(
            &client,
            &mut store,
            &input("team-1"),
            OrderField::CreatedAt,
            PollMode::Initial,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, LinearError::ApiError { status: 500, .. }));
    }

    #[test]
    fn test_cursor_key_per_team_and_ordering() {
        assert_eq!(cursor_key("t1", OrderField::CreatedAt), "t1:createdAt");
        assert_ne!(
            cursor_key("t1", OrderField::CreatedAt),
            cursor_key("t1", OrderField::UpdatedAt)
        );
    }
}
