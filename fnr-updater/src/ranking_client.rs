//! Ranking service client
//!
//! Resolves a batch of member ids to their most recent ranking levels with a
//! single GraphQL query against the ranking service.
//!
//! # API Reference
//! - Endpoint: POST `<endpoint>` with body `{"query": "..."}`
//! - Response: `{"data": {"players": [{"memberId": .., "rankingPlaces": [{"single", "double", "mix"}]}]}}`

use crate::types::{MemberId, RankingRecord};
use async_trait::async_trait;
use fnr_common::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Source of ranking records for a batch of member ids
///
/// The updater only needs this seam; [`RemoteRankingClient`] is the
/// production implementation.
#[async_trait]
pub trait RankingSource: Send + Sync {
    /// Rankings for the given ids. Ids without a ranking are absent from the map.
    async fn lookup(&self, member_ids: &[MemberId]) -> Result<HashMap<MemberId, RankingRecord>>;
}

#[async_trait]
impl<T: RankingSource + ?Sized> RankingSource for Arc<T> {
    async fn lookup(&self, member_ids: &[MemberId]) -> Result<HashMap<MemberId, RankingRecord>> {
        (**self).lookup(member_ids).await
    }
}

/// GraphQL client for the ranking service
pub struct RemoteRankingClient {
    http_client: Client,
    endpoint: String,
}

impl RemoteRankingClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RankingSource for RemoteRankingClient {
    async fn lookup(&self, member_ids: &[MemberId]) -> Result<HashMap<MemberId, RankingRecord>> {
        debug!(
            endpoint = %self.endpoint,
            member_ids = member_ids.len(),
            "Querying ranking service"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "query": build_query(member_ids) }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote {
                status: status.to_string(),
                body,
            });
        }

        let body: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("Failed to decode ranking response: {}", e)))?;
        let rankings = rankings_from_response(body)?;

        debug!(
            requested = member_ids.len(),
            received = rankings.len(),
            "Ranking query complete"
        );

        Ok(rankings)
    }
}

/// GraphQL query selecting the latest ranking of every id in the batch
pub fn build_query(member_ids: &[MemberId]) -> String {
    let filters = member_ids
        .iter()
        .map(|id| format!("{{memberId:{}}}", quote(id.as_str())))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "{{\n players(where: {{or : [\n{filters}]}}) {{\n  firstName, lastName, memberId, \
         rankingPlaces (limit:1, order:\"rankingDate\", direction:\"desc\") {{single,mix,double}}\n}}\n}}"
    )
}

/// GraphQL string literal (JSON string escaping is a valid subset)
fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Parse a ranking service response body into a ranking map
pub fn parse_rankings(body: &str) -> Result<HashMap<MemberId, RankingRecord>> {
    let response: GraphQlResponse =
        serde_json::from_str(body).map_err(|e| Error::Parse(e.to_string()))?;
    rankings_from_response(response)
}

/// Rankings from a decoded response; GraphQL `errors` without `data` is a remote failure
fn rankings_from_response(response: GraphQlResponse) -> Result<HashMap<MemberId, RankingRecord>> {
    let data = match response.data {
        Some(data) => {
            if !response.errors.is_empty() {
                warn!(
                    errors = response.errors.len(),
                    "Ranking service returned partial errors"
                );
            }
            data
        }
        None if !response.errors.is_empty() => {
            return Err(Error::Remote {
                status: "GraphQL error".to_string(),
                body: serde_json::Value::Array(response.errors).to_string(),
            });
        }
        None => return Err(Error::Parse("response has no data".to_string())),
    };

    let mut rankings = HashMap::new();
    for player in data.players.unwrap_or_default() {
        let member_id = player.member_id.into_member_id();
        match player.ranking_places.first() {
            Some(place) => {
                rankings.insert(
                    member_id,
                    RankingRecord::new(place.single, place.double, place.mix),
                );
            }
            None => debug!(member_id = %member_id, "Player has no ranking places"),
        }
    }

    Ok(rankings)
}

// ============================================================================
// Ranking Service Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<PlayersData>,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PlayersData {
    players: Option<Vec<Player>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Player {
    member_id: PlayerMemberId,
    #[serde(default)]
    ranking_places: Vec<RankingPlace>,
}

/// The service reports member ids as numbers; strings are accepted too
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PlayerMemberId {
    Number(i64),
    Text(String),
}

impl PlayerMemberId {
    fn into_member_id(self) -> MemberId {
        match self {
            PlayerMemberId::Number(n) => MemberId::new(n.to_string()),
            PlayerMemberId::Text(s) => MemberId::new(s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RankingPlace {
    single: i64,
    double: i64,
    mix: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<MemberId> {
        raw.iter().map(|s| MemberId::from(*s)).collect()
    }

    #[test]
    fn test_query_lists_every_member_id() {
        let query = build_query(&ids(&["100", "200"]));
        assert!(query.contains("players(where: {or : [\n{memberId:\"100\"},{memberId:\"200\"}]})"));
        assert!(query.contains(
            "rankingPlaces (limit:1, order:\"rankingDate\", direction:\"desc\") {single,mix,double}"
        ));
    }

    #[test]
    fn test_query_escapes_quotes() {
        let query = build_query(&ids(&["1\"2"]));
        assert!(query.contains(r#"{memberId:"1\"2"}"#));
    }

    #[test]
    fn test_parse_numeric_and_text_ids() {
        let body = r#"{"data":{"players":[
            {"firstName":"Alice","lastName":"A","memberId":100,
             "rankingPlaces":[{"single":5,"mix":3,"double":7}]},
            {"firstName":"Bob","lastName":"B","memberId":"200",
             "rankingPlaces":[{"single":12,"mix":11,"double":10}]}
        ]}}"#;

        let rankings = parse_rankings(body).unwrap();
        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings.get("100"), Some(&RankingRecord::new(5, 7, 3)));
        assert_eq!(rankings.get("200"), Some(&RankingRecord::new(12, 10, 11)));
    }

    #[test]
    fn test_player_without_ranking_places_is_absent() {
        let body = r#"{"data":{"players":[{"memberId":100,"rankingPlaces":[]}]}}"#;
        let rankings = parse_rankings(body).unwrap();
        assert!(rankings.is_empty());
    }

    #[test]
    fn test_empty_player_list() {
        let rankings = parse_rankings(r#"{"data":{"players":[]}}"#).unwrap();
        assert!(rankings.is_empty());
        let rankings = parse_rankings(r#"{"data":{"players":null}}"#).unwrap();
        assert!(rankings.is_empty());
    }

    #[test]
    fn test_graphql_errors_without_data_is_remote_error() {
        let body = r#"{"errors":[{"message":"Syntax Error"}]}"#;
        let err = parse_rankings(body).unwrap_err();
        assert!(matches!(err, Error::Remote { ref body, .. } if body.contains("Syntax Error")));
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        assert!(matches!(parse_rankings("<html>"), Err(Error::Parse(_))));
        assert!(matches!(parse_rankings("{}"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_client_keeps_endpoint() {
        let client =
            RemoteRankingClient::new("http://127.0.0.1:1/graphql", Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:1/graphql");
    }
}
