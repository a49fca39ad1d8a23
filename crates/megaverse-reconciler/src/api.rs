//! Remote map service: wire types, the HTTP client, and the service port.
//!
//! The reconciler never talks HTTP directly; it goes through [`MapService`],
//! which the real [`MegaverseClient`] implements with reqwest and tests
//! implement in memory. Every call returns a typed outcome — no status code
//! ever surfaces as a panic or an untyped error string.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::ReconcilerConfig;
use crate::grid::Cell;

/// A cell as the current-map endpoint reports it: a numeric type code plus
/// the attribute field that code requires.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCell {
    #[serde(rename = "type")]
    pub type_code: i64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
}

/// Current map body: absent positions are `null`.
pub type CurrentRows = Vec<Vec<Option<RawCell>>>;

/// Goal map body: token strings, with absence spelled either `null` or
/// `"SPACE"` depending on the service's mood.
pub type GoalRows = Vec<Vec<Option<String>>>;

#[derive(Debug, Deserialize)]
struct CurrentMapResponse {
    map: CurrentMapBody,
}

#[derive(Debug, Deserialize)]
struct CurrentMapBody {
    content: CurrentRows,
}

#[derive(Debug, Deserialize)]
struct GoalMapResponse {
    goal: GoalRows,
}

/// The typed sub-resource endpoints for mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Polyanets,
    Soloons,
    Comeths,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Polyanets => "polyanets",
            Self::Soloons => "soloons",
            Self::Comeths => "comeths",
        }
    }

    /// Which endpoint handles a given cell, if any. Space has nothing to
    /// route and unknown cells deliberately route nowhere.
    pub fn for_cell(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Polyanet => Some(Self::Polyanets),
            Cell::Soloon { .. } => Some(Self::Soloons),
            Cell::Cometh { .. } => Some(Self::Comeths),
            Cell::Space | Cell::Unknown { .. } => None,
        }
    }
}

/// The extra payload field a create call carries for attributed kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Color(crate::grid::Color),
    Direction(crate::grid::Direction),
}

impl Attribute {
    /// The attribute a cell must be created with, if its kind takes one.
    pub fn for_cell(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Soloon { color } => Some(Self::Color(*color)),
            Cell::Cometh { direction } => Some(Self::Direction(*direction)),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Color(_) => "color",
            Self::Direction(_) => "direction",
        }
    }

    pub fn value(&self) -> &'static str {
        match self {
            Self::Color(c) => c.as_str(),
            Self::Direction(d) => d.as_str(),
        }
    }
}

/// Fatal failure while retrieving a map. Aborts the whole pass.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("map request returned status {status}")]
    Status { status: u16 },
    #[error("malformed map body: {0}")]
    Malformed(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Per-call failure while mutating a position. Never fatal to the pass; the
/// actuator decides whether to retry and with what delay.
#[derive(Debug, Clone, Error)]
pub enum CallError {
    #[error("rate limited")]
    RateLimited,
    #[error("rejected with status {status}")]
    Rejected { status: u16 },
    #[error("transport failure: {0}")]
    Transport(String),
}

impl CallError {
    /// Rate limits and transport faults earn exponential backoff before the
    /// next attempt; plain rejections are retried without extra sleep.
    pub fn wants_backoff(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Transport(_))
    }
}

/// Port to the remote map service.
///
/// The reconciler and actuator are generic over this trait so the whole
/// pipeline runs against an in-memory fake in tests.
#[async_trait]
pub trait MapService: Send + Sync {
    /// Fetch the current map content.
    async fn current_map(&self) -> Result<CurrentRows, FetchError>;

    /// Fetch the goal map content.
    async fn goal_map(&self) -> Result<GoalRows, FetchError>;

    /// Create an entity at a position via the given endpoint.
    async fn create(
        &self,
        endpoint: Endpoint,
        row: usize,
        column: usize,
        attribute: Option<Attribute>,
    ) -> Result<(), CallError>;

    /// Delete whatever the given endpoint holds at a position.
    async fn delete(&self, endpoint: Endpoint, row: usize, column: usize) -> Result<(), CallError>;
}

/// HTTP client for the megaverse challenge API.
#[derive(Clone)]
pub struct MegaverseClient {
    client: reqwest::Client,
    base_url: String,
    candidate_id: String,
}

impl MegaverseClient {
    pub fn new(config: &ReconcilerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            candidate_id: config.candidate_id.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }

    async fn mutate(
        &self,
        method: reqwest::Method,
        endpoint: Endpoint,
        body: serde_json::Value,
    ) -> Result<(), CallError> {
        let response = self
            .client
            .request(method, self.url(endpoint.path()))
            .json(&body)
            .send()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status.as_u16() == 429 {
            Err(CallError::RateLimited)
        } else {
            Err(CallError::Rejected {
                status: status.as_u16(),
            })
        }
    }

    fn position_body(&self, row: usize, column: usize) -> serde_json::Value {
        json!({
            "candidateId": self.candidate_id,
            "row": row,
            "column": column,
        })
    }
}

#[async_trait]
impl MapService for MegaverseClient {
    async fn current_map(&self) -> Result<CurrentRows, FetchError> {
        let response: CurrentMapResponse =
            self.fetch_json(&format!("map/{}", self.candidate_id)).await?;
        Ok(response.map.content)
    }

    async fn goal_map(&self) -> Result<GoalRows, FetchError> {
        let response: GoalMapResponse = self
            .fetch_json(&format!("map/{}/goal", self.candidate_id))
            .await?;
        Ok(response.goal)
    }

    async fn create(
        &self,
        endpoint: Endpoint,
        row: usize,
        column: usize,
        attribute: Option<Attribute>,
    ) -> Result<(), CallError> {
        let mut body = self.position_body(row, column);
        if let Some(attribute) = attribute {
            body[attribute.key()] = json!(attribute.value());
        }
        self.mutate(reqwest::Method::POST, endpoint, body).await
    }

    async fn delete(&self, endpoint: Endpoint, row: usize, column: usize) -> Result<(), CallError> {
        let body = self.position_body(row, column);
        self.mutate(reqwest::Method::DELETE, endpoint, body).await
    }
}
