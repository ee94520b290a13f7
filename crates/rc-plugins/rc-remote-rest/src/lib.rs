//! # rc-remote-rest
//! recipe-browser/crates/rc-plugins/rc-remote-rest/src/lib.rs
//! PostgREST implementation of `CollectionGateway`.
//! One generic gateway serves every collection; the record type picks the
//! table through `Record::COLLECTION`.

mod client;

pub use client::{ClientError, RemoteClient};

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use rc_core::error::{AppError, Result};
use rc_core::models::{Record, Validate};
use rc_core::traits::CollectionGateway;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, warn};

/// Asks PostgREST to echo the written rows back.
const RETURN_REPRESENTATION: &str = "return=representation";

/// Error body returned by PostgREST on non-2xx responses.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

impl PostgrestError {
    fn describe(&self) -> String {
        let mut out = self.message.clone();
        if let Some(code) = &self.code {
            out = format!("{out} (code {code})");
        }
        if let Some(details) = &self.details {
            out = format!("{out}: {details}");
        }
        if let Some(hint) = &self.hint {
            out = format!("{out}; hint: {hint}");
        }
        out
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Read,
    Write,
}

impl Direction {
    fn error(self, collection: &str, message: String) -> AppError {
        match self {
            Direction::Read => AppError::query(collection, message),
            Direction::Write => AppError::write(collection, message),
        }
    }
}

pub struct RestCollectionGateway<R> {
    client: Arc<RemoteClient>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> RestCollectionGateway<R> {
    pub fn new(client: Arc<RemoteClient>) -> Self {
        Self {
            client,
            _record: PhantomData,
        }
    }

    fn id_filter(id: &str) -> [(&'static str, String); 1] {
        [("id", format!("eq.{id}"))]
    }

    /// Sends the request and checks its status, mapping transport and
    /// status failures onto `direction`.
    async fn send(&self, request: RequestBuilder, direction: Direction) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            let kind = if e.is_timeout() {
                "timed out"
            } else {
                "transport error"
            };
            warn!(collection = R::COLLECTION, error = %e, "remote call {kind}");
            direction.error(R::COLLECTION, format!("{kind}: {e}"))
        })?;
        check_status::<R>(response, direction).await
    }

    /// Like [`Self::send`], then decodes a JSON array of rows.
    async fn rows(&self, request: RequestBuilder, direction: Direction) -> Result<Vec<R>> {
        let response = self.send(request, direction).await?;
        response.json::<Vec<R>>().await.map_err(|e| {
            warn!(collection = R::COLLECTION, error = %e, "undecodable response");
            direction.error(R::COLLECTION, format!("undecodable response: {e}"))
        })
    }
}

async fn check_status<R: Record>(response: Response, direction: Direction) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<PostgrestError>(&body) {
        Ok(err) => format!("{status}: {}", err.describe()),
        Err(_) if body.is_empty() => status.to_string(),
        Err(_) => format!("{status}: {body}"),
    };
    warn!(collection = R::COLLECTION, %status, "remote call rejected");
    Err(direction.error(R::COLLECTION, message))
}

#[async_trait]
impl<R: Record> CollectionGateway<R> for RestCollectionGateway<R> {
    async fn get_all(&self) -> Result<Vec<R>> {
        debug!(collection = R::COLLECTION, "get_all");
        let request = self
            .client
            .request(Method::GET, R::COLLECTION)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        self.rows(request, Direction::Read).await
    }

    async fn get_by_id(&self, id: &str) -> Result<R> {
        debug!(collection = R::COLLECTION, id, "get_by_id");
        let request = self
            .client
            .request(Method::GET, R::COLLECTION)
            .query(&[("select", "*")])
            .query(&Self::id_filter(id));
        let mut rows = self.rows(request, Direction::Read).await?;
        match rows.len() {
            0 => Err(AppError::query_not_found(R::COLLECTION, id)),
            1 => Ok(rows.remove(0)),
            n => Err(AppError::query(
                R::COLLECTION,
                format!("expected one row for id {id}, got {n}"),
            )),
        }
    }

    async fn create(&self, draft: R::Draft) -> Result<R> {
        draft.validate()?;
        debug!(collection = R::COLLECTION, "create");
        let request = self
            .client
            .request(Method::POST, R::COLLECTION)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[&draft]);
        let mut rows = self.rows(request, Direction::Write).await?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            n => Err(AppError::write(
                R::COLLECTION,
                format!("expected the inserted row back, got {n} rows"),
            )),
        }
    }

    async fn update(&self, id: &str, patch: R::Patch) -> Result<R> {
        patch.validate()?;
        debug!(collection = R::COLLECTION, id, "update");
        let request = self
            .client
            .request(Method::PATCH, R::COLLECTION)
            .query(&Self::id_filter(id))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&patch);
        let mut rows = self.rows(request, Direction::Write).await?;
        match rows.len() {
            0 => Err(AppError::write_not_found(R::COLLECTION, id)),
            1 => Ok(rows.remove(0)),
            n => Err(AppError::write(
                R::COLLECTION,
                format!("update of id {id} touched {n} rows"),
            )),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        debug!(collection = R::COLLECTION, id, "delete");
        let request = self
            .client
            .request(Method::DELETE, R::COLLECTION)
            .query(&Self::id_filter(id));
        self.send(request, Direction::Write).await?;
        Ok(true)
    }
}
