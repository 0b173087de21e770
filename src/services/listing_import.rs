//! Listing import pipeline.
//!
//! Takes a provider listing URL, resolves the notice id from its trailing
//! `--{digits}` segment, fetches the notice from the listings API, validates
//! it through the typed payload in [`crate::models::listing`], and persists
//! the mapped posting with its image rows. Nothing is written until the
//! payload has deserialized cleanly.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::AgentContext;
use crate::db::repository::{
    AgentRepository, FullRepository, ListingRepository, RepositoryError,
};
use crate::models::{listing, Agent, Posting};

/// Listings API endpoint; the notice id is appended as a path segment.
pub const LISTINGS_API_BASE: &str = "https://api.sosiva451.com/Avisos";

/// Errors surfaced by the import pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Invalid listing URL format")]
    InvalidUrl,

    #[error("This property has already been imported")]
    Duplicate,

    #[error("No authenticated agent for this operation")]
    AuthMissing,

    #[error("Failed to fetch property data: {0}")]
    Fetch(String),

    /// The notice payload did not match the expected shape; rejected before
    /// any write.
    #[error("Notice payload rejected: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Extract the provider notice id from a listing URL.
///
/// Provider URLs end in `--{digits}`; anything else is rejected.
pub fn extract_notice_id(url: &str) -> Option<&str> {
    let (_, tail) = url.rsplit_once("--")?;
    if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) {
        Some(tail)
    } else {
        None
    }
}

/// Imports provider listings into the store.
pub struct ImportService {
    repository: Arc<dyn FullRepository>,
    client: reqwest::Client,
    api_base: String,
}

impl ImportService {
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self::with_api_base(repository, LISTINGS_API_BASE)
    }

    /// Use a non-default listings API endpoint (tests point this at a stub).
    pub fn with_api_base(repository: Arc<dyn FullRepository>, api_base: impl Into<String>) -> Self {
        Self {
            repository,
            client: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }

    /// Run the full import for a submitted listing URL.
    pub async fn import_from_url(
        &self,
        ctx: Option<&AgentContext>,
        url: &str,
    ) -> Result<Posting, ImportError> {
        let ctx = ctx.ok_or(ImportError::AuthMissing)?;

        let notice_id = extract_notice_id(url).ok_or(ImportError::InvalidUrl)?;

        self.ensure_agent(ctx).await?;

        if self
            .repository
            .find_posting_by_source_id(notice_id)
            .await?
            .is_some()
        {
            return Err(ImportError::Duplicate);
        }

        let body = self.fetch_notice(notice_id).await?;
        self.import_notice_json(ctx, notice_id, &body).await
    }

    /// Validate a notice body and persist the mapped posting. Split out from
    /// the URL flow so the mapping can run against a captured payload.
    pub async fn import_notice_json(
        &self,
        ctx: &AgentContext,
        notice_id: &str,
        body: &str,
    ) -> Result<Posting, ImportError> {
        let notice = listing::parse_notice_json(body)
            .map_err(|e| ImportError::InvalidPayload(e.to_string()))?;

        let posting = notice.to_posting(notice_id, ctx.agent_id);
        let images = notice.to_images(posting.id);

        let stored = self.repository.insert_posting(&posting, &images).await?;
        info!(
            posting_id = %stored.id,
            notice_id,
            images = images.len(),
            "Imported listing"
        );
        Ok(stored)
    }

    /// The agent row must exist before it can own postings; create a minimal
    /// profile on first use.
    async fn ensure_agent(&self, ctx: &AgentContext) -> Result<(), ImportError> {
        if self.repository.find_agent(ctx.agent_id).await?.is_none() {
            self.repository
                .upsert_agent(&Agent {
                    id: ctx.agent_id,
                    first_name: String::new(),
                    last_name: String::new(),
                    email: String::new(),
                    phone: String::new(),
                    specialization: None,
                    active: true,
                })
                .await?;
        }
        Ok(())
    }

    async fn fetch_notice(&self, notice_id: &str) -> Result<String, ImportError> {
        let url = format!("{}/{}", self.api_base, notice_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ImportError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            warn!(notice_id, status = %response.status(), "Listings API returned an error");
            return Err(ImportError::Fetch(format!(
                "Listings API responded with status {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ImportError::Fetch(e.to_string()))
    }
}
