//! Handler trait and shared construction logic
//!
//! A handler knows how to turn one external id into a composite JSON document
//! for a specific backend kind, and then hands that document to its compiled
//! [`AttributeMapping`].

use crate::adapters::http::Fetcher;
use crate::core::mapping::AttributeMapping;
use crate::domain::{FetchError, HandleOutcome, Result, SyncError, REFERENCE_SEPARATOR};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// One backend integration
///
/// Instances are immutable after construction and shared across tasks.
///
/// # Example
///
/// ```no_run
/// use sensorsync::adapters::handlers::{Handler, HandlerRegistry, HandlerSettings};
/// use sensorsync::adapters::http::HttpFetcher;
/// use sensorsync::config::HttpConfig;
/// use std::sync::Arc;
///
/// # async fn example() -> sensorsync::domain::Result<()> {
/// let fetcher = Arc::new(HttpFetcher::new(&HttpConfig::default())?);
/// let construct = HandlerRegistry::builtin().resolve("gfz_gipp")?;
/// let handler = construct(HandlerSettings::default(), fetcher)?;
///
/// let outcome = handler.handle("4711").await;
/// println!("{outcome:?}");
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Handler: Send + Sync {
    /// Registry name of the handler kind
    fn name(&self) -> &'static str;

    /// Reference prefix this instance answers to
    fn id_prefix(&self) -> &str;

    /// Backend base URL without trailing slash
    fn base_url(&self) -> &str;

    /// Fetches and maps everything known about `external_id`
    ///
    /// Never fails: if the identity-confirming request fails the outcome is
    /// [`HandleOutcome::Errors`], secondary request failures only leave their
    /// part of the document empty.
    async fn handle(&self, external_id: &str) -> HandleOutcome;
}

/// Per-instance settings taken from a catalog binding and a backend entry
#[derive(Debug, Clone, Default)]
pub struct HandlerSettings {
    /// Overrides the handler's default prefix
    pub id_prefix: Option<String>,

    /// Overrides the handler's default base URL
    pub base_url: Option<String>,

    pub attribute_mapping: AttributeMapping,
}

/// Validated settings plus the fetcher, shared by every handler variant
pub(crate) struct HandlerCore {
    pub(crate) id_prefix: String,
    pub(crate) base_url: String,
    base: Url,
    pub(crate) mapping: AttributeMapping,
    pub(crate) fetcher: Arc<dyn Fetcher>,
}

impl HandlerCore {
    /// Resolves defaults and validates them
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] if no base URL is available, the
    /// base URL is not an absolute http(s) URL, or the prefix is empty or
    /// contains the reference separator.
    pub(crate) fn new(
        handler_name: &str,
        settings: HandlerSettings,
        default_prefix: &str,
        default_base_url: Option<&str>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self> {
        let id_prefix = settings
            .id_prefix
            .unwrap_or_else(|| default_prefix.to_string());
        if id_prefix.is_empty() || id_prefix.contains(REFERENCE_SEPARATOR) {
            return Err(SyncError::Configuration(format!(
                "{handler_name}: id_prefix '{id_prefix}' must be non-empty and must not contain '{REFERENCE_SEPARATOR}'"
            )));
        }

        let raw_base = settings
            .base_url
            .or_else(|| default_base_url.map(str::to_string))
            .ok_or_else(|| {
                SyncError::Configuration(format!(
                    "{handler_name}: base_url is required for id_prefix '{id_prefix}'"
                ))
            })?;

        let parsed = Url::parse(&raw_base).map_err(|e| {
            SyncError::Configuration(format!("{handler_name}: invalid base_url '{raw_base}': {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(SyncError::Configuration(format!(
                "{handler_name}: base_url '{raw_base}' must be an http(s) URL"
            )));
        }

        Ok(Self {
            id_prefix,
            base_url: raw_base.trim_end_matches('/').to_string(),
            base: parsed,
            mapping: settings.attribute_mapping,
            fetcher,
        })
    }

    /// The base URL extended by `segments`
    ///
    /// Each segment is percent-encoded as a whole, so `/`, `?` and `#` in an
    /// external id stay inside its segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Rejects ids that cannot be used as a path segment
    pub(crate) fn check_external_id(
        &self,
        handler_name: &str,
        external_id: &str,
    ) -> std::result::Result<(), HandleOutcome> {
        if external_id.is_empty() || matches!(external_id, "." | "..") {
            tracing::warn!(
                handler = handler_name,
                id_prefix = %self.id_prefix,
                external_id = %external_id,
                "External id is not a valid path segment"
            );
            return Err(HandleOutcome::Errors(vec![format!(
                "external id '{external_id}' is not a valid path segment"
            )]));
        }
        Ok(())
    }

    /// Fetches the identity-confirming document
    ///
    /// On failure the caller should return the contained outcome as is.
    pub(crate) async fn fetch_primary(
        &self,
        handler_name: &str,
        url: &str,
    ) -> std::result::Result<Value, HandleOutcome> {
        self.fetcher
            .fetch(url)
            .await
            .map_err(|e| primary_failed(handler_name, &self.id_prefix, &e))
    }

    pub(crate) fn finish(&self, handler_name: &str, document: &Value) -> HandleOutcome {
        tracing::debug!(handler = handler_name, id_prefix = %self.id_prefix, "Mapping composite document");
        HandleOutcome::Mapped(self.mapping.apply(document))
    }
}

fn primary_failed(handler_name: &str, id_prefix: &str, err: &FetchError) -> HandleOutcome {
    tracing::warn!(
        handler = handler_name,
        id_prefix = %id_prefix,
        url = %err.url(),
        error = %err,
        "Primary request failed, nothing will be written"
    );
    HandleOutcome::Errors(vec![err.to_string()])
}
