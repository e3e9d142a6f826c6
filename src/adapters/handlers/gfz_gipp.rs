//! GFZ Geophysical Instrument Pool Potsdam handler

use super::r#trait::{Handler, HandlerCore, HandlerSettings};
use crate::adapters::http::Fetcher;
use crate::domain::{HandleOutcome, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub const NAME: &str = "gfz_gipp";
pub const DEFAULT_ID_PREFIX: &str = "gfzgipp";
pub const DEFAULT_BASE_URL: &str = "https://gipp.gfz-potsdam.de/instruments/rest";

/// Single request: `{base}/{id}.json`
pub struct InstrumentPoolHandler {
    core: HandlerCore,
}

impl InstrumentPoolHandler {
    /// # Errors
    ///
    /// Returns a configuration error for an invalid prefix or base URL.
    pub fn new(settings: HandlerSettings, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let core = HandlerCore::new(
            NAME,
            settings,
            DEFAULT_ID_PREFIX,
            Some(DEFAULT_BASE_URL),
            fetcher,
        )?;
        Ok(Self { core })
    }

    pub(crate) fn construct(
        settings: HandlerSettings,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Arc<dyn Handler>> {
        Ok(Arc::new(Self::new(settings, fetcher)?))
    }
}

#[async_trait]
impl Handler for InstrumentPoolHandler {
    fn name(&self) -> &'static str {
        NAME
    }

    fn id_prefix(&self) -> &str {
        &self.core.id_prefix
    }

    fn base_url(&self) -> &str {
        &self.core.base_url
    }

    async fn handle(&self, external_id: &str) -> HandleOutcome {
        if let Err(outcome) = self.core.check_external_id(NAME, external_id) {
            return outcome;
        }
        let document_name = format!("{external_id}.json");
        let url = self.core.endpoint(&[document_name.as_str()]);
        match self.core.fetch_primary(NAME, url.as_str()).await {
            Ok(document) => self.core.finish(NAME, &document),
            Err(outcome) => outcome,
        }
    }
}
