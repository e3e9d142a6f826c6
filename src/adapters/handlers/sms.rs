//! Sensor Management System handler
//!
//! SMS serves JSON:API documents. Device properties can be included in the
//! device request, contacts cannot, so a second request fetches the contact
//! roles and its `included` array is appended to the device's.

use super::r#trait::{Handler, HandlerCore, HandlerSettings};
use crate::adapters::http::Fetcher;
use crate::domain::{HandleOutcome, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub const NAME: &str = "sensor_management_system";
pub const DEFAULT_ID_PREFIX: &str = "sms";

/// Handler for SMS instances; every backend must configure its own base URL
pub struct SensorManagementHandler {
    core: HandlerCore,
}

impl SensorManagementHandler {
    /// # Errors
    ///
    /// Returns a configuration error when no base URL is configured, since
    /// SMS has no public default instance.
    pub fn new(settings: HandlerSettings, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let core = HandlerCore::new(NAME, settings, DEFAULT_ID_PREFIX, None, fetcher)?;
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
impl Handler for SensorManagementHandler {
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
        let mut device_url = self.core.endpoint(&["devices", external_id]);
        device_url
            .query_pairs_mut()
            .append_pair("include", "device_properties");
        let mut contacts_url =
            self.core.endpoint(&["devices", external_id, "device-contact-roles"]);
        contacts_url
            .query_pairs_mut()
            .append_pair("include", "contact");

        let mut document = match self.core.fetch_primary(NAME, device_url.as_str()).await {
            Ok(document) => document,
            Err(outcome) => return outcome,
        };
        let contact_roles = self.core.fetcher.fetch_or_empty(contacts_url.as_str()).await;

        merge_included(&mut document, contact_roles);
        self.core.finish(NAME, &document)
    }
}

/// Appends `extra.included` to `document.included`
fn merge_included(document: &mut Value, extra: Value) {
    let Some(object) = document.as_object_mut() else {
        tracing::debug!("Device document is not an object, contacts not attached");
        return;
    };

    let mut included = match object.remove("included") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    if let Value::Object(mut extra) = extra {
        if let Some(Value::Array(items)) = extra.remove("included") {
            included.extend(items);
        }
    }
    object.insert("included".to_string(), Value::Array(included));
}
