//! O2A Registry handler
//!
//! An item document alone lacks contacts and parameter units. Four requests
//! are issued concurrently and merged into the item document:
//!
//! 1. `items/{id}`, which confirms the item exists
//! 2. `items/{id}/contacts`, attached as `contacts: [{firstName, lastName, email}]`
//! 3. `items/{id}/parameters`, attached as `parameters: [{name, unit}]`
//! 4. `units`, used to resolve parameter units given by `@uuid` reference

use super::r#trait::{Handler, HandlerCore, HandlerSettings};
use crate::adapters::http::Fetcher;
use crate::domain::{HandleOutcome, Result};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub const NAME: &str = "o2a_registry";
pub const DEFAULT_ID_PREFIX: &str = "o2aregistry";
pub const DEFAULT_BASE_URL: &str = "https://registry.o2a-data.de/rest/v2";

const CONTACT_FIELDS: [&str; 3] = ["firstName", "lastName", "email"];

pub struct O2ARegistryHandler {
    core: HandlerCore,
}

impl O2ARegistryHandler {
    /// # Errors
    ///
    /// Returns a configuration error for an empty or `:`-containing prefix or
    /// an invalid base URL.
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
impl Handler for O2ARegistryHandler {
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
        let item_url = self.core.endpoint(&["items", external_id]);
        let contacts_url = self.core.endpoint(&["items", external_id, "contacts"]);
        let parameters_url = self.core.endpoint(&["items", external_id, "parameters"]);
        let units_url = self.core.endpoint(&["units"]);

        let fetcher = &self.core.fetcher;
        let (item, contacts, parameters, units) = tokio::join!(
            self.core.fetch_primary(NAME, item_url.as_str()),
            fetcher.fetch_or_empty(contacts_url.as_str()),
            fetcher.fetch_or_empty(parameters_url.as_str()),
            fetcher.fetch_or_empty(units_url.as_str()),
        );

        let mut document = match item {
            Ok(document) => document,
            Err(outcome) => return outcome,
        };

        match document.as_object_mut() {
            Some(object) => {
                object.insert("contacts".to_string(), collect_contacts(&contacts));
                object.insert(
                    "parameters".to_string(),
                    collect_parameters(&parameters, &units),
                );
            }
            None => tracing::debug!(
                url = %item_url,
                "Item document is not an object, contacts and parameters not attached"
            ),
        }

        self.core.finish(NAME, &document)
    }
}

fn records(document: &Value) -> &[Value] {
    document
        .get("records")
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

/// Simplified contacts; references that are not expanded objects are skipped
fn collect_contacts(contacts: &Value) -> Value {
    let simplified: Vec<Value> = records(contacts)
        .iter()
        .filter_map(|record| record.get("contact").and_then(Value::as_object))
        .filter(|contact| !contact.is_empty())
        .map(|contact| {
            let fields: Map<String, Value> = CONTACT_FIELDS
                .iter()
                .filter_map(|key| contact.get(*key).map(|v| (key.to_string(), v.clone())))
                .collect();
            Value::Object(fields)
        })
        .collect();
    Value::Array(simplified)
}

/// `[{name, unit}]` with units resolved inline or through the units table
fn collect_parameters(parameters: &Value, units: &Value) -> Value {
    let unit_lookup: HashMap<&str, &Value> = records(units)
        .iter()
        .filter_map(|unit| {
            let uuid = unit.get("@uuid")?.as_str()?;
            Some((uuid, unit.get("code").unwrap_or(&Value::Null)))
        })
        .collect();

    let collected: Vec<Value> = records(parameters)
        .iter()
        .map(|parameter| {
            let name = parameter.get("name").cloned().unwrap_or_else(|| json!(""));
            let unit = match parameter.get("unit") {
                Some(Value::Object(inline)) => inline.get("code").cloned().unwrap_or_else(|| json!("")),
                Some(Value::String(reference)) => unit_lookup
                    .get(reference.as_str())
                    .map_or_else(|| json!(""), |code| (*code).clone()),
                _ => json!(""),
            };
            json!({"name": name, "unit": unit})
        })
        .collect();
    Value::Array(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::fetcher::RecordingFetcher;
    use crate::adapters::http::HttpFetcher;
    use crate::config::HttpConfig;
    use crate::core::mapping::AttributeMapping;
    use crate::domain::MappedValue;
    use indexmap::IndexMap;
    use mockito::Server;

    #[test]
    fn test_collect_contacts_skips_references() {
        let contacts = json!({"records": [
            {"contact": {"firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.org", "@uuid": "c1"}},
            {"contact": 17},
            {"contact": {"lastName": "Hopper"}},
            {"role": "owner"}
        ]});
        assert_eq!(
            collect_contacts(&contacts),
            json!([
                {"firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.org"},
                {"lastName": "Hopper"}
            ])
        );
    }

    #[test]
    fn test_collect_parameters_resolves_units() {
        let parameters = json!({"records": [
            {"name": "Temperature", "unit": {"code": "°C"}},
            {"name": "Pressure", "unit": "u-dbar"},
            {"name": "Salinity", "unit": "u-unknown"},
            {"unit": null}
        ]});
        let units = json!({"records": [
            {"@uuid": "u-dbar", "code": "dbar"},
            {"code": "orphan"}
        ]});
        assert_eq!(
            collect_parameters(&parameters, &units),
            json!([
                {"name": "Temperature", "unit": "°C"},
                {"name": "Pressure", "unit": "dbar"},
                {"name": "Salinity", "unit": ""},
                {"name": "", "unit": ""}
            ])
        );
    }

    #[test]
    fn test_collect_from_empty_documents() {
        assert_eq!(collect_contacts(&json!({})), json!([]));
        assert_eq!(collect_parameters(&json!({}), &json!({})), json!([]));
    }

    #[test]
    fn test_defaults() {
        let fetcher = Arc::new(HttpFetcher::new(&HttpConfig::default()).unwrap());
        let handler = O2ARegistryHandler::new(HandlerSettings::default(), fetcher).unwrap();
        assert_eq!(handler.id_prefix(), DEFAULT_ID_PREFIX);
        assert_eq!(handler.base_url(), DEFAULT_BASE_URL);
        assert_eq!(handler.name(), "o2a_registry");
    }

    #[tokio::test]
    async fn test_external_id_is_encoded_in_every_request() {
        let recorder = Arc::new(RecordingFetcher::default());
        let handler = O2ARegistryHandler::new(HandlerSettings::default(), recorder.clone()).unwrap();

        handler.handle("5#").await;
        let mut urls = recorder.urls();
        urls.sort();
        assert_eq!(
            urls,
            vec![
                "https://registry.o2a-data.de/rest/v2/items/5%23",
                "https://registry.o2a-data.de/rest/v2/items/5%23/contacts",
                "https://registry.o2a-data.de/rest/v2/items/5%23/parameters",
                "https://registry.o2a-data.de/rest/v2/units",
            ]
        );
    }

    fn handler_for(server_url: &str, table: &[(&str, &str)]) -> O2ARegistryHandler {
        let table: IndexMap<String, String> = table
            .iter()
            .map(|(p, a)| (p.to_string(), a.to_string()))
            .collect();
        let settings = HandlerSettings {
            id_prefix: None,
            base_url: Some(server_url.to_string()),
            attribute_mapping: AttributeMapping::compile(&table).unwrap(),
        };
        let fetcher = Arc::new(HttpFetcher::new(&HttpConfig::default()).unwrap());
        O2ARegistryHandler::new(settings, fetcher).unwrap()
    }

    #[tokio::test]
    async fn test_handle_merges_sub_documents() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/items/42")
            .with_status(200)
            .with_body(r#"{"id": 42, "shortName": "CTD-1"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/items/42/contacts")
            .with_status(200)
            .with_body(r#"{"records": [{"contact": {"firstName": "Ada", "lastName": "Lovelace"}}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/items/42/parameters")
            .with_status(200)
            .with_body(r#"{"records": [{"name": "Pressure", "unit": "u1"}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/units")
            .with_status(200)
            .with_body(r#"{"records": [{"@uuid": "u1", "code": "dbar"}]}"#)
            .create_async()
            .await;

        let handler = handler_for(
            &server.url(),
            &[
                ("shortName", "urn:name"),
                ("contacts[*].lastName", "urn:contacts"),
                ("parameters[*].unit", "urn:units"),
            ],
        );

        let outcome = handler.handle("42").await;
        let result = outcome.mapped().unwrap();
        assert_eq!(result["urn:name"], MappedValue::Scalar("CTD-1".to_string()));
        assert_eq!(
            result["urn:contacts"],
            MappedValue::List(vec!["Lovelace".to_string()])
        );
        assert_eq!(result["urn:units"], MappedValue::List(vec!["dbar".to_string()]));
    }

    #[tokio::test]
    async fn test_secondary_failures_leave_empty_lists() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/items/7")
            .with_status(200)
            .with_body(r#"{"shortName": "ADCP"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/items/7/contacts")
            .with_status(500)
            .create_async()
            .await;
        server
            .mock("GET", "/items/7/parameters")
            .with_status(503)
            .create_async()
            .await;
        server
            .mock("GET", "/units")
            .with_status(500)
            .create_async()
            .await;

        let handler = handler_for(
            &server.url(),
            &[("shortName", "urn:name"), ("parameters", "urn:params")],
        );

        let result = handler.handle("7").await;
        let result = result.mapped().unwrap();
        assert_eq!(result["urn:name"], MappedValue::Scalar("ADCP".to_string()));
        assert_eq!(result["urn:params"], MappedValue::List(vec![]));
    }

    #[tokio::test]
    async fn test_primary_failure_is_errors() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/items/404")
            .with_status(404)
            .create_async()
            .await;
        for path in ["/items/404/contacts", "/items/404/parameters", "/units"] {
            server
                .mock("GET", path)
                .with_status(200)
                .with_body("{}")
                .create_async()
                .await;
        }

        let handler = handler_for(&server.url(), &[("shortName", "urn:name")]);
        match handler.handle("404").await {
            HandleOutcome::Errors(messages) => {
                assert_eq!(messages.len(), 1);
                assert!(messages[0].contains("404"));
            }
            other => panic!("expected errors, got {other:?}"),
        }
    }
}
