//! End-to-end enrichment against mock backends

use mockito::{Matcher, Server, ServerGuard};
use sensorsync::adapters::handlers::HandlerRegistry;
use sensorsync::adapters::http::HttpFetcher;
use sensorsync::adapters::store::InMemoryValueStore;
use sensorsync::config::load_config_from_str;
use sensorsync::core::binding::{BindingIndex, SharedBindingIndex};
use sensorsync::core::{Orchestrator, SyncReport};
use sensorsync::domain::{PersistedReference, SchemaCounts, StoredValue, UpsertKey};
use std::sync::Arc;

const CATALOG: &str = "https://rdmo.example.org/terms/catalogs/instruments";
const TRIGGER: &str = "https://rdmo.example.org/terms/domain/instrument/id";
const SERIAL: &str = "https://rdmo.example.org/terms/domain/instrument/serial";
const MISSING: &str = "https://rdmo.example.org/terms/domain/instrument/manual";
const PARAMETERS: &str = "https://rdmo.example.org/terms/domain/instrument/parameter";
const CONTACTS: &str = "https://rdmo.example.org/terms/domain/instrument/contact";
const TAGS: &str = "https://rdmo.example.org/terms/domain/instrument/tag";

const INSTRUMENT: &str = r#"{
    "serialNumber": "SN-1",
    "parameters": [{"name": "Temperature"}, {"name": "Pressure"}, {"name": "Salinity"}],
    "contacts": [{"email": "ada@example.org"}, {"email": "grace@example.org"}],
    "tags": ["ocean", "ctd"]
}"#;

fn config(gipp_url: &str, sms_url: &str) -> String {
    format!(
        r#"
[[handlers.gfz_gipp.catalogs]]
catalog_uri = "{CATALOG}"
auto_complete_field_uri = "{TRIGGER}"

[handlers.gfz_gipp.catalogs.attribute_mapping]
"serialNumber" = "{SERIAL}"
"manualUrl" = "{MISSING}"
"parameters[*].name" = "{PARAMETERS}"
"contacts[*].email" = "{CONTACTS}"
"tags" = "{TAGS}"

[[handlers.gfz_gipp.backends]]
id_prefix = "gipp"
base_url = "{gipp_url}"

[[handlers.sensor_management_system.catalogs]]
catalog_uri = "{CATALOG}"
auto_complete_field_uri = "{TRIGGER}"

[handlers.sensor_management_system.catalogs.attribute_mapping]
"data.attributes.serial_number" = "{SERIAL}"
"included[?type=='device_property'].attributes.property_name" = "{PARAMETERS}"
"included[?type=='contact'].attributes.email" = "{CONTACTS}"

[[handlers.sensor_management_system.backends]]
id_prefix = "sms"
base_url = "{sms_url}"
"#
    )
}

fn store() -> Arc<InMemoryValueStore> {
    let mut store = InMemoryValueStore::new();
    store.declare(
        CATALOG,
        PARAMETERS,
        SchemaCounts {
            collection_fields: 1,
            repeating_groups: 0,
        },
    );
    store.declare(
        CATALOG,
        CONTACTS,
        SchemaCounts {
            collection_fields: 0,
            repeating_groups: 1,
        },
    );
    store.declare(
        CATALOG,
        TAGS,
        SchemaCounts {
            collection_fields: 1,
            repeating_groups: 1,
        },
    );
    Arc::new(store)
}

fn orchestrator(server: &ServerGuard, store: Arc<InMemoryValueStore>) -> Orchestrator {
    let config = load_config_from_str(&config(&server.url(), &server.url())).unwrap();
    let fetcher = Arc::new(HttpFetcher::new(&config.http).unwrap());
    let index = BindingIndex::build(&config.handlers, &HandlerRegistry::builtin(), fetcher);
    assert!(index.skipped().is_empty());
    Orchestrator::new(Arc::new(SharedBindingIndex::new(index)), store)
}

fn event(reference: &str) -> PersistedReference {
    PersistedReference {
        reference: reference.to_string(),
        catalog_uri: CATALOG.to_string(),
        trigger_attribute_uri: TRIGGER.to_string(),
        project_id: 7,
        set_index: 3,
    }
}

fn rows_for<'a>(rows: &'a [StoredValue], attribute_uri: &str) -> Vec<&'a StoredValue> {
    rows.iter().filter(|row| row.attribute_uri == attribute_uri).collect()
}

#[tokio::test]
async fn test_instrument_is_written_by_shape() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/GIPP-1.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(INSTRUMENT)
        .create_async()
        .await;

    let store = store();
    let report = orchestrator(&server, store.clone())
        .on_reference_persisted(&event("gipp:GIPP-1"))
        .await;
    mock.assert_async().await;

    let summary = report.summary().expect("synchronized");
    assert_eq!(summary.created, 6);
    assert_eq!(summary.skipped_null, 1);
    assert_eq!(summary.ambiguous, 1);
    assert!(!summary.is_clean());

    let rows = store.rows().unwrap();
    assert_eq!(rows.len(), 6);

    let serial = rows_for(&rows, SERIAL);
    assert_eq!(serial.len(), 1);
    assert_eq!(serial[0].text, "SN-1");
    assert_eq!(serial[0].project_id, 7);
    assert_eq!(serial[0].set_index, 3);
    assert!(!serial[0].set_collection);

    let parameters = rows_for(&rows, PARAMETERS);
    let placed: Vec<(i64, i64, &str)> = parameters
        .iter()
        .map(|row| (row.set_index, row.collection_index, row.text.as_str()))
        .collect();
    assert_eq!(
        placed,
        vec![(3, 0, "Temperature"), (3, 1, "Pressure"), (3, 2, "Salinity")]
    );
    assert!(parameters.iter().all(|row| row.set_collection));

    let contacts = rows_for(&rows, CONTACTS);
    let placed: Vec<(&str, i64, &str)> = contacts
        .iter()
        .map(|row| (row.set_prefix.as_str(), row.set_index, row.text.as_str()))
        .collect();
    assert_eq!(
        placed,
        vec![("3", 0, "ada@example.org"), ("3", 1, "grace@example.org")]
    );

    assert!(rows_for(&rows, MISSING).is_empty());
    assert!(rows_for(&rows, TAGS).is_empty());
}

#[tokio::test]
async fn test_second_run_changes_nothing() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/GIPP-1.json")
        .with_status(200)
        .with_body(INSTRUMENT)
        .expect(2)
        .create_async()
        .await;

    let store = store();
    let orchestrator = orchestrator(&server, store.clone());
    orchestrator.on_reference_persisted(&event("gipp:GIPP-1")).await;
    let first = store.rows().unwrap();

    let report = orchestrator.on_reference_persisted(&event("gipp:GIPP-1")).await;
    mock.assert_async().await;

    let summary = report.summary().expect("synchronized");
    assert_eq!(summary.created, 0);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.unchanged, 6);

    let second = store.rows().unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_changed_value_is_updated_in_place() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/GIPP-1.json")
        .with_status(200)
        .with_body(INSTRUMENT)
        .create_async()
        .await;

    let store = store();
    let key = UpsertKey::Scalar {
        project_id: 7,
        attribute_uri: SERIAL.to_string(),
        set_index: 3,
    };
    store
        .insert_row(StoredValue::from_key(&key, "SN-OLD".to_string(), chrono::Utc::now()))
        .unwrap();

    let report = orchestrator(&server, store.clone())
        .on_reference_persisted(&event("gipp:GIPP-1"))
        .await;

    let summary = report.summary().expect("synchronized");
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.created, 5);

    let rows = store.rows().unwrap();
    let serial = rows_for(&rows, SERIAL);
    assert_eq!(serial.len(), 1);
    assert_eq!(serial[0].text, "SN-1");
}

#[tokio::test]
async fn test_sms_device_with_failing_contacts() {
    let mut server = Server::new_async().await;
    let device = server
        .mock("GET", "/devices/42")
        .match_query(Matcher::UrlEncoded(
            "include".into(),
            "device_properties".into(),
        ))
        .with_status(200)
        .with_body(
            r#"{
                "data": {"id": "42", "attributes": {"serial_number": "SMS-42"}},
                "included": [
                    {"type": "device_property", "attributes": {"property_name": "Conductivity"}}
                ]
            }"#,
        )
        .create_async()
        .await;
    let contacts = server
        .mock("GET", "/devices/42/device-contact-roles")
        .match_query(Matcher::UrlEncoded("include".into(), "contact".into()))
        .with_status(500)
        .create_async()
        .await;

    let store = store();
    let report = orchestrator(&server, store.clone())
        .on_reference_persisted(&event("sms:42"))
        .await;
    device.assert_async().await;
    contacts.assert_async().await;

    match &report {
        SyncReport::Synchronized {
            handler_name,
            external_id,
            summary,
            ..
        } => {
            assert_eq!(handler_name, "sensor_management_system");
            assert_eq!(external_id, "42");
            assert_eq!(summary.created, 2);
        }
        other => panic!("unexpected report: {other:?}"),
    }

    let rows = store.rows().unwrap();
    assert_eq!(rows_for(&rows, SERIAL)[0].text, "SMS-42");
    assert_eq!(rows_for(&rows, PARAMETERS)[0].text, "Conductivity");
    assert!(rows_for(&rows, CONTACTS).is_empty());
}

#[tokio::test]
async fn test_unknown_instrument_writes_nothing() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/NOPE.json")
        .with_status(404)
        .create_async()
        .await;

    let store = store();
    let report = orchestrator(&server, store.clone())
        .on_reference_persisted(&event("gipp:NOPE"))
        .await;

    match report {
        SyncReport::HandlerErrors {
            handler_name,
            id_prefix,
            errors,
        } => {
            assert_eq!(handler_name, "gfz_gipp");
            assert_eq!(id_prefix, "gipp");
            assert!(!errors.is_empty());
        }
        other => panic!("unexpected report: {other:?}"),
    }
    assert!(store.rows().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_prefix_has_no_binding() {
    let server = Server::new_async().await;
    let store = store();
    let report = orchestrator(&server, store.clone())
        .on_reference_persisted(&event("elsewhere:1"))
        .await;

    assert_eq!(
        report,
        SyncReport::NoMatchingBinding {
            catalog_uri: CATALOG.to_string(),
            trigger_attribute_uri: TRIGGER.to_string(),
            id_prefix: "elsewhere".to_string(),
        }
    );
    assert!(store.rows().unwrap().is_empty());
}

#[tokio::test]
async fn test_other_attribute_has_no_binding() {
    let server = Server::new_async().await;
    let mut event = event("gipp:GIPP-1");
    event.trigger_attribute_uri = SERIAL.to_string();

    let report = orchestrator(&server, store())
        .on_reference_persisted(&event)
        .await;
    assert!(matches!(report, SyncReport::NoMatchingBinding { .. }));
}

#[tokio::test]
async fn test_malformed_references_are_ignored() {
    let server = Server::new_async().await;
    let store = store();
    let orchestrator = orchestrator(&server, store.clone());

    for reference in ["onlyoneword", "a:b:c", ":1", "gipp:"] {
        let report = orchestrator.on_reference_persisted(&event(reference)).await;
        assert!(
            matches!(report, SyncReport::NotApplicable { .. }),
            "{reference}: {report:?}"
        );
    }
    assert!(store.rows().unwrap().is_empty());
}

#[tokio::test]
async fn test_report_serializes_with_outcome_tag() {
    let server = Server::new_async().await;
    let report = orchestrator(&server, store())
        .on_reference_persisted(&event("elsewhere:1"))
        .await;

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcome"], "no_matching_binding");
    assert_eq!(json["id_prefix"], "elsewhere");
}
