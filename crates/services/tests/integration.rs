//! End-to-end scenarios: request record in, wire envelope out, with the
//! managed runtime and a memory sink in between.

use std::sync::Arc;

use async_trait::async_trait;
use relay_config::Config;
use relay_errors::{Cause, InternalError, Result};
use relay_runtime::{RequestContext, Runtime};
use relay_services::{respond, ContactRecord, ContactStore, InMemoryContactStore, RegisterContactService};
use relay_telemetry::{ErrorLogger, MemorySink};
use relay_types::{EmailAddress, RequestRecord, WorkspaceId};
use serde_json::{json, Value};

fn harness(store: Arc<dyn ContactStore>) -> (Runtime, RegisterContactService, MemorySink) {
    let config = Config::default();
    let sink = MemorySink::new();
    let runtime = Runtime::from_config(ErrorLogger::new(Arc::new(sink.clone())), &config);
    let service = RegisterContactService::new(store, &config.validation).unwrap();
    (runtime, service, sink)
}

async fn register(runtime: &Runtime, service: &RegisterContactService, record: RequestRecord) -> Value {
    let service = service.clone();
    let result = runtime
        .execute("register", RequestContext::new(), move |_| async move {
            service.register(&record).await
        })
        .await;
    serde_json::to_value(respond::created(result)).unwrap()
}

fn valid_body(workspace: WorkspaceId) -> RequestRecord {
    RequestRecord::new(json!({
        "email_address": "Ada@Example.com",
        "password": "hunter2hunter2",
        "confirm_password": "hunter2hunter2",
        "first_name": "Ada",
    }))
    .with_qs(json!({"workspace": workspace.to_string()}))
}

#[tokio::test]
async fn missing_email_renders_as_422_with_the_field_in_an_issue_path() {
    let (runtime, service, _) = harness(Arc::new(InMemoryContactStore::new()));
    let record = RequestRecord::new(json!({
        "password": "hunter2hunter2",
        "confirm_password": "hunter2hunter2",
        "first_name": "Ada",
    }))
    .with_qs(json!({"workspace": WorkspaceId::generate().to_string()}));

    let wire = register(&runtime, &service, record).await;

    assert_eq!(wire["type"], "exception");
    assert_eq!(wire["status"], 422);
    assert_eq!(wire["exception"], "E_VALIDATION");
    let issues = wire["data"].as_array().unwrap();
    assert!(issues
        .iter()
        .any(|i| i["path"][0] == "email_address" && i["rule"] == "required"));
}

#[tokio::test]
async fn password_mismatch_is_one_issue_naming_both_fields() {
    let (runtime, service, _) = harness(Arc::new(InMemoryContactStore::new()));
    let record = RequestRecord::new(json!({
        "email_address": "ada@example.com",
        "password": "aaaaaaaa",
        "confirm_password": "bbbbbbbb",
        "first_name": "Ada",
    }))
    .with_qs(json!({"workspace": WorkspaceId::generate().to_string()}));

    let wire = register(&runtime, &service, record).await;

    let issues = wire["data"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["field"], "confirm_password");
    assert_eq!(issues[0]["message"], "must be the same as password");
}

#[tokio::test]
async fn valid_payload_registers_and_preserves_null_last_name() {
    let store = InMemoryContactStore::new();
    let (runtime, service, sink) = harness(Arc::new(store.clone()));
    let workspace = WorkspaceId::generate();

    let wire = register(&runtime, &service, valid_body(workspace)).await;

    assert_eq!(wire["type"], "success");
    assert_eq!(wire["status"], 201);
    assert_eq!(wire["data"]["email_address"], "ada@example.com");
    assert_eq!(wire["data"]["workspace_id"], workspace.to_string());
    assert!(wire["data"]["last_name"].is_null());
    assert_eq!(store.len(), 1);
    assert!(sink.records().is_empty());
}

/// Store whose driver is down; classifies its failure the way a real
/// database adapter must.
struct BrokenStore;

#[derive(Debug)]
struct DriverError;

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "connection reset by peer")
    }
}

impl std::error::Error for DriverError {}

#[async_trait]
impl ContactStore for BrokenStore {
    async fn find_by_email(
        &self,
        _workspace: WorkspaceId,
        _email: &EmailAddress,
    ) -> Result<Option<ContactRecord>> {
        Err(InternalError::database("select contact by email", "driver failure")
            .with_cause(Cause::from_std(&DriverError))
            .into())
    }

    async fn insert(&self, _contact: ContactRecord) -> Result<ContactRecord> {
        Err(InternalError::database("insert contact", "driver failure")
            .with_cause(Cause::from_std(&DriverError))
            .into())
    }
}

#[tokio::test]
async fn foreign_store_failure_is_generic_to_the_client_and_detailed_in_logs() {
    let (runtime, service, sink) = harness(Arc::new(BrokenStore));

    let wire = register(&runtime, &service, valid_body(WorkspaceId::generate())).await;

    // the client sees nothing about the database
    assert_eq!(wire["status"], 500);
    assert_eq!(wire["exception"], "E_INTERNAL_SERVER");
    assert_eq!(wire["message"], "internal server error");
    assert!(wire.get("data").is_none());

    // the sink got the classified internal error with its foreign root
    let records = sink.records();
    assert_eq!(records.len(), 1);
    let logged = &records[0].payload["error"];
    assert_eq!(logged["code"], "I_DATABASE");
    assert_eq!(logged["root_cause"]["message"], "connection reset by peer");
}
