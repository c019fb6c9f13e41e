//! Contact registration
//!
//! Drives a registration request through the payload staircase: structural
//! validation against the declarative ruleset, semantic resolution of the
//! active workspace, strict schema decode into [`RegisterContact`], then the
//! store round trip.

use std::sync::Arc;

use relay_config::ValidationConfig;
use relay_errors::{Error, Exception, Result};
use relay_payload::{DataPayload, Rule, RuleSet};
use relay_runtime::RequestContext;
use relay_types::record::QS_KEY;
use relay_types::{ContactId, EmailAddress, RequestRecord, SecretString, WorkspaceId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{ContactRecord, ContactStore};

/// Decoded registration request. Encoding is lossy on purpose: the
/// password serialises as `"[redacted]"`, so a registration can be logged
/// or replayed structurally but never leaks the secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterContact {
    pub email_address: EmailAddress,
    pub password: SecretString,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub workspace_id: WorkspaceId,
}

/// Registers contacts into a workspace.
#[derive(Clone)]
pub struct RegisterContactService {
    store: Arc<dyn ContactStore>,
    rules: RuleSet,
    redact_keys: Vec<String>,
}

impl RegisterContactService {
    /// Build the service, compiling its ruleset once.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidRuleSetError` if the ruleset is malformed; that is
    /// a programming error and should fail boot, not a request.
    pub fn new(store: Arc<dyn ContactStore>, config: &ValidationConfig) -> Result<Self> {
        let rules = RuleSet::builder()
            .max_issues(config.max_issues)
            .field("email_address", vec![Rule::Required, Rule::Email])
            .field("password", vec![Rule::Required, Rule::MinLength(8)])
            .field(
                "confirm_password",
                vec![Rule::Required, Rule::SameAs("password".into())],
            )
            .field("first_name", vec![Rule::Required, Rule::MaxLength(80)])
            .field("last_name", vec![Rule::MaxLength(80)])
            .compile()?;
        Ok(Self {
            store,
            rules,
            redact_keys: config.redact_keys.clone(),
        })
    }

    /// Register a contact from a raw request record.
    ///
    /// # Errors
    ///
    /// `ValidationException` for structural problems, `BadRequestException`
    /// when no workspace can be resolved, `ConflictException` for a
    /// duplicate email, plus whatever the store classifies.
    pub async fn register(&self, record: &RequestRecord) -> Result<ContactRecord> {
        let registration = DataPayload::<RegisterContact>::from_request(record)
            .validate(&self.rules)?
            .map_semantics(resolve_workspace)
            .await?
            .decode(&self.redact_keys)?
            .into_decoded()?;

        if self
            .store
            .find_by_email(registration.workspace_id, &registration.email_address)
            .await?
            .is_some()
        {
            return Err(Exception::conflict("email address already registered").into());
        }

        let contact = ContactRecord {
            id: ContactId::generate(),
            workspace_id: registration.workspace_id,
            email_address: registration.email_address,
            first_name: registration.first_name,
            last_name: registration.last_name,
        };
        tracing::debug!(contact = %contact.id, workspace = %contact.workspace_id, "registering contact");
        self.store.insert(contact).await
    }
}

/// Resolve the workspace the registration targets: an explicit `workspace`
/// query parameter wins, otherwise the ambient session's workspace.
async fn resolve_workspace(mut record: Value) -> Result<Value> {
    let explicit = record
        .get(QS_KEY)
        .and_then(|qs| qs.get("workspace"))
        .and_then(Value::as_str)
        .map(WorkspaceId::parse)
        .transpose()?;

    let workspace = match explicit {
        Some(workspace) => workspace,
        None => RequestContext::current()?
            .workspace()
            .ok_or_else(|| Error::from(Exception::bad_request("no active workspace")))?,
    };

    record["workspace_id"] = Value::String(workspace.to_string());
    Ok(record)
}
