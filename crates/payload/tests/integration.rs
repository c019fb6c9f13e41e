//! Integration tests for the payload pipeline

use relay_payload::{DataPayload, Rule, RuleSet};
use relay_types::{EmailAddress, RequestRecord, WorkspaceId};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct InviteContact {
    email_address: EmailAddress,
    workspace_id: WorkspaceId,
    role: String,
    note: Option<String>,
}

fn invite_rules() -> RuleSet {
    RuleSet::builder()
        .field("email_address", vec![Rule::Required, Rule::Email])
        .field("workspace_id", vec![Rule::Required, Rule::Uuid])
        .field(
            "role",
            vec![
                Rule::Required,
                Rule::OneOf(vec!["member".into(), "admin".into()]),
            ],
        )
        .field("note", vec![Rule::MaxLength(200)])
        .compile()
        .unwrap()
}

#[test]
fn full_request_pipeline_produces_the_domain_value() {
    let workspace = WorkspaceId::generate();
    let record = RequestRecord::new(json!({
        "email_address": "Grace@Example.com",
        "workspace_id": workspace.to_string(),
        "role": "member",
    }))
    .with_headers(json!({"x-request-id": "r-1"}));

    let invite = DataPayload::<InviteContact>::from_request(&record)
        .validate(&invite_rules())
        .unwrap()
        .decode(&[])
        .unwrap()
        .into_decoded()
        .unwrap();

    assert_eq!(invite.email_address.as_str(), "grace@example.com");
    assert_eq!(invite.workspace_id, workspace);
    assert_eq!(invite.note, None);
}

#[test]
fn decode_round_trips_for_the_schema_target() {
    let original = InviteContact {
        email_address: EmailAddress::parse("grace@example.com").unwrap(),
        workspace_id: WorkspaceId::generate(),
        role: "admin".to_string(),
        note: Some("welcome aboard".to_string()),
    };

    let encoded = serde_json::to_value(&original).unwrap();
    let decoded = DataPayload::<InviteContact>::from_trusted(encoded)
        .unwrap()
        .into_decoded()
        .unwrap();

    assert_eq!(decoded, original);
}

#[test]
fn validation_and_decode_classify_failures_differently() {
    // structurally broken: two problems, both reported at once
    let record = RequestRecord::new(json!({"role": "owner"}));
    let err = DataPayload::<InviteContact>::from_request(&record)
        .validate(&invite_rules())
        .unwrap_err();
    assert!(err.is_exception());
    let issues = err.to_json()["data"].as_array().unwrap().len();
    assert_eq!(issues, 3); // email missing, workspace missing, bad role

    // structurally fine but semantically undecodable: internal schema error
    let sneaky = RequestRecord::new(json!({
        "email_address": "g@example.com",
        "workspace_id": "00000000-0000-0000-0000-000000000000",
        "role": "member",
        "note": null,
    }));
    let decoded = DataPayload::<InviteContact>::from_request(&sneaky)
        .validate(&invite_rules())
        .unwrap()
        .decode(&[]);
    assert!(decoded.is_ok());
}
