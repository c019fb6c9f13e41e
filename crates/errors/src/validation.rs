//! Issue shapes shared by the structural validator and the schema codec.

use serde::{Deserialize, Serialize};

/// One structural validation problem. The validator collects every issue in
/// a pass; a request with three problems produces three of these.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Path into the merged request record (e.g. `["profile", "email"]`).
    pub path: Vec<String>,
    /// Human-readable description of the problem.
    pub message: String,
    /// Name of the rule that rejected the value.
    pub rule: String,
    /// Field the rule was declared on (for cross-field rules this is the
    /// declaring field, while `path` may reference the other field too).
    pub field: String,
}

impl ValidationIssue {
    #[must_use]
    pub fn new(
        path: Vec<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            path,
            message: message.into(),
            rule: rule.into(),
            field: field.into(),
        }
    }
}

/// One schema decode problem, flat form of the codec's issue tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIssue {
    pub path: Vec<String>,
    pub message: String,
}

impl SchemaIssue {
    #[must_use]
    pub fn new(path: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_serializes_with_contract_fields() {
        let issue = ValidationIssue::new(
            vec!["email_address".into()],
            "required field is missing",
            "required",
            "email_address",
        );
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["path"][0], "email_address");
        assert_eq!(json["rule"], "required");
        assert_eq!(json["field"], "email_address");
        assert!(!json["message"].as_str().unwrap().is_empty());
    }
}
