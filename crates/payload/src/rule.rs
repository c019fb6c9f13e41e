//! Declarative structural validation
//!
//! A [`RuleSet`] describes the expected shape of a merged request record:
//! which fields must exist, their basic constraints, and cross-field
//! relations. Validation collects every issue in one pass — a request
//! missing three fields reports three issues, never one.
//!
//! Rule sets are compiled once at boot; [`RuleSet::compile`] rejects
//! malformed declarations (an unknown `same_as` target, a duplicate field)
//! as programming errors before any request is served.

use relay_errors::{Error, InternalError, ValidationIssue};
use serde_json::Value;
use uuid::Uuid;

const DEFAULT_MAX_ISSUES: usize = 64;

/// A single declarative constraint on one field.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Field must be present and non-null.
    Required,
    /// Value must be a string of at least this many characters.
    MinLength(usize),
    /// Value must be a string of at most this many characters.
    MaxLength(usize),
    /// Value must look like an email address.
    Email,
    /// Value must be a canonical uuid string.
    Uuid,
    /// Value must be one of the listed strings.
    OneOf(Vec<String>),
    /// Value must equal the named sibling field's value.
    SameAs(String),
    /// Value must be an object matching the nested rule set.
    Nested(Box<RuleSet>),
}

impl Rule {
    fn name(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::MinLength(_) => "min_length",
            Rule::MaxLength(_) => "max_length",
            Rule::Email => "email",
            Rule::Uuid => "uuid",
            Rule::OneOf(_) => "one_of",
            Rule::SameAs(_) => "same_as",
            Rule::Nested(_) => "object",
        }
    }
}

#[derive(Debug, Clone)]
struct FieldRules {
    field: String,
    rules: Vec<Rule>,
}

/// Compiled, declarative description of a record's expected shape.
#[derive(Debug, Clone)]
pub struct RuleSet {
    fields: Vec<FieldRules>,
    max_issues: usize,
}

/// Builder for [`RuleSet`]; see [`RuleSet::builder`].
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    fields: Vec<FieldRules>,
    max_issues: usize,
}

impl RuleSetBuilder {
    /// Declare rules for one field. Declaration order is report order.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, rules: impl Into<Vec<Rule>>) -> Self {
        self.fields.push(FieldRules {
            field: name.into(),
            rules: rules.into(),
        });
        self
    }

    /// Cap the number of issues reported per validation pass.
    #[must_use]
    pub fn max_issues(mut self, max: usize) -> Self {
        self.max_issues = max;
        self
    }

    /// Compile the declarations, rejecting malformed rule sets.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidRuleSet` internal error when a field is declared
    /// twice or a `same_as` rule names an undeclared field.
    pub fn compile(self) -> Result<RuleSet, Error> {
        let names: Vec<&str> = self.fields.iter().map(|f| f.field.as_str()).collect();
        for (index, field) in self.fields.iter().enumerate() {
            if names[..index].contains(&field.field.as_str()) {
                return Err(InternalError::invalid_rule_set(
                    "field",
                    &field.field,
                    "field declared twice",
                )
                .into());
            }
            for rule in &field.rules {
                if let Rule::SameAs(target) = rule {
                    if !names.contains(&target.as_str()) {
                        return Err(InternalError::invalid_rule_set(
                            rule.name(),
                            &field.field,
                            format!("unknown target field: {target}"),
                        )
                        .into());
                    }
                }
            }
        }
        Ok(RuleSet {
            fields: self.fields,
            max_issues: if self.max_issues == 0 {
                DEFAULT_MAX_ISSUES
            } else {
                self.max_issues
            },
        })
    }
}

impl RuleSet {
    #[must_use]
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::default()
    }

    /// Validate a record, collecting every issue.
    ///
    /// # Errors
    ///
    /// Returns the full issue list when any rule rejects the record.
    pub fn validate(&self, record: &Value) -> Result<(), Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        self.validate_at(record, &[], &mut issues);
        issues.truncate(self.max_issues);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    fn validate_at(&self, record: &Value, prefix: &[String], issues: &mut Vec<ValidationIssue>) {
        for field in &self.fields {
            let mut path: Vec<String> = prefix.to_vec();
            path.push(field.field.clone());
            let value = record.get(&field.field);
            let present = matches!(value, Some(v) if !v.is_null());

            for rule in &field.rules {
                match rule {
                    Rule::Required => {
                        if !present {
                            issues.push(ValidationIssue::new(
                                path.clone(),
                                "required field is missing",
                                rule.name(),
                                &field.field,
                            ));
                        }
                    }
                    // every other rule only applies when a value is present
                    _ if !present => {}
                    Rule::MinLength(min) => {
                        check_string(value, &path, &field.field, rule, issues, |s| {
                            if s.chars().count() < *min {
                                Some(format!("must be at least {min} characters"))
                            } else {
                                None
                            }
                        });
                    }
                    Rule::MaxLength(max) => {
                        check_string(value, &path, &field.field, rule, issues, |s| {
                            if s.chars().count() > *max {
                                Some(format!("must be at most {max} characters"))
                            } else {
                                None
                            }
                        });
                    }
                    Rule::Email => {
                        check_string(value, &path, &field.field, rule, issues, |s| {
                            if is_email_shaped(s) {
                                None
                            } else {
                                Some("must be a valid email address".to_string())
                            }
                        });
                    }
                    Rule::Uuid => {
                        check_string(value, &path, &field.field, rule, issues, |s| {
                            if Uuid::try_parse(s).is_ok() {
                                None
                            } else {
                                Some("must be a valid uuid".to_string())
                            }
                        });
                    }
                    Rule::OneOf(choices) => {
                        check_string(value, &path, &field.field, rule, issues, |s| {
                            if choices.iter().any(|c| c == s) {
                                None
                            } else {
                                Some(format!("must be one of: {}", choices.join(", ")))
                            }
                        });
                    }
                    Rule::SameAs(target) => {
                        if record.get(target) != value {
                            issues.push(ValidationIssue::new(
                                path.clone(),
                                format!("must be the same as {target}"),
                                rule.name(),
                                &field.field,
                            ));
                        }
                    }
                    Rule::Nested(nested) => match value {
                        Some(v @ Value::Object(_)) => nested.validate_at(v, &path, issues),
                        _ => {
                            issues.push(ValidationIssue::new(
                                path.clone(),
                                "must be an object",
                                rule.name(),
                                &field.field,
                            ));
                        }
                    },
                }
            }
        }
    }
}

fn check_string(
    value: Option<&Value>,
    path: &[String],
    field: &str,
    rule: &Rule,
    issues: &mut Vec<ValidationIssue>,
    check: impl Fn(&str) -> Option<String>,
) {
    match value.and_then(Value::as_str) {
        Some(s) => {
            if let Some(message) = check(s) {
                issues.push(ValidationIssue::new(path.to_vec(), message, rule.name(), field));
            }
        }
        None => {
            issues.push(ValidationIssue::new(
                path.to_vec(),
                "must be a string",
                rule.name(),
                field,
            ));
        }
    }
}

fn is_email_shaped(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !s.contains(char::is_whitespace)
        }
        None => false,
    }
}
