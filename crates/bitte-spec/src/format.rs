//! User-facing messages for validation failures.
//!
//! The wording here is asserted on by callers; treat changes as breaking.

use crate::{
    errors::ErrorObject,
    schema::{IssueKind, SchemaError, ValueKind},
};

/// Shown instead of a path when the whole document is missing.
pub const CHECK_SPEC_HINT: &str =
    "OpenAPI validation error.  Please check your OpenAPI spec for errors.";

/// Render the first issue of a schema error as a single line.
pub fn format_schema_error(error: &SchemaError) -> String {
    let Some(first) = error.issues.first() else {
        return error.to_string();
    };
    let path = first.dotted_path();

    match &first.kind {
        IssueKind::InvalidType {
            expected,
            received: ValueKind::Undefined,
        } => {
            if path.is_empty() {
                CHECK_SPEC_HINT.to_owned()
            } else {
                format!("Missing field {path} expected {expected}")
            }
        }
        IssueKind::InvalidType { expected, received } => {
            format!("Invalid type. Expected {path} {expected}, received {received}")
        }
        IssueKind::InvalidEnumValue { .. } | IssueKind::InvalidUnion => {
            let message = first.message();
            if path.is_empty() {
                format!("{message} ")
            } else {
                format!("{message} for {path}")
            }
        }
    }
}

pub fn format_openapi_error(error: &ErrorObject) -> String {
    format!("{} {}", error.code_or_default(), error.message)
}

pub fn format_openapi_errors(errors: &[ErrorObject]) -> String {
    errors
        .iter()
        .map(format_openapi_error)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{PathSegment, SchemaIssue};

    fn single(path: &[&str], kind: IssueKind) -> SchemaError {
        SchemaError::from(SchemaIssue {
            path: path
                .iter()
                .map(|s| {
                    s.parse::<usize>()
                        .map_or_else(|_| PathSegment::Key((*s).to_owned()), PathSegment::Index)
                })
                .collect(),
            kind,
        })
    }

    #[test]
    fn missing_field_names_path_and_expected_type() {
        let e = single(
            &["x-mb", "assistant", "name"],
            IssueKind::InvalidType {
                expected: "string".into(),
                received: ValueKind::Undefined,
            },
        );
        assert_eq!(
            format_schema_error(&e),
            "Missing field x-mb.assistant.name expected string"
        );
    }

    #[test]
    fn missing_root_gets_generic_hint() {
        let e = single(
            &[],
            IssueKind::InvalidType {
                expected: "object".into(),
                received: ValueKind::Undefined,
            },
        );
        assert_eq!(format_schema_error(&e), CHECK_SPEC_HINT);
    }

    #[test]
    fn wrong_type_includes_received_kind() {
        let e = single(
            &["x-mb", "assistant", "tools", "0"],
            IssueKind::InvalidType {
                expected: "object".into(),
                received: ValueKind::Number,
            },
        );
        assert_eq!(
            format_schema_error(&e),
            "Invalid type. Expected x-mb.assistant.tools.0 object, received number"
        );
    }

    #[test]
    fn other_issues_use_message_and_path() {
        let e = single(
            &["openapi"],
            IssueKind::InvalidUnion,
        );
        assert_eq!(format_schema_error(&e), "Invalid input for openapi");

        let e = single(
            &[],
            IssueKind::InvalidEnumValue {
                options: vec!["a".into(), "b".into()],
                received: "c".into(),
            },
        );
        assert_eq!(
            format_schema_error(&e),
            "Invalid enum value. Expected 'a' | 'b', received 'c' "
        );
    }

    #[test]
    fn empty_schema_error_falls_back_to_display() {
        let e = SchemaError { issues: vec![] };
        assert_eq!(format_schema_error(&e), "schema validation failed");
    }

    #[test]
    fn openapi_errors_join_with_newlines_and_default_code() {
        let errors = vec![
            ErrorObject::new("INVALID_REFERENCE", "Can't resolve reference: #/components/x"),
            ErrorObject::uncoded("/info must have required property 'title'"),
        ];
        assert_eq!(
            format_openapi_errors(&errors),
            "INVALID_REFERENCE Can't resolve reference: #/components/x\nOPENAPI_ERROR /info must have required property 'title'"
        );
        assert_eq!(format_openapi_errors(&[]), "");
    }
}
