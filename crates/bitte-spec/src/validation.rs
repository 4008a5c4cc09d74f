//! Entry point of the pipeline: resolve the input, run the structural and extension checks and
//! fold everything into a single [`ValidationResult`].

use crate::{
    config::SpecConfig,
    errors::{ErrorObject, INVALID_SPEC_FORMAT, UNKNOWN_ERROR},
    fetch::{fetch_spec_with_retry, FetchOptions},
    format::{format_openapi_errors, format_schema_error},
    retry::RetryPolicy,
    schema::{parse_bitte_spec, BitteOpenApiSpec},
    structural::{OpenApiStructure, StructuralReport, StructuralValidator},
};
use eyre::Context as _;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
};
use tracing::{debug, info, warn};

pub const MISSING_SPEC_MESSAGE: &str = "Invalid url or spec provided. Exiting before validation.";
pub const INVALID_SPEC_FORMAT_MESSAGE: &str =
    "Invalid spec format. Must be valid JSON string or object.";

/// What a caller can hand to the validator.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecInput {
    Url(Url),
    /// JSON text, or a URL if it starts with `http`.
    Text(String),
    Document(Value),
}

impl SpecInput {
    fn is_url(&self) -> bool {
        match self {
            Self::Url(_) => true,
            Self::Text(s) => s.starts_with("http"),
            Self::Document(_) => false,
        }
    }
}

impl fmt::Display for SpecInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(u) => write!(f, "{u}"),
            Self::Text(s) => f.write_str(s),
            Self::Document(v) => write!(f, "{v}"),
        }
    }
}

impl From<Url> for SpecInput {
    fn from(u: Url) -> Self {
        Self::Url(u)
    }
}

impl From<String> for SpecInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for SpecInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<Value> for SpecInput {
    fn from(v: Value) -> Self {
        Self::Document(v)
    }
}

/// Verdict for one spec.
///
/// `valid == true` always comes with `schema` and no `error_message`; `valid == false` always
/// comes with an `error_message` (possibly empty) and no `schema`. Use the constructors to keep
/// that shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorObject>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<BitteOpenApiSpec>,
}

impl ValidationResult {
    pub const fn success(schema: BitteOpenApiSpec) -> Self {
        Self {
            valid: true,
            errors: None,
            error_message: None,
            schema: Some(schema),
        }
    }

    pub const fn failure(errors: Vec<ErrorObject>, error_message: String) -> Self {
        Self {
            valid: false,
            errors: Some(errors),
            error_message: Some(error_message),
            schema: None,
        }
    }

    /// Failure decided before any validation ran, e.g. no input at all.
    pub fn rejected(error_message: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: None,
            error_message: Some(error_message.into()),
            schema: None,
        }
    }

    fn single(code: &str, message: String) -> Self {
        Self::failure(vec![ErrorObject::new(code, message.clone())], message)
    }

    fn unknown(message: &str) -> Self {
        Self::failure(
            vec![ErrorObject::new(UNKNOWN_ERROR, message)],
            format!("Unknown error: {message}"),
        )
    }
}

/// Validator with its fetch settings and structural pass. Holds no per-call state and can be
/// shared across tasks.
pub struct SpecValidator {
    fetch: FetchOptions,
    retry: RetryPolicy,
    structural: Box<dyn StructuralValidator>,
}

impl Default for SpecValidator {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            retry: RetryPolicy::default(),
            structural: Box::new(OpenApiStructure),
        }
    }
}

impl fmt::Debug for SpecValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecValidator")
            .field("fetch", &self.fetch)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

enum Resolved {
    Document(Value),
    Failed(ValidationResult),
}

impl SpecValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &SpecConfig) -> eyre::Result<Self> {
        Ok(Self::default()
            .with_fetch_options(cfg.fetch.fetch_options().context("fetch options")?)
            .with_retry_policy(cfg.fetch.retry_policy()))
    }

    #[must_use]
    pub fn with_fetch_options(mut self, fetch: FetchOptions) -> Self {
        self.fetch = fetch;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_structural_validator(mut self, v: impl StructuralValidator + 'static) -> Self {
        self.structural = Box::new(v);
        self
    }

    /// Validate a plugin spec. Never fails: every problem, including unexpected ones, is
    /// reported in the returned result.
    pub async fn validate(&self, spec: Option<SpecInput>) -> ValidationResult {
        let Some(spec) = spec.filter(|s| !matches!(s, SpecInput::Document(Value::Null))) else {
            debug!("no spec provided");
            return ValidationResult::rejected(MISSING_SPEC_MESSAGE);
        };

        let result = match self.run(spec).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "spec validation aborted");
                ValidationResult::unknown(&format!("{e:#}"))
            }
        };
        info!(valid = result.valid, "spec validation finished");
        result
    }

    async fn run(&self, spec: SpecInput) -> eyre::Result<ValidationResult> {
        let document = match self.resolve(spec).await {
            Resolved::Document(v) => v,
            Resolved::Failed(r) => return Ok(r),
        };

        let report = self.structural_pass(&document)?;
        debug!(
            valid = report.valid,
            errors = report.errors.len(),
            "structural validation done"
        );

        // The extension check sees the normalized document, not the raw input.
        let parsed = parse_bitte_spec(report.schema.as_ref());

        match parsed {
            Ok(schema) if report.valid && report.schema.is_some() => {
                Ok(ValidationResult::success(schema))
            }
            parsed => {
                let schema_error = parsed.err();
                let mut errors = report.errors.clone();
                let mut blocks = Vec::with_capacity(2);
                if !report.errors.is_empty() {
                    blocks.push(format_openapi_errors(&report.errors));
                }
                if let Some(e) = &schema_error {
                    errors.extend(
                        e.issues
                            .iter()
                            .map(|i| ErrorObject::new(i.code(), i.message())),
                    );
                    blocks.push(format_schema_error(e));
                }
                Ok(ValidationResult::failure(errors, blocks.join("\n")))
            }
        }
    }

    async fn resolve(&self, spec: SpecInput) -> Resolved {
        let is_url = spec.is_url();
        let label = spec.to_string();

        let parsed = match spec {
            SpecInput::Document(v) => return Resolved::Document(v),
            SpecInput::Url(u) => self.fetch_json(u.as_str()).await,
            SpecInput::Text(s) if is_url => self.fetch_json(&s).await,
            SpecInput::Text(s) => serde_json::from_str::<Value>(&s).map_err(eyre::Report::new),
        };

        match parsed {
            Ok(v) => Resolved::Document(v),
            Err(e) => {
                warn!(error = %e, is_url, "could not resolve spec");
                let message = if is_url {
                    format!("Unable to fetch/parse spec at url: {label}")
                } else {
                    INVALID_SPEC_FORMAT_MESSAGE.to_owned()
                };
                Resolved::Failed(ValidationResult::single(INVALID_SPEC_FORMAT, message))
            }
        }
    }

    async fn fetch_json(&self, url: &str) -> eyre::Result<Value> {
        let text = fetch_spec_with_retry(url, &self.fetch, &self.retry).await?;
        serde_json::from_str(&text).context("decode fetched spec")
    }

    /// Structural validators are pluggable; a panicking one must not take the caller down.
    fn structural_pass(&self, document: &Value) -> eyre::Result<StructuralReport> {
        catch_unwind(AssertUnwindSafe(|| self.structural.validate(document))).map_err(|payload| {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "structural validator panicked".to_owned());
            eyre::eyre!(msg)
        })
    }
}

/// Validate a plugin spec with default settings. See [`SpecValidator::validate`].
pub async fn validate_bitte_plugin_spec(spec: Option<SpecInput>) -> ValidationResult {
    SpecValidator::default().validate(spec).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_urls() -> eyre::Result<()> {
        assert!(SpecInput::from("https://example.com/openapi.json").is_url());
        assert!(SpecInput::from("http://localhost:3000/.well-known/ai-plugin.json").is_url());
        assert!(SpecInput::Url(Url::parse("ftp://example.com/spec")?).is_url());
        assert!(!SpecInput::from("{\"openapi\":\"3.0.0\"}").is_url());
        assert!(!SpecInput::from(json!("https://example.com")).is_url());
        Ok(())
    }

    #[test]
    fn result_serializes_camel_case_without_absent_fields() -> eyre::Result<()> {
        let r = ValidationResult::rejected(MISSING_SPEC_MESSAGE);
        assert_eq!(
            serde_json::to_value(&r)?,
            json!({ "valid": false, "errorMessage": MISSING_SPEC_MESSAGE })
        );

        let r = ValidationResult::unknown("boom");
        assert_eq!(
            serde_json::to_value(&r)?,
            json!({
                "valid": false,
                "errors": [{ "message": "boom", "code": "UNKNOWN_ERROR" }],
                "errorMessage": "Unknown error: boom"
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn invalid_json_text_is_a_format_error() {
        let r = validate_bitte_plugin_spec(Some("{not json".into())).await;
        assert!(!r.valid);
        assert_eq!(r.error_message.as_deref(), Some(INVALID_SPEC_FORMAT_MESSAGE));
        assert_eq!(
            r.errors,
            Some(vec![ErrorObject::new(
                INVALID_SPEC_FORMAT,
                INVALID_SPEC_FORMAT_MESSAGE
            )])
        );
    }

    #[tokio::test]
    async fn json_null_counts_as_missing() {
        let r = validate_bitte_plugin_spec(Some(Value::Null.into())).await;
        assert_eq!(r, ValidationResult::rejected(MISSING_SPEC_MESSAGE));
    }
}
