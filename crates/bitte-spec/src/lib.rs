//! Validation pipeline for agent plugin specs: OpenAPI documents carrying the `x-mb` extension.
//!
//! ```no_run
//! # async fn demo() {
//! use bitte_spec::{validate_bitte_plugin_spec, SpecInput};
//!
//! let result = validate_bitte_plugin_spec(Some(SpecInput::from(
//!     "https://example.com/.well-known/ai-plugin.json",
//! )))
//! .await;
//! if !result.valid {
//!     eprintln!("{}", result.error_message.unwrap_or_default());
//! }
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod fetch;
pub mod format;
pub mod retry;
pub mod schema;
pub mod structural;
pub mod validation;

pub use config::{FetchConfig, SpecConfig};
pub use errors::{ErrorObject, FetchError};
pub use fetch::{fetch_spec_with_retry, FetchOptions};
pub use format::{format_openapi_error, format_openapi_errors, format_schema_error};
pub use retry::RetryPolicy;
pub use schema::{
    bitte_extension_json_schema, example_bitte_spec, parse_bitte_spec, BitteOpenApiSpec,
    OpenApiVersion, SchemaError, ToolName, X_MB_KEY,
};
pub use structural::{OpenApiStructure, StructuralReport, StructuralValidator};
pub use validation::{validate_bitte_plugin_spec, SpecInput, SpecValidator, ValidationResult};
