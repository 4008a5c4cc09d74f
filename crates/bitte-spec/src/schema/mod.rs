//! Typed model of an agent plugin spec: an OpenAPI document carrying the `x-mb` extension.

mod example;
mod extension;
mod json_schema;

pub use example::example_bitte_spec;
pub use extension::{parse_bitte_spec, IssueKind, PathSegment, SchemaError, SchemaIssue, ValueKind};
pub use json_schema::bitte_extension_json_schema;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Literal key under which agent configuration lives in the OpenAPI document.
pub const X_MB_KEY: &str = "x-mb";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpenApiVersion {
    #[serde(rename = "3.0.0")]
    V3_0_0,
    #[serde(rename = "3.0.1")]
    V3_0_1,
    #[serde(rename = "3.0.2")]
    V3_0_2,
    #[serde(rename = "3.0.3")]
    V3_0_3,
    #[serde(rename = "3.0.4")]
    V3_0_4,
    #[serde(rename = "3.1.0")]
    V3_1_0,
    #[serde(rename = "3.1.1")]
    V3_1_1,
}

impl OpenApiVersion {
    pub const ALL: [Self; 7] = [
        Self::V3_0_0,
        Self::V3_0_1,
        Self::V3_0_2,
        Self::V3_0_3,
        Self::V3_0_4,
        Self::V3_1_0,
        Self::V3_1_1,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V3_0_0 => "3.0.0",
            Self::V3_0_1 => "3.0.1",
            Self::V3_0_2 => "3.0.2",
            Self::V3_0_3 => "3.0.3",
            Self::V3_0_4 => "3.0.4",
            Self::V3_1_0 => "3.1.0",
            Self::V3_1_1 => "3.1.1",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

/// Primitive tools an agent may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolName {
    #[serde(rename = "transfer-ft")]
    TransferFt,
    #[serde(rename = "generate-transaction")]
    GenerateTransaction,
    #[serde(rename = "submit-query")]
    SubmitQuery,
    #[serde(rename = "generate-image")]
    GenerateImage,
    #[serde(rename = "create-drop")]
    CreateDrop,
    #[serde(rename = "getSwapTransactions")]
    GetSwapTransactions,
    #[serde(rename = "getTokenMetadata")]
    GetTokenMetadata,
    #[serde(rename = "generate-evm-tx")]
    GenerateEvmTx,
    #[serde(rename = "render-chart")]
    RenderChart,
    #[serde(rename = "share-twitter")]
    ShareTwitter,
    #[serde(rename = "sign-message")]
    SignMessage,
}

impl ToolName {
    pub const ALL: [Self; 11] = [
        Self::TransferFt,
        Self::GenerateTransaction,
        Self::SubmitQuery,
        Self::GenerateImage,
        Self::CreateDrop,
        Self::GetSwapTransactions,
        Self::GetTokenMetadata,
        Self::GenerateEvmTx,
        Self::RenderChart,
        Self::ShareTwitter,
        Self::SignMessage,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TransferFt => "transfer-ft",
            Self::GenerateTransaction => "generate-transaction",
            Self::SubmitQuery => "submit-query",
            Self::GenerateImage => "generate-image",
            Self::CreateDrop => "create-drop",
            Self::GetSwapTransactions => "getSwapTransactions",
            Self::GetTokenMetadata => "getTokenMetadata",
            Self::GenerateEvmTx => "generate-evm-tx",
            Self::RenderChart => "render-chart",
            Self::ShareTwitter => "share-twitter",
            Self::SignMessage => "sign-message",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// A validated agent plugin spec. Only the declared fields survive parsing; other top-level
/// OpenAPI keys (`components`, `tags`, ...) are checked structurally but not carried here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitteOpenApiSpec {
    pub openapi: OpenApiVersion,
    pub info: Info,
    /// Path string to path item. Every value is a JSON object; its contents are unconstrained.
    pub paths: Map<String, Value>,
    #[serde(rename = "x-mb")]
    pub x_mb: BitteExtension,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The `x-mb` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitteExtension {
    /// NEAR account that owns the plugin.
    #[serde(rename = "account-id", default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub assistant: Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assistant {
    pub name: String,
    pub description: String,
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// EVM chain IDs. Kept as JSON numbers so values round-trip exactly.
    #[serde(rename = "chainIds", default, skip_serializing_if = "Option::is_none")]
    pub chain_ids: Option<Vec<Number>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    #[serde(rename = "type")]
    pub kind: ToolName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_strings_match_serde_names() -> eyre::Result<()> {
        for t in ToolName::ALL {
            assert_eq!(serde_json::to_value(t)?, Value::String(t.as_str().to_owned()));
            assert_eq!(ToolName::parse(t.as_str()), Some(t));
        }
        for v in OpenApiVersion::ALL {
            assert_eq!(serde_json::to_value(v)?, Value::String(v.as_str().to_owned()));
            assert_eq!(OpenApiVersion::parse(v.as_str()), Some(v));
        }
        assert_eq!(ToolName::parse("function"), None);
        assert_eq!(OpenApiVersion::parse("3.0.5"), None);
        Ok(())
    }
}
