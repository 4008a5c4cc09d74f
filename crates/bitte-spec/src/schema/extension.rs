//! Field-by-field checker for the plugin spec shape.
//!
//! Fields are visited in declaration order and the first violation ends the walk, so a spec with
//! several problems always reports the same one.

use super::{
    Assistant, BitteExtension, BitteOpenApiSpec, Info, License, OpenApiVersion, Server, Tool,
    ToolName, X_MB_KEY,
};
use serde_json::{Map, Number, Value};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// JSON kind of a value as seen by the checker. An absent field is `Undefined`, which is distinct
/// from an explicit `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub const fn of(v: Option<&Value>) -> Self {
        match v {
            None => Self::Undefined,
            Some(Value::Null) => Self::Null,
            Some(Value::Bool(_)) => Self::Boolean,
            Some(Value::Number(_)) => Self::Number,
            Some(Value::String(_)) => Self::String,
            Some(Value::Array(_)) => Self::Array,
            Some(Value::Object(_)) => Self::Object,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// `expected` is a type name (`string`, `object`, ...) or, for enumerations, the quoted
    /// alternation of allowed values.
    InvalidType {
        expected: String,
        received: ValueKind,
    },
    InvalidEnumValue {
        options: Vec<String>,
        received: String,
    },
    /// None of the allowed literals matched.
    InvalidUnion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    pub path: Vec<PathSegment>,
    pub kind: IssueKind,
}

impl SchemaIssue {
    pub const fn code(&self) -> &'static str {
        match self.kind {
            IssueKind::InvalidType { .. } => "invalid_type",
            IssueKind::InvalidEnumValue { .. } => "invalid_enum_value",
            IssueKind::InvalidUnion => "invalid_union",
        }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            IssueKind::InvalidType {
                received: ValueKind::Undefined,
                ..
            } => "Required".to_owned(),
            IssueKind::InvalidType { expected, received } => {
                format!("Expected {expected}, received {received}")
            }
            IssueKind::InvalidEnumValue { options, received } => format!(
                "Invalid enum value. Expected {}, received '{received}'",
                quoted_alternation(options.iter().map(String::as_str))
            ),
            IssueKind::InvalidUnion => "Invalid input".to_owned(),
        }
    }

    /// Dot-joined path, e.g. `x-mb.assistant.tools.0.type`. Empty for the document root.
    pub fn dotted_path(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Why a document does not match the plugin spec shape. The checker stops at the first
/// violation, so `issues` holds at most one entry in practice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct SchemaError {
    pub issues: Vec<SchemaIssue>,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return f.write_str("schema validation failed");
        }
        let parts: Vec<String> = self
            .issues
            .iter()
            .map(|i| format!("{}: {}", i.dotted_path(), i.message()))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl From<SchemaIssue> for SchemaError {
    fn from(issue: SchemaIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }
}

pub(crate) fn quoted_alternation<'a>(options: impl IntoIterator<Item = &'a str>) -> String {
    options
        .into_iter()
        .map(|o| format!("'{o}'"))
        .collect::<Vec<_>>()
        .join(" | ")
}

type Parsed<T> = Result<T, SchemaIssue>;

#[derive(Debug, Clone, Default)]
struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    fn key(&self, k: &str) -> Self {
        let mut next = self.0.clone();
        next.push(PathSegment::Key(k.to_owned()));
        Self(next)
    }

    fn index(&self, i: usize) -> Self {
        let mut next = self.0.clone();
        next.push(PathSegment::Index(i));
        Self(next)
    }

    fn issue(&self, kind: IssueKind) -> SchemaIssue {
        SchemaIssue {
            path: self.0.clone(),
            kind,
        }
    }

    fn invalid_type(&self, expected: impl Into<String>, v: Option<&Value>) -> SchemaIssue {
        self.issue(IssueKind::InvalidType {
            expected: expected.into(),
            received: ValueKind::of(v),
        })
    }
}

fn object<'a>(v: Option<&'a Value>, path: &FieldPath) -> Parsed<&'a Map<String, Value>> {
    match v {
        Some(Value::Object(m)) => Ok(m),
        other => Err(path.invalid_type("object", other)),
    }
}

fn string(v: Option<&Value>, path: &FieldPath) -> Parsed<String> {
    match v {
        Some(Value::String(s)) => Ok(s.clone()),
        other => Err(path.invalid_type("string", other)),
    }
}

fn number(v: Option<&Value>, path: &FieldPath) -> Parsed<Number> {
    match v {
        Some(Value::Number(n)) => Ok(n.clone()),
        other => Err(path.invalid_type("number", other)),
    }
}

/// Absent is fine; anything present (including `null`) must satisfy `parse`.
fn optional<'a, T>(
    v: Option<&'a Value>,
    path: &FieldPath,
    parse: impl FnOnce(Option<&'a Value>, &FieldPath) -> Parsed<T>,
) -> Parsed<Option<T>> {
    match v {
        None => Ok(None),
        Some(_) => parse(v, path).map(Some),
    }
}

fn array<'a, T>(
    v: Option<&'a Value>,
    path: &FieldPath,
    item: impl Fn(Option<&'a Value>, &FieldPath) -> Parsed<T>,
) -> Parsed<Vec<T>> {
    let Some(Value::Array(items)) = v else {
        return Err(path.invalid_type("array", v));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, x)| item(Some(x), &path.index(i)))
        .collect()
}

fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key)
}

fn tool_name(v: Option<&Value>, path: &FieldPath) -> Parsed<ToolName> {
    let options = ToolName::ALL.map(ToolName::as_str);
    let Some(Value::String(s)) = v else {
        return Err(path.invalid_type(quoted_alternation(options), v));
    };
    ToolName::parse(s).ok_or_else(|| {
        path.issue(IssueKind::InvalidEnumValue {
            options: options.iter().map(|&o| o.to_owned()).collect(),
            received: s.clone(),
        })
    })
}

fn openapi_version(v: Option<&Value>, path: &FieldPath) -> Parsed<OpenApiVersion> {
    v.and_then(Value::as_str)
        .and_then(OpenApiVersion::parse)
        .ok_or_else(|| path.issue(IssueKind::InvalidUnion))
}

fn license(v: Option<&Value>, path: &FieldPath) -> Parsed<License> {
    let obj = object(v, path)?;
    Ok(License {
        name: string(field(obj, "name"), &path.key("name"))?,
        url: optional(field(obj, "url"), &path.key("url"), string)?,
    })
}

fn info(v: Option<&Value>, path: &FieldPath) -> Parsed<Info> {
    let obj = object(v, path)?;
    Ok(Info {
        title: string(field(obj, "title"), &path.key("title"))?,
        description: optional(field(obj, "description"), &path.key("description"), string)?,
        version: string(field(obj, "version"), &path.key("version"))?,
        license: optional(field(obj, "license"), &path.key("license"), license)?,
    })
}

fn paths(v: Option<&Value>, path: &FieldPath) -> Parsed<Map<String, Value>> {
    let obj = object(v, path)?;
    for (key, item) in obj {
        object(Some(item), &path.key(key))?;
    }
    Ok(obj.clone())
}

fn tool(v: Option<&Value>, path: &FieldPath) -> Parsed<Tool> {
    let obj = object(v, path)?;
    Ok(Tool {
        kind: tool_name(field(obj, "type"), &path.key("type"))?,
    })
}

fn assistant(v: Option<&Value>, path: &FieldPath) -> Parsed<Assistant> {
    let obj = object(v, path)?;
    let f = |key: &str| (field(obj, key), path.key(key));

    let (name, p) = f("name");
    let name = string(name, &p)?;
    let (description, p) = f("description");
    let description = string(description, &p)?;
    let (instructions, p) = f("instructions");
    let instructions = string(instructions, &p)?;
    let (image, p) = f("image");
    let image = optional(image, &p, string)?;
    let (tools, p) = f("tools");
    let tools = optional(tools, &p, |v, p| array(v, p, tool))?;
    let (categories, p) = f("categories");
    let categories = optional(categories, &p, |v, p| array(v, p, string))?;
    let (chain_ids, p) = f("chainIds");
    let chain_ids = optional(chain_ids, &p, |v, p| array(v, p, number))?;
    let (version, p) = f("version");
    let version = optional(version, &p, string)?;
    let (repo, p) = f("repo");
    let repo = optional(repo, &p, string)?;

    Ok(Assistant {
        name,
        description,
        instructions,
        image,
        tools,
        categories,
        chain_ids,
        version,
        repo,
    })
}

fn extension(v: Option<&Value>, path: &FieldPath) -> Parsed<BitteExtension> {
    let obj = object(v, path)?;
    Ok(BitteExtension {
        account_id: optional(field(obj, "account-id"), &path.key("account-id"), string)?,
        email: optional(field(obj, "email"), &path.key("email"), string)?,
        assistant: assistant(field(obj, "assistant"), &path.key("assistant"))?,
    })
}

fn server(v: Option<&Value>, path: &FieldPath) -> Parsed<Server> {
    let obj = object(v, path)?;
    Ok(Server {
        url: string(field(obj, "url"), &path.key("url"))?,
        description: optional(field(obj, "description"), &path.key("description"), string)?,
    })
}

fn document(v: Option<&Value>) -> Parsed<BitteOpenApiSpec> {
    let root = FieldPath::default();
    let obj = object(v, &root)?;
    Ok(BitteOpenApiSpec {
        openapi: openapi_version(field(obj, "openapi"), &root.key("openapi"))?,
        info: info(field(obj, "info"), &root.key("info"))?,
        paths: paths(field(obj, "paths"), &root.key("paths"))?,
        x_mb: extension(field(obj, X_MB_KEY), &root.key(X_MB_KEY))?,
        servers: optional(field(obj, "servers"), &root.key("servers"), |v, p| {
            array(v, p, server)
        })?,
    })
}

/// Check `doc` against the plugin spec shape and return the typed value, or the first
/// violation. `None` stands for a missing document.
pub fn parse_bitte_spec(doc: Option<&Value>) -> Result<BitteOpenApiSpec, SchemaError> {
    document(doc).map_err(SchemaError::from)
}
