//! Generic OpenAPI shape checks, independent of the `x-mb` extension.

use crate::errors::ErrorObject;
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};

pub const INVALID_DOCUMENT: &str = "INVALID_DOCUMENT";
pub const UNSUPPORTED_VERSION: &str = "UNSUPPORTED_VERSION";
pub const MISSING_FIELD: &str = "MISSING_FIELD";
pub const INVALID_TYPE: &str = "INVALID_TYPE";
pub const INVALID_PATH: &str = "INVALID_PATH";
pub const INVALID_REFERENCE: &str = "INVALID_REFERENCE";

const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Outcome of a structural pass. `schema` is the normalized document handed to the extension
/// checker; it is `None` when the input could not be treated as a document at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuralReport {
    pub valid: bool,
    pub errors: Vec<ErrorObject>,
    pub schema: Option<Value>,
}

/// First-pass OpenAPI validation. Implementations report problems in the returned report and
/// never fail by other means.
pub trait StructuralValidator: Send + Sync {
    fn validate(&self, document: &Value) -> StructuralReport;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Major {
    V30,
    V31,
}

/// Built-in structural validator for OpenAPI 3.0 and 3.1 documents. Collects every problem it
/// finds rather than stopping at the first.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApiStructure;

impl StructuralValidator for OpenApiStructure {
    fn validate(&self, document: &Value) -> StructuralReport {
        let Value::Object(root) = document else {
            return StructuralReport {
                valid: false,
                errors: vec![ErrorObject::new(
                    INVALID_DOCUMENT,
                    "Document must be a JSON object",
                )],
                schema: None,
            };
        };

        let mut f = Findings::default();
        let major = f.version(root);
        f.info(root);
        f.paths(root, major);
        f.servers(root);
        f.tags(root);
        f.components(root);
        f.references(document, document, "");

        StructuralReport {
            valid: f.errors.is_empty(),
            errors: f.errors,
            schema: Some(document.clone()),
        }
    }
}

fn pointer(base: &str, key: &str) -> String {
    format!("{base}/{}", key.replace('~', "~0").replace('/', "~1"))
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_major(version: &str) -> Option<Major> {
    let (major, patch) = if let Some(rest) = version.strip_prefix("3.0.") {
        (Major::V30, rest)
    } else if let Some(rest) = version.strip_prefix("3.1.") {
        (Major::V31, rest)
    } else {
        return None;
    };
    (!patch.is_empty() && patch.bytes().all(|b| b.is_ascii_digit())).then_some(major)
}

#[derive(Default)]
struct Findings {
    errors: Vec<ErrorObject>,
}

impl Findings {
    fn push(&mut self, code: &str, message: String) {
        self.errors.push(ErrorObject::new(code, message));
    }

    fn missing(&mut self, at: &str, key: &str) {
        let at = if at.is_empty() { "/" } else { at };
        self.push(MISSING_FIELD, format!("{at} must have required property '{key}'"));
    }

    fn wrong_type(&mut self, at: &str, expected: &str, got: &Value) {
        self.push(
            INVALID_TYPE,
            format!("{at} must be {expected}, found {}", kind(got)),
        );
    }

    fn object<'a>(&mut self, v: &'a Value, at: &str) -> Option<&'a Map<String, Value>> {
        match v {
            Value::Object(m) => Some(m),
            other => {
                self.wrong_type(at, "an object", other);
                None
            }
        }
    }

    fn array<'a>(&mut self, v: &'a Value, at: &str) -> Option<&'a Vec<Value>> {
        match v {
            Value::Array(a) => Some(a),
            other => {
                self.wrong_type(at, "an array", other);
                None
            }
        }
    }

    fn required_string(&mut self, obj: &Map<String, Value>, at: &str, key: &str) {
        match obj.get(key) {
            None => self.missing(at, key),
            Some(Value::String(_)) => {}
            Some(other) => self.wrong_type(&pointer(at, key), "a string", other),
        }
    }

    fn optional_string(&mut self, obj: &Map<String, Value>, at: &str, key: &str) {
        match obj.get(key) {
            None | Some(Value::String(_)) => {}
            Some(other) => self.wrong_type(&pointer(at, key), "a string", other),
        }
    }

    fn version(&mut self, root: &Map<String, Value>) -> Option<Major> {
        match root.get("openapi") {
            Some(Value::String(v)) => {
                let major = parse_major(v);
                if major.is_none() {
                    self.push(
                        UNSUPPORTED_VERSION,
                        format!("Unsupported OpenAPI version: {v}. Expected 3.0.x or 3.1.x"),
                    );
                }
                major
            }
            _ if root.contains_key("swagger") => {
                self.push(
                    UNSUPPORTED_VERSION,
                    "Swagger 2.0 documents are not supported, convert the document to OpenAPI 3.x"
                        .to_owned(),
                );
                None
            }
            _ => {
                self.push(
                    UNSUPPORTED_VERSION,
                    "Cannot find supported Swagger/OpenAPI version in specification, version must be a string."
                        .to_owned(),
                );
                None
            }
        }
    }

    fn info(&mut self, root: &Map<String, Value>) {
        let Some(v) = root.get("info") else {
            self.missing("", "info");
            return;
        };
        let Some(info) = self.object(v, "/info") else {
            return;
        };
        self.required_string(info, "/info", "title");
        self.required_string(info, "/info", "version");
        self.optional_string(info, "/info", "description");
        if let Some(license) = info.get("license") {
            if let Some(license) = self.object(license, "/info/license") {
                self.required_string(license, "/info/license", "name");
                self.optional_string(license, "/info/license", "url");
            }
        }
    }

    fn paths(&mut self, root: &Map<String, Value>, major: Option<Major>) {
        let Some(v) = root.get("paths") else {
            if major == Some(Major::V31) {
                if !root.contains_key("components") && !root.contains_key("webhooks") {
                    self.push(
                        MISSING_FIELD,
                        "Document must define at least one of 'paths', 'components' or 'webhooks'"
                            .to_owned(),
                    );
                }
            } else {
                self.missing("", "paths");
            }
            return;
        };
        let Some(paths) = self.object(v, "/paths") else {
            return;
        };

        for (route, item) in paths {
            let at = pointer("/paths", route);
            // Specification extensions may sit alongside the routes.
            if route.starts_with("x-") {
                continue;
            }
            if !route.starts_with('/') {
                self.push(INVALID_PATH, format!("Path '{route}' must begin with '/'"));
            }
            let Some(item) = self.object(item, &at) else {
                continue;
            };
            if let Some(params) = item.get("parameters") {
                self.array(params, &pointer(&at, "parameters"));
            }
            for method in HTTP_METHODS {
                let Some(op) = item.get(method) else {
                    continue;
                };
                let op_at = pointer(&at, method);
                let Some(op) = self.object(op, &op_at) else {
                    continue;
                };
                match op.get("responses") {
                    None if major != Some(Major::V31) => self.missing(&op_at, "responses"),
                    None => {}
                    Some(responses) => {
                        self.object(responses, &pointer(&op_at, "responses"));
                    }
                }
            }
        }
    }

    fn servers(&mut self, root: &Map<String, Value>) {
        let Some(v) = root.get("servers") else {
            return;
        };
        let Some(servers) = self.array(v, "/servers") else {
            return;
        };
        for (i, s) in servers.iter().enumerate() {
            let at = format!("/servers/{i}");
            if let Some(s) = self.object(s, &at) {
                self.required_string(s, &at, "url");
            }
        }
    }

    fn tags(&mut self, root: &Map<String, Value>) {
        let Some(v) = root.get("tags") else {
            return;
        };
        let Some(tags) = self.array(v, "/tags") else {
            return;
        };
        for (i, t) in tags.iter().enumerate() {
            let at = format!("/tags/{i}");
            if let Some(t) = self.object(t, &at) {
                self.required_string(t, &at, "name");
            }
        }
    }

    fn components(&mut self, root: &Map<String, Value>) {
        let Some(v) = root.get("components") else {
            return;
        };
        let Some(components) = self.object(v, "/components") else {
            return;
        };
        for (section, entries) in components {
            self.object(entries, &pointer("/components", section));
        }
    }

    /// Every local `$ref` must point somewhere inside the document. External references are left
    /// to whoever bundles the document.
    fn references(&mut self, root: &Value, v: &Value, at: &str) {
        match v {
            Value::Object(m) => {
                for (k, child) in m {
                    let child_at = pointer(at, k);
                    if k == "$ref" {
                        match child {
                            Value::String(r) => {
                                if let Some(local) = r.strip_prefix('#') {
                                    // URI fragments are percent-encoded JSON pointers.
                                    let resolved = percent_decode_str(local)
                                        .decode_utf8()
                                        .ok()
                                        .and_then(|ptr| root.pointer(&ptr));
                                    if resolved.is_none() {
                                        self.push(
                                            INVALID_REFERENCE,
                                            format!("Can't resolve reference: {r} (at {at})"),
                                        );
                                    }
                                }
                            }
                            other => self.wrong_type(&child_at, "a string", other),
                        }
                        continue;
                    }
                    self.references(root, child, &child_at);
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    self.references(root, child, &format!("{at}/{i}"));
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
        }
    }
}
