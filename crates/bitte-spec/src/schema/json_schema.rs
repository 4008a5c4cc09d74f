use super::ToolName;
use serde_json::{json, Value};

/// JSON Schema for the `x-mb` object, for use as a `$ref` target or inline in editor tooling.
pub fn bitte_extension_json_schema() -> Value {
    let tool_names: Vec<&str> = ToolName::ALL.iter().map(|t| t.as_str()).collect();

    json!({
      "type": "object",
      "title": "Bitte Extension Schema",
      "description": "Additional metadata for the Bitte plugin extension",
      "required": ["assistant"],
      "properties": {
        "account-id": { "type": "string", "description": "Specifies the NEAR blockchain account ID associated with the plugin" },
        "email": { "type": "string", "description": "Specifies the email address associated with this plugin" },
        "assistant": {
          "type": "object",
          "title": "Agent Configuration",
          "description": "Configuration for the agent",
          "required": ["name", "description", "instructions"],
          "properties": {
            "name": { "type": "string", "description": "The name of the agent. Example: 'Weather Agent'" },
            "description": { "type": "string", "description": "A summary of the agent's functionalities" },
            "instructions": { "type": "string", "description": "Instructions defining the agent's role" },
            "image": { "type": "string", "description": "URL to an image representing the agent" },
            "categories": { "type": "array", "description": "Tags that categorize your agent", "items": { "type": "string" } },
            "chainIds": { "type": "array", "description": "Array of EVM chain IDs the agent operates on", "items": { "type": "number" } },
            "version": { "type": "string", "description": "Version of the agent" },
            "repo": { "type": "string", "description": "Link to the code repository for the agent" },
            "tools": {
              "type": "array",
              "description": "List of tools the agent can use",
              "items": {
                "type": "object",
                "properties": {
                  "type": { "type": "string", "enum": tool_names, "description": "Provider-specific tool executable by the runtime" }
                }
              }
            }
          }
        }
      }
    })
}
