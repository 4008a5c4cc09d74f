use super::{
    Assistant, BitteExtension, BitteOpenApiSpec, Info, License, OpenApiVersion, Server, Tool,
    ToolName,
};
use serde_json::{json, Map, Number, Value};

/// Reference spec with every optional field populated. Useful as a starting point for new
/// plugins and as a fixture.
pub fn example_bitte_spec() -> BitteOpenApiSpec {
    let operation = json!({
        "summary": "Generate an EVM transaction",
        "description": "Generate an EVM transaction",
        "responses": {
            "200": {
                "description": "A successful response",
                "content": {
                    "application/json": {
                        "schema": {
                            "type": "object",
                            "properties": { "message": { "type": "string" } }
                        }
                    }
                }
            }
        }
    });
    let path_item: Map<String, Value> = [("post".to_owned(), operation)].into_iter().collect();
    let paths: Map<String, Value> = [("/generate-evm-tx".to_owned(), Value::Object(path_item))]
        .into_iter()
        .collect();

    BitteOpenApiSpec {
        openapi: OpenApiVersion::V3_1_1,
        info: Info {
            title: "Bitte OpenAPI Agent Specification".into(),
            description: Some(
                "Reference spec for Bitte OpenAPI Agent Plugins and 'x-mb' extension".into(),
            ),
            version: "1.0.0".into(),
            license: Some(License {
                name: "MIT".into(),
                url: Some("https://opensource.org/licenses/MIT".into()),
            }),
        },
        paths,
        x_mb: BitteExtension {
            account_id: Some("example-account-id".into()),
            email: Some("example@example.com".into()),
            assistant: Assistant {
                name: "Example Agent".into(),
                description: "An example agent using the Bitte OpenAPI Agent Specification"
                    .into(),
                instructions: "This agent can generate EVM transactions and generate images"
                    .into(),
                image: Some("https://example.com/example-agent.png".into()),
                tools: Some(vec![
                    Tool {
                        kind: ToolName::GenerateEvmTx,
                    },
                    Tool {
                        kind: ToolName::GenerateImage,
                    },
                ]),
                categories: Some(vec!["evm".into(), "image".into()]),
                chain_ids: Some(vec![Number::from(1_u64), Number::from(137_u64)]),
                version: Some("1.0.0".into()),
                repo: Some("https://github.com/BitteProtocol/agent-next-boilerplate".into()),
            },
        },
        servers: Some(vec![Server {
            url: "https://docs.bitte.ai".into(),
            description: Some("Placeholder, replace with API endpoint for your plugin".into()),
        }]),
    }
}
