use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use margie::config::{Config, OpenAiConfig, SearchConfig};

pub const CHAT_MODEL: &str = "gpt-4o";
pub const OPENAI_KEY: &str = "openai-secret";
pub const SEARCH_ENDPOINT: &str = "https://search.example.net";
pub const SEARCH_KEY: &str = "search-secret";
pub const INDEX_NAME: &str = "margies-travel";
pub const EMBEDDING_MODEL: &str = "text-embedding-ada-002";

pub const PARIS_QUESTION: &str = "What hotels are available in Paris?";
pub const PARIS_ANSWER: &str = "Margie's Travel Agency offers three hotels in Paris.";

/// Every variable the binary reads from the environment
pub const ENV_VARS: [&str; 12] = [
    "OPENAI_ENDPOINT",
    "OPENAI_API_KEY",
    "CHAT_MODEL",
    "EMBEDDING_MODEL",
    "SEARCH_ENDPOINT",
    "SEARCH_API_KEY",
    "INDEX_NAME",
    "MARGIE_API_VERSION",
    "MARGIE_QUERY_TYPE",
    "MARGIE_BIND",
    "MARGIE_CONFIG",
    "RUST_LOG",
];

/// Completions path for the test deployment
#[allow(dead_code)]
pub fn completions_path() -> String {
    format!("/openai/deployments/{}/chat/completions", CHAT_MODEL)
}

/// Validated configuration whose chat endpoint is `openai_endpoint`
#[allow(dead_code)]
pub fn test_config(openai_endpoint: &str) -> Config {
    Config {
        openai: OpenAiConfig {
            endpoint: openai_endpoint.to_string(),
            api_key: OPENAI_KEY.to_string(),
            chat_model: CHAT_MODEL.to_string(),
            ..OpenAiConfig::default()
        },
        search: SearchConfig {
            endpoint: SEARCH_ENDPOINT.to_string(),
            api_key: SEARCH_KEY.to_string(),
            index_name: INDEX_NAME.to_string(),
            embedding_model: EMBEDDING_MODEL.to_string(),
            ..SearchConfig::default()
        },
        ..Config::default()
    }
}

/// Minimal successful chat-completions response
#[allow(dead_code)]
pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "finish_reason": "stop",
            "message": { "role": "assistant", "content": content }
        }],
        "usage": { "prompt_tokens": 42, "completion_tokens": 9, "total_tokens": 51 }
    })
}

/// The `azure_search` entry every request must carry
#[allow(dead_code)]
pub fn expected_data_source() -> Value {
    json!({
        "type": "azure_search",
        "parameters": {
            "endpoint": SEARCH_ENDPOINT,
            "index_name": INDEX_NAME,
            "authentication": { "type": "api_key", "key": SEARCH_KEY },
            "query_type": "vector",
            "embedding_dependency": {
                "type": "deployment_name",
                "deployment_name": EMBEDDING_MODEL
            }
        }
    })
}

/// Writes a `.env` file pointing the binary at `openai_endpoint`
#[allow(dead_code)]
pub fn write_env_file(dir: &Path, openai_endpoint: &str) -> PathBuf {
    let path = dir.join(".env");
    let contents = format!(
        "OPENAI_ENDPOINT={}\nOPENAI_API_KEY={}\nCHAT_MODEL={}\nEMBEDDING_MODEL={}\nSEARCH_ENDPOINT={}\nSEARCH_API_KEY={}\nINDEX_NAME={}\n",
        openai_endpoint, OPENAI_KEY, CHAT_MODEL, EMBEDDING_MODEL, SEARCH_ENDPOINT, SEARCH_KEY, INDEX_NAME
    );
    fs::write(&path, contents).expect("failed to write .env file");
    path
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("margie.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
