use serde::{Deserialize, Serialize};

/// API ingress configuration, read from `modules.api_ingress`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
    /// `*` allows any origin; anything else is a single exact origin.
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
    /// Serve the OpenAPI document at `/openapi.json`.
    #[serde(default = "default_true")]
    pub enable_docs: bool,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            cors_enabled: true,
            cors_origin: default_cors_origin(),
            enable_docs: true,
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cors_origin() -> String {
    "*".to_string()
}

fn default_body_limit_bytes() -> usize {
    1024 * 1024
}
