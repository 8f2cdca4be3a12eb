//! Provider router — selects the completion backend for a model name.
//!
//! An explicit `provider/model` prefix wins. Otherwise `claude*` goes to
//! Anthropic, `command*` to Cohere, and everything else to OpenAI.

use std::collections::HashMap;
use std::sync::Arc;

use rayo_config::RayoConfig;
use rayo_core::error::ProviderError;
use rayo_core::provider::Provider;
use tracing::{debug, warn};

use crate::anthropic::AnthropicProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Routes completion requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
}

/// Split a model string into `(provider, model)`.
pub fn route_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        if rayo_config::KNOWN_PROVIDERS.contains(&prefix) && !rest.is_empty() {
            return (prefix, rest);
        }
    }

    let lower = model.to_ascii_lowercase();
    let provider = if lower.starts_with("claude") {
        "anthropic"
    } else if lower.starts_with("command") {
        "cohere"
    } else {
        "openai"
    };
    (provider, model)
}

impl ProviderRouter {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// Resolve the provider for `model`, returning it with the bare model name.
    pub fn resolve(&self, model: &str) -> Result<(Arc<dyn Provider>, String), ProviderError> {
        let (provider_name, bare_model) = route_model(model);
        debug!(model, provider = provider_name, "Routing model");
        self.get(provider_name)
            .map(|p| (p, bare_model.to_string()))
            .ok_or_else(|| {
                ProviderError::NotConfigured(format!(
                    "No API key configured for '{provider_name}' (needed by model '{model}')"
                ))
            })
    }

    /// List all registered provider names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ProviderRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a provider for every configured API key.
pub fn build_from_config(config: &RayoConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new();

    for name in rayo_config::KNOWN_PROVIDERS {
        let Some(api_key) = config.api_key_for(name) else {
            continue;
        };
        let api_url = config.api_url_for(name);

        let provider: Arc<dyn Provider> = match name {
            "anthropic" => {
                let mut p = AnthropicProvider::new(api_key);
                if let Some(url) = api_url {
                    p = p.with_base_url(url);
                }
                Arc::new(p)
            }
            "azure" => match api_url {
                Some(url) => Arc::new(OpenAiCompatProvider::new(name, url, api_key)),
                None => {
                    warn!("Azure API key set but no providers.azure.api_url; skipping");
                    continue;
                }
            },
            _ => {
                let url = api_url.unwrap_or_else(|| default_base_url(name));
                Arc::new(OpenAiCompatProvider::new(name, url, api_key))
            }
        };

        router.register(name, provider);
    }

    router
}

fn default_base_url(provider_name: &str) -> &'static str {
    match provider_name {
        "cohere" => crate::openai_compat::COHERE_BASE_URL,
        _ => crate::openai_compat::OPENAI_BASE_URL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_keys(keys: &[(&str, &str)]) -> RayoConfig {
        let mut config = RayoConfig::default();
        for (provider, key) in keys {
            config.api_keys.insert(provider.to_string(), key.to_string());
        }
        config
    }

    #[test]
    fn routes_by_model_family() {
        assert_eq!(route_model("gpt-4"), ("openai", "gpt-4"));
        assert_eq!(
            route_model("claude-3-opus-20240229"),
            ("anthropic", "claude-3-opus-20240229")
        );
        assert_eq!(route_model("command-r-plus"), ("cohere", "command-r-plus"));
    }

    #[test]
    fn explicit_prefix_wins() {
        assert_eq!(route_model("azure/gpt-4o"), ("azure", "gpt-4o"));
        assert_eq!(route_model("openai/claude-proxy"), ("openai", "claude-proxy"));
        // Unknown prefixes stay part of the model name.
        assert_eq!(
            route_model("meta-llama/Llama-3-8b"),
            ("openai", "meta-llama/Llama-3-8b")
        );
    }

    #[test]
    fn builds_only_configured_providers() {
        let router = build_from_config(&config_with_keys(&[("openai", "sk-1"), ("anthropic", "")]));
        assert_eq!(router.list(), vec!["openai"]);
    }

    #[test]
    fn azure_requires_endpoint() {
        let mut config = config_with_keys(&[("azure", "az-key")]);
        assert!(build_from_config(&config).get("azure").is_none());

        config.providers.insert(
            "azure".into(),
            rayo_config::ProviderConfig {
                api_url: Some("https://example.openai.azure.com/openai/v1".into()),
            },
        );
        assert!(build_from_config(&config).get("azure").is_some());
    }

    #[test]
    fn resolve_reports_missing_provider() {
        let router = build_from_config(&config_with_keys(&[("openai", "sk-1")]));
        let (provider, model) = router.resolve("gpt-4").unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(model, "gpt-4");

        let err = router.resolve("claude-3-haiku").err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }
}
