//! `rayo config` — Interactive setup wizard.

use dialoguer::{Input, Password};
use rayo_config::{KNOWN_PROVIDERS, RayoConfig};

/// Raw wizard answers before validation.
#[derive(Debug, Default)]
struct Answers {
    /// New key per provider; `None` keeps whatever is configured.
    keys: Vec<(String, Option<String>)>,
    azure_url: Option<String>,
    model: String,
    max_tokens: String,
    temperature: String,
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║            Rayo CLI Setup Wizard             ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Let's configure your AI coding assistant!");

    // Env overrides are left out so they never get written to disk
    let path = RayoConfig::config_path();
    let existing = RayoConfig::load_from(&path).unwrap_or_else(|e| {
        println!("  ⚠ Ignoring existing config: {e}");
        RayoConfig::default()
    });

    let prompt_existing = existing.clone();
    let answers = tokio::task::spawn_blocking(move || ask(&prompt_existing)).await??;

    let (config, fell_back) = build_config(&existing, answers);
    if fell_back {
        println!("  ✗ Invalid model settings; using default values for invalid fields.");
    }
    if !config.has_api_key() {
        println!("  ⚠ No API keys configured. You'll need to add them later to use Rayo.");
    }

    let saved_to = config.save()?;
    println!();
    println!("  ✓ Setup complete! Configuration saved to {}", saved_to.display());
    println!("  You can now run `rayo start` to begin coding with AI assistance.");
    println!();
    Ok(())
}

fn ask(existing: &RayoConfig) -> Result<Answers, dialoguer::Error> {
    println!();
    println!("  API Key Configuration");
    println!("  Enter your API key(s) below. Leave blank to skip a provider");
    println!("  or to keep a key that is already configured.");
    println!();

    let mut answers = Answers::default();
    for provider in KNOWN_PROVIDERS {
        let mut prompt = format!("{} API Key", capitalize(provider));
        if existing.api_key_for(provider).is_some() {
            prompt.push_str(" (already configured)");
        }
        let key: String = Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?;
        let key = key.trim();
        answers
            .keys
            .push((provider.to_string(), (!key.is_empty()).then(|| key.to_string())));
    }

    let azure_configured = answers
        .keys
        .iter()
        .any(|(p, k)| p == "azure" && k.is_some())
        || existing.api_key_for("azure").is_some();
    if azure_configured {
        let url: String = Input::new()
            .with_prompt("Azure endpoint URL")
            .default(existing.api_url_for("azure").unwrap_or_default().to_string())
            .allow_empty(true)
            .interact_text()?;
        answers.azure_url = Some(url);
    }

    println!();
    println!("  Model Configuration");
    answers.model = Input::new()
        .with_prompt("Default model")
        .default(existing.default_model.clone())
        .interact_text()?;
    answers.max_tokens = Input::new()
        .with_prompt("Max tokens")
        .default(existing.max_tokens.to_string())
        .interact_text()?;
    answers.temperature = Input::new()
        .with_prompt("Temperature (0.0-2.0)")
        .default(existing.temperature.to_string())
        .interact_text()?;

    Ok(answers)
}

/// Merge answers over `existing`. Returns the config and whether the model
/// settings were invalid and replaced with defaults.
fn build_config(existing: &RayoConfig, answers: Answers) -> (RayoConfig, bool) {
    let mut config = existing.clone();

    for (provider, key) in answers.keys {
        if let Some(key) = key {
            config.api_keys.insert(provider, key);
        }
    }

    if let Some(url) = answers.azure_url {
        let url = url.trim();
        let entry = config.providers.entry("azure".to_string()).or_default();
        entry.api_url = (!url.is_empty()).then(|| url.to_string());
    }

    let parsed = (
        answers.max_tokens.trim().parse::<u32>(),
        answers.temperature.trim().parse::<f32>(),
    );
    let mut fell_back = false;
    match parsed {
        (Ok(max_tokens), Ok(temperature)) => {
            config.default_model = answers.model.trim().to_string();
            config.max_tokens = max_tokens;
            config.temperature = temperature;
        }
        _ => fell_back = true,
    }

    if fell_back || config.validate().is_err() {
        let defaults = RayoConfig::default();
        config.default_model = defaults.default_model;
        config.max_tokens = defaults.max_tokens;
        config.temperature = defaults.temperature;
        fell_back = true;
    }

    (config, fell_back)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(model: &str, max_tokens: &str, temperature: &str) -> Answers {
        Answers {
            keys: KNOWN_PROVIDERS.iter().map(|p| (p.to_string(), None)).collect(),
            azure_url: None,
            model: model.into(),
            max_tokens: max_tokens.into(),
            temperature: temperature.into(),
        }
    }

    #[test]
    fn blank_key_keeps_existing() {
        let mut existing = RayoConfig::default();
        existing.api_keys.insert("openai".into(), "sk-old".into());

        let mut a = answers("gpt-4o", "2048", "0.2");
        a.keys[1].1 = Some("ant-new".into());

        let (config, fell_back) = build_config(&existing, a);
        assert!(!fell_back);
        assert_eq!(config.api_key_for("openai"), Some("sk-old"));
        assert_eq!(config.api_key_for("anthropic"), Some("ant-new"));
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.max_tokens, 2048);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn unparsable_numbers_fall_back_to_defaults() {
        let (config, fell_back) = build_config(&RayoConfig::default(), answers("gpt-4o", "lots", "0.5"));
        assert!(fell_back);
        let defaults = RayoConfig::default();
        assert_eq!(config.default_model, defaults.default_model);
        assert_eq!(config.max_tokens, defaults.max_tokens);
    }

    #[test]
    fn out_of_range_values_fall_back_to_defaults() {
        let (config, fell_back) = build_config(&RayoConfig::default(), answers("gpt-4o", "1024", "3.5"));
        assert!(fell_back);
        assert!(config.validate().is_ok());

        let (_, fell_back) = build_config(&RayoConfig::default(), answers("  ", "1024", "0.5"));
        assert!(fell_back);
    }

    #[test]
    fn azure_url_is_recorded_and_cleared() {
        let mut a = answers("gpt-4", "4096", "0.7");
        a.azure_url = Some("https://example.openai.azure.com/openai/v1".into());
        let (config, _) = build_config(&RayoConfig::default(), a);
        assert_eq!(
            config.api_url_for("azure"),
            Some("https://example.openai.azure.com/openai/v1")
        );

        let mut a = answers("gpt-4", "4096", "0.7");
        a.azure_url = Some(String::new());
        let (config, _) = build_config(&config, a);
        assert_eq!(config.api_url_for("azure"), None);
    }

    #[test]
    fn capitalize_provider_names() {
        assert_eq!(capitalize("openai"), "Openai");
        assert_eq!(capitalize(""), "");
    }
}
