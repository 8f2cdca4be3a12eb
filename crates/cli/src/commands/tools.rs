//! `rayo tools` — Print the capability schemas.

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let registry = rayo_tools::default_registry();
    let definitions = registry.definitions();
    println!("{}", serde_json::to_string_pretty(&definitions)?);
    Ok(())
}
