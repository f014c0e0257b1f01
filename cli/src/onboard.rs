use abacus_core::config::{Config, StoreBackend};
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Select};

const PROVIDERS: &[&str] = &["openai", "openrouter", "ollama"];
const STORES: &[&str] = &["file", "memory"];

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

fn setup_provider() -> Result<String> {
    let selection = Select::new()
        .with_prompt("Select your provider")
        .items(PROVIDERS)
        .default(0)
        .interact()
        .context("Failed to select provider")?;

    Ok(PROVIDERS[selection].to_string())
}

fn setup_api_key(provider: &str) -> Result<String> {
    if provider == "ollama" {
        return Ok(String::new());
    }

    let api_key: String = Input::new()
        .with_prompt(format!("Enter your {} API key", provider))
        .interact_text()
        .context("Failed to read API key")?;

    if api_key.is_empty() {
        return Err(anyhow::anyhow!("API key cannot be empty"));
    }

    Ok(api_key)
}

fn setup_model(provider: &str) -> Result<String> {
    let models: &[&str] = match provider {
        "ollama" => &["llama3.2", "qwen2.5", "llava"],
        _ => &["gpt-4o", "gpt-4o-mini", "gpt-4.1", "gpt-4.1-mini"],
    };

    let selection = Select::new()
        .with_prompt("Select your model")
        .items(models)
        .default(0)
        .interact()
        .context("Failed to select model")?;

    Ok(models[selection].to_string())
}

fn setup_proxy() -> Result<Option<String>> {
    let proxy: String = Input::new()
        .with_prompt("HTTP proxy host:port (leave empty for none)")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read proxy")?;

    Ok(Some(proxy.trim().to_string()).filter(|p| !p.is_empty()))
}

fn setup_store() -> Result<StoreBackend> {
    let selection = Select::new()
        .with_prompt("Where should memory threads be kept?")
        .items(STORES)
        .default(0)
        .interact()
        .context("Failed to select thread store")?;

    Ok(match STORES[selection] {
        "memory" => StoreBackend::Memory,
        _ => StoreBackend::File,
    })
}

pub fn run_onboard() -> Result<Config> {
    println!();
    println!("  {}", style("Welcome to abacus!").white().bold());
    println!(
        "  {}",
        style("This wizard sets up the model your agents talk to.").dim()
    );
    println!();

    print_step(1, 4, "Provider");
    let provider = setup_provider()?;
    let api_key = setup_api_key(&provider)?;

    print_step(2, 4, "Model Selection");
    let model = setup_model(&provider)?;

    print_step(3, 4, "Network");
    let proxy = setup_proxy()?;

    print_step(4, 4, "Memory");
    let backend = setup_store()?;

    let mut config = Config {
        provider: Some(provider),
        api_key,
        model,
        proxy,
        ..Default::default()
    };
    config.memory.backend = backend;

    println!();
    println!("  {} Configuration complete!", style("✓").green().bold());
    println!(
        "  {} Config saved to {}",
        style("→").green(),
        style(abacus_core::config::get_config_path().display()).cyan()
    );
    println!();
    println!(
        "  {} You can now run: {}",
        style("→").green(),
        style("abacus chat -m \"Add 2 and 3\"").cyan().bold()
    );
    println!();

    Ok(config)
}
