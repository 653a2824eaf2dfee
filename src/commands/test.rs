use anyhow::Result;
use colored::Colorize;
use nordflytt_api::{config, logging::SensitiveApiKey};
use std::path::Path;

/// Execute the test command
///
/// This validates the configuration file without starting the server
pub fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Testing configuration...".yellow());

    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration test successful".green());
    println!();

    println!("{}", "Configuration Summary:".bold());
    println!("  {}: {}:{}", "Server".cyan(), cfg.server.host, cfg.server.port);
    println!("  {}: {}", "Log Level".cyan(), cfg.server.log_level);
    println!("  {}: {}", "Log Format".cyan(), cfg.server.log_format);
    println!("  {}: {:?}", "Locale".cyan(), cfg.server.locale);
    println!();

    println!("  {}: {}", "API Keys".cyan(), cfg.api_keys.len());
    for (idx, key_cfg) in cfg.api_keys.iter().enumerate() {
        let status = if key_cfg.enabled {
            "enabled".green()
        } else {
            "disabled".red()
        };
        println!(
            "    {}. {} [{}] ({})",
            idx + 1,
            key_cfg.name,
            SensitiveApiKey::new(&key_cfg.key),
            status
        );
    }
    println!();

    let limits = &cfg.rate_limit;
    if limits.enabled {
        println!(
            "  {}: {} requests / {}s",
            "Rate Limit".cyan(),
            limits.max_requests,
            limits.window_seconds
        );
    } else {
        println!("  {}: {}", "Rate Limit".cyan(), "disabled".red());
    }

    match cfg.supabase.credentials() {
        Some((url, _)) => println!("  {}: Supabase ({})", "Store".cyan(), url),
        None => println!("  {}: in-memory (seeded)", "Store".cyan()),
    }

    println!("  {}: {}", "Metrics".cyan(), if cfg.metrics.enabled {
        "enabled".green()
    } else {
        "disabled".red()
    });
    if cfg.metrics.enabled {
        println!("    Endpoint: {}", cfg.metrics.endpoint);
    }

    Ok(())
}
