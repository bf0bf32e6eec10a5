use std::io::{self, Write};

use crate::config::Config;
use crate::error::{LinearError, Result};

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub fn run() -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists() {
        let answer = prompt(&format!(
            "Config file already exists at {}. Overwrite? [y/N] ",
            config_path.display()
        ))?;

        if !answer.eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    println!("Linear Triggers Configuration");
    println!("=============================\n");

    let api_key =
        prompt("Enter your Linear API key (create one at https://linear.app/settings/api): ")?;
    if api_key.is_empty() {
        return Err(LinearError::MissingApiKey);
    }

    let default_team = prompt("Enter default team ID [optional]: ")?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LinearError::ConfigRead {
            path: config_path.clone(),
            source: e,
        })?;
    }

    let mut config_content = format!("api_key = {}\n", toml_string(&api_key));
    if !default_team.is_empty() {
        config_content.push_str(&format!("default_team = {}\n", toml_string(&default_team)));
    }

    std::fs::write(&config_path, config_content).map_err(|e| LinearError::ConfigRead {
        path: config_path.clone(),
        source: e,
    })?;

    println!("\nConfig saved to {}", config_path.display());
    println!("You can now run 'linear-triggers poll'.");

    Ok(())
}

fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
