//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

use contracts::BridgeConfig;

use crate::cli::ValidateArgs;
use crate::error::{load_config, CliError};

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    osc_port: u16,
    contact_count: usize,
    binding_count: usize,
    module_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match load_config(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    osc_port: config.app_settings.osc_port,
                    contact_count: config.contacts.len(),
                    binding_count: config.bindings.len(),
                    module_count: config.modules.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(match e {
                CliError::ConfigNotFound { path } => format!("File not found: {path}"),
                other => other.to_string(),
            }),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &BridgeConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.bindings.is_empty() {
        warnings.push("No bindings configured - events will never be dispatched".to_string());
    }

    // Contacts without bindings
    let bound: HashSet<&str> = config.bindings.iter().map(|b| b.contact_id.as_str()).collect();
    for contact in &config.contacts {
        if !bound.contains(contact.id.as_str()) {
            warnings.push(format!("Contact '{}' has no bindings", contact.id));
        }
    }

    // Bindings to modules not declared here (may come from an external loader)
    let modules: HashSet<&str> = config
        .modules
        .iter()
        .filter(|m| m.enabled)
        .map(|m| m.name.as_str())
        .collect();
    for binding in &config.bindings {
        if !modules.contains(binding.module_name.as_str()) {
            warnings.push(format!(
                "Binding for '{}' targets module '{}' which is not enabled",
                binding.contact_id, binding.module_name
            ));
        }
    }

    // Same address claimed twice: only the first contact can match it
    let mut paths = HashSet::new();
    for contact in &config.contacts {
        if let Some(path) = contact.exact_path() {
            if !paths.insert(path) {
                warnings.push(format!(
                    "Contact '{}' shares osc_path '{}' with an earlier contact",
                    contact.id, path
                ));
            }
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  OSC port: {}", summary.osc_port);
            println!("  Contacts: {}", summary.contact_count);
            println!("  Bindings: {}", summary.binding_count);
            println!("  Modules: {}", summary.module_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
