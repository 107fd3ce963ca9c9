//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use contracts::BridgeConfig;

use crate::cli::InfoArgs;
use crate::error::load_config;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    settings: SettingsInfo,
    contacts: Vec<ContactInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bindings: Vec<BindingInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    modules: Vec<ModuleInfo>,
}

#[derive(Serialize)]
struct SettingsInfo {
    osc_port: u16,
    sniff_port: u16,
    worker_pool_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics_port: Option<u16>,
}

#[derive(Serialize)]
struct ContactInfo {
    id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    osc_path: Option<String>,
    input_type: String,
    cooldown: f64,
    binding_count: usize,
}

#[derive(Serialize)]
struct BindingInfo {
    contact_id: String,
    module_name: String,
    reaction_type: String,
    device_id: String,
    intensity: f64,
    mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mapping: Option<String>,
}

#[derive(Serialize)]
struct ModuleInfo {
    name: String,
    module_type: String,
    enabled: bool,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    params: HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if let Some(ref path) = args.export {
        config_loader::ConfigLoader::export_to_path(path, &config.contacts, &config.bindings)
            .with_context(|| format!("Failed to export config to {}", path.display()))?;
        info!(path = %path.display(), "Contacts and bindings exported");
    }

    if args.json {
        let info = build_config_info(&config, args);
        let json = serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args);
    }

    Ok(())
}

fn binding_count(config: &BridgeConfig, contact_id: &str) -> usize {
    config
        .bindings
        .iter()
        .filter(|b| b.contact_id == contact_id)
        .count()
}

fn describe_mapping(binding: &contracts::Binding) -> Option<String> {
    binding.use_mapping.then(|| {
        format!(
            "[{}, {}] -> [{}, {}] {:?}",
            binding.input_min, binding.input_max, binding.output_min, binding.output_max, binding.curve_type
        )
    })
}

fn build_config_info(config: &BridgeConfig, args: &InfoArgs) -> ConfigInfo {
    let settings = &config.app_settings;

    let contacts = config
        .contacts
        .iter()
        .map(|c| ContactInfo {
            id: c.id.clone(),
            name: c.name.clone(),
            osc_path: c.exact_path().map(str::to_string),
            input_type: format!("{:?}", c.input_type),
            cooldown: c.cooldown,
            binding_count: binding_count(config, &c.id),
        })
        .collect();

    let bindings = if args.bindings {
        config
            .bindings
            .iter()
            .map(|b| BindingInfo {
                contact_id: b.contact_id.clone(),
                module_name: b.module_name.clone(),
                reaction_type: b.reaction_type.clone(),
                device_id: b.device_id.clone(),
                intensity: b.intensity,
                mode: if b.is_continuous { "continuous" } else { "pulse" },
                mapping: describe_mapping(b),
            })
            .collect()
    } else {
        Vec::new()
    };

    let modules = if args.modules {
        config
            .modules
            .iter()
            .map(|m| ModuleInfo {
                name: m.name.clone(),
                module_type: format!("{:?}", m.module_type),
                enabled: m.enabled,
                params: m.params.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", config.version),
        settings: SettingsInfo {
            osc_port: settings.osc_port,
            sniff_port: settings.sniff_port,
            worker_pool_size: settings.worker_pool_size,
            metrics_port: settings.metrics_port,
        },
        contacts,
        bindings,
        modules,
    }
}

fn print_config_info(config: &BridgeConfig, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                Haptic Bridge Configuration                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let settings = &config.app_settings;
    println!("📡 Listener");
    println!("   ├─ Version: {:?}", config.version);
    println!("   ├─ OSC port: {}", settings.osc_port);
    println!("   ├─ Sniff port: {}", settings.sniff_port);
    println!("   ├─ Workers: {}", settings.worker_pool_size);
    match settings.metrics_port {
        Some(port) => println!("   └─ Metrics port: {}", port),
        None => println!("   └─ Metrics: disabled"),
    }

    println!("\n🎯 Contacts ({})", config.contacts.len());
    for (i, contact) in config.contacts.iter().enumerate() {
        let is_last = i == config.contacts.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        let path = contact.exact_path().unwrap_or("(suffix match)");
        println!("   {} {} ({}) {}", prefix, contact.id, contact.name, path);

        let bindings: Vec<_> = config
            .bindings
            .iter()
            .filter(|b| b.contact_id == contact.id)
            .collect();

        if args.bindings && !bindings.is_empty() {
            for (j, binding) in bindings.iter().enumerate() {
                let binding_prefix = if j == bindings.len() - 1 { "└─" } else { "├─" };
                let mode = if binding.is_continuous { "continuous" } else { "pulse" };
                println!(
                    "   {}  {} {}.{} x{} ({}){}",
                    child_prefix,
                    binding_prefix,
                    binding.module_name,
                    binding.reaction_type,
                    binding.intensity,
                    mode,
                    describe_mapping(binding)
                        .map(|m| format!(" {m}"))
                        .unwrap_or_default()
                );
            }
        } else {
            println!(
                "   {}  └─ {} bindings, cooldown {}s",
                child_prefix,
                bindings.len(),
                contact.cooldown
            );
        }
    }

    if args.modules && !config.modules.is_empty() {
        println!("\n🔌 Modules ({})", config.modules.len());
        for (i, module) in config.modules.iter().enumerate() {
            let prefix = if i == config.modules.len() - 1 { "└─" } else { "├─" };
            let state = if module.enabled { "" } else { " [disabled]" };
            println!("   {} {} ({:?}){}", prefix, module.name, module.module_type, state);
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Binding, Contact, CurveType};

    #[test]
    fn test_build_config_info_respects_flags() {
        let config = BridgeConfig {
            contacts: vec![Contact::new("Hand", "Hand")],
            bindings: vec![
                Binding::new("Hand", "log").with_mapping((0.0, 1.0), (0.0, 0.5), CurveType::Exponential),
                Binding::new("Hand", "log").continuous(),
            ],
            ..Default::default()
        };
        let mut args = InfoArgs {
            config: "unused.json".into(),
            json: true,
            bindings: false,
            modules: false,
            export: None,
        };

        let info = build_config_info(&config, &args);
        assert_eq!(info.contacts[0].binding_count, 2);
        assert!(info.bindings.is_empty());

        args.bindings = true;
        let info = build_config_info(&config, &args);
        assert_eq!(info.bindings.len(), 2);
        assert!(info.bindings[0].mapping.as_deref().unwrap().contains("Exponential"));
        assert_eq!(info.bindings[1].mode, "continuous");
    }
}
