//! 配置解析模块
//!
//! 支持 JSON (主要，与用户配置文件一致) 和 TOML 格式。

use contracts::{BridgeConfig, ContractError};
use serde::de::DeserializeOwned;

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON 格式 (默认)
    Json,
    /// TOML 格式
    Toml,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// 解析 TOML 格式
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式
pub fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<BridgeConfig, ContractError> {
    match format {
        ConfigFormat::Json => parse_json(content),
        ConfigFormat::Toml => parse_toml(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CurveType, ModuleType};

    #[test]
    fn test_parse_json_user_config() {
        let content = r#"{
            "app_settings": { "osc_port": 9100 },
            "contacts": [
                { "name": "Left Hand", "id": "LeftHand", "type": 1, "cooldown": 0.5 }
            ],
            "bindings": [
                {
                    "contact_id": "LeftHand",
                    "module_name": "log",
                    "use_mapping": true,
                    "curve_type": "exponential"
                }
            ],
            "modules": [ { "name": "log", "module_type": "log" } ]
        }"#;
        let config: BridgeConfig = parse_json(content).unwrap();

        assert_eq!(config.app_settings.osc_port, 9100);
        assert_eq!(config.app_settings.worker_pool_size, 10);
        assert_eq!(config.contacts[0].contact_type, 1);
        assert_eq!(config.bindings[0].reaction_type, "vibrate");
        assert_eq!(config.bindings[0].curve_type, CurveType::Exponential);
        assert_eq!(config.modules[0].module_type, ModuleType::Log);
        assert!(config.modules[0].enabled);
    }

    #[test]
    fn test_parse_toml() {
        let content = r#"
[app_settings]
sniff_port = 9300

[[contacts]]
name = "Head"
id = "Head"
osc_path = "/avatar/parameters/HeadPat"

[[bindings]]
contact_id = "Head"
module_name = "fwd"
is_continuous = true

[[modules]]
name = "fwd"
module_type = "osc_forward"
params = { addr = "127.0.0.1:9200" }
"#;
        let config = parse(content, ConfigFormat::Toml).unwrap();
        assert_eq!(config.app_settings.sniff_port, 9300);
        assert_eq!(config.contacts[0].exact_path(), Some("/avatar/parameters/HeadPat"));
        assert!(config.bindings[0].is_continuous);
        assert_eq!(config.modules[0].params["addr"], "127.0.0.1:9200");
    }

    #[test]
    fn test_parse_syntax_error() {
        let result = parse("invalid toml [[[", ConfigFormat::Toml);
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));

        let result = parse("{ \"contacts\": [", ConfigFormat::Json);
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
