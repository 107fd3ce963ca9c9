//! 配置校验模块
//!
//! 校验规则：
//! - contact id 非空且唯一
//! - cooldown 为有限值且 >= 0
//! - binding 引用的 contact 存在，数值字段为有限值，module_name 非空
//! - module 名称非空且唯一
//! - worker_pool_size > 0
//!
//! 退化输入范围 (input_min == input_max) 与反向输出范围均合法。

use std::collections::HashSet;

use contracts::{Binding, BridgeConfig, ContractError};

/// 校验 BridgeConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &BridgeConfig) -> Result<(), ContractError> {
    validate_app_settings(config)?;
    let contact_ids = validate_contacts(config)?;
    validate_bindings(config, &contact_ids)?;
    validate_modules(config)?;
    Ok(())
}

/// 校验应用设置
fn validate_app_settings(config: &BridgeConfig) -> Result<(), ContractError> {
    if config.app_settings.worker_pool_size == 0 {
        return Err(ContractError::config_validation(
            "app_settings.worker_pool_size",
            "worker_pool_size must be > 0",
        ));
    }
    Ok(())
}

/// 校验 contact id 唯一性与 cooldown
fn validate_contacts(config: &BridgeConfig) -> Result<HashSet<&str>, ContractError> {
    let mut seen = HashSet::new();
    for (idx, contact) in config.contacts.iter().enumerate() {
        if contact.id.is_empty() {
            return Err(ContractError::config_validation(
                format!("contacts[{idx}].id"),
                "contact id cannot be empty",
            ));
        }
        if !seen.insert(contact.id.as_str()) {
            return Err(ContractError::config_validation(
                format!("contacts[id={}]", contact.id),
                "duplicate contact id",
            ));
        }
        if !contact.cooldown.is_finite() || contact.cooldown < 0.0 {
            return Err(ContractError::config_validation(
                format!("contacts[{}].cooldown", contact.id),
                format!("cooldown must be finite and >= 0, got {}", contact.cooldown),
            ));
        }
    }
    Ok(seen)
}

/// 校验 binding 引用与数值
fn validate_bindings(config: &BridgeConfig, contact_ids: &HashSet<&str>) -> Result<(), ContractError> {
    for (idx, binding) in config.bindings.iter().enumerate() {
        if !contact_ids.contains(binding.contact_id.as_str()) {
            return Err(ContractError::config_validation(
                format!("bindings[{idx}].contact_id"),
                format!("contact '{}' not found", binding.contact_id),
            ));
        }
        if binding.module_name.is_empty() {
            return Err(ContractError::config_validation(
                format!("bindings[{idx}].module_name"),
                "module_name cannot be empty",
            ));
        }
        for (field, value) in numeric_fields(binding) {
            if !value.is_finite() {
                return Err(ContractError::config_validation(
                    format!("bindings[{idx}].{field}"),
                    format!("{field} must be finite, got {value}"),
                ));
            }
        }
    }
    Ok(())
}

fn numeric_fields(binding: &Binding) -> [(&'static str, f64); 6] {
    [
        ("intensity", binding.intensity),
        ("duration", binding.duration),
        ("input_min", binding.input_min),
        ("input_max", binding.input_max),
        ("output_min", binding.output_min),
        ("output_max", binding.output_max),
    ]
}

/// 校验 module 配置
fn validate_modules(config: &BridgeConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, module) in config.modules.iter().enumerate() {
        if module.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("modules[{idx}].name"),
                "module name cannot be empty",
            ));
        }
        if !seen.insert(module.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("modules[name={}]", module.name),
                "duplicate module name",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Contact, CurveType, ModuleConfig, ModuleType};
    use std::collections::HashMap;

    fn base_config() -> BridgeConfig {
        BridgeConfig {
            contacts: vec![Contact::new("Hand", "Hand"), Contact::new("Head", "Head")],
            bindings: vec![Binding::new("Hand", "log")],
            modules: vec![ModuleConfig {
                name: "log".to_string(),
                module_type: ModuleType::Log,
                enabled: true,
                params: HashMap::new(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn test_duplicate_contact_id() {
        let mut config = base_config();
        config.contacts.push(Contact::new("Hand again", "Hand"));
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate contact id"));
    }

    #[test]
    fn test_empty_contact_id() {
        let mut config = base_config();
        config.contacts.push(Contact::new("Nameless", ""));
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_negative_cooldown() {
        let mut config = base_config();
        config.contacts[0].cooldown = -1.0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("cooldown"));
    }

    #[test]
    fn test_binding_to_unknown_contact() {
        let mut config = base_config();
        config.bindings.push(Binding::new("Foot", "log"));
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("'Foot' not found"));
    }

    #[test]
    fn test_non_finite_binding_value() {
        let mut config = base_config();
        config.bindings[0].intensity = f64::NAN;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("bindings[0].intensity"));
    }

    #[test]
    fn test_degenerate_and_inverted_ranges_allowed() {
        let mut config = base_config();
        config.bindings.push(
            Binding::new("Head", "log").with_mapping((0.5, 0.5), (1.0, 0.0), CurveType::Threshold),
        );
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_duplicate_module_name() {
        let mut config = base_config();
        config.modules.push(config.modules[0].clone());
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate module name"));
    }

    #[test]
    fn test_zero_workers() {
        let mut config = base_config();
        config.app_settings.worker_pool_size = 0;
        assert!(validate(&config).is_err());
    }
}
