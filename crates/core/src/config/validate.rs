use reqwest::Url;

use super::{types::Config, ConfigError};
use crate::units::MAX_DECIMALS;

/// Validate configuration
/// Currently validates:
/// - Contract section exists (enforced by serde)
/// - Server port is not 0
/// - Contract id is 32 bytes and the gateway URL is http(s)
/// - Unit precisions fit in a u64
/// - At least one variable output per purchase
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Contract validation
    if config.contract.id.byte_len() != 32 {
        return Err(ConfigError::ValidationError(format!(
            "contract.id must be 32 bytes, got {}",
            config.contract.id.byte_len()
        )));
    }
    match Url::parse(&config.contract.gateway_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => {
            return Err(ConfigError::ValidationError(format!(
                "contract.gateway_url must be http or https, got {}",
                url.scheme()
            )));
        }
        Err(e) => {
            return Err(ConfigError::ValidationError(format!(
                "contract.gateway_url is invalid: {}",
                e
            )));
        }
    }
    if config.contract.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "contract.timeout_secs cannot be 0".to_string(),
        ));
    }

    // Units validation
    for (name, value) in [
        ("units.count_decimals", config.units.count_decimals),
        ("units.price_decimals", config.units.price_decimals),
    ] {
        if value > MAX_DECIMALS {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot exceed {}, got {}",
                name, MAX_DECIMALS, value
            )));
        }
    }

    // Purchase validation
    if config.purchase.variable_outputs == 0 {
        return Err(ConfigError::ValidationError(
            "purchase.variable_outputs must be at least 1".to_string(),
        ));
    }

    Ok(())
}
