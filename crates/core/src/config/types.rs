use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::contract::{ContractId, GatewayConfig};
use crate::purchase::PurchaseConfig;
use crate::units::Units;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub contract: ContractConfig,
    #[serde(default)]
    pub units: Units,
    #[serde(default)]
    pub purchase: PurchaseConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Deployed contract and the gateway used to reach it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContractConfig {
    /// 32-byte contract id
    pub id: ContractId,
    /// Wallet gateway JSON-RPC endpoint
    pub gateway_url: String,
    /// Bearer token for the gateway (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_token: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

impl ContractConfig {
    /// Settings for [`GatewayContractClient`](crate::contract::GatewayContractClient).
    pub fn to_gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            url: self.gateway_url.clone(),
            contract_id: self.id.clone(),
            token: self.gateway_token.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub contract: SanitizedContractConfig,
    pub units: Units,
    pub purchase: PurchaseConfig,
}

/// Sanitized contract config (gateway token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedContractConfig {
    pub id: String,
    pub gateway_url: String,
    pub gateway_token_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            contract: SanitizedContractConfig {
                id: config.contract.id.to_string(),
                gateway_url: config.contract.gateway_url.clone(),
                gateway_token_configured: config
                    .contract
                    .gateway_token
                    .as_deref()
                    .is_some_and(|t| !t.is_empty()),
                timeout_secs: config.contract.timeout_secs,
            },
            units: config.units,
            purchase: config.purchase.clone(),
        }
    }
}
