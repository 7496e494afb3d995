use alloy_primitives::Address;
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_RPC_URL: &str = "PREFLIGHT_RPC_URL";
pub const ENV_TRANSFER_PROXY: &str = "PREFLIGHT_TRANSFER_PROXY";
pub const ENV_BASKET: &str = "PREFLIGHT_BASKET";

/// Configuration for rebalance preflight checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreflightConfig {
    /// RPC URL for chain reads
    pub rpc_url: String,
    /// Contract bidders approve to pull component inflows
    pub transfer_proxy_address: Address,
    /// Rebalancing set token checked when none is given on the command line
    #[serde(default)]
    pub basket_address: Option<Address>,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            transfer_proxy_address: Address::ZERO,
            basket_address: None,
        }
    }
}

impl PreflightConfig {
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .wrap_err_with(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Defaults with `PREFLIGHT_*` environment variables applied, for runs
    /// without a config file
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `PREFLIGHT_*` environment variables on top of this config
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (environment, test fixtures)
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(rpc_url) = lookup(ENV_RPC_URL) {
            self.rpc_url = rpc_url;
        }
        if let Some(proxy) = lookup(ENV_TRANSFER_PROXY) {
            self.transfer_proxy_address = proxy
                .parse()
                .wrap_err_with(|| format!("Invalid {}: {}", ENV_TRANSFER_PROXY, proxy))?;
        }
        if let Some(basket) = lookup(ENV_BASKET) {
            self.basket_address = Some(
                basket
                    .parse()
                    .wrap_err_with(|| format!("Invalid {}: {}", ENV_BASKET, basket))?,
            );
        }
        Ok(self)
    }

    /// Check if config is valid (all required fields set)
    pub fn is_valid(&self) -> bool {
        !self.rpc_url.is_empty() && !self.transfer_proxy_address.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = PreflightConfig::default();
        assert!(!config.is_valid());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "rpc_url": "http://node:8545",
                "transfer_proxy_address": "0x882d80d3a191859d64477eb78cca46599307ec1c"
            }}"#
        )
        .unwrap();

        let config = PreflightConfig::load_from_file(file.path()).await.unwrap();
        assert_eq!(config.rpc_url, "http://node:8545");
        assert_eq!(
            config.transfer_proxy_address,
            "0x882D80D3a191859d64477eb78Cca46599307ec1C"
                .parse::<Address>()
                .unwrap()
        );
        assert_eq!(config.basket_address, None);
        assert!(config.is_valid());
    }

    #[tokio::test]
    async fn test_load_rejects_bad_address() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"rpc_url": "http://node:8545", "transfer_proxy_address": "0x1234"}}"#
        )
        .unwrap();

        assert!(PreflightConfig::load_from_file(file.path()).await.is_err());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_RPC_URL, "http://override:8545"),
            (ENV_BASKET, "0x0101010101010101010101010101010101010101"),
        ]);

        let config = PreflightConfig::default()
            .with_overrides_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.rpc_url, "http://override:8545");
        assert_eq!(config.basket_address, Some(Address::repeat_byte(1)));
        assert_eq!(config.transfer_proxy_address, Address::ZERO);
    }

    #[test]
    fn test_from_env_starts_from_defaults() {
        let from_env = PreflightConfig::from_env().unwrap();
        let expected = PreflightConfig::default()
            .with_overrides_from(|key| std::env::var(key).ok())
            .unwrap();
        assert_eq!(from_env, expected);
    }

    #[test]
    fn test_overrides_complete_default_config() {
        let env: HashMap<&str, &str> = HashMap::from([(
            ENV_TRANSFER_PROXY,
            "0x882d80d3a191859d64477eb78cca46599307ec1c",
        )]);

        let config = PreflightConfig::default()
            .with_overrides_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.rpc_url, "http://localhost:8545");
        assert!(config.is_valid());
    }

    #[test]
    fn test_overrides_reject_bad_address() {
        let result = PreflightConfig::default().with_overrides_from(|key| {
            (key == ENV_TRANSFER_PROXY).then(|| "not-an-address".to_string())
        });
        assert!(result.is_err());
    }
}
