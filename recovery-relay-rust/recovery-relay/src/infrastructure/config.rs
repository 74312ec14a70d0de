use anyhow::{anyhow, Result};
use recovery_wallet_core::shared::constants::{
    DEFAULT_ARCHANOVA_MAPPING_PATH, MAX_RETRY_ATTEMPTS, RETRY_BACKOFF_BASE, RETRY_JITTER, RPC_TIMEOUT,
    TRANSACTION_CONFIRMATION_TIMEOUT,
};
use recovery_wallet_core::{Chain, RecoveryError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const DEFAULT_CONFIG_FILE: &str = "recovery.json";

/// One row of the chain directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainEndpoint {
    pub chain: Chain,
    pub chain_id: u64,
    pub rpc_url: String,
    pub native_symbol: String,
    pub native_name: String,
    pub native_decimals: u8,
    pub explorer_tx_base: String,
}

impl ChainEndpoint {
    pub fn new(chain: Chain, rpc_url: impl Into<String>) -> Self {
        let native = chain.native_currency();
        Self {
            chain,
            chain_id: chain.chain_id(),
            rpc_url: rpc_url.into(),
            native_symbol: native.symbol,
            native_name: native.name,
            native_decimals: native.decimals,
            explorer_tx_base: chain.explorer_tx_base().to_string(),
        }
    }

    pub fn default_for(chain: Chain) -> Self {
        Self::new(chain, chain.default_rpc_url())
    }

    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}{}", self.explorer_tx_base, tx_hash)
    }
}

/// Reject anything that is not an absolute http(s) URL
pub fn validate_rpc_url(url: &str) -> Result<(), RecoveryError> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| RecoveryError::configuration(format!("RPC URL must start with http:// or https://: '{}'", url)))?;

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(RecoveryError::configuration(format!("RPC URL has no host: '{}'", url)));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRY_ATTEMPTS,
            backoff_base_ms: RETRY_BACKOFF_BASE,
            jitter_ms: RETRY_JITTER,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_directory: String,
    pub log_to_file: bool,
    pub rpc_timeout_ms: u64,
    pub confirmation_timeout_ms: u64,
    pub retry: RetryConfig,
    pub archanova_mapping_path: String,
    pub rpc_urls: BTreeMap<Chain, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            log_level: "info".to_string(),
            log_directory: "logs".to_string(),
            log_to_file: false,
            rpc_timeout_ms: RPC_TIMEOUT,
            confirmation_timeout_ms: TRANSACTION_CONFIRMATION_TIMEOUT,
            retry: RetryConfig::default(),
            archanova_mapping_path: DEFAULT_ARCHANOVA_MAPPING_PATH.to_string(),
            rpc_urls: Chain::ALL
                .iter()
                .map(|chain| (*chain, chain.default_rpc_url().to_string()))
                .collect(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load environment variables
        dotenv::dotenv().ok();

        let config_file = Self::validate_and_get_env_var("CONFIG_FILE", DEFAULT_CONFIG_FILE, false)?;

        // Try to load from config file first
        let mut config = match Self::load_from_file(&config_file)? {
            Some(config) => config,
            None => Self::default(),
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Read a JSON config file; a missing file is not an error
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to deserialize config: {}", e))?;

        // Chains left out of the file keep their defaults
        for chain in Chain::ALL {
            config
                .rpc_urls
                .entry(chain)
                .or_insert_with(|| chain.default_rpc_url().to_string());
        }

        Ok(Some(config))
    }

    /// Apply `KEY=value` overrides from any source (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(host) = get("HOST") {
            self.host = host;
        }
        if let Some(port) = parse_override(get("PORT"), "PORT")? {
            self.port = port;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(directory) = get("LOG_DIR") {
            self.log_directory = directory;
        }
        if let Some(to_file) = parse_override(get("LOG_TO_FILE"), "LOG_TO_FILE")? {
            self.log_to_file = to_file;
        }
        if let Some(timeout) = parse_override(get("RPC_TIMEOUT_MS"), "RPC_TIMEOUT_MS")? {
            self.rpc_timeout_ms = timeout;
        }
        if let Some(timeout) = parse_override(get("CONFIRMATION_TIMEOUT_MS"), "CONFIRMATION_TIMEOUT_MS")? {
            self.confirmation_timeout_ms = timeout;
        }
        if let Some(attempts) = parse_override(get("MAX_RETRY_ATTEMPTS"), "MAX_RETRY_ATTEMPTS")? {
            self.retry.max_attempts = attempts;
        }
        if let Some(backoff) = parse_override(get("RETRY_BACKOFF_MS"), "RETRY_BACKOFF_MS")? {
            self.retry.backoff_base_ms = backoff;
        }
        if let Some(jitter) = parse_override(get("RETRY_JITTER_MS"), "RETRY_JITTER_MS")? {
            self.retry.jitter_ms = jitter;
        }
        if let Some(path) = get("ARCHANOVA_MAPPING_PATH") {
            self.archanova_mapping_path = path;
        }

        for chain in Chain::ALL {
            let key = format!("RPC_URL_{}", chain.key().to_uppercase());
            if let Some(url) = get(&key) {
                self.rpc_urls.insert(chain, url.trim().to_string());
            }
        }

        Ok(())
    }

    /// Validates environment variables and provides fallback values
    pub fn validate_and_get_env_var(key: &str, fallback: &str, required: bool) -> Result<String> {
        match env::var(key) {
            Ok(value) => {
                if value.is_empty() {
                    if required {
                        return Err(anyhow!("Environment variable {} is required but empty", key));
                    }
                    Ok(fallback.to_string())
                } else {
                    Ok(value)
                }
            }
            Err(_) => {
                if required {
                    return Err(anyhow!("Required environment variable {} is not set", key));
                }
                Ok(fallback.to_string())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("PORT must be non-zero"));
        }
        if self.retry.max_attempts == 0 {
            return Err(anyhow!("MAX_RETRY_ATTEMPTS must be at least 1"));
        }
        if self.rpc_timeout_ms == 0 {
            return Err(anyhow!("RPC_TIMEOUT_MS must be greater than zero"));
        }
        if self.confirmation_timeout_ms == 0 {
            return Err(anyhow!("CONFIRMATION_TIMEOUT_MS must be greater than zero"));
        }

        for chain in Chain::ALL {
            let url = self
                .rpc_urls
                .get(&chain)
                .ok_or_else(|| anyhow!("RPC URL is required for chain {}", chain))?;
            validate_rpc_url(url).map_err(|e| anyhow!("Invalid RPC URL for chain {}: {}", chain, e))?;
        }

        Ok(())
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }

    pub fn endpoints(&self) -> Vec<ChainEndpoint> {
        Chain::ALL
            .iter()
            .map(|chain| match self.rpc_urls.get(chain) {
                Some(url) => ChainEndpoint::new(*chain, url.clone()),
                None => ChainEndpoint::default_for(*chain),
            })
            .collect()
    }
}

fn parse_override<T>(value: Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| anyhow!("Invalid value for {}: '{}' ({})", key, raw, e))
        })
        .transpose()
}

/// Process-wide chain directory
///
/// Callers take a snapshot of the endpoint they need when an operation starts;
/// later updates only affect operations that start afterwards. Writes are
/// last-write-wins.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    endpoints: Arc<RwLock<HashMap<Chain, ChainEndpoint>>>,
}

impl ChainRegistry {
    pub fn new(config: &Config) -> Self {
        let endpoints = config
            .endpoints()
            .into_iter()
            .map(|endpoint| (endpoint.chain, endpoint))
            .collect();
        Self {
            endpoints: Arc::new(RwLock::new(endpoints)),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&Config::default())
    }

    pub async fn endpoint(&self, chain: Chain) -> Result<ChainEndpoint, RecoveryError> {
        self.endpoints
            .read()
            .await
            .get(&chain)
            .cloned()
            .ok_or_else(|| RecoveryError::configuration(format!("Unsupported chain: {}", chain)))
    }

    pub async fn update_endpoint(&self, chain: Chain, rpc_url: &str) -> Result<ChainEndpoint, RecoveryError> {
        validate_rpc_url(rpc_url)?;

        let updated = ChainEndpoint::new(chain, rpc_url.trim());
        self.endpoints.write().await.insert(chain, updated.clone());

        tracing::info!("RPC endpoint for {} updated to {}", chain, updated.rpc_url);
        Ok(updated)
    }

    /// Replace the whole table at once; every chain must be present
    pub async fn replace_all(&self, rpc_urls: HashMap<Chain, String>) -> Result<Vec<ChainEndpoint>, RecoveryError> {
        let mut replacement = HashMap::with_capacity(Chain::ALL.len());
        for chain in Chain::ALL {
            let url = rpc_urls
                .get(&chain)
                .ok_or_else(|| RecoveryError::configuration(format!("Missing RPC URL for chain {}", chain)))?;
            validate_rpc_url(url)?;
            replacement.insert(chain, ChainEndpoint::new(chain, url.trim()));
        }

        *self.endpoints.write().await = replacement;
        tracing::info!("Chain endpoint table replaced");

        Ok(self.snapshot().await)
    }

    /// All endpoints in chain order
    pub async fn snapshot(&self) -> Vec<ChainEndpoint> {
        let endpoints = self.endpoints.read().await;
        let mut snapshot: Vec<ChainEndpoint> = endpoints.values().cloned().collect();
        snapshot.sort_by_key(|endpoint| endpoint.chain);
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.backoff_base_ms, 0);
        assert_eq!(config.rpc_urls.len(), 6);
        assert_eq!(config.rpc_urls[&Chain::Polygon], "https://polygon-rpc.com");
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[
                ("PORT", "8088"),
                ("MAX_RETRY_ATTEMPTS", "5"),
                ("RETRY_BACKOFF_MS", "250"),
                ("RPC_URL_XDAI", "https://gnosis.example.org/rpc"),
                ("LOG_TO_FILE", "true"),
                ("HOST", ""),
            ]))
            .unwrap();

        assert_eq!(config.port, 8088);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.backoff_base_ms, 250);
        assert!(config.log_to_file);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.rpc_urls[&Chain::Xdai], "https://gnosis.example.org/rpc");
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_overrides(lookup_from(&[("PORT", "eighty")]));
        assert!(result.unwrap_err().to_string().contains("PORT"));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rpc_urls.insert(Chain::Binance, "ftp://bsc".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rpc_urls.remove(&Chain::Arbitrum);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rpc_url_validation() {
        assert!(validate_rpc_url("https://polygon-rpc.com").is_ok());
        assert!(validate_rpc_url("http://localhost:8545").is_ok());
        assert!(validate_rpc_url("https://").is_err());
        assert!(validate_rpc_url("polygon-rpc.com").is_err());
        assert!(validate_rpc_url("").is_err());
    }

    #[test]
    fn test_load_partial_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "port": 5001, "rpc_urls": {{ "ethereum": "https://eth.example.org" }} }}"#).unwrap();

        let config = Config::load_from_file(file.path()).unwrap().unwrap();
        assert_eq!(config.port, 5001);
        assert_eq!(config.rpc_urls[&Chain::Ethereum], "https://eth.example.org");
        assert_eq!(config.rpc_urls[&Chain::Optimism], Chain::Optimism.default_rpc_url());
        assert!(config.validate().is_ok());

        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_file(dir.path().join("missing.json")).unwrap().is_none());
    }

    #[test]
    fn test_validate_and_get_env_var() {
        let result = Config::validate_and_get_env_var("RECOVERY_TEST_NONEXISTENT_VAR", "fallback", false);
        assert_eq!(result.unwrap(), "fallback");

        let result = Config::validate_and_get_env_var("RECOVERY_TEST_NONEXISTENT_VAR", "fallback", true);
        assert!(result.is_err());

        std::env::set_var("RECOVERY_TEST_VALID_VAR", "test_value");
        let result = Config::validate_and_get_env_var("RECOVERY_TEST_VALID_VAR", "fallback", false);
        assert_eq!(result.unwrap(), "test_value");
        std::env::remove_var("RECOVERY_TEST_VALID_VAR");
    }

    #[tokio::test]
    async fn test_registry_update_is_last_write_wins() {
        let registry = ChainRegistry::with_defaults();

        let in_flight = registry.endpoint(Chain::Polygon).await.unwrap();
        registry.update_endpoint(Chain::Polygon, "https://first.example.org").await.unwrap();
        registry.update_endpoint(Chain::Polygon, "https://second.example.org").await.unwrap();

        // A snapshot taken earlier keeps its URL
        assert_eq!(in_flight.rpc_url, "https://polygon-rpc.com");
        let current = registry.endpoint(Chain::Polygon).await.unwrap();
        assert_eq!(current.rpc_url, "https://second.example.org");
        assert_eq!(current.native_symbol, "MATIC");
    }

    #[tokio::test]
    async fn test_registry_rejects_bad_update() {
        let registry = ChainRegistry::with_defaults();
        let result = registry.update_endpoint(Chain::Ethereum, "not a url").await;
        assert!(matches!(result, Err(RecoveryError::Configuration(_))));
        assert_eq!(
            registry.endpoint(Chain::Ethereum).await.unwrap().rpc_url,
            Chain::Ethereum.default_rpc_url()
        );
    }

    #[tokio::test]
    async fn test_replace_all_requires_every_chain() {
        let registry = ChainRegistry::with_defaults();

        let mut partial = HashMap::new();
        partial.insert(Chain::Ethereum, "https://eth.example.org".to_string());
        assert!(registry.replace_all(partial).await.is_err());

        let full: HashMap<Chain, String> = Chain::ALL
            .iter()
            .map(|chain| (*chain, format!("https://{}.example.org", chain.key())))
            .collect();
        let snapshot = registry.replace_all(full).await.unwrap();
        assert_eq!(snapshot.len(), 6);
        assert_eq!(snapshot[0].chain, Chain::Ethereum);
        assert_eq!(snapshot[0].rpc_url, "https://ethereum.example.org");
        assert_eq!(registry.endpoint(Chain::Xdai).await.unwrap().rpc_url, "https://xdai.example.org");
    }

    #[test]
    fn test_explorer_url() {
        let endpoint = ChainEndpoint::default_for(Chain::Arbitrum);
        assert_eq!(endpoint.explorer_tx_url("0xabc"), "https://arbiscan.io/tx/0xabc");
        assert_eq!(endpoint.chain_id, 42161);
    }
}
