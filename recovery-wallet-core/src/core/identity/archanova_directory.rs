//! Offline Archanova account directory
//!
//! Archanova accounts cannot be recomputed from the EOA alone, so they are
//! resolved against a mapping file produced ahead of time. The file is a JSON
//! array of `{ eoaAddress, archanovaAddress, accountId, isDeployed?, portfolioData? }`
//! records. Lookups are keyed by the lower-cased EOA address.

use crate::shared::error::RecoveryError;
use crate::shared::types::Address;
use crate::shared::utils::{address_key, parse_address};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArchanovaRecord {
    pub eoa_address: String,
    pub archanova_address: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub account_id: Option<String>,
    #[serde(default)]
    pub is_deployed: Option<bool>,
    #[serde(default)]
    pub portfolio_data: Option<serde_json::Value>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Read-only keyed lookup over the mapping file
#[derive(Debug, Clone, Default)]
pub struct ArchanovaDirectory {
    records: HashMap<String, ArchanovaRecord>,
}

impl ArchanovaDirectory {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ArchanovaRecord>) -> Self {
        // Later records win, matching the append-only file layout
        let records = records
            .into_iter()
            .map(|record| (address_key(&record.eoa_address), record))
            .collect();
        Self { records }
    }

    pub fn from_json_str(json: &str) -> Result<Self, RecoveryError> {
        let records: Vec<ArchanovaRecord> = serde_json::from_str(json)
            .map_err(|e| RecoveryError::configuration(format!("Invalid Archanova mapping: {}", e)))?;
        Ok(Self::from_records(records))
    }

    /// Load the mapping file; a missing file yields an empty directory
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecoveryError> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!(
                "Archanova mapping file {} not found, Archanova lookups will return not found",
                path.display()
            );
            return Ok(Self::empty());
        }

        let content = fs::read_to_string(path)?;
        let directory = Self::from_json_str(&content)?;
        log::info!("Loaded {} Archanova account mappings from {}", directory.len(), path.display());
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, eoa: &Address) -> Option<&ArchanovaRecord> {
        self.records.get(&address_key(&format!("{:?}", eoa)))
    }

    /// Archanova account address for an EOA
    pub fn archanova_address(&self, eoa: &Address) -> Result<Address, RecoveryError> {
        let record = self
            .find(eoa)
            .ok_or_else(|| RecoveryError::not_found(format!("No Archanova account mapped to {:?}", eoa)))?;
        parse_address(&record.archanova_address)
    }

    /// Archanova account id for an EOA
    pub fn account_id(&self, eoa: &Address) -> Result<String, RecoveryError> {
        self.find(eoa)
            .and_then(|record| record.account_id.clone())
            .ok_or_else(|| RecoveryError::not_found(format!("No Archanova account id mapped to {:?}", eoa)))
    }
}
