use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{PanelError, PanelResult};
use crate::models::Principal;

// Unknown user and wrong password must be indistinguishable to the caller.
const AUTH_FAILURE_MESSAGE: &str = "unknown username or wrong password";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialEntry {
    pub password: String,
    pub provider: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialTable {
    entries: BTreeMap<String, CredentialEntry>,
}

impl CredentialTable {
    pub fn new(entries: BTreeMap<String, CredentialEntry>) -> Self {
        Self { entries }
    }

    pub fn from_yaml(raw: &str) -> PanelResult<Self> {
        serde_yaml::from_str(raw)
            .map_err(|error| PanelError::SourceRejected(format!("invalid credential table: {error}")))
    }

    pub fn from_yaml_file(path: &Path) -> PanelResult<Self> {
        let raw = fs::read_to_string(path).map_err(|error| {
            PanelError::SourceUnavailable(format!(
                "cannot read credential file {}: {error}",
                path.display()
            ))
        })?;
        Self::from_yaml(&raw)
    }

    pub fn authenticate(&self, username: &str, password: &str) -> PanelResult<Principal> {
        let entry = match self.entries.get(username) {
            Some(entry) if entry.password == password => entry,
            _ => {
                tracing::warn!(username = %username, "rejected login");
                return Err(PanelError::AuthFailure(AUTH_FAILURE_MESSAGE.to_string()));
            }
        };
        let display_name = entry
            .display_name
            .clone()
            .unwrap_or_else(|| entry.provider.clone());
        Ok(Principal {
            username: username.to_string(),
            display_name,
            provider: entry.provider.clone(),
        })
    }
}
