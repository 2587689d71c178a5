use crate::error::{PlumbError, Result};
use crate::translate::is_known_capability;
use crate::types::CapabilityCode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_note: Option<String>,
    #[serde(default)]
    pub services: BTreeSet<CapabilityCode>,
}

impl Provider {
    pub fn offers(&self, code: &CapabilityCode) -> bool {
        self.services.contains(code)
    }
}

// ---------------------------------------------------------------------------
// ProviderCatalog
// ---------------------------------------------------------------------------

/// Read-only provider roster. Order is the file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderCatalog {
    pub providers: Vec<Provider>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogFinding {
    UnknownCapability { provider: String, code: String },
    NoServices { provider: String },
    DuplicateId { provider: String },
}

impl std::fmt::Display for CatalogFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogFinding::UnknownCapability { provider, code } => {
                write!(f, "provider '{provider}' advertises unknown capability '{code}'")
            }
            CatalogFinding::NoServices { provider } => {
                write!(f, "provider '{provider}' advertises no services")
            }
            CatalogFinding::DuplicateId { provider } => {
                write!(f, "provider id '{provider}' appears more than once")
            }
        }
    }
}

impl ProviderCatalog {
    pub fn new(providers: Vec<Provider>) -> Self {
        Self { providers }
    }

    /// Load the catalog fresh from disk. No caching.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PlumbError::CatalogNotFound(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        let catalog: ProviderCatalog = serde_json::from_str(&data)?;
        tracing::debug!(providers = catalog.providers.len(), path = %path.display(), "loaded provider catalog");
        Ok(catalog)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    pub fn audit(&self) -> Vec<CatalogFinding> {
        let mut findings = Vec::new();
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

        for p in &self.providers {
            *counts.entry(p.id.as_str()).or_default() += 1;
            if p.services.is_empty() {
                findings.push(CatalogFinding::NoServices {
                    provider: p.id.clone(),
                });
            }
            for code in &p.services {
                if !is_known_capability(code.as_str()) {
                    findings.push(CatalogFinding::UnknownCapability {
                        provider: p.id.clone(),
                        code: code.to_string(),
                    });
                }
            }
        }

        for (id, n) in counts {
            if n > 1 {
                findings.push(CatalogFinding::DuplicateId {
                    provider: id.to_string(),
                });
            }
        }

        findings
    }
}
