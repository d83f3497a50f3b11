use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub file: String,
    pub rows: usize,
    pub sha256: String,
}

/// No timestamps: unchanged inputs reproduce it byte for byte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub tables: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn record(&mut self, file: &str, rows: usize, bytes: &[u8]) {
        self.tables.push(ManifestEntry {
            file: file.to_string(),
            rows,
            sha256: sha256_hex(bytes),
        });
    }

    pub fn get(&self, file: &str) -> Option<&ManifestEntry> {
        self.tables.iter().find(|e| e.file == file)
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE);
        let raw = serde_json::to_string_pretty(self).context("serialize manifest")?;
        fs::write(&path, raw).with_context(|| format!("write {}", path.display()))?;
        tracing::info!(tables = self.tables.len(), path = %path.display(), "wrote manifest");
        Ok(())
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
    }

    /// Entries whose file on disk no longer hashes to the recorded digest.
    pub fn stale_entries(&self, dir: &Path) -> Result<Vec<String>> {
        let mut stale = Vec::new();
        for entry in &self.tables {
            let path = dir.join(&entry.file);
            let bytes = fs::read(&path).with_context(|| format!("read {}", path.display()))?;
            if sha256_hex(&bytes) != entry.sha256 {
                stale.push(entry.file.clone());
            }
        }
        Ok(stale)
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
