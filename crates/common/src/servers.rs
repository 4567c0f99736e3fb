//! Recently used server addresses
//!
//! Stored newest-first, one `host:port` per line.

use std::fs;
use std::io;
use std::path::Path;

/// Address offered when no server has been used yet
pub const DEFAULT_SERVER: &str = "127.0.0.1:2181";

/// Port appended to addresses that do not name one
pub const DEFAULT_PORT: u16 = 2181;

#[derive(Debug, thiserror::Error)]
pub enum ServersError {
    #[error("failed to read server list {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to write server list {path}: {source}")]
    Write { path: String, source: io::Error },
}

/// Append the default port to an address lacking a `:`
pub fn normalize_address(address: &str) -> String {
    let address = address.trim();
    if address.contains(':') {
        address.to_string()
    } else {
        format!("{}:{}", address, DEFAULT_PORT)
    }
}

/// Newest-first, de-duplicated list of server addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentServers {
    entries: Vec<String>,
}

impl Default for RecentServers {
    fn default() -> Self {
        Self {
            entries: vec![DEFAULT_SERVER.to_string()],
        }
    }
}

impl RecentServers {
    /// Parse the file format: blank lines are skipped, later duplicates
    /// dropped, and an empty result falls back to the default server
    pub fn parse(text: &str) -> Self {
        let mut entries: Vec<String> = Vec::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if !entries.iter().any(|e| e == line) {
                entries.push(line.to_string());
            }
        }

        if entries.is_empty() {
            return Self::default();
        }
        Self { entries }
    }

    /// Load from `path`; a missing file yields the default list
    pub fn load(path: &Path) -> Result<Self, ServersError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ServersError::Read {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ServersError> {
        fs::write(path, self.to_text()).map_err(|source| ServersError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn to_text(&self) -> String {
        self.entries.join("\n")
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn most_recent(&self) -> Option<&str> {
        self.entries.first().map(String::as_str)
    }

    /// Move `address` to the front, keeping the relative order of the rest
    pub fn promote(&mut self, address: &str) {
        let address = normalize_address(address);
        self.entries.retain(|e| *e != address);
        self.entries.insert(0, address);
    }
}
