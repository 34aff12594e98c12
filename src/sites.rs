/// Configured monitoring site list.
///
/// The service tracks a small, user-managed set of validated sites. The
/// list is persisted as TOML and edited through the admin collaborator;
/// this module owns loading, saving, and the invariants the admin layer
/// relies on: unique site numbers and a non-empty opaque `id` per entry
/// (regenerated on load when missing, e.g. after a hand-edited file).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::model::Site;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum SiteListError {
    /// The file could not be read or written.
    Io(String),
    /// The file contents were not valid TOML for a site list.
    Parse(String),
}

impl fmt::Display for SiteListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteListError::Io(msg) => write!(f, "Site list I/O error: {}", msg),
            SiteListError::Parse(msg) => write!(f, "Site list parse error: {}", msg),
        }
    }
}

impl std::error::Error for SiteListError {}

// ---------------------------------------------------------------------------
// Site list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteList {
    #[serde(default)]
    pub sites: Vec<Site>,
}

impl SiteList {
    /// Loads a site list from a TOML file and regenerates any missing ids.
    pub fn load(path: &Path) -> Result<SiteList, SiteListError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| SiteListError::Io(e.to_string()))?;
        let mut list: SiteList =
            toml::from_str(&contents).map_err(|e| SiteListError::Parse(e.to_string()))?;
        list.ensure_ids();
        Ok(list)
    }

    /// Writes the site list back as TOML.
    pub fn save(&self, path: &Path) -> Result<(), SiteListError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| SiteListError::Parse(e.to_string()))?;
        std::fs::write(path, contents).map_err(|e| SiteListError::Io(e.to_string()))
    }

    /// Assigns an id to every entry missing one. Returns how many were
    /// assigned.
    pub fn ensure_ids(&mut self) -> usize {
        let base = Utc::now().timestamp_micros();
        let mut assigned = 0;
        for (index, site) in self.sites.iter_mut().enumerate() {
            if site.id.is_empty() {
                // Clock-derived like the ids existing installs carry; the
                // index keeps ids distinct within one pass.
                site.id = format!("usgs_{:x}{:x}", base, index);
                assigned += 1;
            }
        }
        assigned
    }

    pub fn find(&self, site_number: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.site_number == site_number)
    }

    /// Adds a site, rejecting duplicates by site number. Assigns an id if
    /// the new entry lacks one.
    pub fn add(&mut self, site: Site) -> bool {
        if self.find(&site.site_number).is_some() {
            return false;
        }
        self.sites.push(site);
        self.ensure_ids();
        true
    }

    /// Removes a site by site number. Returns whether anything was removed.
    pub fn remove(&mut self, site_number: &str) -> bool {
        let before = self.sites.len();
        self.sites.retain(|s| s.site_number != site_number);
        self.sites.len() != before
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
