//! Rule evaluation over catalog snapshots.
//!
//! All operations are pure functions of (snapshot, rule input); result
//! order equals catalog iteration order. Folders are never matched: they
//! pass through untouched at the caller, matching is a file-level concept.

use std::collections::HashMap;
use std::sync::RwLock;

use regex::Regex;

use crate::catalog::node::ResourceNode;
use crate::matcher::rules::{FreeformRule, SatelliteConfig};

#[derive(Default)]
pub struct MatchEngine {
    /// Compiled pattern cache. Failed compilations are cached as `None` so
    /// a bad pattern is only reported once.
    patterns: RwLock<HashMap<String, Option<Regex>>>,
}

impl MatchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles a pattern through the cache. Returns `None` for patterns
    /// that fail to compile.
    fn regex_for(&self, pattern: &str) -> Option<Regex> {
        {
            let cache = match self.patterns.read() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    log::warn!("Pattern cache lock was poisoned, recovering");
                    poisoned.into_inner()
                }
            };
            if let Some(entry) = cache.get(pattern) {
                return entry.clone();
            }
        }

        let compiled = match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                log::warn!("Invalid match pattern '{}': {}", pattern, e);
                None
            }
        };
        let mut cache = match self.patterns.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Pattern cache lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        cache.insert(pattern.to_string(), compiled.clone());
        compiled
    }

    /// Matches one named config against the files of a folder listing.
    ///
    /// A present-but-invalid regex yields an empty result: fail-closed, not
    /// fail-open. Without a regex the config's `code` / `satellite_type`
    /// substrings apply.
    pub fn match_by_single_config(
        &self,
        entries: &[ResourceNode],
        config: &SatelliteConfig,
    ) -> Vec<ResourceNode> {
        if let Some(pattern) = &config.regex {
            return match self.regex_for(pattern) {
                Some(re) => entries
                    .iter()
                    .filter(|n| n.is_file() && re.is_match(&n.name))
                    .cloned()
                    .collect(),
                None => vec![],
            };
        }

        entries
            .iter()
            .filter(|n| n.is_file() && substring_match(&n.name, config))
            .cloned()
            .collect()
    }

    /// Matches a caller-ordered config list against all files. The first
    /// config that matches wins; the result entry is a copy of the file
    /// enriched with that config's metadata, the original stays untouched.
    pub fn match_by_multiple_configs(
        &self,
        files: &[ResourceNode],
        configs: &[SatelliteConfig],
    ) -> Vec<ResourceNode> {
        let mut matched = Vec::new();
        for file in files.iter().filter(|n| n.is_file()) {
            for config in configs {
                if self.config_matches(&file.name, config) {
                    let mut enriched = file.clone();
                    enriched.satellite_type = Some(config.satellite_type.clone());
                    enriched.sensor = Some(config.payload.clone());
                    enriched.code = Some(config.code.clone());
                    enriched.resolution = Some(config.resolution.clone());
                    matched.push(enriched);
                    break;
                }
            }
        }
        matched
    }

    /// Matches ad-hoc field rules against a file set. A file passes when
    /// any rule accepts it; an empty rule list lets everything through.
    pub fn match_by_freeform_rules(
        &self,
        files: &[ResourceNode],
        rules: &[FreeformRule],
    ) -> Vec<ResourceNode> {
        if rules.is_empty() {
            return files.iter().filter(|n| n.is_file()).cloned().collect();
        }

        files
            .iter()
            .filter(|n| n.is_file())
            .filter(|n| rules.iter().any(|rule| self.rule_matches(&n.name, rule)))
            .cloned()
            .collect()
    }

    /// Per-config criterion as used by the multi-config scan. Unlike the
    /// single-config operation, an invalid regex here only disables this
    /// one config: the scan continues with the next one.
    fn config_matches(&self, name: &str, config: &SatelliteConfig) -> bool {
        if let Some(pattern) = &config.regex {
            return match self.regex_for(pattern) {
                Some(re) => re.is_match(name),
                None => false,
            };
        }
        substring_match(name, config)
    }

    fn rule_matches(&self, name: &str, rule: &FreeformRule) -> bool {
        if let Some(pattern) = &rule.regex {
            if let Some(re) = self.regex_for(pattern) {
                return re.is_match(name);
            }
            // Invalid regex falls through to the substring pair
        }

        let satellite = !rule.satellite.is_empty() && name.contains(&rule.satellite);
        let sensor = !rule.sensor.is_empty() && name.contains(&rule.sensor);
        if rule.satellite.is_empty() && rule.sensor.is_empty() {
            // Nothing supplied: the rule filters nothing
            return true;
        }
        satellite || sensor
    }
}

/// Substring containment: the name carries the config's code or its
/// satellite label. Empty fields never match.
fn substring_match(name: &str, config: &SatelliteConfig) -> bool {
    let code = !config.code.is_empty() && name.contains(&config.code);
    let satellite = !config.satellite_type.is_empty() && name.contains(&config.satellite_type);
    code || satellite
}
