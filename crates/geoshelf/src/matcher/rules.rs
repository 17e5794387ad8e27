use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a named match rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigId(String);

impl ConfigId {
    pub fn mint() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConfigId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A named matching rule against file naming conventions. When `regex` is
/// present it is the sole criterion; otherwise the `code` / `satellite_type`
/// substrings apply. A matched file is enriched with this rule's metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatelliteConfig {
    pub id: ConfigId,
    pub name: String,
    /// Satellite/platform label, e.g. "GF1".
    pub satellite_type: String,
    /// Sensor label, e.g. "PMS2".
    pub payload: String,
    /// Short identifier substring looked for in file names.
    pub code: String,
    pub resolution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

impl SatelliteConfig {
    pub fn new(name: &str, satellite_type: &str, payload: &str, code: &str, resolution: &str) -> Self {
        Self {
            id: ConfigId::mint(),
            name: name.to_string(),
            satellite_type: satellite_type.to_string(),
            payload: payload.to_string(),
            code: code.to_string(),
            resolution: resolution.to_string(),
            regex: None,
        }
    }

    pub fn with_regex(mut self, pattern: &str) -> Self {
        self.regex = Some(pattern.to_string());
        self
    }
}

/// Named rule collection, resolving caller-supplied id lists in caller
/// order. Unknown ids are dropped with a warning.
#[derive(Debug, Clone, Default)]
pub struct ConfigLibrary {
    configs: Vec<SatelliteConfig>,
}

impl ConfigLibrary {
    pub fn new(configs: Vec<SatelliteConfig>) -> Self {
        Self { configs }
    }

    pub fn add(&mut self, config: SatelliteConfig) {
        self.configs.retain(|c| c.id != config.id);
        self.configs.push(config);
    }

    pub fn get(&self, id: &ConfigId) -> Option<&SatelliteConfig> {
        self.configs.iter().find(|c| &c.id == id)
    }

    pub fn all(&self) -> &[SatelliteConfig] {
        &self.configs
    }

    /// Resolves ids to configs, preserving the caller's order. The order
    /// matters: the multi-config scan is first-match-wins.
    pub fn resolve(&self, ids: &[ConfigId]) -> Vec<SatelliteConfig> {
        ids.iter()
            .filter_map(|id| {
                let found = self.get(id);
                if found.is_none() {
                    log::warn!("Unknown match config '{}'", id.as_str());
                }
                found.cloned()
            })
            .collect()
    }
}

/// Ad-hoc field rule. Regex takes precedence when present and valid;
/// otherwise non-empty substring fields apply. A rule with neither lets
/// every file pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeformRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default)]
    pub satellite: String,
    #[serde(default)]
    pub sensor: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_preserves_caller_order() {
        let a = SatelliteConfig::new("a", "GF1", "PMS1", "PMS1", "8m");
        let b = SatelliteConfig::new("b", "GF2", "PMS2", "PMS2", "4m");
        let library = ConfigLibrary::new(vec![a.clone(), b.clone()]);

        let resolved = library.resolve(&[b.id.clone(), a.id.clone()]);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name, "b");
        assert_eq!(resolved[1].name, "a");
    }

    #[test]
    fn test_resolve_drops_unknown_ids() {
        let a = SatelliteConfig::new("a", "GF1", "PMS1", "PMS1", "8m");
        let library = ConfigLibrary::new(vec![a.clone()]);

        let resolved = library.resolve(&[ConfigId::from("missing"), a.id.clone()]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, "a");
    }

    #[test]
    fn test_add_replaces_by_id() {
        let mut library = ConfigLibrary::default();
        let mut config = SatelliteConfig::new("a", "GF1", "PMS1", "PMS1", "8m");
        library.add(config.clone());
        config.name = "renamed".to_string();
        library.add(config.clone());

        assert_eq!(library.all().len(), 1);
        assert_eq!(library.get(&config.id).unwrap().name, "renamed");
    }
}
