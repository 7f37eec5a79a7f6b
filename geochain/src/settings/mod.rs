//! Réglages des opérateurs

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Réglages partagés par le registre d'opérateurs
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// Nombre maximal de sommets d'un cercle complet (minimum 12)
    #[serde(default = "default_max_vertices")]
    pub max_vertices_in_full_circle: usize,

    /// Écart maximal corde/arc, dans l'unité de la référence ; aucun par défaut
    #[serde(default)]
    pub max_deviation: Option<f64>,

    /// Graine du mélange des sommets du cercle englobant
    #[serde(default = "default_enclosing_seed")]
    pub enclosing_circle_seed: u64,

    /// Subdivisions de chaque côté d'une enveloppe avant projection
    #[serde(default = "default_envelope_steps")]
    pub envelope_densify_steps: usize,
}

fn default_max_vertices() -> usize {
    96
}

fn default_enclosing_seed() -> u64 {
    1977
}

fn default_envelope_steps() -> usize {
    32
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_vertices_in_full_circle: default_max_vertices(),
            max_deviation: None,
            enclosing_circle_seed: default_enclosing_seed(),
            envelope_densify_steps: default_envelope_steps(),
        }
    }
}

impl Settings {
    /// Charge les réglages depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read settings file: {}", path.display()))?;

        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json).context("Failed to parse settings JSON")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Charge un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "default" => Self::load_embedded(include_str!("presets/default.json")),
            "fine" => Self::load_embedded(include_str!("presets/fine.json")),
            "coarse" => Self::load_embedded(include_str!("presets/coarse.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: default, fine, coarse", preset),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        Self::from_json(json).context("Failed to parse embedded settings")
    }

    fn validate(&self) -> Result<()> {
        if self.max_vertices_in_full_circle < 12 {
            anyhow::bail!(
                "max_vertices_in_full_circle must be at least 12, got {}",
                self.max_vertices_in_full_circle
            );
        }
        if let Some(deviation) = self.max_deviation {
            if !(deviation > 0.0) {
                anyhow::bail!("max_deviation must be positive, got {}", deviation);
            }
        }
        if self.envelope_densify_steps == 0 {
            anyhow::bail!("envelope_densify_steps must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preset_matches_default() {
        assert_eq!(Settings::from_preset("default").unwrap(), Settings::default());
    }

    #[test]
    fn test_all_presets_load() {
        for preset in ["default", "fine", "coarse"] {
            assert!(Settings::from_preset(preset).is_ok(), "{preset}");
        }
        assert!(Settings::from_preset("ultra").is_err());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let s = Settings::from_json(r#"{ "enclosing_circle_seed": 7 }"#).unwrap();
        assert_eq!(s.enclosing_circle_seed, 7);
        assert_eq!(s.max_vertices_in_full_circle, 96);
        assert_eq!(s.max_deviation, None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Settings::from_json(r#"{ "max_vertices_in_full_circle": 4 }"#).is_err());
        assert!(Settings::from_json(r#"{ "max_deviation": -1.0 }"#).is_err());
        assert!(Settings::from_json("not json").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("geochain-settings-test.json");
        std::fs::write(&path, r#"{ "envelope_densify_steps": 4 }"#).unwrap();
        let s = Settings::load(&path).unwrap();
        assert_eq!(s.envelope_densify_steps, 4);
        let _ = std::fs::remove_file(&path);
    }
}
