//! Configuration structures for the referral pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::form::{field_spec, FieldSource};
use crate::clinical::ValueSource;
use crate::error::{DialrefError, Result};
use crate::geo::{default_districts, District};
use crate::referral::rules::DEFAULT_DIAGNOSIS;

/// Main configuration for the dialref pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DialrefConfig {
    /// Geocoding configuration.
    pub geocoder: GeocoderConfig,

    /// District centroids, in tie-breaking order.
    pub districts: DistrictTable,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Fixed form values, keyed by form field.
    pub defaults: BusinessDefaults,

    /// Values the documents do not provide.
    pub clinical: ClinicalConfig,
}

/// Geocoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Call the geocoding service at all.
    pub enabled: bool,

    /// Nominatim search endpoint.
    pub base_url: String,

    /// Identifying User-Agent, required by the public Nominatim instance.
    pub user_agent: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// City appended to every postal code query.
    pub city: String,

    /// Country appended to every postal code query.
    pub country: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://nominatim.openstreetmap.org/search".to_string(),
            user_agent: "dialref-geolocator".to_string(),
            timeout_secs: 10,
            city: "São Paulo".to_string(),
            country: "Brasil".to_string(),
        }
    }
}

/// District table wrapper so the default is the São Paulo table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistrictTable(pub Vec<District>);

impl Default for DistrictTable {
    fn default() -> Self {
        Self(default_districts())
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Diagnoses to look for in the clinical summary, upper case.
    ///
    /// Empty by default: the list is site-specific and must be supplied.
    pub diagnosis_vocabulary: Vec<String>,

    /// Diagnosis reported when no clinical summary is uploaded.
    pub default_diagnosis: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            diagnosis_vocabulary: Vec::new(),
            default_diagnosis: DEFAULT_DIAGNOSIS.to_string(),
        }
    }
}

/// Fixed form values.
///
/// A configured table is layered over the built-in one, so a file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BusinessDefaults(pub BTreeMap<String, String>);

impl<'de> Deserialize<'de> for BusinessDefaults {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let overrides = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut defaults = Self::default();
        defaults.0.extend(overrides);
        Ok(defaults)
    }
}

impl Default for BusinessDefaults {
    fn default() -> Self {
        let pairs = [
            ("email", "dialise@incor.usp.br"),
            ("consentimento", "sim"),
            ("hospital", "INCOR"),
            ("cidade", "SP - São Paulo"),
            ("telefone fixo", "11-26610000"),
            ("tratamento_atual", "DIALITICO"),
            ("outras_patologias", "INSUFICIENCIA CARDIACA"),
            ("transplante", "NAO"),
            ("data_transplante", ""),
            ("modalidade", "HEMO"),
            ("acesso", "CATETER"),
            ("sangramentos", "NAO"),
            ("condicoes_hemo", "ESTÁVEL"),
            ("clearance", "0"),
            ("HbsAg", "NEG"),
            ("AntiHbs", "NEG"),
            ("AntiHbc", "NEG"),
            ("HIV", "NEG"),
            ("HCV", "NEG"),
            ("medico", "Karoline Wayla Costa"),
            ("crm", "202865"),
            ("uf_crm", "SP"),
            ("tipo_solicitacao", "INICIAL"),
            ("alta", "SIM"),
            ("observacoes", ""),
        ];
        Self(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Clinical value provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalConfig {
    /// Which provider fills weight, pressure and labs.
    pub source: ValueSource,

    /// Seed for reproducible random values.
    pub seed: Option<u64>,
}

impl DialrefConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> std::result::Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check that defaults only target fixed form fields.
    pub fn validate(&self) -> Result<()> {
        for key in self.defaults.0.keys() {
            match field_spec(key) {
                None => {
                    return Err(DialrefError::Config(format!(
                        "default for unknown form field {:?}",
                        key
                    )));
                }
                Some(spec) if spec.source != FieldSource::Fixed => {
                    return Err(DialrefError::Config(format!(
                        "form field {:?} is filled from the documents, not from defaults",
                        key
                    )));
                }
                Some(_) => {}
            }
        }

        if self.geocoder.timeout_secs == 0 {
            return Err(DialrefError::Config(
                "geocoder.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::form::FORM_SCHEMA;

    #[test]
    fn test_default_config_is_valid() {
        let config = DialrefConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.districts.0.len(), 6);
        assert!(config.extraction.diagnosis_vocabulary.is_empty());
    }

    #[test]
    fn test_defaults_cover_every_fixed_field() {
        let defaults = BusinessDefaults::default();
        for spec in FORM_SCHEMA.iter().filter(|f| f.source == FieldSource::Fixed) {
            assert!(defaults.0.contains_key(spec.key), "{}", spec.key);
        }
    }

    #[test]
    fn test_rejects_defaults_for_extracted_fields() {
        let mut config = DialrefConfig::default();
        config.defaults.0.insert("nome".to_string(), "FULANO".to_string());
        assert!(matches!(config.validate(), Err(DialrefError::Config(_))));

        let mut config = DialrefConfig::default();
        config.defaults.0.insert("apelido".to_string(), "x".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "geocoder": { "enabled": false },
            "extraction": { "diagnosis_vocabulary": ["DIABETES MELLITUS"] },
            "clinical": { "source": "fixed" }
        }"#;
        let config: DialrefConfig = serde_json::from_str(json).unwrap();
        assert!(!config.geocoder.enabled);
        assert_eq!(config.geocoder.timeout_secs, 10);
        assert_eq!(config.extraction.diagnosis_vocabulary, vec!["DIABETES MELLITUS"]);
        assert_eq!(config.extraction.default_diagnosis, DEFAULT_DIAGNOSIS);
        assert_eq!(config.clinical.source, ValueSource::Fixed);
        assert_eq!(config.defaults, BusinessDefaults::default());
    }

    #[test]
    fn test_partial_defaults_are_merged() {
        let json = r#"{ "defaults": { "hospital": "HC", "observacoes": "retorno em 30 dias" } }"#;
        let config: DialrefConfig = serde_json::from_str(json).unwrap();
        let defaults = &config.defaults.0;
        assert_eq!(defaults.get("hospital").map(String::as_str), Some("HC"));
        assert_eq!(defaults.get("observacoes").map(String::as_str), Some("retorno em 30 dias"));
        assert_eq!(defaults.get("email").map(String::as_str), Some("dialise@incor.usp.br"));
        assert_eq!(defaults.len(), BusinessDefaults::default().0.len());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = DialrefConfig::default();
        config.clinical.seed = Some(99);
        config.save(&path).unwrap();

        let loaded = DialrefConfig::from_file(&path).unwrap();
        assert_eq!(loaded.clinical.seed, Some(99));
        assert_eq!(loaded.districts, config.districts);
    }
}
