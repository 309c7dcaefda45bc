//! Assembles a referral form from the three uploaded documents.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::clinical::{ClinicalValue, ClinicalValueProvider};
use crate::document::Document;
use crate::geo::{DisabledGeocoder, GeoResolver, Geocoder};
use crate::models::config::{BusinessDefaults, DialrefConfig};
use crate::models::form::{field_spec, FormRecord};
use crate::pdf::document_from_pdf;

use super::rules::{
    BirthDateExtractor, DiagnosisExtractor, FieldExtractor, LabeledValueExtractor,
    PersonNameExtractor, PhoneExtractor, PostalCodeExtractor,
};

/// Raw PDF uploads for one run; `None` when a file was not supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uploads<'a> {
    /// Registration sheet with patient demographics.
    pub demographics: Option<&'a [u8]>,
    /// Clinical evolution / summary.
    pub clinical: Option<&'a [u8]>,
    /// Laboratory results.
    pub labs: Option<&'a [u8]>,
}

/// The three documents of a referral.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferralDocuments {
    pub demographics: Document,
    pub clinical: Document,
    pub labs: Document,
}

impl ReferralDocuments {
    pub fn new(demographics: Document, clinical: Document, labs: Document) -> Self {
        Self {
            demographics,
            clinical,
            labs,
        }
    }

    /// Convert uploads to documents.
    ///
    /// Missing or unreadable uploads become empty documents; the returned
    /// warnings say which.
    pub fn load(uploads: &Uploads<'_>) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let mut read = |name: &str, upload: Option<&[u8]>| match upload {
            None => {
                debug!("No {} upload", name);
                Document::empty()
            }
            Some(data) => match document_from_pdf(data) {
                Ok(document) => {
                    debug!("{} upload: {} lines", name, document.lines().len());
                    document
                }
                Err(e) => {
                    warn!("Could not read {} PDF: {}", name, e);
                    warnings.push(format!("Could not read {} PDF: {}", name, e));
                    Document::empty()
                }
            },
        };

        let documents = Self {
            demographics: read("demographics", uploads.demographics),
            clinical: read("clinical", uploads.clinical),
            labs: read("labs", uploads.labs),
        };
        (documents, warnings)
    }
}

/// Result of assembling one form.
#[derive(Debug, Clone)]
pub struct AssemblyReport {
    /// The filled-in form.
    pub record: FormRecord,
    /// Things a reviewer should double-check.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Runs the field extractors and fills in the referral form.
pub struct FormAssembler {
    resolver: GeoResolver,
    diagnoses: DiagnosisExtractor,
    defaults: BusinessDefaults,
    values: Box<dyn ClinicalValueProvider>,
}

impl FormAssembler {
    /// Create an assembler with the built-in business defaults.
    pub fn new(
        resolver: GeoResolver,
        diagnoses: DiagnosisExtractor,
        values: Box<dyn ClinicalValueProvider>,
    ) -> Self {
        Self {
            resolver,
            diagnoses,
            defaults: BusinessDefaults::default(),
            values,
        }
    }

    /// Replace the fixed form values.
    pub fn with_defaults(mut self, defaults: BusinessDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Build an assembler from configuration.
    ///
    /// A geocoder that cannot be set up is replaced by one that never finds
    /// anything, so districts come out as not found.
    pub fn from_config(config: &DialrefConfig) -> Self {
        let geocoder = build_geocoder(config);
        let resolver = GeoResolver::new(geocoder, config.districts.0.clone())
            .with_locality(&config.geocoder.city, &config.geocoder.country);
        let diagnoses = DiagnosisExtractor::new(config.extraction.diagnosis_vocabulary.clone())
            .with_default(&config.extraction.default_diagnosis);
        let values = config.clinical.source.provider(config.clinical.seed);

        Self::new(resolver, diagnoses, values).with_defaults(config.defaults.clone())
    }

    /// Load the uploads and assemble the form.
    pub fn run(&mut self, uploads: &Uploads<'_>) -> AssemblyReport {
        let start = Instant::now();
        let (documents, load_warnings) = ReferralDocuments::load(uploads);
        let mut report = self.assemble(&documents);
        report.warnings.splice(0..0, load_warnings);
        report.processing_time_ms = elapsed_ms(start.elapsed());
        report
    }

    /// Assemble the form from already converted documents.
    pub fn assemble(&mut self, documents: &ReferralDocuments) -> AssemblyReport {
        let start = Instant::now();
        let mut warnings = Vec::new();
        let mut record = FormRecord::new();

        info!(
            "Assembling referral from {} + {} + {} lines",
            documents.demographics.lines().len(),
            documents.clinical.lines().len(),
            documents.labs.lines().len()
        );

        for (key, value) in &self.defaults.0 {
            record.set(key, value.as_str());
        }

        // Page 3: patient identification
        let demographics = &documents.demographics;
        if demographics.is_blank() {
            warnings.push("No demographics document; patient fields left empty".to_string());
        }
        for (key, extractor) in demographic_extractors() {
            let value = extractor.extract_or_empty(demographics);
            if value.is_empty() && !demographics.is_blank() {
                let label = field_spec(key).map(|f| f.label).unwrap_or(key);
                warnings.push(format!("Could not extract {}", label));
            }
            record.set(key, value);
        }

        let postal_code = record.get("cep").to_string();
        let assignment = self.resolver.resolve(&postal_code);
        if !assignment.is_found() && !postal_code.is_empty() {
            warnings.push(format!("Could not place postal code {} in a district", postal_code));
        }
        record.set("distrito", assignment.district);
        record.set("regiao_preferencia", assignment.region);

        // Page 4: clinical data
        record.set("diagnosticos", self.diagnoses.extract_or_empty(&documents.clinical));

        for value in ClinicalValue::ALL {
            match self.values.value(value) {
                Ok(v) => {
                    record.set(value.key(), v);
                }
                Err(e) => warnings.push(e.to_string()),
            }
        }

        debug!(
            "Assembled form for {:?} with {} warnings",
            record.get("nome"),
            warnings.len()
        );

        AssemblyReport {
            record,
            warnings,
            processing_time_ms: elapsed_ms(start.elapsed()),
        }
    }
}

fn demographic_extractors() -> Vec<(&'static str, Box<dyn FieldExtractor>)> {
    vec![
        ("nome", Box::new(PersonNameExtractor::patient())),
        ("nome_mae", Box::new(PersonNameExtractor::mother())),
        ("nascimento", Box::new(BirthDateExtractor::new())),
        ("telefone", Box::new(PhoneExtractor::new())),
        ("cpf", Box::new(LabeledValueExtractor::new("CIC"))),
        ("sexo", Box::new(LabeledValueExtractor::new("Sexo"))),
        ("cns", Box::new(LabeledValueExtractor::new("CNS"))),
        ("endereco", Box::new(LabeledValueExtractor::new("Endere"))),
        ("cep", Box::new(PostalCodeExtractor::new())),
    ]
}

#[cfg(feature = "native")]
fn build_geocoder(config: &DialrefConfig) -> Box<dyn Geocoder> {
    use crate::geo::NominatimGeocoder;

    if !config.geocoder.enabled {
        debug!("Geocoding disabled");
        return Box::new(DisabledGeocoder);
    }

    match NominatimGeocoder::new(
        &config.geocoder.base_url,
        &config.geocoder.user_agent,
        Duration::from_secs(config.geocoder.timeout_secs),
    ) {
        Ok(geocoder) => Box::new(geocoder),
        Err(e) => {
            warn!("Geocoder unavailable, districts will not be resolved: {}", e);
            Box::new(DisabledGeocoder)
        }
    }
}

#[cfg(not(feature = "native"))]
fn build_geocoder(_config: &DialrefConfig) -> Box<dyn Geocoder> {
    Box::new(DisabledGeocoder)
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    elapsed.as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinical::{FixedClinicalValues, ManualEntry, RandomClinicalValues};
    use crate::error::GeocodeError;
    use crate::geo::{default_districts, Coordinate, NOT_FOUND};
    use crate::models::form::{FieldSource, FORM_SCHEMA};
    use crate::referral::rules::DEFAULT_DIAGNOSIS;
    use pretty_assertions::assert_eq;

    const DEMOGRAPHICS: &str = "\
HOSPITAL DAS CLINICAS - FICHA DE CADASTRO
Telefone: (11) 2345-6789
JOAO PEREIRA DOS SANTOS
Nome do Paciente
ANA PEREIRA DOS SANTOS
Nome da Mãe
15/08/1962
Data Nascimento
Sexo: Masculino
CIC: 123.456.789-09
Prontuário: 1234567
CNS
898 0012 3456 7890
Endereço
RUA VERGUEIRO, 1000 APTO 12
01504-001
SÃO PAULO
CEP
Emitido em 02/03/2024
";

    const CLINICAL: &str = "\
Evolução clínica
Paciente com doença renal crônica em hemodiálise, diabetes mellitus tipo 2.
";

    struct FixedGeocoder(Option<Coordinate>);

    impl Geocoder for FixedGeocoder {
        fn geocode(&self, _query: &str) -> Result<Option<Coordinate>, GeocodeError> {
            Ok(self.0)
        }
    }

    struct UnreachableGeocoder;

    impl Geocoder for UnreachableGeocoder {
        fn geocode(&self, _query: &str) -> Result<Option<Coordinate>, GeocodeError> {
            Err(GeocodeError::Parse {
                message: "connection refused".to_string(),
            })
        }
    }

    fn vocabulary() -> Vec<String> {
        vec![
            "DIABETES MELLITUS".to_string(),
            "HIPERTENSÃO ARTERIAL".to_string(),
            "DOENÇA RENAL CRÔNICA".to_string(),
        ]
    }

    fn assembler(geocoder: impl Geocoder + 'static) -> FormAssembler {
        FormAssembler::new(
            GeoResolver::new(Box::new(geocoder), default_districts()),
            DiagnosisExtractor::new(vocabulary()),
            Box::new(FixedClinicalValues),
        )
    }

    fn documents() -> ReferralDocuments {
        ReferralDocuments::new(
            Document::from_text(DEMOGRAPHICS),
            Document::from_text(CLINICAL),
            Document::empty(),
        )
    }

    #[test]
    fn test_assemble_full_referral() {
        // Vila Mariana
        let geocoder = FixedGeocoder(Some(Coordinate::new(-23.5880, -46.6350)));
        let report = assembler(geocoder).assemble(&documents());
        let record = &report.record;

        assert_eq!(record.get("nome"), "JOAO PEREIRA DOS SANTOS");
        assert_eq!(record.get("nome_mae"), "ANA PEREIRA DOS SANTOS");
        assert_eq!(record.get("nascimento"), "15/08/1962");
        assert_eq!(record.get("sexo"), "Masculino");
        assert_eq!(record.get("cpf"), "123.456.789-09");
        assert_eq!(record.get("cns"), "898 0012 3456 7890");
        assert_eq!(record.get("endereco"), "RUA VERGUEIRO, 1000 APTO 12");
        assert_eq!(record.get("cep"), "01504-001");
        assert_eq!(record.get("telefone"), "11-23456789");
        assert_eq!(record.get("distrito"), "SUDESTE - VILA MARIANA");
        assert_eq!(record.get("regiao_preferencia"), "SUDESTE");
        assert_eq!(record.get("diagnosticos"), "DIABETES MELLITUS, DOENÇA RENAL CRÔNICA");
        assert_eq!(record.get("pressao"), "120-80");
        assert_eq!(record.get("hospital"), "INCOR");
        assert_eq!(record.get("tipo_solicitacao"), "INICIAL");
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn test_all_documents_absent() {
        let report = assembler(UnreachableGeocoder).assemble(&ReferralDocuments::default());
        let record = &report.record;

        for spec in FORM_SCHEMA.iter().filter(|f| f.source == FieldSource::Extracted) {
            let expected = if spec.key == "diagnosticos" { DEFAULT_DIAGNOSIS } else { "" };
            assert_eq!(record.get(spec.key), expected, "{}", spec.key);
        }
        assert_eq!(record.get("distrito"), NOT_FOUND);
        assert_eq!(record.get("regiao_preferencia"), "");
        assert_eq!(record.get("email"), "dialise@incor.usp.br");
        assert_eq!(record.iter().count(), FORM_SCHEMA.len());
        assert_eq!(
            report.warnings,
            vec!["No demographics document; patient fields left empty".to_string()]
        );
    }

    #[test]
    fn test_geocoding_failure_is_not_fatal() {
        let report = assembler(UnreachableGeocoder).assemble(&documents());
        assert_eq!(report.record.get("cep"), "01504-001");
        assert_eq!(report.record.get("distrito"), NOT_FOUND);
        assert_eq!(report.record.get("regiao_preferencia"), "");
        assert!(report.warnings.iter().any(|w| w.contains("01504-001")));
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let documents = ReferralDocuments::new(
            Document::from_text("Sexo: Feminino\nObs: sem mais dados"),
            Document::empty(),
            Document::empty(),
        );
        let report = assembler(FixedGeocoder(None)).assemble(&documents);
        assert_eq!(report.record.get("sexo"), "Feminino");
        assert_eq!(report.record.get("nome"), "");
        assert!(report.warnings.contains(&"Could not extract Nome do paciente".to_string()));
        assert!(!report.warnings.iter().any(|w| w.contains("Sexo")));
    }

    #[test]
    fn test_manual_entry_leaves_values_empty() {
        let mut assembler = FormAssembler::new(
            GeoResolver::new(Box::new(FixedGeocoder(None)), default_districts()),
            DiagnosisExtractor::new(Vec::new()),
            Box::new(ManualEntry),
        );
        let report = assembler.assemble(&documents());
        for value in ClinicalValue::ALL {
            assert_eq!(report.record.get(value.key()), "");
        }
        assert!(report.warnings.contains(&"pressao must be entered manually".to_string()));
    }

    #[test]
    fn test_random_values_are_filled() {
        let mut assembler = FormAssembler::new(
            GeoResolver::new(Box::new(FixedGeocoder(None)), default_districts()),
            DiagnosisExtractor::new(Vec::new()),
            Box::new(RandomClinicalValues::seeded(3)),
        );
        let report = assembler.assemble(&documents());
        for value in ClinicalValue::ALL {
            assert!(!report.record.get(value.key()).is_empty());
        }
    }

    #[test]
    fn test_custom_defaults() {
        let mut defaults = BusinessDefaults::default();
        defaults.0.insert("hospital".to_string(), "HC".to_string());
        let report = assembler(FixedGeocoder(None))
            .with_defaults(defaults)
            .assemble(&ReferralDocuments::default());
        assert_eq!(report.record.get("hospital"), "HC");
    }

    #[test]
    fn test_unreadable_uploads_degrade_to_empty_documents() {
        let uploads = Uploads {
            demographics: Some(&b"not a pdf"[..]),
            clinical: None,
            labs: Some(&[][..]),
        };
        let report = assembler(FixedGeocoder(None)).run(&uploads);
        assert_eq!(report.record.get("nome"), "");
        assert_eq!(report.record.get("diagnosticos"), DEFAULT_DIAGNOSIS);
        assert!(report.warnings[0].starts_with("Could not read demographics PDF"));
        assert!(report.warnings[1].starts_with("Could not read labs PDF"));
    }

    #[test]
    fn test_from_config_offline() {
        let mut config = DialrefConfig::default();
        config.geocoder.enabled = false;
        config.clinical.source = crate::clinical::ValueSource::Fixed;
        config.extraction.diagnosis_vocabulary = vocabulary();

        let report = FormAssembler::from_config(&config).assemble(&documents());
        assert_eq!(report.record.get("distrito"), NOT_FOUND);
        assert_eq!(report.record.get("peso"), "70");
        assert_eq!(report.record.get("diagnosticos"), "DIABETES MELLITUS, DOENÇA RENAL CRÔNICA");
    }
}
