//! Providers for clinical values the source documents do not carry.
//!
//! Weight, blood pressure and a handful of lab results are required by the
//! referral form but are not extracted. A [`ClinicalValueProvider`] decides
//! what goes in those fields: plausible random values, fixed defaults, or
//! nothing at all so that a person fills them in.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A form value that has to come from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClinicalValue {
    /// Weight in kg, integer.
    Weight,
    /// Systolic-diastolic pressure, `"S-D"`.
    BloodPressure,
    /// Urea in mg/dL, integer.
    Urea,
    /// Creatinine in mg/dL, one decimal.
    Creatinine,
    /// Potassium in mEq/L, one decimal.
    Potassium,
    /// Fasting glucose in mg/dL, integer.
    Glycemia,
}

impl ClinicalValue {
    pub const ALL: [ClinicalValue; 6] = [
        ClinicalValue::Weight,
        ClinicalValue::BloodPressure,
        ClinicalValue::Urea,
        ClinicalValue::Creatinine,
        ClinicalValue::Potassium,
        ClinicalValue::Glycemia,
    ];

    /// Form field this value fills.
    pub fn key(self) -> &'static str {
        match self {
            ClinicalValue::Weight => "peso",
            ClinicalValue::BloodPressure => "pressao",
            ClinicalValue::Urea => "ureia",
            ClinicalValue::Creatinine => "creatinina",
            ClinicalValue::Potassium => "potassio",
            ClinicalValue::Glycemia => "glicemia",
        }
    }
}

/// Source of values for fields that cannot be extracted.
pub trait ClinicalValueProvider {
    fn value(&mut self, value: ClinicalValue) -> Result<String, ProviderError>;
}

/// Which provider a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// Random values inside clinically plausible ranges.
    #[default]
    Random,
    /// Fixed mid-range values.
    Fixed,
    /// Leave the fields empty for manual entry.
    Manual,
}

impl ValueSource {
    /// Build the provider; `seed` only matters for [`ValueSource::Random`].
    pub fn provider(self, seed: Option<u64>) -> Box<dyn ClinicalValueProvider> {
        match self {
            ValueSource::Random => match seed {
                Some(seed) => Box::new(RandomClinicalValues::seeded(seed)),
                None => Box::new(RandomClinicalValues::from_entropy()),
            },
            ValueSource::Fixed => Box::new(FixedClinicalValues),
            ValueSource::Manual => Box::new(ManualEntry),
        }
    }
}

/// Uniformly drawn values; blood pressure by rejection sampling.
pub struct RandomClinicalValues<R: Rng = StdRng> {
    rng: R,
}

impl RandomClinicalValues<StdRng> {
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible values for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomClinicalValues<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Systolic in 100..=140, diastolic in 60..=90, pulse pressure 30..=50.
    pub fn blood_pressure(&mut self) -> (u32, u32) {
        loop {
            let systolic = self.rng.gen_range(100..=140u32);
            let diastolic = self.rng.gen_range(60..=90u32);
            if (30..=50).contains(&(systolic as i64 - diastolic as i64)) {
                return (systolic, diastolic);
            }
        }
    }

    fn integer(&mut self, min: u32, max: u32) -> String {
        self.rng.gen_range(min..=max).to_string()
    }

    fn one_decimal(&mut self, min: f64, max: f64) -> String {
        let x: f64 = self.rng.gen_range(min..=max);
        format!("{:.1}", (x * 10.0).round() / 10.0)
    }
}

impl<R: Rng> ClinicalValueProvider for RandomClinicalValues<R> {
    fn value(&mut self, value: ClinicalValue) -> Result<String, ProviderError> {
        Ok(match value {
            ClinicalValue::Weight => self.integer(60, 80),
            ClinicalValue::BloodPressure => {
                let (systolic, diastolic) = self.blood_pressure();
                format!("{}-{}", systolic, diastolic)
            }
            ClinicalValue::Urea => self.integer(120, 180),
            ClinicalValue::Creatinine => self.one_decimal(5.5, 7.5),
            ClinicalValue::Potassium => self.one_decimal(4.0, 5.0),
            ClinicalValue::Glycemia => self.integer(80, 100),
        })
    }
}

/// The same mid-range values on every run.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClinicalValues;

impl ClinicalValueProvider for FixedClinicalValues {
    fn value(&mut self, value: ClinicalValue) -> Result<String, ProviderError> {
        let fixed = match value {
            ClinicalValue::Weight => "70",
            ClinicalValue::BloodPressure => "120-80",
            ClinicalValue::Urea => "150",
            ClinicalValue::Creatinine => "6.5",
            ClinicalValue::Potassium => "4.5",
            ClinicalValue::Glycemia => "90",
        };
        Ok(fixed.to_string())
    }
}

/// Refuses every value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualEntry;

impl ClinicalValueProvider for ManualEntry {
    fn value(&mut self, value: ClinicalValue) -> Result<String, ProviderError> {
        Err(ProviderError::ManualEntryRequired(value.key()))
    }
}
