//! Referral form schema and the flat record that fills it.

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::warn;

/// Where a form field's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Read from the uploaded documents.
    Extracted,
    /// Derived from the extracted postal code.
    Geo,
    /// Supplied by a clinical value provider.
    Provider,
    /// Fixed business default, configurable.
    Fixed,
}

/// One field of the referral form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key used in exports.
    pub key: &'static str,
    /// Caption shown to people.
    pub label: &'static str,
    /// Page of the regulation form the field sits on.
    pub page: u8,
    pub source: FieldSource,
}

const fn field(key: &'static str, label: &'static str, page: u8, source: FieldSource) -> FieldSpec {
    FieldSpec {
        key,
        label,
        page,
        source,
    }
}

use FieldSource::{Extracted, Fixed, Geo, Provider};

/// Every field of the form, in display order.
pub const FORM_SCHEMA: &[FieldSpec] = &[
    field("email", "Email", 1, Fixed),
    field("consentimento", "Consentimento", 1, Fixed),
    field("hospital", "Hospital", 2, Fixed),
    field("cidade", "Cidade", 2, Fixed),
    field("telefone fixo", "Telefone fixo", 2, Fixed),
    field("nome", "Nome do paciente", 3, Extracted),
    field("nome_mae", "Nome da mãe", 3, Extracted),
    field("nascimento", "Data de nascimento", 3, Extracted),
    field("peso", "Peso", 3, Provider),
    field("telefone", "Telefone", 3, Extracted),
    field("cpf", "CPF", 3, Extracted),
    field("sexo", "Sexo", 3, Extracted),
    field("cns", "CNS", 3, Extracted),
    field("endereco", "Endereço", 3, Extracted),
    field("cep", "CEP", 3, Extracted),
    field("regiao_preferencia", "Região de preferência", 3, Geo),
    field("distrito", "Distrito", 3, Geo),
    field("diagnosticos", "Diagnósticos", 4, Extracted),
    field("tratamento_atual", "Tratamento atual", 4, Fixed),
    field("outras_patologias", "Outras patologias", 4, Fixed),
    field("transplante", "Já realizou transplante", 4, Fixed),
    field("data_transplante", "Data do transplante", 4, Fixed),
    field("modalidade", "Modalidade", 4, Fixed),
    field("acesso", "Acesso", 4, Fixed),
    field("sangramentos", "Sangramentos", 4, Fixed),
    field("condicoes_hemo", "Condições hemodinâmicas", 4, Fixed),
    field("pressao", "Pressão arterial", 4, Provider),
    field("ureia", "Ureia", 4, Provider),
    field("creatinina", "Creatinina", 4, Provider),
    field("potassio", "Potássio", 4, Provider),
    field("glicemia", "Glicemia", 4, Provider),
    field("clearance", "Clearance", 4, Fixed),
    field("HbsAg", "HbsAg", 4, Fixed),
    field("AntiHbs", "Anti-Hbs", 4, Fixed),
    field("AntiHbc", "Anti-Hbc", 4, Fixed),
    field("HIV", "HIV", 4, Fixed),
    field("HCV", "HCV", 4, Fixed),
    field("medico", "Médico responsável", 4, Fixed),
    field("crm", "CRM", 4, Fixed),
    field("uf_crm", "UF CRM", 4, Fixed),
    field("tipo_solicitacao", "Tipo de Solicitação", 5, Fixed),
    field("alta", "Paciente em condições de alta?", 7, Fixed),
    field("observacoes", "Informações adicionais", 7, Fixed),
];

/// Look up a field by key.
pub fn field_spec(key: &str) -> Option<&'static FieldSpec> {
    FORM_SCHEMA.iter().find(|f| f.key == key)
}

fn position(key: &str) -> Option<usize> {
    FORM_SCHEMA.iter().position(|f| f.key == key)
}

/// A filled-in referral form.
///
/// Holds exactly one value per schema field; fields nobody set are `""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRecord {
    values: Vec<String>,
}

impl FormRecord {
    /// A record with every field empty.
    pub fn new() -> Self {
        Self {
            values: vec![String::new(); FORM_SCHEMA.len()],
        }
    }

    /// Set a field. Returns `false` for keys outside the schema.
    pub(crate) fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        match position(key) {
            Some(i) => {
                self.values[i] = value.into();
                true
            }
            None => {
                warn!("Ignoring value for unknown form field {:?}", key);
                false
            }
        }
    }

    /// Value of a field, `""` when unset or unknown.
    pub fn get(&self, key: &str) -> &str {
        position(key).map(|i| self.values[i].as_str()).unwrap_or("")
    }

    /// Fields and values in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static FieldSpec, &str)> + '_ {
        FORM_SCHEMA
            .iter()
            .zip(self.values.iter().map(String::as_str))
    }

    /// Fields grouped by form page, pages ascending.
    pub fn pages(&self) -> Vec<(u8, Vec<(&'static FieldSpec, &str)>)> {
        let mut pages: Vec<(u8, Vec<(&'static FieldSpec, &str)>)> = Vec::new();
        for (spec, value) in self.iter() {
            if pages.last().is_none_or(|(page, _)| *page != spec.page) {
                pages.push((spec.page, Vec::new()));
            }
            if let Some((_, fields)) = pages.last_mut() {
                fields.push((spec, value));
            }
        }
        pages
    }
}

impl Default for FormRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for FormRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FORM_SCHEMA.len()))?;
        for (spec, value) in self.iter() {
            map.serialize_entry(spec.key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_schema_keys_are_unique() {
        let keys: HashSet<_> = FORM_SCHEMA.iter().map(|f| f.key).collect();
        assert_eq!(keys.len(), FORM_SCHEMA.len());
    }

    #[test]
    fn test_new_record_has_every_key_empty() {
        let record = FormRecord::new();
        assert_eq!(record.iter().count(), FORM_SCHEMA.len());
        assert!(record.iter().all(|(_, v)| v.is_empty()));
    }

    #[test]
    fn test_set_and_get() {
        let mut record = FormRecord::new();
        assert!(record.set("nome", "MARIA DA SILVA"));
        assert!(!record.set("nickname", "Mari"));
        assert_eq!(record.get("nome"), "MARIA DA SILVA");
        assert_eq!(record.get("nickname"), "");
    }

    #[test]
    fn test_pages_are_grouped_in_order() {
        let record = FormRecord::new();
        let pages = record.pages();
        let numbers: Vec<u8> = pages.iter().map(|(page, _)| *page).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 7]);
        assert_eq!(pages[0].1[0].0.key, "email");
    }

    #[test]
    fn test_serializes_in_schema_order() {
        let mut record = FormRecord::new();
        record.set("cep", "01310-100");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.starts_with(r#"{"email":"","consentimento":"""#));
        assert!(json.contains(r#""cep":"01310-100""#));
        assert!(json.find("\"email\"").unwrap() < json.find("\"observacoes\"").unwrap());
    }
}
