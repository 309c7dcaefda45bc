//! Common regex patterns and value validators for referral documents.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Names are printed in capitals, accents included
    pub static ref PERSON_NAME: Regex = Regex::new(
        r"^[A-ZÀ-Ú ]{5,}$"
    ).unwrap();

    // DD/MM/YYYY, alone on its line
    pub static ref BIRTH_DATE: Regex = Regex::new(
        r"^\d{2}/\d{2}/\d{4}$"
    ).unwrap();

    pub static ref DATE_ANYWHERE: Regex = Regex::new(
        r"(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    // (11) 2345-6789, 11 98765-4321, 1123456789
    pub static ref PHONE: Regex = Regex::new(
        r"\(?(\d{2})\)?[-\s]?(\d{4,5})[-\s]?(\d{4})"
    ).unwrap();

    // CEP: 01310-100 or 01310100
    pub static ref POSTAL_CODE: Regex = Regex::new(
        r"\d{5}-?\d{3}"
    ).unwrap();
}

/// Upper-case name of at least five characters.
pub fn is_person_name(candidate: &str) -> bool {
    PERSON_NAME.is_match(candidate)
}

/// Exactly `DD/MM/YYYY`.
pub fn is_birth_date(candidate: &str) -> bool {
    BIRTH_DATE.is_match(candidate)
}

/// Line carries a CEP-shaped digit run somewhere.
pub fn has_postal_code(candidate: &str) -> bool {
    POSTAL_CODE.is_match(candidate)
}

/// First CEP-shaped run in `candidate`, as `NNNNN-NNN`.
pub fn postal_code_in(candidate: &str) -> Option<String> {
    POSTAL_CODE
        .find(candidate)
        .map(|m| normalize_postal_code(m.as_str()))
}

/// Insert the hyphen into a bare 8-digit CEP; anything else is kept.
pub fn normalize_postal_code(cep: &str) -> String {
    if cep.len() == 8 {
        format!("{}-{}", &cep[..5], &cep[5..])
    } else {
        cep.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_name() {
        assert!(is_person_name("MARIA DA SILVA"));
        assert!(is_person_name("JOSÉ ÂNGELO"));
        assert!(!is_person_name("Maria Da Silva"));
        assert!(!is_person_name("ANA"));
        assert!(!is_person_name("MARIA 2"));
    }

    #[test]
    fn test_birth_date() {
        assert!(is_birth_date("12/05/1980"));
        assert!(!is_birth_date("12/05/80"));
        assert!(!is_birth_date("Nasc. 12/05/1980"));
    }

    #[test]
    fn test_postal_code_in() {
        assert_eq!(postal_code_in("01310-100"), Some("01310-100".to_string()));
        assert_eq!(postal_code_in("01310100"), Some("01310-100".to_string()));
        assert_eq!(
            postal_code_in("Av. Paulista 1000 - 01310100 SP"),
            Some("01310-100".to_string())
        );
        assert_eq!(postal_code_in("Av. Paulista"), None);
        assert!(!has_postal_code("0131-0100"));
    }
}
