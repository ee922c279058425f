//! GSTIN (GST identification number) structural validation.
//!
//! Structural checks only: 15 characters laid out as
//! `2 digits` + `5 letters` + `4 digits` + `1 letter` + `1 alphanumeric` +
//! literal `Z` + `1 alphanumeric` (e.g. `29ABCDE1234F1Z5`). Checksum
//! validation against the GST registry is out of scope.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A structurally valid GST identification number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gstin(String);

/// GST state-code prefix → state name. Used to derive the seller's state from
/// their own GSTIN when no explicit seller state is configured.
const STATE_CODES: &[(&str, &str)] = &[
    ("01", "Jammu and Kashmir"),
    ("02", "Himachal Pradesh"),
    ("03", "Punjab"),
    ("04", "Chandigarh"),
    ("05", "Uttarakhand"),
    ("06", "Haryana"),
    ("07", "Delhi"),
    ("08", "Rajasthan"),
    ("09", "Uttar Pradesh"),
    ("10", "Bihar"),
    ("11", "Sikkim"),
    ("12", "Arunachal Pradesh"),
    ("13", "Nagaland"),
    ("14", "Manipur"),
    ("15", "Mizoram"),
    ("16", "Tripura"),
    ("17", "Meghalaya"),
    ("18", "Assam"),
    ("19", "West Bengal"),
    ("20", "Jharkhand"),
    ("21", "Odisha"),
    ("22", "Chhattisgarh"),
    ("23", "Madhya Pradesh"),
    ("24", "Gujarat"),
    ("27", "Maharashtra"),
    ("29", "Karnataka"),
    ("30", "Goa"),
    ("32", "Kerala"),
    ("33", "Tamil Nadu"),
    ("34", "Puducherry"),
    ("36", "Telangana"),
    ("37", "Andhra Pradesh"),
];

impl Gstin {
    /// Validate and normalize (uppercase) a GSTIN.
    pub fn parse(input: &str) -> DomainResult<Gstin> {
        let s: String = input.trim().to_uppercase();
        let chars: Vec<char> = s.chars().collect();

        if chars.len() != 15 {
            return Err(DomainError::validation(format!(
                "GST number must be 15 characters, got {}",
                chars.len()
            )));
        }

        let ok = chars[0..2].iter().all(|c| c.is_ascii_digit())
            && chars[2..7].iter().all(|c| c.is_ascii_uppercase())
            && chars[7..11].iter().all(|c| c.is_ascii_digit())
            && chars[11].is_ascii_uppercase()
            && chars[12].is_ascii_alphanumeric()
            && chars[13] == 'Z'
            && chars[14].is_ascii_alphanumeric();

        if !ok {
            return Err(DomainError::validation(format!(
                "'{input}' is not a structurally valid GST number (expected format like 29ABCDE1234F1Z5)"
            )));
        }

        Ok(Gstin(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 2-digit state-code prefix.
    pub fn state_code(&self) -> &str {
        &self.0[0..2]
    }

    /// State name for this GSTIN's state-code prefix, if the code is known.
    pub fn state_name(&self) -> Option<&'static str> {
        let code = self.state_code();
        STATE_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| *name)
    }
}

impl ValueObject for Gstin {}

impl fmt::Display for Gstin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Gstin {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gstin::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_gstin() {
        let g = Gstin::parse("29ABCDE1234F1Z5").unwrap();
        assert_eq!(g.as_str(), "29ABCDE1234F1Z5");
        assert_eq!(g.state_code(), "29");
        assert_eq!(g.state_name(), Some("Karnataka"));
    }

    #[test]
    fn normalizes_lowercase_input() {
        let g = Gstin::parse("07abcde1234f1z5").unwrap();
        assert_eq!(g.as_str(), "07ABCDE1234F1Z5");
        assert_eq!(g.state_name(), Some("Delhi"));
    }

    #[test]
    fn rejects_structural_violations() {
        // wrong length
        assert!(Gstin::parse("29ABCDE1234F1Z").is_err());
        // letters where digits belong
        assert!(Gstin::parse("A9ABCDE1234F1Z5").is_err());
        // digit in the PAN letter block
        assert!(Gstin::parse("29AB1DE1234F1Z5").is_err());
        // missing fixed Z at position 14
        assert!(Gstin::parse("29ABCDE1234F1X5").is_err());
    }

    #[test]
    fn unknown_state_code_has_no_name() {
        let g = Gstin::parse("99ABCDE1234F1Z5").unwrap();
        assert_eq!(g.state_name(), None);
    }
}
