use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::field::{parse_canonical, to_decimal, FieldElement, FieldError};

/// A reporter's receipt identifier. Never printed in full.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ReceiptSecret {
    value: FieldElement,
    /// Last two characters of the caller's text, kept for diagnostics.
    hint: String,
}

impl ReceiptSecret {
    pub fn parse(s: &str) -> Result<Self, FieldError> {
        let value = parse_canonical(s)?;
        let trimmed = s.trim();
        // short identifiers would be given away entirely by a two-char hint
        let hint = match trimmed.char_indices().rev().nth(1) {
            Some((i, _)) if trimmed.chars().count() > 4 => trimmed[i..].to_string(),
            _ => String::new(),
        };
        Ok(Self { value, hint })
    }

    pub fn as_fr(&self) -> &FieldElement {
        &self.value
    }

    pub fn redacted(&self) -> String {
        format!("****{}", self.hint)
    }
}

impl fmt::Debug for ReceiptSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReceiptSecret").field(&self.redacted()).finish()
    }
}

impl fmt::Display for ReceiptSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Public auxiliary value bound into every report proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportTag(pub FieldElement);

impl ReportTag {
    pub fn parse(s: &str) -> Result<Self, FieldError> {
        parse_canonical(s).map(Self)
    }

    pub fn as_fr(&self) -> &FieldElement {
        &self.0
    }
}

impl fmt::Display for ReportTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_decimal(&self.0))
    }
}
