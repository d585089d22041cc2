//! Brazilian tax document type (CPF/CNPJ).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`TaxId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxIdError {
    /// The input string is empty.
    #[error("tax document cannot be empty")]
    Empty,
    /// The input contains characters other than digits and separators.
    #[error("tax document may only contain digits, '.', '-' and '/'")]
    InvalidCharacter,
    /// The digit count matches neither CPF (11) nor CNPJ (14).
    #[error("tax document must have 11 digits (CPF) or 14 digits (CNPJ), got {got}")]
    WrongLength {
        /// Number of digits found in the input.
        got: usize,
    },
    /// A CNPJ was required but the input is a CPF.
    #[error("a company document (CNPJ, 14 digits) is required")]
    CnpjRequired,
}

/// Which kind of document a [`TaxId`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxIdKind {
    /// Natural-person document, 11 digits.
    Cpf,
    /// Company document, 14 digits.
    Cnpj,
}

/// A Brazilian tax document (CPF or CNPJ), stored as bare digits.
///
/// Producers register with either document; insurers must register with a
/// CNPJ. Input may be punctuated (`12.345.678/0001-95`) or bare
/// (`12345678000195`) - both normalize to the digit form that the backend
/// expects.
///
/// ## Examples
///
/// ```
/// use harper_core::{TaxId, TaxIdKind};
///
/// let cnpj = TaxId::parse("12.345.678/0001-95").unwrap();
/// assert_eq!(cnpj.kind(), TaxIdKind::Cnpj);
/// assert_eq!(cnpj.as_str(), "12345678000195");
///
/// let cpf = TaxId::parse("123.456.789-09").unwrap();
/// assert_eq!(cpf.kind(), TaxIdKind::Cpf);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TaxId(String);

impl TaxId {
    /// Parse a `TaxId` from punctuated or bare input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters other
    /// than digits and the usual separators, or does not have exactly 11 or
    /// 14 digits.
    pub fn parse(s: &str) -> Result<Self, TaxIdError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TaxIdError::Empty);
        }

        let mut digits = String::with_capacity(14);
        for c in trimmed.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
            } else if !matches!(c, '.' | '-' | '/' | ' ') {
                return Err(TaxIdError::InvalidCharacter);
            }
        }

        match digits.len() {
            11 | 14 => Ok(Self(digits)),
            got => Err(TaxIdError::WrongLength { got }),
        }
    }

    /// Parse a `TaxId` that must be a CNPJ (14 digits).
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`TaxId::parse`], plus
    /// [`TaxIdError::CnpjRequired`] when the input is a valid CPF.
    pub fn parse_cnpj(s: &str) -> Result<Self, TaxIdError> {
        let id = Self::parse(s)?;
        match id.kind() {
            TaxIdKind::Cnpj => Ok(id),
            TaxIdKind::Cpf => Err(TaxIdError::CnpjRequired),
        }
    }

    /// Which kind of document this is.
    #[must_use]
    pub fn kind(&self) -> TaxIdKind {
        if self.0.len() == 14 {
            TaxIdKind::Cnpj
        } else {
            TaxIdKind::Cpf
        }
    }

    /// Returns the normalized digit string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `TaxId` and returns its digit string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaxId {
    type Err = TaxIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
