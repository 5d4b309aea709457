use std::{fmt, str::FromStr};

use thiserror::Error;

/// Editable fields of a doctor draft, named as the form inputs are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Name,
    Speciality,
}

impl DraftField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Speciality => "speciality",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftField {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "name" => Ok(Self::Name),
            "speciality" => Ok(Self::Speciality),
            other => Err(ValidationError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required field '{0}' is empty")]
    MissingField(DraftField),
    #[error("unknown draft field '{0}'")]
    UnknownField(String),
}

#[derive(Debug, Error)]
pub enum ClinicError {
    #[error("remote call failed with status {status}: {body}")]
    Remote { status: u16, body: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl ClinicError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type ClinicResult<T> = std::result::Result<T, ClinicError>;
