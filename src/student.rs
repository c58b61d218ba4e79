use serde::Deserialize;
use std::fmt::Display;

use crate::{
    catalog::{ClassLevel, MaterialRequest, MaterialType},
    error::HubError,
};

pub const PHONE_DIGITS: usize = 10;

pub const INVALID_PHONE: &str =
    "You have entered an invalid phone number. Please enter a 10-digit phone number.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Accepts exactly ten ASCII digits, nothing else.
    pub fn parse(input: &str) -> Result<Self, HubError> {
        let valid = input.len() == PHONE_DIGITS && input.bytes().all(|b| b.is_ascii_digit());

        if !valid {
            return Err(HubError::InvalidInput(INVALID_PHONE.to_string()));
        }

        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The student details form as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentForm {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub phone_number: String,

    pub class: ClassLevel,

    pub material_type: MaterialType,
}

impl StudentForm {
    pub fn request(&self) -> MaterialRequest {
        MaterialRequest::new(self.class, self.material_type)
    }

    pub fn validate(self) -> Result<StudentRecord, HubError> {
        let phone_number = PhoneNumber::parse(&self.phone_number)?;
        Ok(StudentRecord {
            name: self.name,
            phone_number,
            class: self.class,
            material_type: self.material_type,
        })
    }
}

/// One row of the download log.
#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub name: String,
    pub phone_number: PhoneNumber,
    pub class: ClassLevel,
    pub material_type: MaterialType,
}

impl StudentRecord {
    pub const HEADER: [&'static str; 4] = ["Name", "Phone Number", "Class", "Material Type"];

    pub fn row(&self) -> [&str; 4] {
        [
            self.name.as_str(),
            self.phone_number.as_str(),
            self.class.label(),
            self.material_type.label(),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionForm {
    #[serde(default)]
    pub name: String,

    pub class: ClassLevel,

    #[serde(default)]
    pub suggestion: String,
}

/// One row of the suggestion log.
#[derive(Debug, Clone)]
pub struct SuggestionRecord {
    pub name: String,
    pub class: ClassLevel,
    pub suggestion: String,
}

impl SuggestionRecord {
    pub const HEADER: [&'static str; 3] = ["Name", "Class", "Suggestion"];

    pub fn row(&self) -> [&str; 3] {
        [self.name.as_str(), self.class.label(), self.suggestion.as_str()]
    }
}

impl From<SuggestionForm> for SuggestionRecord {
    fn from(value: SuggestionForm) -> Self {
        let SuggestionForm {
            name,
            class,
            suggestion,
        } = value;
        Self {
            name,
            class,
            suggestion,
        }
    }
}
