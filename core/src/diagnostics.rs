use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub location: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn field_parse(ordinal: usize, field: &str, message: impl Into<String>) -> Self {
        Self {
            location: Some(format!("host[{ordinal}].{field}")),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "[warn] {location}: {}", self.message),
            None => write!(f, "[warn] {}", self.message),
        }
    }
}
