//! Gemstone options that can be set into products.

use crate::model::validation::{limit_text, require_text, ValidationResult};
use crate::model::EntityId;
use serde::{Deserialize, Serialize};

pub const GEMSTONE_NAME_MAX_CHARS: usize = 100;
pub const GEMSTONE_COLOR_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gemstone {
    pub id: EntityId,
    pub name: String,
    /// Blank when the stone has no notable color.
    pub color: String,
    pub is_precious: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GemstoneDraft {
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub is_precious: bool,
}

impl GemstoneDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        require_text("name", &self.name, GEMSTONE_NAME_MAX_CHARS)?;
        limit_text("color", &self.color, GEMSTONE_COLOR_MAX_CHARS)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GemstonePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_precious: Option<bool>,
}

impl GemstonePatch {
    pub fn merge_into(self, current: &Gemstone) -> GemstoneDraft {
        GemstoneDraft {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            color: self.color.unwrap_or_else(|| current.color.clone()),
            is_precious: self.is_precious.unwrap_or(current.is_precious),
        }
    }
}
