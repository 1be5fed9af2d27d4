//! Raw material records
//!
//! A raw material entry lists the material, its components with their share
//! and supplier, and the manufacturing date. Records are exported as a short
//! summary text, either to a file or encoded in a QR code.

use serde::{Serialize, Deserialize};

use crate::error::{ClientError, Result};

/// One component of a raw material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Component name
    pub name: String,

    /// Share in percent, as entered
    pub percent: String,

    /// Supplier name
    pub supplier: String,
}

impl Component {
    /// Create a component
    pub fn new(name: impl Into<String>, percent: impl Into<String>, supplier: impl Into<String>) -> Self {
        Component {
            name: name.into(),
            percent: percent.into(),
            supplier: supplier.into(),
        }
    }

    /// Parse `name:percent:supplier`
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.splitn(3, ':');
        let name = parts.next()?.trim();
        let percent = parts.next()?.trim().trim_end_matches('%');
        let supplier = parts.next().unwrap_or("").trim();
        if name.is_empty() {
            return None;
        }
        Some(Component::new(name, percent, supplier))
    }
}

/// A raw material with its components
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRecord {
    /// Raw material, e.g. a formula or trade name
    pub raw_material: String,

    /// Components in entry order
    pub components: Vec<Component>,

    /// Manufacturing date, as entered
    pub manufacturing_date: String,
}

impl MaterialRecord {
    /// Create a record
    pub fn new(raw_material: impl Into<String>, components: Vec<Component>, manufacturing_date: impl Into<String>) -> Self {
        MaterialRecord {
            raw_material: raw_material.into(),
            components,
            manufacturing_date: manufacturing_date.into(),
        }
    }

    /// Check the fields a QR code needs
    pub fn validate(&self) -> Result<()> {
        if self.raw_material.trim().is_empty() {
            return Err(ClientError::MissingField("raw material".to_string()));
        }
        if self.manufacturing_date.trim().is_empty() {
            return Err(ClientError::MissingField("manufacturing date".to_string()));
        }
        Ok(())
    }

    /// Summary text, without a trailing newline
    pub fn summary(&self) -> String {
        let mut text = format!("Raw Material: {}\nComponents:\n", self.raw_material);
        for c in &self.components {
            text.push_str(&format!("  - {}: {}% {}\n", c.name, c.percent, c.supplier));
        }
        text.push_str(&format!("Manufacturing Date: {}", self.manufacturing_date));
        text
    }
}
