use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::StatusError;

// ============================================================================
// Order Status Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(pub i32);

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Side-effect switches a status carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusFlags {
    pub reserve_stock: bool,
    pub release_stock: bool,
    pub reduce_stock: bool,
    pub increase_stock: bool,
    pub mark_delivered: bool,
    pub mark_refunded: bool,
    pub send_notification: bool,
}

impl StatusFlags {
    pub fn validate(&self) -> Result<(), StatusError> {
        if self.reserve_stock && self.release_stock {
            return Err(StatusError::ConflictingStockFlags("reserve and release"));
        }
        if self.reduce_stock && self.increase_stock {
            return Err(StatusError::ConflictingStockFlags("reduce and increase"));
        }
        Ok(())
    }

    /// Effects applied when an order enters a status with these flags
    pub fn effects(&self) -> StatusEffects {
        let mut stock = Vec::new();
        if self.reserve_stock {
            stock.push(StockMovement::Reserve);
        }
        if self.release_stock {
            stock.push(StockMovement::Release);
        }
        if self.reduce_stock {
            stock.push(StockMovement::Reduce);
        }
        if self.increase_stock {
            stock.push(StockMovement::Increase);
        }

        StatusEffects {
            stock,
            mark_delivered: self.mark_delivered,
            mark_refunded: self.mark_refunded,
            notify_customer: self.send_notification,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StockMovement {
    Reserve,
    Release,
    Reduce,
    Increase,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEffects {
    pub stock: Vec<StockMovement>,
    pub mark_delivered: bool,
    pub mark_refunded: bool,
    pub notify_customer: bool,
}

/// Whether staff must explain why an order entered a status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ExplanationRequirement {
    #[default]
    NotRequired,
    Required { prompt: String },
}

impl ExplanationRequirement {
    pub fn is_required(&self) -> bool {
        matches!(self, ExplanationRequirement::Required { .. })
    }

    pub fn prompt(&self) -> Option<&str> {
        match self {
            ExplanationRequirement::Required { prompt } => Some(prompt),
            ExplanationRequirement::NotRequired => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatus {
    pub id: StatusId,
    pub name: String,
    pub color: String,
    pub flags: StatusFlags,
    #[serde(default)]
    pub explanation: ExplanationRequirement,
}

/// Status fields as submitted from the create/edit form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDraft {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub flags: StatusFlags,
    #[serde(default)]
    pub explanation: ExplanationRequirement,
}

impl StatusDraft {
    /// Trims the name and normalizes the color to lowercase
    pub fn validate(mut self) -> Result<Self, StatusError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(StatusError::EmptyName);
        }

        self.color = self.color.trim().to_ascii_lowercase();
        if !is_hex_color(&self.color) {
            return Err(StatusError::InvalidColor(self.color));
        }

        self.flags.validate()?;

        if let ExplanationRequirement::Required { prompt } = &self.explanation {
            if prompt.trim().is_empty() {
                return Err(StatusError::EmptyExplanationPrompt);
            }
        }

        Ok(self)
    }

    pub fn into_status(self, id: StatusId) -> OrderStatus {
        OrderStatus {
            id,
            name: self.name,
            color: self.color,
            flags: self.flags,
            explanation: self.explanation,
        }
    }
}

fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
