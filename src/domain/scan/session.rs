use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::errors::ScanError;

// ============================================================================
// Scan Session - per-dialog scan state
// ============================================================================
//
// Ephemeral and client-owned: a fresh session is opened every time the scan
// dialog opens for an order. Scans arrive one at a time (camera decode or
// manual entry); each one is independent and leaves the state untouched
// unless it is accepted.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanLine {
    pub barcode: String,
    pub required: u32,
    pub scanned: u32,
}

impl ScanLine {
    pub fn is_complete(&self) -> bool {
        self.scanned >= self.required
    }
}

/// Result of feeding one barcode into the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Accepted { barcode: String, scanned: u32, required: u32 },
    InvalidBarcode { barcode: String },
    AlreadyScanned { barcode: String, required: u32 },
}

impl ScanOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ScanOutcome::Accepted { .. })
    }

    /// Short label for metrics
    pub fn label(&self) -> &'static str {
        match self {
            ScanOutcome::Accepted { .. } => "accepted",
            ScanOutcome::InvalidBarcode { .. } => "invalid_barcode",
            ScanOutcome::AlreadyScanned { .. } => "already_scanned",
        }
    }
}

/// Status-line message shown under the scanner
impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanOutcome::Accepted { barcode, scanned, required } => {
                write!(f, "Scanned {} ({}/{})", barcode, scanned, required)
            }
            ScanOutcome::InvalidBarcode { barcode } if barcode.is_empty() => {
                write!(f, "Invalid or unrelated barcode")
            }
            ScanOutcome::InvalidBarcode { barcode } => {
                write!(f, "Invalid or unrelated barcode: {}", barcode)
            }
            ScanOutcome::AlreadyScanned { barcode, required } => {
                write!(f, "{} is already fully scanned ({}/{})", barcode, required, required)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    pub complete_lines: usize,
    pub total_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedLine {
    pub barcode: String,
    pub quantity: u32,
}

/// Proof that every line of an order was scanned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanConfirmation {
    pub order_id: Uuid,
    pub lines: Vec<ScannedLine>,
    pub confirmed_at: DateTime<Utc>,
}

impl ScanConfirmation {
    pub fn scanned(&self, barcode: &str) -> u32 {
        self.lines
            .iter()
            .filter(|line| line.barcode == barcode)
            .map(|line| line.quantity)
            .sum()
    }
}

#[derive(Debug, Clone)]
pub struct ScanSession {
    order_id: Uuid,
    lines: BTreeMap<String, ScanLine>,
}

impl ScanSession {
    /// Opens a session with a zero count for every barcode of the order.
    /// Items sharing a barcode have their quantities summed; barcodes are
    /// trimmed like scanner input.
    pub fn open<'a>(order_id: Uuid, items: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        let mut lines: BTreeMap<String, ScanLine> = BTreeMap::new();

        for (barcode, quantity) in items {
            let barcode = barcode.trim();
            lines
                .entry(barcode.to_string())
                .and_modify(|line| line.required += quantity)
                .or_insert_with(|| ScanLine {
                    barcode: barcode.to_string(),
                    required: quantity,
                    scanned: 0,
                });
        }

        tracing::debug!(order_id = %order_id, lines = lines.len(), "Scan session opened");
        Self { order_id, lines }
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    pub fn record_scan(&mut self, raw: &str) -> ScanOutcome {
        let barcode = raw.trim();

        let Some(line) = self.lines.get_mut(barcode) else {
            return ScanOutcome::InvalidBarcode { barcode: barcode.to_string() };
        };

        if line.is_complete() {
            return ScanOutcome::AlreadyScanned {
                barcode: line.barcode.clone(),
                required: line.required,
            };
        }

        line.scanned += 1;
        ScanOutcome::Accepted {
            barcode: line.barcode.clone(),
            scanned: line.scanned,
            required: line.required,
        }
    }

    /// True iff every line reached its ordered quantity
    pub fn can_submit(&self) -> bool {
        self.lines.values().all(ScanLine::is_complete)
    }

    pub fn progress(&self) -> ScanProgress {
        ScanProgress {
            complete_lines: self.lines.values().filter(|l| l.is_complete()).count(),
            total_lines: self.lines.len(),
        }
    }

    pub fn scanned(&self, barcode: &str) -> Option<u32> {
        self.lines.get(barcode).map(|line| line.scanned)
    }

    pub fn lines(&self) -> impl Iterator<Item = &ScanLine> {
        self.lines.values()
    }

    pub fn reset(&mut self) {
        for line in self.lines.values_mut() {
            line.scanned = 0;
        }
    }

    /// Gate for submission: only a complete session yields a confirmation
    pub fn confirm(&self) -> Result<ScanConfirmation, ScanError> {
        if self.lines.is_empty() {
            return Err(ScanError::NothingToScan);
        }

        if !self.can_submit() {
            let progress = self.progress();
            return Err(ScanError::Incomplete {
                scanned_lines: progress.complete_lines,
                total_lines: progress.total_lines,
            });
        }

        Ok(ScanConfirmation {
            order_id: self.order_id,
            lines: self
                .lines
                .values()
                .map(|line| ScannedLine {
                    barcode: line.barcode.clone(),
                    quantity: line.scanned,
                })
                .collect(),
            confirmed_at: Utc::now(),
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
