//! Stock movement kinds, level arithmetic, and ledger replay.
//!
//! A product's stock level is a projection over its movement ledger:
//! ENTRADA adds, SAIDA subtracts, AJUSTE replaces the running total.
//! Negative levels are representable. Preventing over-deduction is left to
//! callers; the ledger does not enforce it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The level every product starts at before its first movement.
pub const INITIAL_LEVEL: f64 = 0.0;

// ---------------------------------------------------------------------------
// Movement type
// ---------------------------------------------------------------------------

/// Kind of a single inventory movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    /// Inventory increase.
    Entrada,
    /// Inventory decrease.
    Saida,
    /// Absolute set: the quantity becomes the new level.
    Ajuste,
}

impl MovementType {
    /// Every movement type, in declaration order.
    pub const ALL: [MovementType; 3] = [Self::Entrada, Self::Saida, Self::Ajuste];

    /// The value stored in `stock_movements.movement_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entrada => "ENTRADA",
            Self::Saida => "SAIDA",
            Self::Ajuste => "AJUSTE",
        }
    }

    /// Compute the level that results from applying this movement to
    /// `current`. AJUSTE ignores `current` entirely.
    pub fn apply(self, current: f64, quantity: f64) -> f64 {
        match self {
            Self::Entrada => current + quantity,
            Self::Saida => current - quantity,
            Self::Ajuste => quantity,
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = CoreError;

    /// Parse a movement type, case-insensitively (`"saida"`, `"Saida"` and
    /// `"SAIDA"` are all accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid movement type '{s}'. Must be one of: ENTRADA, SAIDA, AJUSTE"
                ))
            })
    }
}

impl TryFrom<String> for MovementType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject quantities that are zero, negative, NaN or infinite.
///
/// For AJUSTE the quantity is the target absolute level and the same rule
/// applies.
pub fn validate_quantity(quantity: f64) -> Result<(), CoreError> {
    if !quantity.is_finite() {
        return Err(CoreError::Validation(
            "Quantity must be a finite number".to_string(),
        ));
    }
    if quantity <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Quantity must be greater than zero, got {quantity}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Derive a stock level by replaying movements oldest-first, starting from
/// [`INITIAL_LEVEL`].
pub fn replay<I>(movements: I) -> f64
where
    I: IntoIterator<Item = (MovementType, f64)>,
{
    movements
        .into_iter()
        .fold(INITIAL_LEVEL, |level, (kind, quantity)| {
            kind.apply(level, quantity)
        })
}
