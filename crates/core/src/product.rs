//! Catalog field validation.

use crate::error::CoreError;

/// Maximum length of a product name, unit, or category.
pub const MAX_FIELD_LEN: usize = 120;

/// Validate a required text field (name, unit, category).
pub fn validate_text(field: &str, value: &str) -> Result<(), CoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_FIELD_LEN} characters"
        )));
    }
    Ok(())
}

/// Prices are finite and never negative. Zero is allowed.
pub fn validate_price(price: f64) -> Result<(), CoreError> {
    if !price.is_finite() || price < 0.0 {
        return Err(CoreError::Validation(format!(
            "Price must be zero or greater, got {price}"
        )));
    }
    Ok(())
}

/// Opening stock is optional (zero) or a positive finite level.
pub fn validate_opening_stock(level: f64) -> Result<(), CoreError> {
    if !level.is_finite() || level < 0.0 {
        return Err(CoreError::Validation(format!(
            "Opening stock must be zero or greater, got {level}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert_matches!(
            validate_text("Name", "  "),
            Err(CoreError::Validation(msg)) if msg == "Name is required"
        );
    }

    #[test]
    fn overlong_text_is_rejected() {
        let unit = "u".repeat(MAX_FIELD_LEN + 1);
        assert!(validate_text("Unit", &unit).is_err());
        assert!(validate_text("Unit", "saco").is_ok());
    }

    #[test]
    fn price_bounds() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(30.5).is_ok());
        assert!(validate_price(-0.01).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(f64::INFINITY).is_err());
    }

    #[test]
    fn opening_stock_bounds() {
        assert!(validate_opening_stock(0.0).is_ok());
        assert!(validate_opening_stock(12.5).is_ok());
        assert!(validate_opening_stock(-1.0).is_err());
    }
}
