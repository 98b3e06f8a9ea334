//! Budget (price quote) request validation and pricing.
//!
//! Prices come from a [`ProductSnapshot`] captured when the quote is built.
//! Once priced, an item never consults the catalog again, so later price
//! changes do not leak into existing budgets.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::stock::validate_quantity;
use crate::types::DbId;

/// Maximum length of a customer name, in characters.
pub const MAX_CUSTOMER_LEN: usize = 200;

/// A requested line: which product and how much of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub product_id: DbId,
    pub quantity: f64,
}

/// The read-only view of a catalog product that pricing needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: DbId,
    pub name: String,
    pub price: f64,
}

/// A line item with its price frozen at quote time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedItem {
    pub product_id: DbId,
    pub product: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// A fully priced quote ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedBudget {
    pub customer: String,
    pub total: f64,
    pub items: Vec<PricedItem>,
}

/// Validate a create/update request before any lookup or write happens.
///
/// Returns the trimmed customer name.
pub fn validate_request<'a>(
    customer: &'a str,
    items: &[ItemRequest],
) -> Result<&'a str, CoreError> {
    let customer = customer.trim();
    if customer.is_empty() {
        return Err(CoreError::Validation("Customer is required".to_string()));
    }
    if customer.chars().count() > MAX_CUSTOMER_LEN {
        return Err(CoreError::Validation(format!(
            "Customer must be at most {MAX_CUSTOMER_LEN} characters"
        )));
    }
    if items.is_empty() {
        return Err(CoreError::Validation(
            "A budget needs at least one item".to_string(),
        ));
    }
    for (index, item) in items.iter().enumerate() {
        validate_quantity(item.quantity).map_err(|e| match e {
            CoreError::Validation(msg) => CoreError::Validation(format!("Item {index}: {msg}")),
            other => other,
        })?;
    }
    Ok(customer)
}

/// Price one requested line against its catalog snapshot.
pub fn price_item(request: &ItemRequest, snapshot: &ProductSnapshot) -> PricedItem {
    PricedItem {
        product_id: snapshot.id,
        product: snapshot.name.clone(),
        quantity: request.quantity,
        unit_price: snapshot.price,
        subtotal: request.quantity * snapshot.price,
    }
}

/// Sum subtotals in line order.
pub fn total_of(items: &[PricedItem]) -> f64 {
    items.iter().map(|item| item.subtotal).sum()
}

/// Assemble a priced budget, deriving the total from the items.
pub fn price_budget(customer: &str, items: Vec<PricedItem>) -> PricedBudget {
    PricedBudget {
        customer: customer.to_string(),
        total: total_of(&items),
        items,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn cimento() -> ProductSnapshot {
        ProductSnapshot {
            id: 1,
            name: "Cimento".to_string(),
            price: 30.0,
        }
    }

    fn request(product_id: DbId, quantity: f64) -> ItemRequest {
        ItemRequest {
            product_id,
            quantity,
        }
    }

    // -- validate_request --

    #[test]
    fn valid_request_returns_trimmed_customer() {
        let customer = validate_request("  Ana ", &[request(1, 2.0)]).unwrap();
        assert_eq!(customer, "Ana");
    }

    #[test]
    fn blank_customer_is_rejected() {
        assert_matches!(
            validate_request("   ", &[request(1, 2.0)]),
            Err(CoreError::Validation(msg)) if msg.contains("Customer")
        );
    }

    #[test]
    fn overlong_customer_is_rejected() {
        let name = "x".repeat(MAX_CUSTOMER_LEN + 1);
        assert_matches!(
            validate_request(&name, &[request(1, 2.0)]),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn empty_items_are_rejected() {
        assert_matches!(
            validate_request("Ana", &[]),
            Err(CoreError::Validation(msg)) if msg.contains("at least one item")
        );
    }

    #[test]
    fn non_positive_quantity_names_the_item() {
        assert_matches!(
            validate_request("Ana", &[request(1, 2.0), request(2, 0.0)]),
            Err(CoreError::Validation(msg)) if msg.starts_with("Item 1:")
        );
    }

    // -- pricing --

    #[test]
    fn price_item_snapshots_name_and_price() {
        let item = price_item(&request(1, 2.0), &cimento());
        assert_eq!(item.product, "Cimento");
        assert_eq!(item.unit_price, 30.0);
        assert_eq!(item.subtotal, 60.0);
    }

    #[test]
    fn priced_item_is_detached_from_snapshot() {
        let mut snapshot = cimento();
        let item = price_item(&request(1, 2.0), &snapshot);
        snapshot.price = 99.0;
        assert_eq!(item.unit_price, 30.0);
        assert_eq!(item.subtotal, 60.0);
    }

    #[test]
    fn total_is_sum_of_subtotals() {
        let areia = ProductSnapshot {
            id: 2,
            name: "Areia".to_string(),
            price: 0.1,
        };
        let items = vec![
            price_item(&request(1, 2.0), &cimento()),
            price_item(&request(2, 3.0), &areia),
            price_item(&request(2, 0.7), &areia),
        ];
        let budget = price_budget("Ana", items);
        let expected: f64 = budget.items.iter().map(|i| i.subtotal).sum();
        assert_eq!(budget.total, expected);
        assert_eq!(budget.customer, "Ana");
        assert_eq!(budget.items.len(), 3);
    }

    #[test]
    fn total_of_no_items_is_zero() {
        assert_eq!(total_of(&[]), 0.0);
    }
}
