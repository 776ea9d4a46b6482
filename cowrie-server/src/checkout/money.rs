//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` for storage/serialization.

use rust_decimal::prelude::*;

use crate::db::models::CartItemWithProduct;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Line total: unit price × quantity
pub fn line_total(unit_price: f64, quantity: i64) -> Decimal {
    to_decimal(unit_price) * Decimal::from(quantity)
}

/// Order total over a cart snapshot, computed server-side
///
/// 单价取快照时刻的值；客户端传入的总额一律不信任。
pub fn order_total(lines: &[CartItemWithProduct]) -> f64 {
    let total: Decimal = lines
        .iter()
        .map(|line| line_total(line.product.price, line.quantity))
        .sum();
    to_f64(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::RecordId;

    use crate::db::models::Product;

    fn line(price: f64, quantity: i64) -> CartItemWithProduct {
        CartItemWithProduct {
            id: None,
            cart: RecordId::from_table_key("cart", "c1"),
            product: Product {
                id: Some(RecordId::from_table_key("product", "p1")),
                category: RecordId::from_table_key("category", "k1"),
                name: "Item".to_string(),
                description: None,
                price,
                stock_quantity: 100,
                image_url: None,
            },
            quantity,
            created_at: None,
        }
    }

    #[test]
    fn test_to_decimal_precision() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let a = 0.1_f64;
        let b = 0.2_f64;
        let sum_f64 = a + b;

        // f64 fails
        assert_ne!(sum_f64, 0.3);

        // Decimal succeeds
        let sum_dec = to_decimal(a) + to_decimal(b);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(to_f64(line_total(10.99, 3)), 32.97);
        assert_eq!(to_f64(line_total(0.0, 5)), 0.0);
    }

    #[test]
    fn test_order_total_sums_lines() {
        // qty 2 of $10 + qty 3 of $5 = 35
        let lines = vec![line(10.0, 2), line(5.0, 3)];
        assert_eq!(order_total(&lines), 35.0);
    }

    #[test]
    fn test_order_total_accumulation_precision() {
        // 0.1 added a hundred times must come out exactly 10.00
        let lines: Vec<_> = (0..100).map(|_| line(0.1, 1)).collect();
        assert_eq!(order_total(&lines), 10.0);
    }

    #[test]
    fn test_order_total_empty() {
        assert_eq!(order_total(&[]), 0.0);
    }
}
