// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Purchase order status roll-up.
//!
//! A purchase order's status is derived from its line items every time
//! an item changes. The only status set directly is `cancelled`.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Open,
    Ordered,
    Partial,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Ordered => "ordered",
            Self::Partial => "partial",
            Self::Received => "received",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for PurchaseOrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "ordered" => Ok(Self::Ordered),
            "partial" => Ok(Self::Partial),
            "received" => Ok(Self::Received),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidPurchaseOrderStatus(s.to_string())),
        }
    }
}

/// Quantities tracked per line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemQuantities {
    pub required: i64,
    pub ordered: i64,
    pub received: i64,
}

impl ItemQuantities {
    /// Creates quantities, rejecting negatives.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidQuantity` naming the first negative field.
    pub fn new(required: i64, ordered: i64, received: i64) -> Result<Self, DomainError> {
        check_non_negative("qty_required", required)?;
        check_non_negative("qty_ordered", ordered)?;
        check_non_negative("qty_received", received)?;
        Ok(Self {
            required,
            ordered,
            received,
        })
    }

    #[must_use]
    pub const fn is_fully_received(&self) -> bool {
        self.received >= self.required
    }
}

const fn check_non_negative(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value < 0 {
        return Err(DomainError::InvalidQuantity { field, value });
    }
    Ok(())
}

/// Derives the purchase order status from its items.
///
/// `current` is only consulted for cancellation, which is sticky.
#[must_use]
pub fn roll_up_status(
    current: PurchaseOrderStatus,
    items: &[ItemQuantities],
) -> PurchaseOrderStatus {
    if current == PurchaseOrderStatus::Cancelled {
        return PurchaseOrderStatus::Cancelled;
    }

    let any_received = items.iter().any(|i| i.received > 0);
    let any_ordered = items.iter().any(|i| i.ordered > 0);

    if items.is_empty() || (!any_received && !any_ordered) {
        return PurchaseOrderStatus::Open;
    }
    if items.iter().all(ItemQuantities::is_fully_received) {
        return PurchaseOrderStatus::Received;
    }
    if any_received {
        return PurchaseOrderStatus::Partial;
    }
    PurchaseOrderStatus::Ordered
}

/// Adds a receipt to an item.
///
/// Over-receipt is accepted; vendors sometimes ship extra.
///
/// # Errors
///
/// Returns an error if the order is cancelled, the quantity is negative,
/// or the running total overflows.
pub fn apply_receipt(
    status: PurchaseOrderStatus,
    item: ItemQuantities,
    quantity: i64,
) -> Result<ItemQuantities, DomainError> {
    if status == PurchaseOrderStatus::Cancelled {
        return Err(DomainError::PurchaseOrderCancelled);
    }
    check_non_negative("quantity", quantity)?;
    let received = item
        .received
        .checked_add(quantity)
        .ok_or(DomainError::InvalidQuantity {
            field: "quantity",
            value: quantity,
        })?;
    Ok(ItemQuantities { received, ..item })
}

/// Checks that an order may be cancelled.
///
/// # Errors
///
/// Returns `DomainError::PurchaseOrderHasReceipts` if any item has been
/// received.
pub fn validate_cancel(items: &[ItemQuantities]) -> Result<(), DomainError> {
    if items.iter().any(|i| i.received > 0) {
        return Err(DomainError::PurchaseOrderHasReceipts);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(required: i64, ordered: i64, received: i64) -> ItemQuantities {
        ItemQuantities::new(required, ordered, received).unwrap()
    }

    #[test]
    fn test_empty_order_is_open() {
        assert_eq!(
            roll_up_status(PurchaseOrderStatus::Ordered, &[]),
            PurchaseOrderStatus::Open
        );
    }

    #[test]
    fn test_nothing_ordered_is_open() {
        assert_eq!(
            roll_up_status(PurchaseOrderStatus::Open, &[item(4, 0, 0)]),
            PurchaseOrderStatus::Open
        );
    }

    #[test]
    fn test_ordered_not_received() {
        assert_eq!(
            roll_up_status(PurchaseOrderStatus::Open, &[item(4, 4, 0), item(2, 0, 0)]),
            PurchaseOrderStatus::Ordered
        );
    }

    #[test]
    fn test_partial_receipt() {
        assert_eq!(
            roll_up_status(
                PurchaseOrderStatus::Ordered,
                &[item(4, 4, 4), item(2, 2, 0)],
            ),
            PurchaseOrderStatus::Partial
        );
    }

    #[test]
    fn test_all_received() {
        assert_eq!(
            roll_up_status(
                PurchaseOrderStatus::Partial,
                &[item(4, 4, 5), item(2, 2, 2)],
            ),
            PurchaseOrderStatus::Received
        );
    }

    #[test]
    fn test_cancelled_is_sticky() {
        assert_eq!(
            roll_up_status(PurchaseOrderStatus::Cancelled, &[item(1, 1, 1)]),
            PurchaseOrderStatus::Cancelled
        );
    }

    #[test]
    fn test_zero_required_items_count_as_received() {
        assert_eq!(
            roll_up_status(PurchaseOrderStatus::Open, &[item(0, 0, 0), item(1, 1, 1)]),
            PurchaseOrderStatus::Received
        );
    }

    #[test]
    fn test_receipt_rules() {
        let updated = apply_receipt(PurchaseOrderStatus::Ordered, item(4, 4, 1), 2).unwrap();
        assert_eq!(updated.received, 3);

        assert_eq!(
            apply_receipt(PurchaseOrderStatus::Cancelled, item(4, 4, 0), 1),
            Err(DomainError::PurchaseOrderCancelled)
        );
        assert!(matches!(
            apply_receipt(PurchaseOrderStatus::Ordered, item(4, 4, 0), -1),
            Err(DomainError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_negative_quantities_rejected() {
        assert_eq!(
            ItemQuantities::new(1, -2, 0),
            Err(DomainError::InvalidQuantity {
                field: "qty_ordered",
                value: -2
            })
        );
    }

    #[test]
    fn test_cancel_requires_no_receipts() {
        assert!(validate_cancel(&[item(3, 3, 0)]).is_ok());
        assert_eq!(
            validate_cancel(&[item(3, 3, 1)]),
            Err(DomainError::PurchaseOrderHasReceipts)
        );
    }
}
