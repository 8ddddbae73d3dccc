// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bids: status lifecycle, pricing snapshots and document links.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Sales status of a bid.
///
/// ```text
/// draft -> sent | declined
/// sent -> accepted | declined | draft
/// accepted -> completed
/// declined -> draft
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Draft,
    Sent,
    Accepted,
    Declined,
    Completed,
}

impl BidStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Completed => "completed",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Validates a status change.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBidTransition` if the lifecycle does
    /// not allow moving from `self` to `next`.
    pub fn validate_transition(&self, next: Self) -> Result<(), DomainError> {
        let valid = match self {
            Self::Draft => matches!(next, Self::Sent | Self::Declined),
            Self::Sent => matches!(next, Self::Accepted | Self::Declined | Self::Draft),
            Self::Accepted => matches!(next, Self::Completed),
            Self::Declined => matches!(next, Self::Draft),
            Self::Completed => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidBidTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

impl FromStr for BidStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "completed" => Ok(Self::Completed),
            _ => Err(DomainError::InvalidBidStatus(s.to_string())),
        }
    }
}

/// One priced line on a bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// Stored pricing for a bid, with totals computed at save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSnapshot {
    pub line_items: Vec<LineItem>,
    /// Tax rate in basis points (825 = 8.25%).
    pub tax_rate_bps: i64,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

impl PricingSnapshot {
    /// Computes totals for the given lines.
    ///
    /// Tax is rounded half-up to the cent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPricing` for blank descriptions,
    /// negative quantities or prices, a rate outside 0..=10000 bps, or
    /// totals that overflow.
    pub fn compute(line_items: Vec<LineItem>, tax_rate_bps: i64) -> Result<Self, DomainError> {
        if !(0..=10_000).contains(&tax_rate_bps) {
            return Err(DomainError::InvalidPricing(format!(
                "tax_rate_bps must be between 0 and 10000, got {tax_rate_bps}"
            )));
        }

        let mut subtotal_cents: i64 = 0;
        for (index, line) in line_items.iter().enumerate() {
            if line.description.trim().is_empty() {
                return Err(DomainError::InvalidPricing(format!(
                    "line {} has no description",
                    index + 1
                )));
            }
            if line.quantity < 0 || line.unit_price_cents < 0 {
                return Err(DomainError::InvalidPricing(format!(
                    "line {} has a negative quantity or price",
                    index + 1
                )));
            }
            subtotal_cents = line
                .quantity
                .checked_mul(line.unit_price_cents)
                .and_then(|amount| subtotal_cents.checked_add(amount))
                .ok_or_else(overflow)?;
        }

        let tax_cents = subtotal_cents
            .checked_mul(tax_rate_bps)
            .and_then(|scaled| scaled.checked_add(5_000))
            .map(|scaled| scaled / 10_000)
            .ok_or_else(overflow)?;
        let total_cents = subtotal_cents.checked_add(tax_cents).ok_or_else(overflow)?;

        Ok(Self {
            line_items,
            tax_rate_bps,
            subtotal_cents,
            tax_cents,
            total_cents,
        })
    }
}

fn overflow() -> DomainError {
    DomainError::InvalidPricing(String::from("amount out of range"))
}

/// A link to an externally stored document (drawings, contracts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLink {
    pub label: String,
    pub url: String,
}

impl DocumentLink {
    /// Creates a trimmed, validated link.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDocumentLink` if the label is blank or
    /// the URL is not http(s).
    pub fn new(label: &str, url: &str) -> Result<Self, DomainError> {
        let label = label.trim();
        let url = url.trim();
        if label.is_empty() {
            return Err(DomainError::InvalidDocumentLink(String::from(
                "label is required",
            )));
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(DomainError::InvalidDocumentLink(format!(
                "url must be http or https: '{url}'"
            )));
        }
        Ok(Self {
            label: label.to_string(),
            url: url.to_string(),
        })
    }
}
