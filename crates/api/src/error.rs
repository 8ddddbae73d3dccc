// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use ce_ops_domain::DomainError;
use ce_ops_persistence::PersistenceError;

use crate::password_policy::PasswordPolicyError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role(s) required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain and persistence errors and represent
/// the API contract. The server maps each variant to one HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role(s) required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// Machine-readable rule code, e.g. `invalid_task_transition`.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The request conflicts with existing state (duplicate, in-flight
    /// phase group, task with history, ...).
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
    /// Password policy violation.
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(err)
    }
}

fn invalid(field: &str, err: &DomainError) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    }
}

fn rule(code: &str, err: &DomainError) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: code.to_string(),
        message: err.to_string(),
    }
}

/// Translates a domain error into an API error.
///
/// Parse and shape errors become `InvalidInput`; state-dependent rules
/// become `DomainRuleViolation` carrying a stable rule code.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match &err {
        DomainError::MissingField(field) => invalid(field, &err),
        DomainError::InvalidEmail(_) => invalid("email", &err),
        DomainError::InvalidRole(_) => invalid("role", &err),
        DomainError::InvalidTaskType(_) => invalid("task_type", &err),
        DomainError::InvalidTaskStatus(_)
        | DomainError::InvalidBidStatus(_)
        | DomainError::InvalidPurchaseOrderStatus(_) => invalid("status", &err),
        DomainError::InvalidTaskEventKind(_) | DomainError::InvalidResourceKind(_) => {
            invalid("kind", &err)
        }
        DomainError::InvalidTaskWindow { .. } => invalid("end", &err),
        DomainError::InvalidTimestamp { .. } | DomainError::NonexistentLocalTime { .. } => {
            invalid("timestamp", &err)
        }
        DomainError::InvalidTimezone(_) => invalid("timezone", &err),
        DomainError::InvalidWorkdayHours { .. } => invalid("workday_hours", &err),
        DomainError::InvalidPricing(_) => invalid("pricing", &err),
        DomainError::InvalidDocumentLink(_) => invalid("document", &err),
        DomainError::InvalidQuantity { field, .. } => invalid(field, &err),
        DomainError::InvalidTaskTransition { .. } => rule("invalid_task_transition", &err),
        DomainError::TaskAlreadyComplete { .. } => rule("task_complete", &err),
        DomainError::InvalidPhaseTemplate(_) => rule("invalid_phase_template", &err),
        DomainError::InvalidBidTransition { .. } => rule("invalid_bid_transition", &err),
        DomainError::PurchaseOrderCancelled => rule("purchase_order_cancelled", &err),
        DomainError::PurchaseOrderHasReceipts => rule("purchase_order_has_receipts", &err),
    }
}

/// Translates a persistence error into an API error.
///
/// `resource_type` names what the caller was operating on, for the
/// not-found case.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError, resource_type: &str) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: resource_type.to_string(),
            message,
        },
        PersistenceError::Conflict(message) => ApiError::Conflict { message },
        PersistenceError::InvalidReference(message) => ApiError::InvalidInput {
            field: String::from("reference"),
            message: format!("Referenced record does not exist ({message})"),
        },
        PersistenceError::RuleViolation(domain_err) => translate_domain_error(domain_err),
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_errors_carry_rule_codes() {
        let err = translate_domain_error(DomainError::InvalidTaskTransition {
            from: String::from("complete"),
            to: String::from("in_progress"),
            reason: String::from("complete is terminal"),
        });
        assert!(matches!(
            err,
            ApiError::DomainRuleViolation { ref rule, .. } if rule == "invalid_task_transition"
        ));
    }

    #[test]
    fn test_missing_field_names_the_field() {
        let err = translate_domain_error(DomainError::MissingField("vendor"));
        assert!(matches!(
            err,
            ApiError::InvalidInput { ref field, .. } if field == "vendor"
        ));
    }

    #[test]
    fn test_persistence_not_found_uses_caller_resource_type() {
        let err = translate_persistence_error(
            PersistenceError::NotFound(String::from("Bid 9 not found")),
            "Bid",
        );
        assert_eq!(
            err,
            ApiError::ResourceNotFound {
                resource_type: String::from("Bid"),
                message: String::from("Bid 9 not found"),
            }
        );
    }

    #[test]
    fn test_persistence_rule_violation_unwraps_domain_error() {
        let err = translate_persistence_error(
            PersistenceError::RuleViolation(DomainError::PurchaseOrderHasReceipts),
            "Purchase order",
        );
        assert!(matches!(
            err,
            ApiError::DomainRuleViolation { ref rule, .. } if rule == "purchase_order_has_receipts"
        ));
    }
}
