// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

//! API boundary for CE Ops.
//!
//! Sits between the HTTP server and the domain/persistence crates:
//! authenticates sessions, enforces the role permission matrix, validates
//! requests against domain rules and translates every lower-layer error
//! into an [`ApiError`].

mod auth;
mod error;
pub mod handlers;
mod password_policy;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthConfig, AuthenticatedActor, AuthenticationService, AuthorizationService};
pub use error::{ApiError, AuthError, translate_domain_error, translate_persistence_error};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    AcceptInvitationRequest, AddDocumentRequest, AssignTaskRequest, BidRequest,
    BootstrapRequest, CalendarEventsRequest, CalendarViewRequest, CalendarViewResponse,
    CreateInvitationRequest, CreatePurchaseOrderRequest, CreateResourceRequest,
    CreateTaskRequest, DocumentsResponse, GeneratePhasesRequest, GeneratePhasesResponse, IdValue,
    InvitationInfo, ListBidsRequest, ListBidsResponse, ListInvitationsResponse,
    ListPurchaseOrdersRequest, ListPurchaseOrdersResponse, ListResourcesRequest,
    ListResourcesResponse, ListTaskEventsResponse, ListTasksRequest, ListTasksResponse,
    ListUsersResponse, LoginRequest, LoginResponse, MessageResponse, MoveEventRequest,
    MoveEventResponse, Permissions, PurchaseOrderInfo, PurchaseOrderItemInfo,
    PurchaseOrderItemRequest, ReceiptLine, ReceiveItemsRequest, RescheduleTaskRequest,
    RescheduleTaskResponse, ResourceInfo, TaskDetailResponse, TaskEventRequest,
    TaskEventResponse, TaskInfo, UpdateBidStatusRequest, UpdateBidStatusResponse,
    UpdatePricingRequest, UpdatePurchaseOrderItemRequest, UpdateTaskRequest,
    UpdateUserRoleRequest, UserInfo, WhoAmIResponse,
};

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
