// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Crew and individual resource handlers.

use ce_ops_domain::{ResourceKind, require_text};
use ce_ops_persistence::Persistence;
use tracing::info;

use super::{not_found, persistence_error};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::request_response::{
    CreateResourceRequest, ListResourcesRequest, ListResourcesResponse, ResourceInfo,
};

/// Lists resources. Any authenticated user may read them.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_resources(
    persistence: &mut Persistence,
    request: &ListResourcesRequest,
) -> Result<ListResourcesResponse, ApiError> {
    let resources = persistence
        .list_resources(request.include_inactive)
        .map_err(persistence_error("Resource"))?;
    Ok(ListResourcesResponse {
        resources: resources.into_iter().map(ResourceInfo::from).collect(),
    })
}

/// # Errors
///
/// Returns an error if the actor may not schedule, the input is invalid,
/// or the name is already taken.
pub fn create_resource(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &CreateResourceRequest,
) -> Result<ResourceInfo, ApiError> {
    AuthorizationService::authorize_schedule(actor, "create_resource")?;
    let name: String = require_text("name", &request.name)?;
    let kind: ResourceKind = request.kind.parse()?;

    let resource_id: i64 = persistence
        .create_resource(&name, kind)
        .map_err(persistence_error("Resource"))?;
    info!(
        actor_id = actor.user_id,
        resource_id,
        kind = kind.as_str(),
        "Resource created"
    );

    persistence
        .get_resource(resource_id)
        .map_err(persistence_error("Resource"))?
        .map(ResourceInfo::from)
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Resource not found after creation"),
        })
}

/// Hides a resource from assignment. Existing assignments are kept.
///
/// # Errors
///
/// Returns an error if the actor may not schedule or the resource does
/// not exist.
pub fn deactivate_resource(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    resource_id: i64,
) -> Result<ResourceInfo, ApiError> {
    AuthorizationService::authorize_schedule(actor, "deactivate_resource")?;
    persistence
        .deactivate_resource(resource_id)
        .map_err(persistence_error("Resource"))?;
    info!(
        actor_id = actor.user_id,
        resource_id,
        "Resource deactivated"
    );

    persistence
        .get_resource(resource_id)
        .map_err(persistence_error("Resource"))?
        .map(ResourceInfo::from)
        .ok_or_else(|| not_found("Resource", format!("Resource {resource_id} not found")))
}
