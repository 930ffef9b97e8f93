//! Feature flag endpoint handlers.
//!
//! Every handler follows the same preamble: authenticate the caller, parse
//! the path ids, load the organization, and check the caller's role. A
//! missing organization or flag row surfaces as a storage failure, not a
//! 404; clients always address flags through an organization they belong
//! to, so a miss here means the request is malformed in a way validation
//! cannot see.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{user_has_permission, FeatureFlag, FlagType, Organization, Revision, Role, Rule};
use serde::{Deserialize, Serialize};
use shared::pagination::PageParams;
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, UserAuth};

/// Query parameters for flag listing.
///
/// Carried as raw strings: a value that does not parse as a number falls
/// back to the default instead of rejecting the request.
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl ListQuery {
    fn page_params(&self) -> PageParams {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.parse::<i64>().ok());
        PageParams::clamped(parse(&self.page), parse(&self.page_size))
    }
}

/// Response body for flag listing.
#[derive(Debug, Serialize)]
pub struct ListFeatureFlagsResponse {
    pub data: Vec<FeatureFlag>,
    pub page: i64,
    pub page_size: i64,
    /// Count of flags in this page, not the overall total.
    pub total: i64,
}

/// Request body for flag creation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFeatureFlagRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[serde(rename = "type")]
    pub flag_type: FlagType,

    #[validate(length(min = 1, message = "Default value is required"))]
    pub default_value: String,

    #[serde(default)]
    #[validate(nested)]
    pub rules: Vec<Rule>,
}

/// Request body for proposing a revision via PATCH.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PatchFeatureFlagRequest {
    #[serde(default)]
    pub default_value: String,

    #[serde(default)]
    #[validate(nested)]
    pub rules: Vec<Rule>,
}

fn parse_id(value: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value).map_err(|_| ApiError::Validation(format!("Invalid {} id", what)))
}

/// Loads the organization and checks the caller holds at least `role`.
async fn authorize(
    state: &AppState,
    user_id: Uuid,
    organization_id: Uuid,
    role: Role,
) -> Result<Organization, ApiError> {
    let organization = state
        .organization_repository()
        .find_by_id(organization_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::Internal(format!("Organization {} not found", organization_id)))?;

    if !user_has_permission(user_id, &organization, role) {
        return Err(ApiError::Forbidden(
            "Insufficient permissions for this organization".to_string(),
        ));
    }

    Ok(organization)
}

/// GET /organizations/:organization_id/feature-flags
pub async fn list_feature_flags(
    State(state): State<AppState>,
    user: UserAuth,
    Path(organization_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListFeatureFlagsResponse>, ApiError> {
    let organization_id = parse_id(&organization_id, "organization")?;
    authorize(&state, user.user_id, organization_id, Role::ReadOnly).await?;

    let params = query.page_params();
    let timeout = Duration::from_secs(state.config.database.query_timeout_secs);

    let flags = tokio::time::timeout(
        timeout,
        state
            .feature_flag_repository()
            .list_by_organization(organization_id, params),
    )
    .await
    .map_err(|_| ApiError::Internal("Flag listing timed out".to_string()))?
    .map_err(ApiError::from)?;

    let total = flags.len() as i64;
    Ok(Json(ListFeatureFlagsResponse {
        data: flags,
        page: params.page,
        page_size: params.page_size,
        total,
    }))
}

/// POST /organizations/:organization_id/feature-flags
pub async fn create_feature_flag(
    State(state): State<AppState>,
    user: UserAuth,
    Path(organization_id): Path<String>,
    ApiJson(req): ApiJson<CreateFeatureFlagRequest>,
) -> Result<(StatusCode, Json<FeatureFlag>), ApiError> {
    let organization_id = parse_id(&organization_id, "organization")?;
    authorize(&state, user.user_id, organization_id, Role::Collaborator).await?;
    req.validate()?;

    let flag = FeatureFlag::new(
        req.name,
        req.flag_type,
        req.default_value,
        req.rules,
        organization_id,
        user.user_id,
    );

    state
        .feature_flag_repository()
        .insert(&flag)
        .await
        .map_err(ApiError::from)?;

    tracing::info!(flag_id = %flag.id, organization_id = %organization_id, "Feature flag created");

    Ok((StatusCode::CREATED, Json(flag)))
}

/// PATCH /organizations/:organization_id/feature-flags/:feature_flag_id
pub async fn patch_feature_flag(
    State(state): State<AppState>,
    user: UserAuth,
    Path((organization_id, feature_flag_id)): Path<(String, String)>,
    ApiJson(req): ApiJson<PatchFeatureFlagRequest>,
) -> Result<Json<Revision>, ApiError> {
    let organization_id = parse_id(&organization_id, "organization")?;
    let feature_flag_id = parse_id(&feature_flag_id, "feature flag")?;
    authorize(&state, user.user_id, organization_id, Role::Collaborator).await?;
    req.validate()?;

    let revision = Revision::new(req.default_value, req.rules, user.user_id);

    let pushed = state
        .feature_flag_repository()
        .push_revision(feature_flag_id, &revision)
        .await
        .map_err(ApiError::from)?;

    if !pushed {
        return Err(ApiError::Internal(format!(
            "Feature flag {} not found",
            feature_flag_id
        )));
    }

    Ok(Json(revision))
}

/// POST /organizations/:organization_id/feature-flags/:feature_flag_id
///      /revisions/:revision_id/approve
pub async fn approve_revision(
    State(state): State<AppState>,
    user: UserAuth,
    Path((organization_id, feature_flag_id, revision_id)): Path<(String, String, String)>,
) -> Result<Json<FeatureFlag>, ApiError> {
    let organization_id = parse_id(&organization_id, "organization")?;
    let feature_flag_id = parse_id(&feature_flag_id, "feature flag")?;
    let revision_id = parse_id(&revision_id, "revision")?;
    authorize(&state, user.user_id, organization_id, Role::Collaborator).await?;

    let repository = state.feature_flag_repository();

    let mut flag = repository
        .find_by_id(feature_flag_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| {
            ApiError::Internal(format!("Feature flag {} not found", feature_flag_id))
        })?;

    flag.approve_revision(revision_id);

    let saved = repository
        .save_revisions(flag.id, flag.version, &flag.revisions)
        .await
        .map_err(ApiError::from)?;

    if !saved {
        return Err(ApiError::Internal(format!(
            "Feature flag {} disappeared during approval",
            feature_flag_id
        )));
    }

    tracing::info!(
        flag_id = %flag.id,
        revision_id = %revision_id,
        version = flag.version,
        "Revision approved"
    );

    Ok(Json(flag))
}

/// DELETE /organizations/:organization_id/feature-flags/:feature_flag_id
pub async fn delete_feature_flag(
    State(state): State<AppState>,
    user: UserAuth,
    Path((organization_id, feature_flag_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let organization_id = parse_id(&organization_id, "organization")?;
    let feature_flag_id = parse_id(&feature_flag_id, "feature flag")?;
    authorize(&state, user.user_id, organization_id, Role::Collaborator).await?;

    let deleted = state
        .feature_flag_repository()
        .soft_delete(feature_flag_id)
        .await
        .map_err(ApiError::from)?;

    if !deleted {
        return Err(ApiError::Internal(format!(
            "Feature flag {} not found",
            feature_flag_id
        )));
    }

    tracing::info!(flag_id = %feature_flag_id, "Feature flag soft-deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults_on_unparseable_values() {
        let query = ListQuery {
            page: Some("abc".to_string()),
            page_size: Some("xyz".to_string()),
        };
        let params = query.page_params();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 10);

        let query = ListQuery {
            page: Some("3".to_string()),
            page_size: Some("25".to_string()),
        };
        let params = query.page_params();
        assert_eq!(params.page, 3);
        assert_eq!(params.page_size, 25);

        let query = ListQuery {
            page: None,
            page_size: None,
        };
        assert_eq!(query.page_params().page, 1);
    }

    #[test]
    fn test_parse_id_rejects_garbage() {
        let err = parse_id("not-a-uuid", "organization").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(parse_id(&Uuid::new_v4().to_string(), "organization").is_ok());
    }

    #[test]
    fn test_create_request_requires_name_and_default_value() {
        let req = CreateFeatureFlagRequest {
            name: String::new(),
            flag_type: FlagType::Boolean,
            default_value: "false".to_string(),
            rules: vec![],
        };
        assert!(req.validate().is_err());

        let req = CreateFeatureFlagRequest {
            name: "checkout-redesign".to_string(),
            flag_type: FlagType::Boolean,
            default_value: String::new(),
            rules: vec![],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_request_validates_nested_rules() {
        let req = CreateFeatureFlagRequest {
            name: "checkout-redesign".to_string(),
            flag_type: FlagType::Boolean,
            default_value: "false".to_string(),
            rules: vec![Rule {
                predicate: String::new(),
                value: "true".to_string(),
                env: "production".to_string(),
            }],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_request_deserializes_type_field() {
        let req: CreateFeatureFlagRequest = serde_json::from_str(
            r#"{"name": "dark-mode", "type": "boolean", "default_value": "false"}"#,
        )
        .unwrap();
        assert_eq!(req.flag_type, FlagType::Boolean);
        assert!(req.rules.is_empty());

        let bad = serde_json::from_str::<CreateFeatureFlagRequest>(
            r#"{"name": "dark-mode", "type": "float", "default_value": "0.5"}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_patch_request_allows_empty_default_value() {
        let req: PatchFeatureFlagRequest = serde_json::from_str(r#"{"rules": []}"#).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.default_value.is_empty());
    }

    #[test]
    fn test_list_response_total_is_page_count() {
        let user_id = Uuid::new_v4();
        let organization_id = Uuid::new_v4();
        let flags: Vec<FeatureFlag> = (0..3)
            .map(|i| {
                FeatureFlag::new(
                    format!("flag-{}", i),
                    FlagType::Boolean,
                    "false".to_string(),
                    vec![],
                    organization_id,
                    user_id,
                )
            })
            .collect();

        let total = flags.len() as i64;
        let response = ListFeatureFlagsResponse {
            data: flags,
            page: 1,
            page_size: 10,
            total,
        };
        assert_eq!(response.total, 3);
    }
}
