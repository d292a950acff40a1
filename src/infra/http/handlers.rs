//! API handlers.

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::response::IntoResponse;

use crate::application::sessions::AuthedUser;
use crate::domain::templates::TemplateSlug;

use super::error::ApiError;
use super::models::{
    ApiEnvelope, CreateLinkRequest, CustomizerStateResponse, EnterCustomizerRequest,
    LinkActiveRequest, ProfileLinkResponse, SaveTemplateRequest, SelectionRequest,
    SelectionResponse, TemplateEntry, TemplateSetResponse,
};
use super::state::ApiState;

fn parse_slug(raw: &str) -> Result<TemplateSlug, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::bad_request(
            "unknown template slug",
            Some(format!("`{raw}` is not a known template")),
        )
    })
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Session bootstrap: resolve every known slug at once.
pub async fn list_templates(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthedUser>,
) -> Result<impl IntoResponse, ApiError> {
    let resolved = state.templates.initialize(&user).await;
    let templates = resolved
        .into_iter()
        .map(|(slug, data)| TemplateEntry { slug, data })
        .collect();
    Ok(Json(ApiEnvelope::new(TemplateSetResponse { templates })))
}

pub async fn resolve_template(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthedUser>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let slug = parse_slug(&slug)?;
    let mode = state.customizer.mode_for(user.user_id);
    let resolved = state.templates.resolve(&user, slug, &mode).await?;
    Ok(Json(ApiEnvelope::new(resolved)))
}

pub async fn refresh_template(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthedUser>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let slug = parse_slug(&slug)?;
    let resolved = state.templates.refresh(&user, slug).await?;
    Ok(Json(ApiEnvelope::new(resolved)))
}

pub async fn save_template(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthedUser>,
    Json(payload): Json<SaveTemplateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let slug = parse_slug(&payload.template_slug)?;
    let resolved = state
        .templates
        .save(&user, slug, payload.custom_settings, payload.is_published)
        .await?;
    Ok(Json(ApiEnvelope::new(resolved)))
}

pub async fn get_selection(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthedUser>,
) -> impl IntoResponse {
    let template_slug = state.selection.get_selected(user.user_id).await;
    Json(ApiEnvelope::new(SelectionResponse { template_slug }))
}

pub async fn put_selection(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthedUser>,
    Json(payload): Json<SelectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let slug = parse_slug(&payload.template_slug)?;
    state.selection.set_selected(user.user_id, slug).await;
    Ok(Json(ApiEnvelope::new(SelectionResponse {
        template_slug: slug,
    })))
}

pub async fn enter_customizer(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthedUser>,
    Json(payload): Json<EnterCustomizerRequest>,
) -> impl IntoResponse {
    state
        .customizer
        .enter(user.user_id, payload.draft, payload.officer_info);
    Json(ApiEnvelope::new(CustomizerStateResponse {
        customizer_mode: true,
    }))
}

pub async fn exit_customizer(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthedUser>,
) -> impl IntoResponse {
    state.customizer.exit(user.user_id);
    Json(ApiEnvelope::new(CustomizerStateResponse {
        customizer_mode: false,
    }))
}

/// Logout hook: drop everything cached for the caller.
pub async fn clear_cache(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthedUser>,
) -> impl IntoResponse {
    state.customizer.exit(user.user_id);
    state.templates.clear_user(user.user_id).await;
    Json(ApiEnvelope::new(serde_json::json!({ "cleared": true })))
}

pub async fn create_profile_link(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthedUser>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let slug = parse_slug(&payload.template_slug)?;
    let link = state.public_profiles.create_link(user.user_id, slug).await?;
    Ok(Json(ApiEnvelope::new(ProfileLinkResponse::from(link))))
}

pub async fn set_profile_link_active(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthedUser>,
    Path(token): Path<String>,
    Json(payload): Json<LinkActiveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .public_profiles
        .set_link_active(user.user_id, &token, payload.active)
        .await?;
    Ok(Json(ApiEnvelope::new(serde_json::json!({
        "token": token,
        "active": payload.active,
    }))))
}

pub async fn resolve_public_profile(
    State(state): State<ApiState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    use crate::application::error::AppError;

    match state.public_profiles.resolve_public(&token).await {
        Ok(resolved) => Ok(Json(ApiEnvelope::new(resolved))),
        // A link can be reactivated by its owner at any time, so tell the
        // caller this is worth polling.
        Err(AppError::NotFound) => Err(ApiError::not_found_retryable(
            "profile is not currently available",
        )),
        Err(other) => Err(other.into()),
    }
}
