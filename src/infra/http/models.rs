//! API request and response models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::templates::OfficerInfo;
use crate::domain::links::ProfileLinkRecord;
use crate::domain::templates::{ResolvedTemplate, TemplateBundle, TemplateSlug};

/// Success envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTemplateRequest {
    pub template_slug: String,
    pub custom_settings: Value,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    pub template_slug: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub template_slug: TemplateSlug,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterCustomizerRequest {
    pub draft: TemplateBundle,
    #[serde(default)]
    pub officer_info: Option<OfficerInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizerStateResponse {
    pub customizer_mode: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    pub template_slug: String,
}

#[derive(Debug, Deserialize)]
pub struct LinkActiveRequest {
    pub active: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileLinkResponse {
    pub token: String,
    pub template_slug: TemplateSlug,
    pub active: bool,
}

impl From<ProfileLinkRecord> for ProfileLinkResponse {
    fn from(record: ProfileLinkRecord) -> Self {
        Self {
            token: record.token,
            template_slug: record.slug,
            active: record.active,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateEntry {
    pub slug: TemplateSlug,
    pub data: ResolvedTemplate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSetResponse {
    pub templates: Vec<TemplateEntry>,
}
