//! Customizer editing mode.
//!
//! While a user edits a draft, resolution answers with the draft alone:
//! cache tiers and the store are not consulted, and nothing the editing
//! session sees is persisted until an explicit save. The mode is a sum
//! type passed into the resolver rather than hidden state, so a call site
//! always shows whether it can be answered by a draft.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::sessions::AuthedUser;
use crate::domain::templates::{
    ResolvedTemplate, TemplateBundle, TemplateMetadata, TemplateSlug, UserTemplateContext,
};

/// Officer contact details shown while previewing a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerInfo {
    pub officer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub enum CustomizerMode {
    #[default]
    Browsing,
    Editing {
        draft: TemplateBundle,
        officer_info: Option<OfficerInfo>,
    },
}

impl CustomizerMode {
    pub fn is_editing(&self) -> bool {
        matches!(self, CustomizerMode::Editing { .. })
    }

    /// Materialize the draft as a resolved template for `slug`. Draft
    /// previews are always marked customized and never published.
    pub fn preview(&self, user: &AuthedUser, slug: TemplateSlug) -> Option<ResolvedTemplate> {
        let CustomizerMode::Editing { draft, .. } = self else {
            return None;
        };
        let mut template = draft.clone();
        template.slug = slug;
        Some(ResolvedTemplate {
            template,
            user_info: UserTemplateContext {
                user_id: user.user_id,
                company_id: user.company_id,
                company_name: user.company_name.clone(),
                user_role: user.role.clone(),
                has_custom_settings: true,
            },
            metadata: TemplateMetadata {
                template_slug: slug,
                is_customized: true,
                is_published: false,
            },
        })
    }
}

/// Per-user editing mode, held for the lifetime of an editing session.
#[derive(Default)]
pub struct CustomizerRegistry {
    modes: DashMap<Uuid, CustomizerMode>,
}

impl CustomizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter editing mode; re-entering replaces the draft.
    pub fn enter(&self, user_id: Uuid, draft: TemplateBundle, officer_info: Option<OfficerInfo>) {
        self.modes
            .insert(user_id, CustomizerMode::Editing { draft, officer_info });
    }

    /// Leave editing mode. Idempotent.
    pub fn exit(&self, user_id: Uuid) {
        self.modes.remove(&user_id);
    }

    pub fn mode_for(&self, user_id: Uuid) -> CustomizerMode {
        self.modes
            .get(&user_id)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }
}
