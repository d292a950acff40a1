//! Cache key definitions.
//!
//! Every tier shares one namespaced key scheme so an entry written by the
//! distributed tier can be deleted through the local tier and vice versa.

use uuid::Uuid;

use crate::domain::templates::TemplateSlug;

const NAMESPACE: &str = "vetrina";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// A resolved template for one user and slug.
    Template { user_id: Uuid, slug: TemplateSlug },
    /// The user's active template selection.
    Selection { user_id: Uuid },
}

impl CacheKey {
    pub fn template(user_id: Uuid, slug: TemplateSlug) -> Self {
        Self::Template { user_id, slug }
    }

    pub fn selection(user_id: Uuid) -> Self {
        Self::Selection { user_id }
    }

    /// Render the storage key shared by every tier.
    pub fn render(&self) -> String {
        match self {
            CacheKey::Template { user_id, slug } => {
                format!("{NAMESPACE}:template:{user_id}:{slug}")
            }
            CacheKey::Selection { user_id } => format!("{NAMESPACE}:selection:{user_id}"),
        }
    }
}
