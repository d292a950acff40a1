//! Public profile links.
//!
//! A link is the anonymous address of one user's published bundle. Tokens
//! are unguessable and carry no meaning; ownership and activation live in
//! the store.

use time::OffsetDateTime;
use uuid::Uuid;

use super::templates::TemplateSlug;

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileLinkRecord {
    pub token: String,
    pub user_id: Uuid,
    pub slug: TemplateSlug,
    pub active: bool,
    pub created_at: OffsetDateTime,
}

impl ProfileLinkRecord {
    pub fn generate_token() -> String {
        format!("pl_{}", Uuid::new_v4().simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_prefixed_and_unique() {
        let a = ProfileLinkRecord::generate_token();
        let b = ProfileLinkRecord::generate_token();
        assert!(a.starts_with("pl_"));
        assert_ne!(a, b);
    }
}
