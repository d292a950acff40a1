//! Template bundles and their composition rules.
//!
//! A bundle carries the full styling and content configuration for one
//! visual template. The configuration blocks (`colors`, `typography`, ...)
//! are opaque JSON: the service transports them between the store, the
//! cache tiers, and consumers without ever interpreting their contents.
//! Composition guarantees a fully-populated bundle even when a user has no
//! stored customization.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::DomainError;

/// The closed set of template variants offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateSlug {
    #[serde(rename = "template1")]
    Template1,
    #[serde(rename = "template2")]
    Template2,
}

impl TemplateSlug {
    pub const ALL: [TemplateSlug; 2] = [TemplateSlug::Template1, TemplateSlug::Template2];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateSlug::Template1 => "template1",
            TemplateSlug::Template2 => "template2",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TemplateSlug::Template1 => "Classic",
            TemplateSlug::Template2 => "Spotlight",
        }
    }
}

impl std::str::FromStr for TemplateSlug {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "template1" => Ok(TemplateSlug::Template1),
            "template2" => Ok(TemplateSlug::Template2),
            other => Err(DomainError::UnknownSlug(other.to_string())),
        }
    }
}

impl std::fmt::Display for TemplateSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn empty_block() -> Value {
    json!({})
}

/// Full styling/content configuration for one template variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateBundle {
    pub id: String,
    pub slug: TemplateSlug,
    pub name: String,
    pub colors: Value,
    pub typography: Value,
    pub content: Value,
    pub layout: Value,
    pub advanced: Value,
    #[serde(default = "empty_block")]
    pub header_modifications: Value,
    #[serde(default = "empty_block")]
    pub body_modifications: Value,
    #[serde(default = "empty_block")]
    pub right_sidebar_modifications: Value,
}

static DEFAULT_COLORS: Lazy<Value> = Lazy::new(|| {
    json!({
        "primary": "#ec4899",
        "secondary": "#3b82f6",
        "background": "#ffffff",
        "text": "#111827",
        "textSecondary": "#6b7280",
        "border": "#e5e7eb",
    })
});

static DEFAULT_TYPOGRAPHY: Lazy<Value> = Lazy::new(|| {
    json!({
        "fontFamily": "Inter",
        "fontSize": 16,
        "fontWeight": {
            "light": 300,
            "normal": 400,
            "medium": 500,
            "semibold": 600,
            "bold": 700,
        },
    })
});

static DEFAULT_CONTENT: Lazy<Value> = Lazy::new(|| {
    json!({
        "headline": "Let's find the right loan for you",
        "subheadline": "Answer a few questions and get a personalized quote.",
        "ctaText": "Get Started",
        "companyName": "Your Company",
    })
});

static DEFAULT_LAYOUT: Lazy<Value> = Lazy::new(|| {
    json!({
        "alignment": "center",
        "spacing": 16,
        "borderRadius": 8,
        "padding": 24,
    })
});

static DEFAULT_ADVANCED: Lazy<Value> = Lazy::new(|| {
    json!({
        "customCSS": "",
        "accessibility": true,
    })
});

fn overlay(slot: &mut Value, map: &serde_json::Map<String, Value>, key: &str) {
    if let Some(value) = map.get(key)
        && !value.is_null()
    {
        *slot = value.clone();
    }
}

impl TemplateBundle {
    /// The documented fallback bundle for a slug. Every block is a concrete
    /// object so consumers can render without null checks.
    pub fn default_for(slug: TemplateSlug) -> Self {
        Self {
            id: format!("default-{}", slug.as_str()),
            slug,
            name: slug.display_name().to_string(),
            colors: DEFAULT_COLORS.clone(),
            typography: DEFAULT_TYPOGRAPHY.clone(),
            content: DEFAULT_CONTENT.clone(),
            layout: DEFAULT_LAYOUT.clone(),
            advanced: DEFAULT_ADVANCED.clone(),
            header_modifications: empty_block(),
            body_modifications: empty_block(),
            right_sidebar_modifications: empty_block(),
        }
    }

    /// Overlay stored customization blocks. A block present in `settings`
    /// replaces the corresponding default wholesale; blocks the user never
    /// touched keep their fallback values.
    pub fn apply_custom_settings(&mut self, settings: &Value) {
        let Some(map) = settings.as_object() else {
            return;
        };
        overlay(&mut self.colors, map, "colors");
        overlay(&mut self.typography, map, "typography");
        overlay(&mut self.content, map, "content");
        overlay(&mut self.layout, map, "layout");
        overlay(&mut self.advanced, map, "advanced");
        overlay(&mut self.header_modifications, map, "headerModifications");
        overlay(&mut self.body_modifications, map, "bodyModifications");
        overlay(
            &mut self.right_sidebar_modifications,
            map,
            "rightSidebarModifications",
        );
        if let Some(name) = map.get("name").and_then(Value::as_str) {
            self.name = name.to_string();
        }
    }
}

/// Who the resolved bundle belongs to, as consumers see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTemplateContext {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub company_name: String,
    pub user_role: String,
    pub has_custom_settings: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
    pub template_slug: TemplateSlug,
    pub is_customized: bool,
    pub is_published: bool,
}

/// The unit returned to consumers and stored in the cache tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTemplate {
    pub template: TemplateBundle,
    pub user_info: UserTemplateContext,
    pub metadata: TemplateMetadata,
}

impl ResolvedTemplate {
    /// Compose the default bundle with an optional stored customization
    /// row. `None` yields the pristine default marked uncustomized.
    pub fn compose(
        slug: TemplateSlug,
        mut user_info: UserTemplateContext,
        record: Option<&CustomizationRecord>,
    ) -> Self {
        let mut template = TemplateBundle::default_for(slug);
        let (is_customized, is_published) = match record {
            Some(record) => {
                template.apply_custom_settings(&record.custom_settings);
                (record.is_customized, record.is_published)
            }
            None => (false, false),
        };
        user_info.has_custom_settings = is_customized;
        Self {
            template,
            user_info,
            metadata: TemplateMetadata {
                template_slug: slug,
                is_customized,
                is_published,
            },
        }
    }
}

/// A stored customization row, exactly as the store keeps it.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomizationRecord {
    pub user_id: Uuid,
    pub slug: TemplateSlug,
    pub custom_settings: Value,
    pub is_customized: bool,
    pub is_published: bool,
    pub updated_at: OffsetDateTime,
}
