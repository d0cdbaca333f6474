use serde::{Deserialize, Serialize};

/// Category assigned to entries that were listed without one.
pub const DEFAULT_CATEGORY: &str = "Утилиты";

/// Name stored on every review; the storefront has no user accounts.
pub const DEFAULT_REVIEW_USERNAME: &str = "Пользователь";

/// A storefront shelf. Each section shows every app of one category.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Section {
    pub slug: &'static str,
    pub title: &'static str,
    pub category: &'static str,
}

/// Sections in display order.
pub const SECTIONS: &[Section] = &[
    Section { slug: "finance", title: "Финансы", category: "Финансы" },
    Section { slug: "games", title: "Игры", category: "Игры" },
    Section { slug: "bots", title: "Боты", category: "Боты" },
    Section { slug: "gifts", title: "Подарки", category: "Подарки" },
    Section { slug: "utilities", title: "Утилиты", category: "Утилиты" },
    Section { slug: "trends", title: "Тренды", category: "Тренды" },
];

pub fn find_section(slug: &str) -> Option<&'static Section> {
    SECTIONS.iter().find(|s| s.slug == slug)
}

/// One record of the out-of-band catalog seed file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SeedChannel {
    pub idminiapp: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default = "default_category")]
    pub category: String,
    /// Screenshot filenames; joined with `;` when stored.
    #[serde(default)]
    pub screenshots: Vec<String>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}
