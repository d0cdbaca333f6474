/// Database row types; these map directly to SQLite rows.
/// Distinct from market-types API models to keep the DB layer independent.

pub struct ChannelRow {
    pub idminiapp: String,
    pub title: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub icon: Option<String>,
    pub url: Option<String>,
    pub is_verified: bool,
    /// Cached average; readers recompute it from `reviews`.
    pub rating: f64,
    pub category: Option<String>,
    pub screenshots_path: Option<String>,
}

pub struct ReviewRow {
    pub id: i64,
    pub idminiapp: String,
    pub username: String,
    pub rating: i64,
    pub text: String,
    pub created_at: String,
}

pub struct NewReview<'a> {
    pub idminiapp: &'a str,
    pub username: &'a str,
    pub rating: i64,
    pub text: &'a str,
    pub created_at: &'a str,
}

/// Narrowing applied to a catalog listing. Empty filter lists everything.
#[derive(Debug, Default, Clone)]
pub struct ChannelFilter {
    /// Case-sensitive literal substring of title or description.
    pub search: Option<String>,
    /// Exact category.
    pub category: Option<String>,
}
