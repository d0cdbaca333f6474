//! Turns the icon and screenshot filenames stored in the catalog into URLs
//! the Mini App can load.

/// Shown for entries listed without an icon.
pub const DEFAULT_ICON_URL: &str = "https://api.dicebear.com/7.x/shapes/svg?seed=default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetUrls {
    /// Served by this process through `/api/static`.
    Proxy,
    /// Served from remote object storage or a CDN mirror. The base always
    /// ends with `/`.
    Remote { base: String },
}

impl AssetUrls {
    pub fn remote(base: &str) -> Self {
        let mut base = base.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self::Remote { base }
    }

    /// `Remote` when a base URL is configured, `Proxy` otherwise.
    pub fn from_base(base: Option<&str>) -> Self {
        match base.map(str::trim).filter(|b| !b.is_empty()) {
            Some(base) => Self::remote(base),
            None => Self::Proxy,
        }
    }

    pub fn file_url(&self, file: &str) -> String {
        let encoded = urlencoding::encode(file);
        match self {
            Self::Proxy => format!("/api/static?file={encoded}"),
            Self::Remote { base } => format!("{base}{encoded}"),
        }
    }

    /// Absolute icon URLs pass through untouched.
    pub fn icon_url(&self, icon: Option<&str>) -> String {
        match icon.map(str::trim).filter(|i| !i.is_empty()) {
            None => DEFAULT_ICON_URL.to_string(),
            Some(icon) if icon.starts_with("http://") || icon.starts_with("https://") => {
                icon.to_string()
            }
            Some(icon) => self.file_url(icon),
        }
    }

    /// Splits the `;`-delimited screenshot list, dropping blank entries.
    pub fn screenshot_urls(&self, screenshots_path: Option<&str>) -> Vec<String> {
        screenshots_path
            .unwrap_or_default()
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| self.file_url(s))
            .collect()
    }
}
