use std::path::Path;

use anyhow::{Context, Result};
use market_db::Database;
use market_types::models::SeedChannel;
use tracing::info;

/// Upserts every channel listed in a JSON array file. Returns how many were
/// written.
pub fn import_file(db: &Database, path: &Path) -> Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    let channels: Vec<SeedChannel> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing seed file {}", path.display()))?;

    for channel in &channels {
        db.upsert_channel(channel)
            .with_context(|| format!("importing channel {}", channel.idminiapp))?;
    }

    info!("Imported {} channel(s) from {}", channels.len(), path.display());
    Ok(channels.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_db::models::ChannelFilter;

    #[test]
    fn imports_and_reimports() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("market.db")).unwrap();
        let seed = dir.path().join("seed.json");
        std::fs::write(
            &seed,
            r#"[
                {"idminiapp": "1", "title": "Major", "category": "Игры", "is_verified": true,
                 "screenshots": ["major_1.webp", "major_2.webp"]},
                {"idminiapp": "2", "title": "Wallet", "description": "Crypto wallet"}
            ]"#,
        )
        .unwrap();

        assert_eq!(import_file(&db, &seed).unwrap(), 2);
        assert_eq!(import_file(&db, &seed).unwrap(), 2);

        let all = db.list_channels(&ChannelFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
        let major = db.get_channel("1").unwrap().unwrap();
        assert_eq!(major.category.as_deref(), Some("Игры"));
        assert_eq!(major.screenshots_path.as_deref(), Some("major_1.webp;major_2.webp"));
    }

    #[test]
    fn rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("market.db")).unwrap();
        let seed = dir.path().join("seed.json");
        std::fs::write(&seed, r#"{"idminiapp": "1"}"#).unwrap();

        assert!(import_file(&db, &seed).is_err());
        assert!(import_file(&db, &dir.path().join("missing.json")).is_err());
    }
}
