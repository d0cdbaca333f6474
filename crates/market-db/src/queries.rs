use crate::Database;
use crate::models::{ChannelFilter, ChannelRow, NewReview, ReviewRow};
use crate::rating::RatingTotals;
use anyhow::Result;
use market_types::models::SeedChannel;
use rusqlite::{Connection, OptionalExtension, Row};
use std::collections::HashMap;

/// Catalog files written by earlier tooling may hold fractional scores;
/// every read rounds them to whole stars.
const SCORE: &str = "CAST(ROUND(rating) AS INTEGER)";

const CHANNEL_COLUMNS: &str = "idminiapp, title, description, short_description, icon, url, \
     is_verified, rating, category, screenshots_path";

impl Database {
    // -- Channels --

    pub fn get_channel(&self, idminiapp: &str) -> Result<Option<ChannelRow>> {
        self.with_conn(|conn| query_channel(conn, idminiapp))
    }

    pub fn channel_exists(&self, idminiapp: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row("SELECT 1 FROM channels WHERE idminiapp = ?1", [idminiapp], |_| Ok(()))
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn list_channels(&self, filter: &ChannelFilter) -> Result<Vec<ChannelRow>> {
        self.with_conn(|conn| query_channels(conn, filter))
    }

    /// Inserts or refreshes a catalog entry. The cached rating is left alone.
    pub fn upsert_channel(&self, channel: &SeedChannel) -> Result<()> {
        let screenshots = channel.screenshots.join(";");
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO channels
                    (idminiapp, title, description, short_description, icon, url,
                     is_verified, category, screenshots_path)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(idminiapp) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    short_description = excluded.short_description,
                    icon = excluded.icon,
                    url = excluded.url,
                    is_verified = excluded.is_verified,
                    category = excluded.category,
                    screenshots_path = excluded.screenshots_path",
                rusqlite::params![
                    &channel.idminiapp,
                    &channel.title,
                    &channel.description,
                    &channel.short_description,
                    &channel.icon,
                    &channel.url,
                    channel.is_verified,
                    &channel.category,
                    &screenshots,
                ],
            )?;
            Ok(())
        })
    }

    // -- Reviews --

    /// Appends a review and rewrites the app's cached rating in the same
    /// transaction. Returns the new review id.
    pub fn insert_review(&self, review: &NewReview<'_>) -> Result<i64> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO reviews (idminiapp, username, rating, text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    review.idminiapp,
                    review.username,
                    review.rating,
                    review.text,
                    review.created_at,
                ],
            )?;
            let id = tx.last_insert_rowid();

            let totals = query_rating_totals_for(&tx, review.idminiapp)?;
            tx.execute(
                "UPDATE channels SET rating = ?1 WHERE idminiapp = ?2",
                rusqlite::params![totals.average(), review.idminiapp],
            )?;

            tx.commit()?;
            Ok(id)
        })
    }

    /// Reviews of one app, newest first. `julianday()` orders legacy
    /// `YYYY-MM-DD HH:MM:SS` rows and RFC 3339 rows on one timeline.
    pub fn list_reviews(&self, idminiapp: &str) -> Result<Vec<ReviewRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT id, idminiapp, username, {SCORE}, text, created_at
                 FROM reviews
                 WHERE idminiapp = ?1
                 ORDER BY julianday(created_at) DESC, id DESC"
            ))?;

            let rows = stmt
                .query_map([idminiapp], |row| {
                    Ok(ReviewRow {
                        id: row.get(0)?,
                        idminiapp: row.get(1)?,
                        username: row.get(2)?,
                        rating: row.get(3)?,
                        text: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn rating_totals_for(&self, idminiapp: &str) -> Result<RatingTotals> {
        self.with_conn(|conn| query_rating_totals_for(conn, idminiapp))
    }

    /// Review totals of every app that has at least one review.
    pub fn rating_totals(&self) -> Result<HashMap<String, RatingTotals>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT idminiapp, SUM({SCORE}), COUNT(*) FROM reviews GROUP BY idminiapp"
            ))?;

            let totals = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        RatingTotals {
                            sum: row.get(1)?,
                            count: row.get(2)?,
                        },
                    ))
                })?
                .collect::<std::result::Result<HashMap<_, _>, _>>()?;

            Ok(totals)
        })
    }
}

fn query_channel(conn: &Connection, idminiapp: &str) -> Result<Option<ChannelRow>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {CHANNEL_COLUMNS} FROM channels WHERE idminiapp = ?1"))?;

    let row = stmt.query_row([idminiapp], channel_from_row).optional()?;
    Ok(row)
}

fn query_channels(conn: &Connection, filter: &ChannelFilter) -> Result<Vec<ChannelRow>> {
    let mut sql = format!("SELECT {CHANNEL_COLUMNS} FROM channels");
    let mut clauses = Vec::new();
    let mut args: Vec<&str> = Vec::new();

    // instr() instead of LIKE: case-sensitive, and `%`/`_` in the term stay literal.
    if let Some(search) = filter.search.as_deref() {
        args.push(search);
        let n = args.len();
        clauses.push(format!(
            "(instr(title, ?{n}) > 0 OR instr(COALESCE(description, ''), ?{n}) > 0)"
        ));
    }
    if let Some(category) = filter.category.as_deref() {
        args.push(category);
        clauses.push(format!(
            "COALESCE(NULLIF(category, ''), 'Утилиты') = ?{}",
            args.len()
        ));
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY rowid");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(args), channel_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_rating_totals_for(conn: &Connection, idminiapp: &str) -> Result<RatingTotals> {
    let mut stmt = conn.prepare(&format!("SELECT {SCORE} FROM reviews WHERE idminiapp = ?1"))?;
    let scores = stmt
        .query_map([idminiapp], |row| row.get::<_, i64>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(RatingTotals::from_scores(scores))
}

fn channel_from_row(row: &Row<'_>) -> rusqlite::Result<ChannelRow> {
    Ok(ChannelRow {
        idminiapp: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        short_description: row.get(3)?,
        icon: row.get(4)?,
        url: row.get(5)?,
        is_verified: row.get::<_, Option<i64>>(6)?.unwrap_or(0) != 0,
        rating: row.get::<_, Option<f64>>(7)?.unwrap_or(0.0),
        category: row.get(8)?,
        screenshots_path: row.get(9)?,
    })
}
