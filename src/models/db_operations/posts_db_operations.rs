use crate::models::{NewPost, Post};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Item not found in database: {0}")]
    NotFound(String),
}

const POST_COLUMNS: &str = "id, title, meta_description, focus_keyword, url_keyword, image, tags, \
     topic, service, industry, priority, description, created_at, updated_at";

const PRIORITY_RANK_SQL: &str = "CASE priority WHEN 'maximum' THEN 1 WHEN 'high' THEN 2 \
     WHEN 'normal' THEN 3 ELSE 4 END";

fn conversion_failure<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    let tags_json: String = row.get(6)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).map_err(|e| conversion_failure(6, e))?;

    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        meta_description: row.get(2)?,
        focus_keyword: row.get(3)?,
        url_keyword: row.get(4)?,
        image: row.get(5)?,
        tags,
        topic: row.get(7)?,
        service: row.get(8)?,
        industry: row.get(9)?,
        priority: row.get(10)?,
        description: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

/// Inserts a validated post inside a single transaction and returns its row id.
pub fn insert_post(conn: &mut Connection, post: &NewPost, image: Option<&str>) -> Result<i64, DbError> {
    let tags_json = serde_json::to_string(&post.tags)?;
    let now = Utc::now();

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO blog_posts (
            title, meta_description, focus_keyword, url_keyword, image, tags,
            topic, service, industry, priority, description, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            post.title,
            post.meta_description,
            post.focus_keyword,
            post.url_keyword,
            image,
            tags_json,
            post.topic,
            post.service,
            post.industry,
            post.priority.as_str(),
            post.description,
            now,
            now,
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    Ok(id)
}

pub fn url_keyword_exists(conn: &Connection, url_keyword: &str) -> Result<bool, DbError> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM blog_posts WHERE url_keyword = ?1)",
        [url_keyword],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(exists)
}

pub fn read_post_by_url_keyword(conn: &Connection, url_keyword: &str) -> Result<Post, DbError> {
    let sql = format!("SELECT {} FROM blog_posts WHERE url_keyword = ?1", POST_COLUMNS);
    conn.query_row(&sql, [url_keyword], post_from_row)
        .optional()?
        .ok_or_else(|| DbError::NotFound(url_keyword.to_string()))
}

pub fn count_posts(conn: &Connection) -> Result<u64, DbError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM blog_posts", [], |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

/// Reads one page of posts, in insertion order or by priority rank.
/// Rows that no longer decode are logged and left out of the page.
pub fn read_posts_paginated(
    conn: &Connection,
    limit: u64,
    offset: u64,
    sort_by_priority: bool,
) -> Result<Vec<Post>, DbError> {
    let order_by = if sort_by_priority {
        format!("{}, id", PRIORITY_RANK_SQL)
    } else {
        "id".to_string()
    };
    let sql = format!(
        "SELECT {} FROM blog_posts ORDER BY {} LIMIT ?1 OFFSET ?2",
        POST_COLUMNS, order_by
    );

    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(offset).unwrap_or(i64::MAX);

    let mut stmt = conn.prepare(&sql)?;
    let post_iter = stmt.query_map(params![limit, offset], post_from_row)?;

    let posts = post_iter
        .filter_map(|res| match res {
            Ok(post) => Some(post),
            Err(e) => {
                log::warn!("Skipping malformed blog post row: {}", e);
                None
            }
        })
        .collect();
    Ok(posts)
}

/// Minimal `(url_keyword, priority)` projection used by the sitemap.
pub fn read_sitemap_entries(conn: &Connection) -> Result<Vec<(String, String)>, DbError> {
    let mut stmt = conn.prepare("SELECT url_keyword, priority FROM blog_posts ORDER BY id")?;
    let entries = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .filter_map(|res| res.ok())
        .collect();
    Ok(entries)
}
