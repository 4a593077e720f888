use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

use crate::Database;
use crate::models::{PostRow, UserRow};

impl Database {
    // -- Users --

    /// Insert a new user and return the store-assigned id.
    /// Fails on a duplicate username (UNIQUE constraint).
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password) VALUES (?1, ?2)",
                (username, password_hash),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    // -- Posts --

    /// Insert a post and return the store-assigned id. The referential
    /// constraint rejects an author_id with no matching user.
    pub fn insert_post(&self, author_id: i64, content: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (author_id, content) VALUES (?1, ?2)",
                rusqlite::params![author_id, content],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| query_posts(conn, None))
    }

    pub fn list_posts_by_user(&self, author_id: i64) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| query_posts(conn, Some(author_id)))
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, username, password, created_at FROM users WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, username, password, created_at FROM users WHERE id = ?1")?;

    let row = stmt
        .query_row([id], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_posts(conn: &Connection, author_id: Option<i64>) -> Result<Vec<PostRow>> {
    // JOIN users to fetch the author username in a single query (no N+1).
    // created_at has second granularity, so id DESC breaks insertion ties.
    let mut sql = String::from(
        "SELECT p.id, p.author_id, u.username, p.content, p.created_at
         FROM posts p
         JOIN users u ON p.author_id = u.id",
    );
    if author_id.is_some() {
        sql.push_str(" WHERE p.author_id = ?1");
    }
    sql.push_str(" ORDER BY p.created_at DESC, p.id DESC");

    let mut stmt = conn.prepare(&sql)?;

    let map = |row: &rusqlite::Row<'_>| {
        Ok(PostRow {
            id: row.get(0)?,
            author_id: row.get(1)?,
            author_username: row.get(2)?,
            content: row.get(3)?,
            created_at: row.get(4)?,
        })
    };

    let rows = match author_id {
        Some(id) => stmt
            .query_map([id], map)?
            .collect::<std::result::Result<Vec<_>, _>>()?,
        None => stmt
            .query_map([], map)?
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };

    Ok(rows)
}
