use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{Message, User, now_timestamp};
use crate::error::{AppError, AppResult};

pub const MAX_TEXT_LEN: usize = 140;

const MESSAGE_SELECT: &str = "SELECT m.id, m.text, m.created_at, m.user_id, u.username, u.image_url
     FROM messages m
     JOIN users u ON u.id = m.user_id";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        text: row.get(1)?,
        created_at: row.get(2)?,
        user_id: row.get(3)?,
        username: row.get(4)?,
        user_image_url: row.get(5)?,
    })
}

fn collect(conn: &Connection, sql: &str, args: impl rusqlite::Params) -> AppResult<Vec<Message>> {
    let mut stmt = conn.prepare(sql)?;
    let messages = stmt
        .query_map(args, from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(messages)
}

/// Post a message for `user_id`. Text is stored as given; it must be 1-140
/// characters and not blank.
pub fn create(conn: &Connection, user_id: i64, text: &str) -> AppResult<Message> {
    let len = text.chars().count();
    if text.trim().is_empty() || len > MAX_TEXT_LEN {
        return Err(AppError::Invalid(format!(
            "Message must be 1-{MAX_TEXT_LEN} characters"
        )));
    }

    let owner_exists: bool = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE id = ?1",
        params![user_id],
        |r| r.get::<_, i64>(0),
    )? > 0;
    if !owner_exists {
        return Err(AppError::Invalid("Message owner does not exist".to_string()));
    }

    conn.execute(
        "INSERT INTO messages (text, created_at, user_id) VALUES (?1, ?2, ?3)",
        params![text, now_timestamp(), user_id],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(message_id = id, user_id, "message created");
    find(conn, id)?.ok_or(AppError::NotFound)
}

pub fn find(conn: &Connection, id: i64) -> AppResult<Option<Message>> {
    let message = conn
        .query_row(
            &format!("{MESSAGE_SELECT} WHERE m.id = ?1"),
            params![id],
            from_row,
        )
        .optional()?;
    Ok(message)
}

/// Delete a message on behalf of `actor`, who must be its author or an admin.
pub fn delete(conn: &Connection, id: i64, actor: &User) -> AppResult<()> {
    let message = find(conn, id)?.ok_or(AppError::NotFound)?;
    if message.user_id != actor.id && !actor.is_admin {
        return Err(AppError::Unauthorized);
    }
    conn.execute("DELETE FROM messages WHERE id = ?1", params![id])?;
    tracing::info!(message_id = id, actor_id = actor.id, "message deleted");
    Ok(())
}

/// Messages authored by `user_id`, newest first.
pub fn list_by_owner(conn: &Connection, user_id: i64) -> AppResult<Vec<Message>> {
    collect(
        conn,
        &format!("{MESSAGE_SELECT} WHERE m.user_id = ?1 ORDER BY m.created_at DESC, m.id DESC"),
        params![user_id],
    )
}

/// Messages `user_id` has liked, newest message first.
pub fn list_liked_by_user(conn: &Connection, user_id: i64) -> AppResult<Vec<Message>> {
    collect(
        conn,
        &format!(
            "{MESSAGE_SELECT}
             JOIN likes l ON l.message_id = m.id
             WHERE l.user_id = ?1
             ORDER BY m.created_at DESC, m.id DESC"
        ),
        params![user_id],
    )
}

/// Home feed: the user's own messages plus those of everyone they follow.
pub fn timeline(conn: &Connection, user_id: i64, limit: u32) -> AppResult<Vec<Message>> {
    collect(
        conn,
        &format!(
            "{MESSAGE_SELECT}
             WHERE m.user_id = ?1
                OR m.user_id IN (SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1)
             ORDER BY m.created_at DESC, m.id DESC
             LIMIT ?2"
        ),
        params![user_id, limit],
    )
}
