use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};

use super::{DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL, ProfileUpdate, User, UserStats};
use crate::error::{AppError, AppResult};

const USER_COLUMNS: &str =
    "id, username, email, password, image_url, header_image_url, bio, location, is_admin";

const MAX_USERNAME_LEN: usize = 50;

fn from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        image_url: row.get(4)?,
        header_image_url: row.get(5)?,
        bio: row.get(6)?,
        location: row.get(7)?,
        is_admin: row.get(8)?,
    })
}

fn unique_violation(e: rusqlite::Error) -> AppError {
    match e {
        rusqlite::Error::SqliteFailure(ref err, _)
            if err.code == ErrorCode::ConstraintViolation =>
        {
            AppError::Conflict("Username or email already taken".to_string())
        }
        other => AppError::Db(other),
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// `false` for a mismatch or an unparseable stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn non_blank(v: Option<&str>) -> Option<String> {
    v.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

fn validate_username(username: &str) -> AppResult<()> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::Invalid(format!(
            "Username must be 1-{MAX_USERNAME_LEN} characters"
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(AppError::Invalid("Username may not contain spaces".to_string()));
    }
    Ok(())
}

fn validate_email(email: &str) -> AppResult<()> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::Invalid("Invalid email address".to_string()));
    }
    Ok(())
}

fn ensure_available(
    conn: &Connection,
    username: &str,
    email: &str,
    except_id: Option<i64>,
) -> AppResult<()> {
    let except = except_id.unwrap_or(0);
    let username_taken: bool = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE username = ?1 AND id <> ?2",
        params![username, except],
        |r| r.get::<_, i64>(0),
    )? > 0;
    if username_taken {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }
    let email_taken: bool = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1 AND id <> ?2",
        params![email, except],
        |r| r.get::<_, i64>(0),
    )? > 0;
    if email_taken {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }
    Ok(())
}

/// Create a user, storing an Argon2 hash of `password`.
pub fn signup(
    conn: &Connection,
    username: &str,
    email: &str,
    password: &str,
    image_url: Option<&str>,
) -> AppResult<User> {
    let username = username.trim();
    let email = email.trim();
    validate_username(username)?;
    validate_email(email)?;
    if password.is_empty() {
        return Err(AppError::Invalid("Password is required".to_string()));
    }
    ensure_available(conn, username, email, None)?;

    let hashed = hash_password(password)?;
    let image_url = image_url
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_IMAGE_URL);

    conn.execute(
        "INSERT INTO users (username, email, password, image_url, header_image_url) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![username, email, &hashed, image_url, DEFAULT_HEADER_IMAGE_URL],
    )
    .map_err(unique_violation)?;

    let id = conn.last_insert_rowid();
    tracing::info!(user_id = id, username, "user signed up");
    find(conn, id)?.ok_or(AppError::NotFound)
}

/// The user whose name and password match, or `None`.
pub fn authenticate(conn: &Connection, username: &str, password: &str) -> AppResult<Option<User>> {
    let user = find_by_username(conn, username)?;
    Ok(user.filter(|u| verify_password(password, &u.password)))
}

pub fn find(conn: &Connection, id: i64) -> AppResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            from_row,
        )
        .optional()?;
    Ok(user)
}

pub fn find_by_username(conn: &Connection, username: &str) -> AppResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            params![username],
            from_row,
        )
        .optional()?;
    Ok(user)
}

/// All users, or those whose username contains `query` (case-insensitive).
pub fn search(conn: &Connection, query: Option<&str>) -> AppResult<Vec<User>> {
    let query = query.map(str::trim).filter(|q| !q.is_empty());
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users
         WHERE ?1 IS NULL OR instr(lower(username), lower(?1)) > 0
         ORDER BY username"
    ))?;
    let users = stmt
        .query_map(params![query], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

/// Users that `user_id` follows.
pub fn following(conn: &Connection, user_id: i64) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.username, u.email, u.password, u.image_url, u.header_image_url, u.bio, u.location, u.is_admin
         FROM follows f
         JOIN users u ON u.id = f.user_being_followed_id
         WHERE f.user_following_id = ?1
         ORDER BY u.username",
    )?;
    let users = stmt
        .query_map(params![user_id], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

/// Users following `user_id`.
pub fn followers(conn: &Connection, user_id: i64) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.username, u.email, u.password, u.image_url, u.header_image_url, u.bio, u.location, u.is_admin
         FROM follows f
         JOIN users u ON u.id = f.user_following_id
         WHERE f.user_being_followed_id = ?1
         ORDER BY u.username",
    )?;
    let users = stmt
        .query_map(params![user_id], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

pub fn stats(conn: &Connection, user_id: i64) -> AppResult<UserStats> {
    let stats = conn.query_row(
        "SELECT
            (SELECT COUNT(*) FROM messages WHERE user_id = ?1),
            (SELECT COUNT(*) FROM follows WHERE user_following_id = ?1),
            (SELECT COUNT(*) FROM follows WHERE user_being_followed_id = ?1),
            (SELECT COUNT(*) FROM likes WHERE user_id = ?1)",
        params![user_id],
        |r| {
            Ok(UserStats {
                messages: r.get(0)?,
                following: r.get(1)?,
                followers: r.get(2)?,
                likes: r.get(3)?,
            })
        },
    )?;
    Ok(stats)
}

/// Apply a partial update. Blank strings count as "not provided" for the
/// required fields; for bio and location they clear the value.
pub fn update_profile(conn: &Connection, id: i64, update: &ProfileUpdate) -> AppResult<User> {
    let existing = find(conn, id)?.ok_or(AppError::NotFound)?;

    let username = non_blank(update.username.as_deref()).unwrap_or(existing.username);
    let email = non_blank(update.email.as_deref()).unwrap_or(existing.email);
    validate_username(&username)?;
    validate_email(&email)?;
    ensure_available(conn, &username, &email, Some(id))?;

    let image_url = non_blank(update.image_url.as_deref()).unwrap_or(existing.image_url);
    let header_image_url =
        non_blank(update.header_image_url.as_deref()).unwrap_or(existing.header_image_url);
    let bio = match update.bio.as_deref() {
        Some(b) => non_blank(Some(b)),
        None => existing.bio,
    };
    let location = match update.location.as_deref() {
        Some(l) => non_blank(Some(l)),
        None => existing.location,
    };

    conn.execute(
        "UPDATE users SET username = ?1, email = ?2, image_url = ?3, header_image_url = ?4, bio = ?5, location = ?6 WHERE id = ?7",
        params![&username, &email, &image_url, &header_image_url, &bio, &location, id],
    )
    .map_err(unique_violation)?;

    find(conn, id)?.ok_or(AppError::NotFound)
}

pub fn set_admin(conn: &Connection, id: i64, is_admin: bool) -> AppResult<()> {
    let rows = conn.execute(
        "UPDATE users SET is_admin = ?1 WHERE id = ?2",
        params![is_admin, id],
    )?;
    if rows == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Delete a user. Messages, likes and follow edges go with it via
/// `ON DELETE CASCADE`. Returns whether a row was removed.
pub fn delete(conn: &Connection, id: i64) -> AppResult<bool> {
    let rows = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    if rows > 0 {
        tracing::info!(user_id = id, "user deleted");
    }
    Ok(rows > 0)
}

impl User {
    /// Whether `self` follows `other`.
    pub fn is_following(&self, conn: &Connection, other: &User) -> AppResult<bool> {
        super::follows::exists(conn, self.id, other.id)
    }

    /// Whether `other` follows `self`.
    pub fn is_followed_by(&self, conn: &Connection, other: &User) -> AppResult<bool> {
        super::follows::exists(conn, other.id, self.id)
    }
}
