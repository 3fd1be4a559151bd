use rusqlite::{params, Connection, OptionalExtension};

use crate::db::models::User;

fn user_from_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        bio: row.get(4)?,
        profile_picture: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const USER_COLUMNS: &str = "id, name, email, password_hash, bio, profile_picture, created_at";

/// Insert a new user. A duplicate email surfaces as a constraint
/// violation from the UNIQUE index, not from a pre-check.
pub fn insert_user(
    conn: &Connection,
    name: &str,
    email: &str,
    password_hash: &str,
    bio: Option<&str>,
) -> rusqlite::Result<User> {
    let user = User {
        id: uuid::Uuid::now_v7().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        bio: bio.map(|b| b.to_string()),
        profile_picture: None,
        created_at: crate::db::now(),
    };

    conn.execute(
        "INSERT INTO users (id, name, email, password_hash, bio, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id,
            user.name,
            user.email,
            user.password_hash,
            user.bio,
            user.created_at
        ],
    )?;

    Ok(user)
}

pub fn find_by_id(conn: &Connection, id: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
        params![id],
        user_from_row,
    )
    .optional()
}

pub fn find_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
        params![email],
        user_from_row,
    )
    .optional()
}

/// Partial profile update. `None` fields are left untouched. Deliberately
/// does not rewrite the denormalized author/comment names on posts.
pub fn update_profile(
    conn: &Connection,
    id: &str,
    name: Option<&str>,
    bio: Option<&str>,
    profile_picture: Option<&str>,
) -> rusqlite::Result<Option<User>> {
    if let Some(name) = name {
        conn.execute(
            "UPDATE users SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;
    }
    if let Some(bio) = bio {
        conn.execute("UPDATE users SET bio = ?1 WHERE id = ?2", params![bio, id])?;
    }
    if let Some(pic) = profile_picture {
        conn.execute(
            "UPDATE users SET profile_picture = ?1 WHERE id = ?2",
            params![pic, id],
        )?;
    }

    find_by_id(conn, id)
}
