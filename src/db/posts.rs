use rusqlite::{params, Connection, TransactionBehavior};

use crate::db::models::{AuthorView, CommentView, LikeView, Post, PostView, User, UserRef};

/// How many posts the global feed returns.
pub const FEED_LIMIT: i64 = 50;

/// Insert a post, capturing the author's display name at this instant.
/// Later profile renames do not touch it.
pub fn insert_post(conn: &Connection, author: &User, content: &str) -> rusqlite::Result<Post> {
    let now = crate::db::now();
    let post = Post {
        id: uuid::Uuid::now_v7().to_string(),
        author_id: author.id.clone(),
        author_name: author.name.clone(),
        content: content.to_string(),
        created_at: now.clone(),
        updated_at: now,
    };

    conn.execute(
        "INSERT INTO posts (id, author_id, author_name, content, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            post.id,
            post.author_id,
            post.author_name,
            post.content,
            post.created_at,
            post.updated_at
        ],
    )?;

    Ok(post)
}

/// Toggle the (post, user) like in a single conditional mutation: delete
/// the row, and only if nothing was deleted insert one. Runs in an
/// immediate transaction so two concurrent toggles serialize; the
/// UNIQUE(post_id, user_id) index backstops the at-most-one invariant
/// even without it.
///
/// Returns `None` when the post does not exist, otherwise whether the
/// user likes the post after the toggle.
pub fn toggle_like(
    conn: &mut Connection,
    post_id: &str,
    user_id: &str,
) -> rusqlite::Result<Option<bool>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let exists: bool = tx.query_row(
        "SELECT COUNT(*) > 0 FROM posts WHERE id = ?1",
        params![post_id],
        |row| row.get(0),
    )?;
    if !exists {
        return Ok(None);
    }

    let removed = tx.execute(
        "DELETE FROM likes WHERE post_id = ?1 AND user_id = ?2",
        params![post_id, user_id],
    )?;

    let liked = if removed == 0 {
        tx.execute(
            "INSERT OR IGNORE INTO likes (id, post_id, user_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                uuid::Uuid::now_v7().to_string(),
                post_id,
                user_id,
                crate::db::now()
            ],
        )?;
        true
    } else {
        false
    };

    tx.commit()?;
    Ok(Some(liked))
}

/// Append a comment, capturing the commenter's display name at this
/// instant. Returns `None` when the post does not exist.
pub fn add_comment(
    conn: &Connection,
    post_id: &str,
    user: &User,
    text: &str,
) -> rusqlite::Result<Option<()>> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM posts WHERE id = ?1",
        params![post_id],
        |row| row.get(0),
    )?;
    if !exists {
        return Ok(None);
    }

    conn.execute(
        "INSERT INTO comments (id, post_id, user_id, username, body, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            uuid::Uuid::now_v7().to_string(),
            post_id,
            user.id,
            user.name,
            text,
            crate::db::now()
        ],
    )?;

    Ok(Some(()))
}

/// The most recent posts, newest first, fully resolved.
pub fn list_recent(conn: &Connection, limit: i64) -> rusqlite::Result<Vec<PostView>> {
    list_views(
        conn,
        "ORDER BY p.created_at DESC, p.rowid DESC LIMIT ?1",
        params![limit],
    )
}

/// All posts by one author, newest first.
pub fn list_by_author(conn: &Connection, author_id: &str) -> rusqlite::Result<Vec<PostView>> {
    list_views(
        conn,
        "WHERE p.author_id = ?1 ORDER BY p.created_at DESC, p.rowid DESC",
        params![author_id],
    )
}

/// A single post resolved for the API, or `None` if it does not exist.
pub fn get_view(conn: &Connection, post_id: &str) -> rusqlite::Result<Option<PostView>> {
    let mut views = list_views(conn, "WHERE p.id = ?1", params![post_id])?;
    Ok(views.pop())
}

fn list_views(
    conn: &Connection,
    tail: &str,
    params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<PostView>> {
    let sql = format!(
        "SELECT p.id, p.content, p.author_name, p.created_at, p.updated_at,
                u.id, u.name, u.email, u.profile_picture
         FROM posts p JOIN users u ON u.id = p.author_id {}",
        tail
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut posts: Vec<PostView> = stmt
        .query_map(params, |row| {
            Ok(PostView {
                id: row.get(0)?,
                content: row.get(1)?,
                author_name: row.get(2)?,
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
                author: AuthorView {
                    id: row.get(5)?,
                    name: row.get(6)?,
                    email: row.get(7)?,
                    profile_picture: row.get(8)?,
                },
                likes: Vec::new(),
                comments: Vec::new(),
            })
        })?
        .collect::<Result<_, _>>()?;

    for post in &mut posts {
        post.likes = likes_for(conn, &post.id)?;
        post.comments = comments_for(conn, &post.id)?;
    }

    Ok(posts)
}

fn likes_for(conn: &Connection, post_id: &str) -> rusqlite::Result<Vec<LikeView>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.name FROM likes l JOIN users u ON u.id = l.user_id
         WHERE l.post_id = ?1 ORDER BY l.rowid",
    )?;
    let rows = stmt
        .query_map(params![post_id], |row| {
            Ok(LikeView {
                user: UserRef {
                    id: row.get(0)?,
                    name: row.get(1)?,
                },
            })
        })?
        .collect();
    rows
}

fn comments_for(conn: &Connection, post_id: &str) -> rusqlite::Result<Vec<CommentView>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.username, c.body, c.created_at, u.id, u.name
         FROM comments c JOIN users u ON u.id = c.user_id
         WHERE c.post_id = ?1 ORDER BY c.rowid",
    )?;
    let rows = stmt
        .query_map(params![post_id], |row| {
            Ok(CommentView {
                id: row.get(0)?,
                username: row.get(1)?,
                text: row.get(2)?,
                created_at: row.get(3)?,
                user: UserRef {
                    id: row.get(4)?,
                    name: row.get(5)?,
                },
            })
        })?
        .collect();
    rows
}
