use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::Database;
use crate::error::StoreError;
use crate::models::{PostRow, PostWithVotesRow, UserRow};

/// Vote-annotated post projection. Posts with no votes still appear with a
/// zero count (LEFT JOIN), owners are joined in, and the title filter is a
/// case-sensitive substring match via instr() — SQLite's LIKE folds ASCII
/// case and would not honor that contract.
const POST_WITH_VOTES_SQL: &str = "
    SELECT p.id, p.title, p.content, p.published, p.owner_id, p.created_at,
           COUNT(v.user_id) AS votes,
           u.email, u.created_at
    FROM posts p
    JOIN users u ON u.id = p.owner_id
    LEFT JOIN votes v ON v.post_id = p.id";

impl Database {
    // -- Users --

    pub fn create_user(&self, email: &str, password_hash: &str) -> Result<UserRow, StoreError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO users (email, password) VALUES (?1, ?2)",
                (email, password_hash),
            )
            .map_err(|e| {
                if StoreError::is_constraint_violation(&e) {
                    StoreError::DuplicateEmail
                } else {
                    e.into()
                }
            })?;

            let user = tx.query_row(
                "SELECT id, email, password, created_at FROM users WHERE id = ?1",
                [tx.last_insert_rowid()],
                user_from_row,
            )?;

            tx.commit()?;
            Ok(user)
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>, StoreError> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, StoreError> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    // -- Posts --

    pub fn create_post(
        &self,
        owner_id: i64,
        title: &str,
        content: &str,
        published: bool,
    ) -> Result<PostRow, StoreError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO posts (title, content, published, owner_id) VALUES (?1, ?2, ?3, ?4)",
                params![title, content, published, owner_id],
            )?;

            let post = tx.query_row(
                "SELECT id, title, content, published, owner_id, created_at
                 FROM posts WHERE id = ?1",
                [tx.last_insert_rowid()],
                post_from_row,
            )?;

            tx.commit()?;
            Ok(post)
        })
    }

    /// Full-field replacement. The ownership check and the update run in one
    /// transaction so the owner read cannot go stale against a concurrent
    /// delete.
    pub fn update_post(
        &self,
        id: i64,
        caller_id: i64,
        title: &str,
        content: &str,
        published: bool,
    ) -> Result<PostRow, StoreError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            check_post_owner(&tx, id, caller_id)?;

            tx.execute(
                "UPDATE posts SET title = ?1, content = ?2, published = ?3 WHERE id = ?4",
                params![title, content, published, id],
            )?;

            let post = tx.query_row(
                "SELECT id, title, content, published, owner_id, created_at
                 FROM posts WHERE id = ?1",
                [id],
                post_from_row,
            )?;

            tx.commit()?;
            Ok(post)
        })
    }

    pub fn delete_post(&self, id: i64, caller_id: i64) -> Result<(), StoreError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            check_post_owner(&tx, id, caller_id)?;

            tx.execute("DELETE FROM posts WHERE id = ?1", [id])?;

            tx.commit()?;
            Ok(())
        })
    }

    // -- Votes --

    pub fn add_vote(&self, post_id: i64, user_id: i64) -> Result<(), StoreError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            check_post_exists(&tx, post_id)?;

            tx.execute(
                "INSERT INTO votes (post_id, user_id) VALUES (?1, ?2)",
                params![post_id, user_id],
            )
            .map_err(|e| {
                if StoreError::is_constraint_violation(&e) {
                    StoreError::DuplicateVote { post_id, user_id }
                } else {
                    e.into()
                }
            })?;

            tx.commit()?;
            Ok(())
        })
    }

    /// Post absence is checked first and reported as post-not-found; only
    /// then is a missing vote row reported.
    pub fn remove_vote(&self, post_id: i64, user_id: i64) -> Result<(), StoreError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            check_post_exists(&tx, post_id)?;

            let deleted = tx.execute(
                "DELETE FROM votes WHERE post_id = ?1 AND user_id = ?2",
                params![post_id, user_id],
            )?;
            if deleted == 0 {
                return Err(StoreError::VoteNotFound);
            }

            tx.commit()?;
            Ok(())
        })
    }

    // -- Listings --

    pub fn list_posts(
        &self,
        limit: u32,
        skip: u32,
        search: &str,
    ) -> Result<Vec<PostWithVotesRow>, StoreError> {
        self.with_conn(|conn| {
            // id-ascending keeps pagination deterministic under concurrent inserts
            let sql = format!(
                "{POST_WITH_VOTES_SQL}
                 WHERE ?1 = '' OR instr(p.title, ?1) > 0
                 GROUP BY p.id
                 ORDER BY p.id ASC
                 LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare(&sql)?;

            let rows = stmt
                .query_map(params![search, limit, skip], post_with_votes_from_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn get_post_with_votes(&self, id: i64) -> Result<Option<PostWithVotesRow>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!(
                "{POST_WITH_VOTES_SQL}
                 WHERE p.id = ?1
                 GROUP BY p.id"
            );

            let row = conn
                .query_row(&sql, [id], post_with_votes_from_row)
                .optional()?;

            Ok(row)
        })
    }
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>, StoreError> {
    let row = conn
        .query_row(
            "SELECT id, email, password, created_at FROM users WHERE id = ?1",
            [id],
            user_from_row,
        )
        .optional()?;

    Ok(row)
}

fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>, StoreError> {
    let row = conn
        .query_row(
            "SELECT id, email, password, created_at FROM users WHERE email = ?1",
            [email],
            user_from_row,
        )
        .optional()?;

    Ok(row)
}

fn check_post_exists(conn: &Connection, id: i64) -> Result<(), StoreError> {
    conn.query_row("SELECT id FROM posts WHERE id = ?1", [id], |row| {
        row.get::<_, i64>(0)
    })
    .optional()?
    .map(|_| ())
    .ok_or(StoreError::PostNotFound(id))
}

fn check_post_owner(conn: &Connection, id: i64, caller_id: i64) -> Result<(), StoreError> {
    let owner_id: i64 = conn
        .query_row("SELECT owner_id FROM posts WHERE id = ?1", [id], |row| {
            row.get(0)
        })
        .optional()?
        .ok_or(StoreError::PostNotFound(id))?;

    if owner_id != caller_id {
        return Err(StoreError::NotOwner);
    }
    Ok(())
}

fn user_from_row(row: &Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn post_from_row(row: &Row) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        published: row.get(3)?,
        owner_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn post_with_votes_from_row(row: &Row) -> rusqlite::Result<PostWithVotesRow> {
    Ok(PostWithVotesRow {
        post: PostRow {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            published: row.get(3)?,
            owner_id: row.get(4)?,
            created_at: row.get(5)?,
        },
        votes: row.get(6)?,
        owner_email: row.get(7)?,
        owner_created_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn seed_user(db: &Database, email: &str) -> UserRow {
        db.create_user(email, "not-a-real-hash").unwrap()
    }

    #[test]
    fn duplicate_email_rejected_and_first_row_kept() {
        let db = db();
        let first = seed_user(&db, "a@x.com");

        let err = db.create_user("a@x.com", "other-hash").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));

        let kept = db.get_user_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(kept.id, first.id);
        assert_eq!(kept.password, "not-a-real-hash");
    }

    #[test]
    fn get_user_by_id_missing_is_none() {
        let db = db();
        assert!(db.get_user_by_id(42).unwrap().is_none());
    }

    #[test]
    fn create_post_defaults_round_trip() {
        let db = db();
        let user = seed_user(&db, "a@x.com");

        let post = db.create_post(user.id, "t", "c", true).unwrap();
        assert_eq!(post.title, "t");
        assert_eq!(post.content, "c");
        assert!(post.published);
        assert_eq!(post.owner_id, user.id);
    }

    #[test]
    fn update_post_enforces_ownership() {
        let db = db();
        let owner = seed_user(&db, "a@x.com");
        let other = seed_user(&db, "b@x.com");
        let post = db.create_post(owner.id, "t", "c", true).unwrap();

        let err = db
            .update_post(post.id, other.id, "t2", "c2", false)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotOwner));

        let updated = db
            .update_post(post.id, owner.id, "t2", "c2", false)
            .unwrap();
        assert_eq!(updated.title, "t2");
        assert!(!updated.published);
    }

    #[test]
    fn update_missing_post_is_not_found() {
        let db = db();
        let user = seed_user(&db, "a@x.com");

        let err = db.update_post(999, user.id, "t", "c", true).unwrap_err();
        assert!(matches!(err, StoreError::PostNotFound(999)));
    }

    #[test]
    fn delete_post_enforces_ownership() {
        let db = db();
        let owner = seed_user(&db, "a@x.com");
        let other = seed_user(&db, "b@x.com");
        let post = db.create_post(owner.id, "t", "c", true).unwrap();

        let err = db.delete_post(post.id, other.id).unwrap_err();
        assert!(matches!(err, StoreError::NotOwner));

        db.delete_post(post.id, owner.id).unwrap();
        assert!(db.get_post_with_votes(post.id).unwrap().is_none());
    }

    #[test]
    fn vote_add_conflicts_then_remove_allows_readd() {
        let db = db();
        let user = seed_user(&db, "a@x.com");
        let post = db.create_post(user.id, "t", "c", true).unwrap();

        db.add_vote(post.id, user.id).unwrap();

        let err = db.add_vote(post.id, user.id).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateVote { .. }));

        db.remove_vote(post.id, user.id).unwrap();
        db.add_vote(post.id, user.id).unwrap();
    }

    #[test]
    fn vote_on_missing_post_reports_post_not_found() {
        let db = db();
        let user = seed_user(&db, "a@x.com");

        let err = db.add_vote(999, user.id).unwrap_err();
        assert!(matches!(err, StoreError::PostNotFound(999)));

        // same ordering on removal: post absence wins over vote absence
        let err = db.remove_vote(999, user.id).unwrap_err();
        assert!(matches!(err, StoreError::PostNotFound(999)));
    }

    #[test]
    fn remove_missing_vote_reports_vote_not_found() {
        let db = db();
        let user = seed_user(&db, "a@x.com");
        let post = db.create_post(user.id, "t", "c", true).unwrap();

        let err = db.remove_vote(post.id, user.id).unwrap_err();
        assert!(matches!(err, StoreError::VoteNotFound));
    }

    #[test]
    fn vote_counts_aggregate_per_post() {
        let db = db();
        let a = seed_user(&db, "a@x.com");
        let b = seed_user(&db, "b@x.com");
        let c = seed_user(&db, "c@x.com");
        let voted = db.create_post(a.id, "voted", "c", true).unwrap();
        let quiet = db.create_post(a.id, "quiet", "c", true).unwrap();

        db.add_vote(voted.id, a.id).unwrap();
        db.add_vote(voted.id, b.id).unwrap();
        db.add_vote(voted.id, c.id).unwrap();

        let row = db.get_post_with_votes(voted.id).unwrap().unwrap();
        assert_eq!(row.votes, 3);
        assert_eq!(row.owner_email, "a@x.com");

        // zero-vote posts still appear with count 0
        let row = db.get_post_with_votes(quiet.id).unwrap().unwrap();
        assert_eq!(row.votes, 0);

        let listed = db.list_posts(10, 0, "").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].votes, 3);
        assert_eq!(listed[1].votes, 0);
    }

    #[test]
    fn listing_paginates_in_id_order() {
        let db = db();
        let user = seed_user(&db, "a@x.com");
        let ids: Vec<i64> = (0..5)
            .map(|i| {
                db.create_post(user.id, &format!("post {i}"), "c", true)
                    .unwrap()
                    .id
            })
            .collect();

        let page = db.list_posts(2, 1, "").unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].post.id, ids[1]);
        assert_eq!(page[1].post.id, ids[2]);
    }

    #[test]
    fn listing_search_is_case_sensitive_substring() {
        let db = db();
        let user = seed_user(&db, "a@x.com");
        db.create_post(user.id, "Rust tips", "c", true).unwrap();
        db.create_post(user.id, "rust tricks", "c", true).unwrap();
        db.create_post(user.id, "unrelated", "c", true).unwrap();

        let hits = db.list_posts(10, 0, "Rust").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].post.title, "Rust tips");

        let hits = db.list_posts(10, 0, "rust").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].post.title, "rust tricks");

        // empty search applies no filter
        let hits = db.list_posts(10, 0, "").unwrap();
        assert_eq!(hits.len(), 3);
    }
}
