/// Database row types — these map directly to SQLite rows.
/// Distinct from quill-types API models to keep the DB layer independent.

#[derive(Debug)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

#[derive(Debug)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub owner_id: i64,
    pub created_at: String,
}

/// One row of the vote-annotated listing: the post, its aggregated vote
/// count, and the owner columns joined in.
pub struct PostWithVotesRow {
    pub post: PostRow,
    pub votes: i64,
    pub owner_email: String,
    pub owner_created_at: String,
}
