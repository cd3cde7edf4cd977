use chrono::{DateTime, Utc};

/// Store-generated primary key. Never reused after a delete.
pub type UserId = i64;

/// A user record as held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub company: String,
    pub address: String,
    pub city: String,
    pub created_at: DateTime<Utc>,
}

/// Data for inserting a user; id and created_at are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub company: String,
    pub address: String,
    pub city: String,
}
