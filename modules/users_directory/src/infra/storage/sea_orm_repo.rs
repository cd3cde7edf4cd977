//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait`, so it can be built on a
//! `DatabaseConnection` or on a transaction.

use anyhow::Context;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, Condition, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set,
};

use crate::contract::model::{NewUser, User, UserId};
use crate::domain::repo::{UserQuery, UsersRepository};
use crate::infra::storage::entity::{
    ActiveModel as UserAM, Column, Entity as UserEntity, Model as UserModel,
};

const LIKE_ESCAPE: char = '\\';

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// `%term%` with the LIKE metacharacters of `term` escaped. Only ASCII is
/// folded, matching what SQLite's `LOWER(column)` does.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.to_ascii_lowercase().chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn lower_contains(column: Column, pattern: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col((UserEntity, column))))
        .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

/// Terms outside ASCII are not pushed into SQL: `LOWER` would leave their
/// letters unfolded. Those rows are filtered by [`unicode_match`] instead.
fn select_users(query: &UserQuery) -> Select<UserEntity> {
    let select = match query {
        UserQuery::NameOrEmailContains(term) if term.is_ascii() => {
            let pattern = contains_pattern(term);
            UserEntity::find().filter(
                Condition::any()
                    .add(lower_contains(Column::Name, &pattern))
                    .add(lower_contains(Column::Email, &pattern)),
            )
        }
        UserQuery::NameOrEmailContains(_) | UserQuery::All => UserEntity::find(),
    };
    select
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
}

/// Unicode-folded name/email match for the terms [`select_users`] leaves
/// unfiltered. `None` means the SQL filter already applied.
fn unicode_match(query: &UserQuery) -> Option<impl Fn(&UserModel) -> bool> {
    match query {
        UserQuery::NameOrEmailContains(term) if !term.is_ascii() => {
            let needle = term.to_lowercase();
            Some(move |m: &UserModel| {
                m.name.to_lowercase().contains(&needle) || m.email.to_lowercase().contains(&needle)
            })
        }
        _ => None,
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_users(&self, query: &UserQuery) -> anyhow::Result<Vec<User>> {
        let rows = select_users(query)
            .all(&self.conn)
            .await
            .context("find_users failed")?;
        let users = match unicode_match(query) {
            Some(keep) => rows.into_iter().filter(|m| keep(m)).map(Into::into).collect(),
            None => rows.into_iter().map(Into::into).collect(),
        };
        Ok(users)
    }

    async fn find_by_id(&self, id: UserId) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn delete(&self, id: UserId) -> anyhow::Result<bool> {
        let res = UserEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        UserEntity::find()
            .count(&self.conn)
            .await
            .context("count failed")
    }

    async fn insert(&self, new_user: NewUser) -> anyhow::Result<User> {
        let m = UserAM {
            id: NotSet,
            name: Set(new_user.name),
            email: Set(new_user.email),
            company: Set(new_user.company),
            address: Set(new_user.address),
            city: Set(new_user.city),
            created_at: Set(Utc::now()),
        };
        let inserted = m.insert(&self.conn).await.context("insert failed")?;
        Ok(inserted.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn pattern_escapes_like_metacharacters() {
        assert_eq!(contains_pattern("oh D"), "%oh d%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }

    #[test]
    fn non_ascii_terms_are_filtered_outside_sql() {
        assert_eq!(contains_pattern("ÉMILE"), "%Émile%");

        let sql = select_users(&UserQuery::matching("émile"))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(!sql.contains("WHERE"), "{sql}");

        let keep = unicode_match(&UserQuery::matching("émile")).unwrap();
        let row = UserModel {
            id: 1,
            name: "ÉMILE ZOLA".into(),
            email: "emile@example.com".into(),
            company: String::new(),
            address: String::new(),
            city: String::new(),
            created_at: Utc::now(),
        };
        assert!(keep(&row));
        assert!(unicode_match(&UserQuery::matching("emile")).is_none());
    }

    #[test]
    fn unfiltered_select_orders_newest_first() {
        let sql = select_users(&UserQuery::All)
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains(r#"ORDER BY "users"."created_at" DESC, "users"."id" DESC"#), "{sql}");
        assert!(!sql.contains("WHERE"), "{sql}");
    }

    #[test]
    fn search_select_matches_name_or_email() {
        let sql = select_users(&UserQuery::matching("John"))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains(r#"LOWER("users"."name") LIKE '%john%'"#), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
        assert!(sql.contains(r#"LOWER("users"."email")"#), "{sql}");
    }
}
