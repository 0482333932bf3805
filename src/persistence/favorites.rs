use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::{
    app::DatabaseError,
    favorite::{Favorite, NewFavorite},
    persistence::{DatabaseResult, get_connection},
};

pub trait FavoriteRepository {
    fn insert(&self, favorite: &NewFavorite) -> DatabaseResult<i64>;
    fn list_by_owner(&self, owner_email: &str) -> DatabaseResult<Vec<Favorite>>;
    fn delete_own(&self, id: i64, owner_email: &str) -> DatabaseResult<usize>;
}

pub struct FavoriteRepositoryImpl {
    pool: Pool<SqliteConnectionManager>,
}

impl FavoriteRepositoryImpl {
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Self {
        Self { pool }
    }

    fn favorite_from_row(row: &rusqlite::Row) -> rusqlite::Result<Favorite> {
        Ok(Favorite {
            id: row.get("id")?,
            owner_email: row.get("owner_email")?,
            profile_id: row.get("profile_id")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl FavoriteRepository for FavoriteRepositoryImpl {
    fn insert(&self, favorite: &NewFavorite) -> DatabaseResult<i64> {
        let conn = get_connection(&self.pool)?;
        conn.execute(
            "INSERT INTO favorites (owner_email, profile_id, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                favorite.owner_email,
                favorite.profile_id,
                favorite.created_at
            ],
        )
        .map_err(|e| DatabaseError::QueryError(e))?;
        Ok(conn.last_insert_rowid())
    }

    fn list_by_owner(&self, owner_email: &str) -> DatabaseResult<Vec<Favorite>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn
            .prepare("SELECT * FROM favorites WHERE owner_email = ?1")
            .map_err(|e| DatabaseError::QueryError(e))?;
        let rows = stmt
            .query_map([owner_email], Self::favorite_from_row)
            .map_err(|e| DatabaseError::QueryError(e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DatabaseError::QueryError(e))
    }

    fn delete_own(&self, id: i64, owner_email: &str) -> DatabaseResult<usize> {
        let conn = get_connection(&self.pool)?;
        conn.execute(
            "DELETE FROM favorites WHERE id = ?1 AND owner_email = ?2",
            rusqlite::params![id, owner_email],
        )
        .map_err(|e| DatabaseError::QueryError(e))
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockFavoriteRepository {
    rows: std::sync::Arc<std::sync::Mutex<Vec<Favorite>>>,
}

#[cfg(test)]
impl FavoriteRepository for MockFavoriteRepository {
    fn insert(&self, favorite: &NewFavorite) -> DatabaseResult<i64> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        rows.push(Favorite {
            id,
            owner_email: favorite.owner_email.clone(),
            profile_id: favorite.profile_id,
            created_at: favorite.created_at,
        });
        Ok(id)
    }

    fn list_by_owner(&self, owner_email: &str) -> DatabaseResult<Vec<Favorite>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|f| f.owner_email == owner_email)
            .cloned()
            .collect())
    }

    fn delete_own(&self, id: i64, owner_email: &str) -> DatabaseResult<usize> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|f| !(f.id == id && f.owner_email == owner_email));
        Ok(before - rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::test_pool;

    #[test]
    fn test_insert_list_delete() {
        let repo = FavoriteRepositoryImpl::new(test_pool());
        let id = repo
            .insert(&NewFavorite {
                owner_email: "alice@example.com".to_string(),
                profile_id: 3,
                created_at: 1700000000,
            })
            .unwrap();

        let listed = repo.list_by_owner("alice@example.com").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].profile_id, 3);
        assert!(repo.list_by_owner("bob@example.com").unwrap().is_empty());

        assert_eq!(repo.delete_own(id, "bob@example.com").unwrap(), 0);
        assert_eq!(repo.delete_own(id, "alice@example.com").unwrap(), 1);
        assert!(repo.list_by_owner("alice@example.com").unwrap().is_empty());
    }
}
