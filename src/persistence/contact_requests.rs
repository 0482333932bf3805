use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};

use crate::{
    app::DatabaseError,
    contact_request::{ContactRequest, NewContactRequest, RequestStatus},
    persistence::{DatabaseResult, get_connection},
};

pub trait ContactRequestRepository {
    fn get_by_id(&self, id: i64) -> DatabaseResult<Option<ContactRequest>>;
    fn insert(&self, request: &NewContactRequest) -> DatabaseResult<i64>;
    fn list_by_requester(&self, requester_email: &str) -> DatabaseResult<Vec<ContactRequest>>;
    fn list_pending(&self) -> DatabaseResult<Vec<ContactRequest>>;
    fn approve(&self, id: i64) -> DatabaseResult<usize>;
    fn delete_own(&self, id: i64, requester_email: &str) -> DatabaseResult<usize>;
    fn count_pending(&self) -> DatabaseResult<usize>;
}

impl FromSql for RequestStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        RequestStatus::parse(text).ok_or(FromSqlError::InvalidType)
    }
}

impl ToSql for RequestStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

pub struct ContactRequestRepositoryImpl {
    pool: Pool<SqliteConnectionManager>,
}

impl ContactRequestRepositoryImpl {
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Self {
        Self { pool }
    }

    fn request_from_row(row: &rusqlite::Row) -> rusqlite::Result<ContactRequest> {
        Ok(ContactRequest {
            id: row.get("id")?,
            profile_id: row.get("profile_id")?,
            requester_email: row.get("requester_email")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl ContactRequestRepository for ContactRequestRepositoryImpl {
    fn get_by_id(&self, id: i64) -> DatabaseResult<Option<ContactRequest>> {
        let conn = get_connection(&self.pool)?;
        let request = conn.query_row(
            "SELECT * FROM contact_requests WHERE id = ?1",
            [id],
            Self::request_from_row,
        );
        match request {
            Ok(request) => Ok(Some(request)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryError(e)),
        }
    }

    fn insert(&self, request: &NewContactRequest) -> DatabaseResult<i64> {
        let conn = get_connection(&self.pool)?;
        conn.execute(
            "INSERT INTO contact_requests (profile_id, requester_email, status, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                request.profile_id,
                request.requester_email,
                RequestStatus::Pending,
                request.created_at,
            ],
        )
        .map_err(|e| DatabaseError::QueryError(e))?;
        Ok(conn.last_insert_rowid())
    }

    fn list_by_requester(&self, requester_email: &str) -> DatabaseResult<Vec<ContactRequest>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn
            .prepare("SELECT * FROM contact_requests WHERE requester_email = ?1")
            .map_err(|e| DatabaseError::QueryError(e))?;
        let rows = stmt
            .query_map([requester_email], Self::request_from_row)
            .map_err(|e| DatabaseError::QueryError(e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DatabaseError::QueryError(e))
    }

    fn list_pending(&self) -> DatabaseResult<Vec<ContactRequest>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn
            .prepare("SELECT * FROM contact_requests WHERE status = ?1")
            .map_err(|e| DatabaseError::QueryError(e))?;
        let rows = stmt
            .query_map([RequestStatus::Pending], Self::request_from_row)
            .map_err(|e| DatabaseError::QueryError(e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DatabaseError::QueryError(e))
    }

    fn approve(&self, id: i64) -> DatabaseResult<usize> {
        let conn = get_connection(&self.pool)?;
        conn.execute(
            "UPDATE contact_requests SET status = ?1 WHERE id = ?2",
            rusqlite::params![RequestStatus::Approved, id],
        )
        .map_err(|e| DatabaseError::QueryError(e))
    }

    fn delete_own(&self, id: i64, requester_email: &str) -> DatabaseResult<usize> {
        let conn = get_connection(&self.pool)?;
        conn.execute(
            "DELETE FROM contact_requests WHERE id = ?1 AND requester_email = ?2",
            rusqlite::params![id, requester_email],
        )
        .map_err(|e| DatabaseError::QueryError(e))
    }

    fn count_pending(&self) -> DatabaseResult<usize> {
        let conn = get_connection(&self.pool)?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM contact_requests WHERE status = ?1",
                [RequestStatus::Pending],
                |row| row.get(0),
            )
            .map_err(|e| DatabaseError::QueryError(e))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockContactRequestRepository {
    rows: std::sync::Arc<std::sync::Mutex<Vec<ContactRequest>>>,
}

#[cfg(test)]
impl ContactRequestRepository for MockContactRequestRepository {
    fn get_by_id(&self, id: i64) -> DatabaseResult<Option<ContactRequest>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| r.id == id).cloned())
    }

    fn insert(&self, request: &NewContactRequest) -> DatabaseResult<i64> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        rows.push(ContactRequest {
            id,
            profile_id: request.profile_id,
            requester_email: request.requester_email.clone(),
            status: RequestStatus::Pending,
            created_at: request.created_at,
        });
        Ok(id)
    }

    fn list_by_requester(&self, requester_email: &str) -> DatabaseResult<Vec<ContactRequest>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| r.requester_email == requester_email)
            .cloned()
            .collect())
    }

    fn list_pending(&self) -> DatabaseResult<Vec<ContactRequest>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .cloned()
            .collect())
    }

    fn approve(&self, id: i64) -> DatabaseResult<usize> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.id == id) {
            Some(request) => {
                request.status = RequestStatus::Approved;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_own(&self, id: i64, requester_email: &str) -> DatabaseResult<usize> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.id == id && r.requester_email == requester_email));
        Ok(before - rows.len())
    }

    fn count_pending(&self) -> DatabaseResult<usize> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::test_pool;

    #[test]
    fn test_lifecycle() {
        let repo = ContactRequestRepositoryImpl::new(test_pool());
        let id = repo
            .insert(&NewContactRequest {
                profile_id: 7,
                requester_email: "alice@example.com".to_string(),
                created_at: 1700000000,
            })
            .unwrap();

        let stored = repo.get_by_id(id).unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
        assert_eq!(repo.count_pending().unwrap(), 1);
        assert_eq!(repo.list_pending().unwrap().len(), 1);

        assert_eq!(repo.approve(id).unwrap(), 1);
        let approved = repo.get_by_id(id).unwrap().unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(repo.count_pending().unwrap(), 0);
        assert_eq!(repo.approve(999).unwrap(), 0);
    }

    #[test]
    fn test_delete_is_owner_scoped() {
        let repo = ContactRequestRepositoryImpl::new(test_pool());
        let id = repo
            .insert(&NewContactRequest {
                profile_id: 7,
                requester_email: "alice@example.com".to_string(),
                created_at: 1700000000,
            })
            .unwrap();

        assert_eq!(repo.delete_own(id, "mallory@example.com").unwrap(), 0);
        assert_eq!(repo.delete_own(id, "alice@example.com").unwrap(), 1);
        assert!(repo.get_by_id(id).unwrap().is_none());
    }
}
