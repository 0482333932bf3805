use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};

use crate::{
    account::{Account, NewAccount, Role},
    app::DatabaseError,
    persistence::{DatabaseResult, get_connection},
};

pub trait AccountRepository {
    fn get_by_email(&self, email: &str) -> DatabaseResult<Option<Account>>;
    fn insert(&self, account: &NewAccount) -> DatabaseResult<i64>;
    fn set_role(&self, email: &str, role: Role) -> DatabaseResult<usize>;
    fn list(&self, search: Option<&str>) -> DatabaseResult<Vec<Account>>;
    fn list_by_role(&self, role: Role, offset: usize, limit: usize) -> DatabaseResult<Vec<Account>>;
    fn count_by_role(&self, role: Role) -> DatabaseResult<usize>;
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Role::parse(text).ok_or(FromSqlError::InvalidType)
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

pub struct AccountRepositoryImpl {
    pool: Pool<SqliteConnectionManager>,
}

impl AccountRepositoryImpl {
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Self {
        Self { pool }
    }

    fn account_from_row(row: &rusqlite::Row) -> rusqlite::Result<Account> {
        Ok(Account {
            id: row.get("id")?,
            email: row.get("email")?,
            name: row.get("name")?,
            photo_url: row.get("photo_url")?,
            role: row.get("role")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl AccountRepository for AccountRepositoryImpl {
    fn get_by_email(&self, email: &str) -> DatabaseResult<Option<Account>> {
        let conn = get_connection(&self.pool)?;
        let account = conn.query_row(
            "SELECT * FROM users WHERE email = ?1",
            [email],
            Self::account_from_row,
        );
        match account {
            Ok(account) => Ok(Some(account)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryError(e)),
        }
    }

    fn insert(&self, account: &NewAccount) -> DatabaseResult<i64> {
        let conn = get_connection(&self.pool)?;
        conn.execute(
            "INSERT INTO users (email, name, photo_url, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                account.email,
                account.name,
                account.photo_url,
                account.role,
                account.created_at,
            ],
        )
        .map_err(|e| DatabaseError::QueryError(e))?;
        Ok(conn.last_insert_rowid())
    }

    fn set_role(&self, email: &str, role: Role) -> DatabaseResult<usize> {
        let conn = get_connection(&self.pool)?;
        conn.execute(
            "UPDATE users SET role = ?1 WHERE email = ?2",
            rusqlite::params![role, email],
        )
        .map_err(|e| DatabaseError::QueryError(e))
    }

    fn list(&self, search: Option<&str>) -> DatabaseResult<Vec<Account>> {
        let conn = get_connection(&self.pool)?;
        let (sql, params) = match search {
            Some(search) => (
                "SELECT * FROM users WHERE name LIKE ?1 OR email LIKE ?1",
                vec![format!("%{}%", search)],
            ),
            None => ("SELECT * FROM users", Vec::new()),
        };
        let mut stmt = conn.prepare(sql).map_err(|e| DatabaseError::QueryError(e))?;
        let rows = stmt
            .query_map(
                rusqlite::params_from_iter(params.iter()),
                Self::account_from_row,
            )
            .map_err(|e| DatabaseError::QueryError(e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DatabaseError::QueryError(e))
    }

    fn list_by_role(&self, role: Role, offset: usize, limit: usize) -> DatabaseResult<Vec<Account>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn
            .prepare("SELECT * FROM users WHERE role = ?1 LIMIT ?2 OFFSET ?3")
            .map_err(|e| DatabaseError::QueryError(e))?;
        let rows = stmt
            .query_map(
                rusqlite::params![role, limit as i64, offset as i64],
                Self::account_from_row,
            )
            .map_err(|e| DatabaseError::QueryError(e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DatabaseError::QueryError(e))
    }

    fn count_by_role(&self, role: Role) -> DatabaseResult<usize> {
        let conn = get_connection(&self.pool)?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE role = ?1",
                [role],
                |row| row.get(0),
            )
            .map_err(|e| DatabaseError::QueryError(e))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockAccountRepository {
    rows: std::sync::Arc<std::sync::Mutex<Vec<Account>>>,
}

#[cfg(test)]
impl MockAccountRepository {
    pub fn seed_premium(&self, email: &str) {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        rows.push(Account {
            id,
            email: email.to_string(),
            name: email.to_string(),
            photo_url: String::new(),
            role: Role::Premium,
            created_at: 0,
        });
    }
}

#[cfg(test)]
impl AccountRepository for MockAccountRepository {
    fn get_by_email(&self, email: &str) -> DatabaseResult<Option<Account>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|a| a.email == email).cloned())
    }

    fn insert(&self, account: &NewAccount) -> DatabaseResult<i64> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        rows.push(Account {
            id,
            email: account.email.clone(),
            name: account.name.clone(),
            photo_url: account.photo_url.clone(),
            role: account.role,
            created_at: account.created_at,
        });
        Ok(id)
    }

    fn set_role(&self, email: &str, role: Role) -> DatabaseResult<usize> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|a| a.email == email) {
            Some(account) => {
                account.role = role;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn list(&self, search: Option<&str>) -> DatabaseResult<Vec<Account>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|a| match search {
                Some(search) => a.name.contains(search) || a.email.contains(search),
                None => true,
            })
            .cloned()
            .collect())
    }

    fn list_by_role(&self, role: Role, offset: usize, limit: usize) -> DatabaseResult<Vec<Account>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|a| a.role == role)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn count_by_role(&self, role: Role) -> DatabaseResult<usize> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|a| a.role == role).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::test_pool;

    fn new_account(email: &str, name: &str, role: Role) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            name: name.to_string(),
            photo_url: String::new(),
            role,
            created_at: 1700000000,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let repo = AccountRepositoryImpl::new(test_pool());
        let id = repo
            .insert(&new_account("alice@example.com", "Alice", Role::Normal))
            .unwrap();
        assert!(id > 0);

        let account = repo.get_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(account.name, "Alice");
        assert_eq!(account.role, Role::Normal);
        assert!(repo.get_by_email("ghost@example.com").unwrap().is_none());
    }

    #[test]
    fn test_set_role_reports_matches() {
        let repo = AccountRepositoryImpl::new(test_pool());
        repo.insert(&new_account("alice@example.com", "Alice", Role::Normal))
            .unwrap();

        assert_eq!(
            repo.set_role("alice@example.com", Role::PremiumRequested)
                .unwrap(),
            1
        );
        assert_eq!(
            repo.get_by_email("alice@example.com").unwrap().unwrap().role,
            Role::PremiumRequested
        );
        assert_eq!(repo.set_role("ghost@example.com", Role::Premium).unwrap(), 0);
    }

    #[test]
    fn test_list_by_role_windows() {
        let repo = AccountRepositoryImpl::new(test_pool());
        for n in 0..5 {
            repo.insert(&new_account(
                &format!("premium{}@example.com", n),
                "Premium",
                Role::Premium,
            ))
            .unwrap();
        }
        repo.insert(&new_account("normal@example.com", "Normal", Role::Normal))
            .unwrap();

        let first = repo.list_by_role(Role::Premium, 0, 3).unwrap();
        assert_eq!(first.len(), 3);
        let rest = repo.list_by_role(Role::Premium, 3, 3).unwrap();
        assert_eq!(rest.len(), 2);
        assert_eq!(repo.count_by_role(Role::Premium).unwrap(), 5);
        assert_eq!(repo.count_by_role(Role::Admin).unwrap(), 0);
    }

    #[test]
    fn test_list_search() {
        let repo = AccountRepositoryImpl::new(test_pool());
        repo.insert(&new_account("alice@example.com", "Alice", Role::Normal))
            .unwrap();
        repo.insert(&new_account("bob@example.com", "Bob", Role::Normal))
            .unwrap();

        let found = repo.list(Some("alice")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "alice@example.com");
        assert_eq!(repo.list(None).unwrap().len(), 2);
    }
}
