use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::app::DatabaseError;

pub mod accounts;
pub mod contact_requests;
pub mod favorites;
pub mod profiles;
pub mod stories;

pub type DatabaseResult<T> = Result<T, DatabaseError>;

pub fn get_connection(
    pool: &Pool<SqliteConnectionManager>,
) -> DatabaseResult<PooledConnection<SqliteConnectionManager>> {
    pool.get().map_err(|e| DatabaseError::ConnectionError(e))
}

#[cfg(test)]
pub fn test_pool() -> Pool<SqliteConnectionManager> {
    let schema_sql = "
        CREATE TABLE users (id INTEGER PRIMARY KEY, email VARCHAR(100), name VARCHAR(100), photo_url TEXT DEFAULT '', role VARCHAR(20) DEFAULT 'normal', created_at INT DEFAULT 0);
        CREATE TABLE biodatas (profile_id INTEGER PRIMARY KEY, profile_type VARCHAR(10), name VARCHAR(100), profile_image TEXT DEFAULT '', date_of_birth VARCHAR(20) DEFAULT '', height VARCHAR(20) DEFAULT '', weight VARCHAR(20) DEFAULT '', age INT, occupation VARCHAR(50) DEFAULT '', race VARCHAR(30) DEFAULT '', fathers_name VARCHAR(100) DEFAULT '', mothers_name VARCHAR(100) DEFAULT '', expected_partner_age VARCHAR(20) DEFAULT '', division VARCHAR(30), contact_email VARCHAR(100), mobile_number VARCHAR(30) DEFAULT '');
        CREATE TABLE contact_requests (id INTEGER PRIMARY KEY, profile_id INT, requester_email VARCHAR(100), status VARCHAR(20) DEFAULT 'pending', created_at INT DEFAULT 0);
        CREATE TABLE favorites (id INTEGER PRIMARY KEY, owner_email VARCHAR(100), profile_id INT, created_at INT DEFAULT 0);
        CREATE TABLE stories (id INTEGER PRIMARY KEY, self_profile_id INT, partner_profile_id INT, couple_image TEXT DEFAULT '', marriage_date VARCHAR(20) DEFAULT '', review TEXT DEFAULT '');
    ";

    // One connection only, so every query in a test sees the same in-memory
    // database.
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .expect("Failed to create test DB pool");
    let conn = pool.get().expect("Failed to get test DB connection");
    conn.execute_batch(schema_sql)
        .expect("Failed to create test schema");
    drop(conn);
    pool
}
