use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

fn main() {
    dotenvy::dotenv().ok();

    let schema_sql = "
        CREATE TABLE users (id INTEGER PRIMARY KEY, email VARCHAR(100), name VARCHAR(100), photo_url TEXT DEFAULT '', role VARCHAR(20) DEFAULT 'normal', created_at INT DEFAULT 0);
        CREATE TABLE biodatas (profile_id INTEGER PRIMARY KEY, profile_type VARCHAR(10), name VARCHAR(100), profile_image TEXT DEFAULT '', date_of_birth VARCHAR(20) DEFAULT '', height VARCHAR(20) DEFAULT '', weight VARCHAR(20) DEFAULT '', age INT, occupation VARCHAR(50) DEFAULT '', race VARCHAR(30) DEFAULT '', fathers_name VARCHAR(100) DEFAULT '', mothers_name VARCHAR(100) DEFAULT '', expected_partner_age VARCHAR(20) DEFAULT '', division VARCHAR(30), contact_email VARCHAR(100), mobile_number VARCHAR(30) DEFAULT '');
        CREATE TABLE contact_requests (id INTEGER PRIMARY KEY, profile_id INT, requester_email VARCHAR(100), status VARCHAR(20) DEFAULT 'pending', created_at INT DEFAULT 0);
        CREATE TABLE favorites (id INTEGER PRIMARY KEY, owner_email VARCHAR(100), profile_id INT, created_at INT DEFAULT 0);
        CREATE TABLE stories (id INTEGER PRIMARY KEY, self_profile_id INT, partner_profile_id INT, couple_image TEXT DEFAULT '', marriage_date VARCHAR(20) DEFAULT '', review TEXT DEFAULT '');
    ";

    let db_path = std::env::var("MATRI_DB").expect("MATRI_DB env var not set");
    let parent = std::path::Path::new(&db_path)
        .parent()
        .expect("Failed to get parent directory of DB path");
    if !parent.exists() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory for DB");
        println!("Created parent directory for DB at {}", parent.display());
    }

    if std::path::Path::new(&db_path).exists() {
        std::fs::remove_file(&db_path).expect("Failed to remove existing DB");
        println!("Removed existing DB at {}", db_path);
    }

    let manager = SqliteConnectionManager::file(&db_path);
    let pool = Pool::builder()
        .max_size(5)
        .build(manager)
        .expect("Failed to create DB pool");
    let conn = pool.get().expect("Failed to get DB connection");
    conn.execute_batch(schema_sql)
        .expect("Failed to create tables");

    println!("Created new DB at {}", db_path);

    if let Ok(admin_email) = std::env::var("MATRI_ADMIN_EMAIL") {
        create_account(&conn, &admin_email, "Site Admin", "admin");
    }
}

fn create_account(conn: &rusqlite::Connection, email: &str, name: &str, role: &str) {
    let sql =
        "INSERT INTO users (email, name, photo_url, role, created_at) VALUES (?1, ?2, '', ?3, ?4)";
    conn.execute(
        sql,
        rusqlite::params![email, name, role, chrono::Utc::now().timestamp()],
    )
    .expect("Failed to create account");
    println!("Created {} account {}", role, email);
}
