//! SQLite connection pooling and embedded migrations.
//!
//! The database is a single file, `~/.larder/larder.db` by default. Each
//! logical operation borrows a pooled connection, does its reads/writes, and
//! returns it; there is no cross-operation locking.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::path::PathBuf;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

diesel::define_sql_function! {
    /// SQLite's LOWER(), for case-insensitive name lookups.
    fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// Applied to every pooled connection. SQLite does not enforce foreign keys
/// unless asked, and concurrent writers need a busy timeout instead of an
/// immediate SQLITE_BUSY.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(r2d2::Error::QueryError)
    }
}

/// Default database location: `~/.larder/larder.db`, falling back to a
/// relative path when no home directory is available.
pub fn default_database_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".larder").join("larder.db"))
        .unwrap_or_else(|| PathBuf::from("larder.db"))
}

pub fn create_pool(database_url: &str) -> DbPool {
    if let Some(parent) = std::path::Path::new(database_url).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).expect("Failed to create database directory");
        }
    }

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .expect("Failed to create database pool");

    // Run pending migrations on startup
    let mut conn = pool
        .get()
        .expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");

    pool
}

/// Fresh in-memory database with all migrations applied. Test fixture; not
/// used by the server.
pub fn connect_in_memory() -> SqliteConnection {
    let mut conn =
        SqliteConnection::establish(":memory:").expect("Failed to open in-memory SQLite");
    conn.batch_execute("PRAGMA foreign_keys = ON")
        .expect("Failed to enable foreign keys");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");
    conn
}

/// Case-insensitive, whitespace-trimmed form of a name, used as the matching
/// key for ingredients, staples, and known prices.
pub fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_apply_cleanly() {
        let mut conn = connect_in_memory();
        // A trivial query against a late-migration table proves the chain ran.
        let count: i64 = crate::schema::known_prices::table
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn fold_name_trims_and_lowercases() {
        assert_eq!(fold_name("  Black Beans "), "black beans");
        assert_eq!(fold_name("black beans"), "black beans");
    }
}
