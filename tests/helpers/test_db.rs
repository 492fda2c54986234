use printdesk::infrastructure::persistence::Database;
use uuid::Uuid;

/// File-backed SQLite database with every migration applied. The file is
/// removed when the handle is dropped.
pub struct TestDb {
    pub db: Database,
    path: String,
}

impl TestDb {
    pub async fn new() -> Self {
        // Unique file per test so tests can run in parallel
        let path = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", path);

        let db = Database::connect(&db_url)
            .await
            .expect("Failed to connect to test database");
        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        Self { db, path }
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path, suffix));
        }
    }
}
