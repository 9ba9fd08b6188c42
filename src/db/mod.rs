use crate::error::AppError;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub mod attempt;

refinery::embed_migrations!("migrations");

fn get_data_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| "C:\\Users\\User".to_string());
        PathBuf::from(home).join(".local\\share\\study-quiz")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/home/user".to_string());
        PathBuf::from(home).join(".local/share/study-quiz")
    }
}

pub fn default_db_path() -> PathBuf {
    get_data_dir().join("attempts.db")
}

pub fn init_db(db_path: &Path) -> Result<Connection, AppError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut conn = Connection::open(db_path)?;
    run_migrations(&mut conn)?;

    Ok(conn)
}

pub(crate) fn run_migrations(conn: &mut Connection) -> Result<(), AppError> {
    let report = migrations::runner().run(conn)?;
    for migration in report.applied_migrations() {
        tracing::info!("Applied migration {}", migration);
    }
    Ok(())
}
