use chrono::{DateTime, Local};
use directories::ProjectDirs;
use rusqlite::{params, Connection, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One finished game, as persisted in the score history.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    pub recorded_at: DateTime<Local>,
}

/// Persistence seam for finished-game scores.
pub trait ScoreSink: Send + Sync {
    fn save_score(&self, name: &str, score: u32) -> Result<()>;
    /// Top `limit` entries, highest score first; ties keep arrival
    /// order.
    fn load_top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>>;
}

/// SQLite-backed score history.
#[derive(Debug)]
pub struct ScoreDb {
    conn: Mutex<Connection>,
}

impl ScoreDb {
    /// Opens the history database at the default per-user location,
    /// creating it (and its schema) if needed.
    pub fn open() -> Result<Self> {
        let db_path = Self::default_path().unwrap_or_else(|| PathBuf::from("startype_scores.db"));
        Self::open_path(db_path)
    }

    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }
        Self::init(Connection::open(path)?)
    }

    /// Throwaway history for tests and headless runs.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS scores (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                score INTEGER NOT NULL,
                recorded_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_scores_score ON scores(score)",
            [],
        )?;
        Ok(ScoreDb {
            conn: Mutex::new(conn),
        })
    }

    /// History database under $HOME/.local/state/startype.
    fn default_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("startype");
            Some(state_dir.join("scores.db"))
        } else {
            ProjectDirs::from("", "", "startype")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("scores.db"))
        }
    }

    /// Writes the full history (arrival order) as CSV.
    pub fn export_csv<W: Write>(&self, out: W) -> Result<(), Box<dyn std::error::Error>> {
        let entries = {
            let conn = self.conn.lock().unwrap();
            let mut stmt =
                conn.prepare("SELECT name, score, recorded_at FROM scores ORDER BY id ASC")?;
            let rows = stmt.query_map([], row_to_entry)?;
            rows.collect::<Result<Vec<_>, rusqlite::Error>>()?
        };

        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(["name", "score", "recorded_at"])?;
        for entry in entries {
            writer.write_record([
                entry.name.as_str(),
                &entry.score.to_string(),
                &entry.recorded_at.to_rfc3339(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn row_to_entry(row: &rusqlite::Row) -> Result<ScoreEntry> {
    let recorded_at: String = row.get(2)?;
    Ok(ScoreEntry {
        name: row.get(0)?,
        score: row.get(1)?,
        recorded_at: DateTime::parse_from_rfc3339(&recorded_at)
            .map(|dt| dt.with_timezone(&Local))
            .unwrap_or_else(|_| Local::now()),
    })
}

impl ScoreSink for ScoreDb {
    fn save_score(&self, name: &str, score: u32) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO scores (name, score, recorded_at) VALUES (?1, ?2, ?3)",
            params![name, score, Local::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn load_top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT name, score, recorded_at FROM scores
             ORDER BY score DESC, id ASC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], row_to_entry)?;
        rows.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_scores_are_descending_and_truncated() {
        let db = ScoreDb::open_in_memory().unwrap();
        for (name, score) in [("ann", 30), ("bo", 90), ("cy", 10), ("dee", 70), ("eli", 50)] {
            db.save_score(name, score).unwrap();
        }

        let top = db.load_top_scores(3).unwrap();
        assert_eq!(top.len(), 3);
        assert_eq!(
            top.iter().map(|e| e.score).collect::<Vec<_>>(),
            vec![90, 70, 50]
        );
        assert_eq!(top[0].name, "bo");
    }

    #[test]
    fn ties_keep_arrival_order() {
        let db = ScoreDb::open_in_memory().unwrap();
        db.save_score("first", 40).unwrap();
        db.save_score("second", 40).unwrap();
        db.save_score("third", 40).unwrap();

        let top = db.load_top_scores(10).unwrap();
        assert_eq!(
            top.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn limit_larger_than_history_returns_everything() {
        let db = ScoreDb::open_in_memory().unwrap();
        db.save_score("solo", 5).unwrap();

        let top = db.load_top_scores(10).unwrap();
        assert_eq!(top.len(), 1);
    }

    #[test]
    fn empty_history_loads_empty() {
        let db = ScoreDb::open_in_memory().unwrap();
        assert!(db.load_top_scores(3).unwrap().is_empty());
    }

    #[test]
    fn csv_export_has_header_and_rows() {
        let db = ScoreDb::open_in_memory().unwrap();
        db.save_score("ann", 30).unwrap();
        db.save_score("bo", 90).unwrap();

        let mut buf = Vec::new();
        db.export_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("name,score,recorded_at"));
        assert!(lines.next().unwrap().starts_with("ann,30,"));
        assert!(lines.next().unwrap().starts_with("bo,90,"));
    }
}
