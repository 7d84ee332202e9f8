//! Saved Collections
//!
//! Records the user chose to keep, grouped by collection (`flashcard` or
//! `language`). Insertion order is display order and duplicates are kept.

use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::{CardFields, FlashcardRecord, Mode};
use crate::error::FlashResult;

pub struct CollectionStore {
    db_path: PathBuf,
}

impl CollectionStore {
    pub fn new(db_path: PathBuf) -> FlashResult<Self> {
        let store = Self { db_path };
        store.init_db()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> FlashResult<Connection> {
        Ok(Connection::open(&self.db_path)?)
    }

    fn init_db(&self) -> FlashResult<()> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = self.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                word TEXT,
                translation TEXT,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                added_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_records_collection ON records (collection, id)",
            [],
        )?;
        Ok(())
    }

    /// Append records to the collection for `mode`
    pub fn add(&self, mode: Mode, records: &[FlashcardRecord]) -> FlashResult<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let added_at = chrono::Utc::now().to_rfc3339();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (collection, word, translation, question, answer, added_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )?;
            for record in records {
                let fields = record.fields();
                stmt.execute(params![
                    mode.collection_key(),
                    fields.word,
                    fields.translation,
                    fields.question,
                    fields.answer,
                    added_at,
                ])?;
            }
        }
        tx.commit()?;

        info!(
            "💾 Saved {} record(s) to the {} collection",
            records.len(),
            mode.collection_key()
        );
        Ok(records.len())
    }

    /// Records in the collection for `mode`, oldest first
    pub fn list(&self, mode: Mode) -> FlashResult<Vec<FlashcardRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT word, translation, question, answer
             FROM records
             WHERE collection = ?
             ORDER BY id",
        )?;
        let rows = stmt.query_map([mode.collection_key()], |row| {
            Ok(CardFields {
                word: row.get(0)?,
                translation: row.get(1)?,
                question: row.get(2)?,
                answer: row.get(3)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(FlashcardRecord::from(row?));
        }
        debug!("Loaded {} {} record(s)", results.len(), mode.collection_key());
        Ok(results)
    }

    pub fn count(&self, mode: Mode) -> FlashResult<usize> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE collection = ?",
            [mode.collection_key()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Remove every record in the collection for `mode`
    pub fn clear(&self, mode: Mode) -> FlashResult<usize> {
        let conn = self.connect()?;
        let removed = conn.execute(
            "DELETE FROM records WHERE collection = ?",
            [mode.collection_key()],
        )?;
        info!(
            "🧹 Cleared {} record(s) from the {} collection",
            removed,
            mode.collection_key()
        );
        Ok(removed)
    }
}
