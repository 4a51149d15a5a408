//! SQLite-based course store implementation.
//!
//! Uses SQLite with cosine distance computed in Rust for simplicity.
//! Equality filters are pushed down into the `WHERE` clause so only
//! candidate rows are decoded and scored.

use super::{
    cosine_distance, rank, CatalogEntry, CourseStore, Filter, FragmentRecord, RankedCourse,
    RankedFragment,
};
use crate::error::{Result, SyllabusError};
use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS courses (
        title TEXT PRIMARY KEY,
        instructor TEXT,
        course_link TEXT,
        lessons_json TEXT NOT NULL,
        lesson_count INTEGER NOT NULL,
        embedding BLOB NOT NULL
    );

    CREATE TABLE IF NOT EXISTS fragments (
        id TEXT PRIMARY KEY,
        content TEXT NOT NULL,
        course_title TEXT NOT NULL,
        lesson_number INTEGER,
        chunk_index INTEGER NOT NULL,
        embedding BLOB NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_fragments_course_title ON fragments(course_title);
    CREATE INDEX IF NOT EXISTS idx_fragments_lesson_number ON fragments(lesson_number);
"#;

const UPSERT_FRAGMENT: &str = r#"
    INSERT INTO fragments (id, content, course_title, lesson_number, chunk_index, embedding)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(id) DO UPDATE SET
        content = excluded.content,
        course_title = excluded.course_title,
        lesson_number = excluded.lesson_number,
        chunk_index = excluded.chunk_index,
        embedding = excluded.embedding
"#;

/// SQLite-based course store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite course store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SyllabusError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_catalog(row: &Row<'_>) -> rusqlite::Result<CatalogEntry> {
        let embedding_bytes: Vec<u8> = row.get(5)?;
        Ok(CatalogEntry {
            title: row.get(0)?,
            instructor: row.get(1)?,
            course_link: row.get(2)?,
            lessons_json: row.get(3)?,
            lesson_count: row.get(4)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
        })
    }

    fn row_to_fragment(row: &Row<'_>) -> rusqlite::Result<FragmentRecord> {
        let embedding_bytes: Vec<u8> = row.get(5)?;
        Ok(FragmentRecord {
            id: row.get(0)?,
            content: row.get(1)?,
            course_title: row.get(2)?,
            lesson_number: row.get(3)?,
            chunk_index: row.get(4)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
        })
    }
}

#[async_trait]
impl CourseStore for SqliteVectorStore {
    #[instrument(skip(self, entry), fields(title = %entry.title))]
    async fn upsert_course(&self, entry: &CatalogEntry) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO courses (title, instructor, course_link, lessons_json, lesson_count, embedding)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(title) DO UPDATE SET
                instructor = excluded.instructor,
                course_link = excluded.course_link,
                lessons_json = excluded.lessons_json,
                lesson_count = excluded.lesson_count,
                embedding = excluded.embedding
            "#,
            params![
                entry.title,
                entry.instructor,
                entry.course_link,
                entry.lessons_json,
                entry.lesson_count,
                Self::embedding_to_bytes(&entry.embedding),
            ],
        )?;

        debug!("Upserted course {}", entry.title);
        Ok(())
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn upsert_fragments(&self, records: &[FragmentRecord]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for record in records {
            tx.execute(
                UPSERT_FRAGMENT,
                params![
                    record.id,
                    record.content,
                    record.course_title,
                    record.lesson_number,
                    record.chunk_index,
                    Self::embedding_to_bytes(&record.embedding),
                ],
            )?;
        }

        tx.commit()?;
        debug!("Batch upserted {} fragments", records.len());
        Ok(records.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn nearest_courses(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<RankedCourse>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT title, instructor, course_link, lessons_json, lesson_count, embedding
             FROM courses ORDER BY rowid",
        )?;

        let entries = stmt
            .query_map([], Self::row_to_catalog)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let scored = entries
            .into_iter()
            .map(|e| {
                let distance = cosine_distance(query_embedding, &e.embedding);
                (e.title, distance)
            })
            .collect();

        Ok(rank(scored, limit)
            .into_iter()
            .map(|(title, distance)| RankedCourse { title, distance })
            .collect())
    }

    #[instrument(skip(self, query_embedding, filter))]
    async fn nearest_fragments(
        &self,
        query_embedding: &[f32],
        limit: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<RankedFragment>> {
        let mut sql = String::from(
            "SELECT id, content, course_title, lesson_number, chunk_index, embedding FROM fragments",
        );
        let mut values = Vec::new();
        if let Some(filter) = filter {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.to_sql(&mut values));
        }
        sql.push_str(" ORDER BY rowid");

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values), Self::row_to_fragment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let scored = records
            .into_iter()
            .map(|r| {
                let distance = cosine_distance(query_embedding, &r.embedding);
                (r, distance)
            })
            .collect();

        let results: Vec<RankedFragment> = rank(scored, limit)
            .into_iter()
            .map(|(record, distance)| RankedFragment { record, distance })
            .collect();

        debug!("Found {} matching fragments", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn get_course(&self, title: &str) -> Result<Option<CatalogEntry>> {
        let conn = self.lock()?;
        let result = conn.query_row(
            "SELECT title, instructor, course_link, lessons_json, lesson_count, embedding
             FROM courses WHERE title = ?1",
            params![title],
            Self::row_to_catalog,
        );

        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn course_titles(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT title FROM courses ORDER BY rowid")?;
        let titles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(titles)
    }

    async fn course_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn fragment_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM fragments", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch("DELETE FROM fragments; DELETE FROM courses;")?;
        info!("Cleared course store");
        Ok(())
    }
}
