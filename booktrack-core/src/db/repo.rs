//! Database repository layer
//!
//! Provides query and insert operations for books and reading sessions.
//! Each public operation is a self-contained unit of work: lock the
//! connection, run the statement(s), release. No transaction spans calls.

use crate::error::{Error, Result};
use crate::types::*;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Days of history included in `Statistics::daily_stats`.
const DAILY_STATS_WINDOW_DAYS: i64 = 30;

/// Database handle wrapping a single SQLite connection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable cascade deletes and WAL mode
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // ============================================
    // Book operations
    // ============================================

    /// Add a book to the library, returning its new id.
    ///
    /// The book starts with status `"Active"`. `total_pages` goes through
    /// [`PagesInput::normalize`], so loosely-typed input never fails here —
    /// only an empty title or author does.
    pub fn add_book(
        &self,
        title: &str,
        author: &str,
        total_pages: PagesInput,
        cover_image_url: Option<&str>,
    ) -> Result<i64> {
        if title.trim().is_empty() {
            return Err(Error::Validation("book title must not be empty".into()));
        }
        if author.trim().is_empty() {
            return Err(Error::Validation("book author must not be empty".into()));
        }

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO books (title, author, total_pages, cover_image_url, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                title,
                author,
                total_pages.normalize(),
                cover_image_url,
                DEFAULT_BOOK_STATUS,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, title, "Added book");
        Ok(id)
    }

    /// Get all books, optionally filtered by exact status, newest first.
    pub fn get_books(&self, status: Option<&str>) -> Result<Vec<Book>> {
        let conn = self.conn.lock().unwrap();
        let mut books = Vec::new();

        match status {
            Some(status) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM books WHERE status = ? ORDER BY created_at DESC",
                )?;
                let rows = stmt.query_map([status], Self::row_to_book)?;
                for row in rows {
                    books.push(row?);
                }
            }
            None => {
                let mut stmt = conn.prepare("SELECT * FROM books ORDER BY created_at DESC")?;
                let rows = stmt.query_map([], Self::row_to_book)?;
                for row in rows {
                    books.push(row?);
                }
            }
        }

        Ok(books)
    }

    /// Get a book by id, or `None` if it doesn't exist.
    pub fn get_book(&self, id: i64) -> Result<Option<Book>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM books WHERE id = ?", [id], Self::row_to_book)
            .optional()
            .map_err(Error::from)
    }

    /// Apply a partial update to a book.
    ///
    /// Only supplied fields are written; an empty update returns `Ok(false)`
    /// without touching storage. Returns whether a row matched `id`.
    pub fn update_book(&self, id: i64, update: &BookUpdate) -> Result<bool> {
        if update.is_empty() {
            return Ok(false);
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(title) = &update.title {
            sets.push("title = ?");
            values.push(Box::new(title.clone()));
        }
        if let Some(author) = &update.author {
            sets.push("author = ?");
            values.push(Box::new(author.clone()));
        }
        if let Some(pages) = &update.total_pages {
            sets.push("total_pages = ?");
            values.push(Box::new(pages.normalize()));
        }
        if let Some(url) = &update.cover_image_url {
            sets.push("cover_image_url = ?");
            values.push(Box::new(url.clone()));
        }
        if let Some(status) = &update.status {
            sets.push("status = ?");
            values.push(Box::new(status.clone()));
        }
        values.push(Box::new(id));

        let sql = format!("UPDATE books SET {} WHERE id = ?", sets.join(", "));

        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            &sql,
            rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())),
        )?;
        tracing::debug!(id, changed, "Updated book");
        Ok(changed > 0)
    }

    /// Delete a book and all its reading sessions.
    ///
    /// Both deletes run in one transaction, so there is never a state where
    /// the book is gone but its sessions remain. Returns whether a book was
    /// actually removed.
    pub fn delete_book(&self, id: i64) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM reading_sessions WHERE book_id = ?", [id])?;
        let deleted = tx.execute("DELETE FROM books WHERE id = ?", [id])?;
        tx.commit()?;
        tracing::debug!(id, deleted = deleted > 0, "Deleted book");
        Ok(deleted > 0)
    }

    // ============================================
    // ReadingSession operations
    // ============================================

    /// Record a reading session for a book, returning its new id.
    ///
    /// `book_id` is not checked against live books here; the caller owns
    /// that. Negative durations are rejected; `pages_read` is normalized
    /// like `total_pages`.
    pub fn add_reading_session(
        &self,
        book_id: i64,
        duration_seconds: i64,
        pages_read: PagesInput,
        notes: Option<&str>,
    ) -> Result<i64> {
        if duration_seconds < 0 {
            return Err(Error::Validation(format!(
                "duration_seconds must be non-negative, got {}",
                duration_seconds
            )));
        }

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO reading_sessions (book_id, duration_seconds, pages_read, notes, session_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                book_id,
                duration_seconds,
                pages_read.normalize(),
                notes,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, book_id, duration_seconds, "Added reading session");
        Ok(id)
    }

    /// Get reading sessions with book context, optionally filtered to one
    /// book, newest first.
    pub fn get_reading_sessions(&self, book_id: Option<i64>) -> Result<Vec<SessionView>> {
        const BASE: &str = r#"
            SELECT rs.id AS id, rs.book_id AS book_id,
                   rs.duration_seconds AS duration_seconds,
                   rs.pages_read AS pages_read, rs.notes AS notes,
                   rs.session_date AS session_date,
                   b.title AS book_title, b.author AS book_author
            FROM reading_sessions rs
            JOIN books b ON rs.book_id = b.id
        "#;

        let conn = self.conn.lock().unwrap();
        let mut sessions = Vec::new();

        match book_id {
            Some(book_id) => {
                let sql = format!("{BASE} WHERE rs.book_id = ? ORDER BY rs.session_date DESC");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([book_id], Self::row_to_session_view)?;
                for row in rows {
                    sessions.push(row?);
                }
            }
            None => {
                let sql = format!("{BASE} ORDER BY rs.session_date DESC");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], Self::row_to_session_view)?;
                for row in rows {
                    sessions.push(row?);
                }
            }
        }

        Ok(sessions)
    }

    // ============================================
    // Statistics and export
    // ============================================

    /// Compute aggregate reading statistics.
    pub fn get_statistics(&self) -> Result<Statistics> {
        let conn = self.conn.lock().unwrap();

        let total_reading_time_seconds: i64 = conn.query_row(
            "SELECT COALESCE(SUM(duration_seconds), 0) FROM reading_sessions",
            [],
            |r| r.get(0),
        )?;
        let total_sessions: i64 =
            conn.query_row("SELECT COUNT(*) FROM reading_sessions", [], |r| r.get(0))?;
        let total_books: i64 = conn.query_row("SELECT COUNT(*) FROM books", [], |r| r.get(0))?;

        let mut books_by_status = HashMap::new();
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM books GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (status, count) = row?;
            books_by_status.insert(status, count);
        }

        // Cutoff computed here rather than with datetime('now'): stored
        // timestamps are RFC 3339 text, so both sides of the comparison
        // must use the same format.
        let cutoff = (Utc::now() - Duration::days(DAILY_STATS_WINDOW_DAYS)).to_rfc3339();
        let mut stmt = conn.prepare(
            r#"
            SELECT DATE(session_date) AS day, SUM(duration_seconds) AS total_seconds
            FROM reading_sessions
            WHERE session_date >= ?1
            GROUP BY day
            ORDER BY day DESC
            "#,
        )?;
        let rows = stmt.query_map([cutoff], |row| {
            Ok(DailyReading {
                date: row.get(0)?,
                total_seconds: row.get(1)?,
            })
        })?;
        let mut daily_stats = Vec::new();
        for row in rows {
            daily_stats.push(row?);
        }

        Ok(Statistics {
            total_reading_time_seconds,
            total_sessions,
            total_books,
            books_by_status,
            daily_stats,
        })
    }

    /// Assemble a point-in-time export of all books, sessions, and
    /// statistics.
    pub fn export_data(&self) -> Result<Snapshot> {
        let books = self.get_books(None)?;
        let reading_sessions = self.get_reading_sessions(None)?;
        let statistics = self.get_statistics()?;

        tracing::info!(
            books = books.len(),
            sessions = reading_sessions.len(),
            "Exporting library snapshot"
        );

        Ok(Snapshot {
            export_date: Utc::now(),
            books,
            reading_sessions,
            statistics,
        })
    }

    // ============================================
    // Row mapping
    // ============================================

    fn row_to_book(row: &Row) -> rusqlite::Result<Book> {
        let created_at_str: String = row.get("created_at")?;

        Ok(Book {
            id: row.get("id")?,
            title: row.get("title")?,
            author: row.get("author")?,
            total_pages: row.get("total_pages")?,
            cover_image_url: row.get("cover_image_url")?,
            status: row.get("status")?,
            created_at: parse_timestamp(&created_at_str),
        })
    }

    fn row_to_session_view(row: &Row) -> rusqlite::Result<SessionView> {
        let session_date_str: String = row.get("session_date")?;

        Ok(SessionView {
            session: ReadingSession {
                id: row.get("id")?,
                book_id: row.get("book_id")?,
                duration_seconds: row.get("duration_seconds")?,
                pages_read: row.get("pages_read")?,
                notes: row.get("notes")?,
                session_date: parse_timestamp(&session_date_str),
            },
            book_title: row.get("book_title")?,
            book_author: row.get("book_author")?,
        })
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn test_add_and_get_book() {
        let db = test_db();
        let id = db
            .add_book("Dune", "Frank Herbert", PagesInput::Int(412), None)
            .unwrap();
        assert!(id > 0);

        let book = db.get_book(id).unwrap().expect("book should exist");
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Frank Herbert");
        assert_eq!(book.total_pages, Some(412));
        assert_eq!(book.status, DEFAULT_BOOK_STATUS);
    }

    #[test]
    fn test_add_book_rejects_empty_fields() {
        let db = test_db();
        assert!(matches!(
            db.add_book("", "Author", PagesInput::Absent, None),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            db.add_book("Title", "   ", PagesInput::Absent, None),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_add_book_normalizes_pages() {
        let db = test_db();
        let id = db
            .add_book("A", "B", PagesInput::Text("200".into()), None)
            .unwrap();
        assert_eq!(db.get_book(id).unwrap().unwrap().total_pages, Some(200));

        let id = db
            .add_book("C", "D", PagesInput::Text("garbage".into()), None)
            .unwrap();
        assert_eq!(db.get_book(id).unwrap().unwrap().total_pages, None);

        let id = db.add_book("E", "F", PagesInput::Float(199.7), None).unwrap();
        assert_eq!(db.get_book(id).unwrap().unwrap().total_pages, Some(199));
    }

    #[test]
    fn test_get_book_missing_is_none() {
        let db = test_db();
        assert!(db.get_book(9999).unwrap().is_none());
    }

    #[test]
    fn test_get_books_filters_by_status() {
        let db = test_db();
        let id1 = db.add_book("One", "A", PagesInput::Absent, None).unwrap();
        db.add_book("Two", "B", PagesInput::Absent, None).unwrap();

        db.update_book(
            id1,
            &BookUpdate {
                status: Some("Read".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(db.get_books(None).unwrap().len(), 2);
        let read = db.get_books(Some("Read")).unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].title, "One");
        assert_eq!(db.get_books(Some("Active")).unwrap().len(), 1);
    }

    #[test]
    fn test_update_book_partial() {
        let db = test_db();
        let id = db
            .add_book("Original", "Author", PagesInput::Int(100), None)
            .unwrap();

        let matched = db
            .update_book(
                id,
                &BookUpdate {
                    title: Some("Updated".to_string()),
                    status: Some("Read".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(matched);

        let book = db.get_book(id).unwrap().unwrap();
        assert_eq!(book.title, "Updated");
        assert_eq!(book.status, "Read");
        // Untouched fields survive
        assert_eq!(book.author, "Author");
        assert_eq!(book.total_pages, Some(100));
    }

    #[test]
    fn test_update_book_empty_is_noop() {
        let db = test_db();
        let id = db.add_book("T", "A", PagesInput::Absent, None).unwrap();
        assert!(!db.update_book(id, &BookUpdate::default()).unwrap());
    }

    #[test]
    fn test_update_book_missing_id() {
        let db = test_db();
        let matched = db
            .update_book(
                424242,
                &BookUpdate {
                    title: Some("Ghost".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!matched);
    }

    #[test]
    fn test_update_book_renormalizes_pages() {
        let db = test_db();
        let id = db.add_book("T", "A", PagesInput::Int(100), None).unwrap();

        db.update_book(
            id,
            &BookUpdate {
                total_pages: Some(PagesInput::Text("200".into())),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(db.get_book(id).unwrap().unwrap().total_pages, Some(200));

        // Empty-string sentinel clears the value
        db.update_book(
            id,
            &BookUpdate {
                total_pages: Some(PagesInput::Text("".into())),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(db.get_book(id).unwrap().unwrap().total_pages, None);
    }

    #[test]
    fn test_delete_book_cascades() {
        let db = test_db();
        let id = db.add_book("Doomed", "A", PagesInput::Absent, None).unwrap();
        db.add_reading_session(id, 1800, PagesInput::Absent, None)
            .unwrap();
        db.add_reading_session(id, 600, PagesInput::Absent, None)
            .unwrap();

        assert!(db.delete_book(id).unwrap());
        assert!(db.get_book(id).unwrap().is_none());
        assert!(db.get_reading_sessions(Some(id)).unwrap().is_empty());
        assert!(db.get_reading_sessions(None).unwrap().is_empty());

        // Second delete finds nothing
        assert!(!db.delete_book(id).unwrap());
    }

    #[test]
    fn test_book_ids_not_reused_after_delete() {
        let db = test_db();
        let id1 = db.add_book("First", "A", PagesInput::Absent, None).unwrap();
        db.delete_book(id1).unwrap();
        let id2 = db.add_book("Second", "B", PagesInput::Absent, None).unwrap();
        assert!(id2 > id1);
    }

    #[test]
    fn test_add_session_rejects_negative_duration() {
        let db = test_db();
        let id = db.add_book("T", "A", PagesInput::Absent, None).unwrap();
        assert!(matches!(
            db.add_reading_session(id, -1, PagesInput::Absent, None),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_get_reading_sessions_includes_book_context() {
        let db = test_db();
        let id = db
            .add_book("Dune", "Frank Herbert", PagesInput::Absent, None)
            .unwrap();
        db.add_reading_session(id, 1800, PagesInput::Int(25), Some("good pace"))
            .unwrap();

        let sessions = db.get_reading_sessions(Some(id)).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].book_title, "Dune");
        assert_eq!(sessions[0].book_author, "Frank Herbert");
        assert_eq!(sessions[0].session.duration_seconds, 1800);
        assert_eq!(sessions[0].session.pages_read, Some(25));
        assert_eq!(sessions[0].session.notes.as_deref(), Some("good pace"));
    }

    #[test]
    fn test_statistics_empty_store() {
        let db = test_db();
        let stats = db.get_statistics().unwrap();
        assert_eq!(stats.total_reading_time_seconds, 0);
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.total_books, 0);
        assert!(stats.books_by_status.is_empty());
        assert!(stats.daily_stats.is_empty());
    }

    #[test]
    fn test_statistics_aggregates() {
        let db = test_db();
        let id = db
            .add_book("Dune", "Herbert", PagesInput::Int(412), None)
            .unwrap();
        db.add_reading_session(id, 1800, PagesInput::Absent, None)
            .unwrap();
        db.add_reading_session(id, 2400, PagesInput::Absent, None)
            .unwrap();

        let stats = db.get_statistics().unwrap();
        assert_eq!(stats.total_reading_time_seconds, 4200);
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_books, 1);
        assert_eq!(stats.books_by_status.get("Active"), Some(&1));

        // Both sessions land on today's bucket
        assert_eq!(stats.daily_stats.len(), 1);
        assert_eq!(stats.daily_stats[0].total_seconds, 4200);
    }
}
