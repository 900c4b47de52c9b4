//! Core domain types for booktrack
//!
//! These types represent the persisted data model (books and reading
//! sessions) plus the derived views the store hands back to callers.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Book** | A library entry with title, author, optional page count, status |
//! | **ReadingSession** | A timed interval of reading linked to one Book |
//! | **SessionView** | A ReadingSession joined with its Book's title/author |
//! | **Statistics** | Aggregates derived from the live store (regenerable) |
//! | **Snapshot** | A point-in-time export of all books, sessions, and statistics |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Status assigned to a book at creation.
pub const DEFAULT_BOOK_STATUS: &str = "Active";

// ============================================
// Book
// ============================================

/// A book in the library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    /// Rowid assigned by the store on insert; never reused
    pub id: i64,
    /// Book title (required, non-empty)
    pub title: String,
    /// Book author (required, non-empty)
    pub author: String,
    /// Total page count, if known
    pub total_pages: Option<i64>,
    /// Cover image location, if any
    pub cover_image_url: Option<String>,
    /// Free-form status text ("Active", "Read", ...)
    pub status: String,
    /// When the book was added; immutable after insert
    pub created_at: DateTime<Utc>,
}

/// Partial update for a book.
///
/// `None` means "leave the column alone"; `Some` means "write this value".
/// An update with every field `None` is a no-op and never touches storage.
#[derive(Debug, Clone, Default)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    /// Re-normalized through [`PagesInput::normalize`] before writing
    pub total_pages: Option<PagesInput>,
    pub cover_image_url: Option<String>,
    pub status: Option<String>,
}

impl BookUpdate {
    /// True if no field is supplied.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.total_pages.is_none()
            && self.cover_image_url.is_none()
            && self.status.is_none()
    }
}

// ============================================
// ReadingSession
// ============================================

/// A recorded reading session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingSession {
    /// Rowid assigned by the store on insert
    pub id: i64,
    /// Owning book; sessions are cascade-deleted with their book
    pub book_id: i64,
    /// How long the session lasted (non-negative)
    pub duration_seconds: i64,
    /// Pages read during the session, if tracked
    pub pages_read: Option<i64>,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the session was recorded
    pub session_date: DateTime<Utc>,
}

/// A reading session enriched with its book's title and author.
///
/// Returned by session list queries so callers don't need an N+1 lookup
/// per row to label the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    /// The session record
    #[serde(flatten)]
    pub session: ReadingSession,
    /// Owning book's title
    pub book_title: String,
    /// Owning book's author
    pub book_author: String,
}

// ============================================
// Numeric normalization
// ============================================

/// Loosely-typed page-count input.
///
/// Upstream layers hand page counts over as whatever their widgets produced:
/// an integer, a decimal, a text field's contents, or nothing at all. This
/// enum is the closed set of accepted encodings; [`normalize`] converts each
/// deterministically and never fails — anything unparseable, empty, or
/// negative is downgraded to absent.
///
/// [`normalize`]: PagesInput::normalize
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PagesInput {
    /// Already an integer
    Int(i64),
    /// Decimal-typed input; truncated toward zero
    Float(f64),
    /// Text field contents; trimmed, then parsed as an integer
    Text(String),
    /// No value supplied
    #[default]
    Absent,
}

impl PagesInput {
    /// Convert to a stored page count, or absent.
    pub fn normalize(&self) -> Option<i64> {
        let value = match self {
            PagesInput::Int(n) => Some(*n),
            PagesInput::Float(f) if f.is_finite() => Some(*f as i64),
            PagesInput::Float(_) => None,
            PagesInput::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    trimmed.parse::<i64>().ok()
                }
            }
            PagesInput::Absent => None,
        };
        value.filter(|n| *n >= 0)
    }
}

impl From<i64> for PagesInput {
    fn from(n: i64) -> Self {
        PagesInput::Int(n)
    }
}

impl From<f64> for PagesInput {
    fn from(f: f64) -> Self {
        PagesInput::Float(f)
    }
}

impl From<&str> for PagesInput {
    fn from(s: &str) -> Self {
        PagesInput::Text(s.to_string())
    }
}

impl From<String> for PagesInput {
    fn from(s: String) -> Self {
        PagesInput::Text(s)
    }
}

impl From<Option<i64>> for PagesInput {
    fn from(n: Option<i64>) -> Self {
        match n {
            Some(n) => PagesInput::Int(n),
            None => PagesInput::Absent,
        }
    }
}

// ============================================
// Statistics and export
// ============================================

/// Reading time accumulated on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReading {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Sum of session durations on that date
    pub total_seconds: i64,
}

/// Aggregate reading statistics, computed from the live store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statistics {
    /// Sum of all sessions' durations; 0 with no sessions
    pub total_reading_time_seconds: i64,
    /// Total session count
    pub total_sessions: i64,
    /// Total book count
    pub total_books: i64,
    /// Book count per status value
    pub books_by_status: HashMap<String, i64>,
    /// Per-day reading time for the trailing 30 days, newest first
    pub daily_stats: Vec<DailyReading>,
}

/// Point-in-time export of the whole store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the export was assembled
    pub export_date: DateTime<Utc>,
    /// All books, newest first
    pub books: Vec<Book>,
    /// All sessions with book context, newest first
    pub reading_sessions: Vec<SessionView>,
    /// Statistics at export time
    pub statistics: Statistics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_int() {
        assert_eq!(PagesInput::Int(300).normalize(), Some(300));
        assert_eq!(PagesInput::Int(0).normalize(), Some(0));
    }

    #[test]
    fn test_normalize_float_truncates() {
        assert_eq!(PagesInput::Float(200.9).normalize(), Some(200));
        assert_eq!(PagesInput::Float(f64::NAN).normalize(), None);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(PagesInput::Text("200".into()).normalize(), Some(200));
        assert_eq!(PagesInput::Text(" 412 ".into()).normalize(), Some(412));
        assert_eq!(PagesInput::Text("".into()).normalize(), None);
        assert_eq!(PagesInput::Text("  ".into()).normalize(), None);
        assert_eq!(PagesInput::Text("lots".into()).normalize(), None);
        assert_eq!(PagesInput::Text("200.5".into()).normalize(), None);
    }

    #[test]
    fn test_normalize_negative_is_absent() {
        assert_eq!(PagesInput::Int(-5).normalize(), None);
        assert_eq!(PagesInput::Text("-5".into()).normalize(), None);
    }

    #[test]
    fn test_normalize_absent() {
        assert_eq!(PagesInput::Absent.normalize(), None);
        assert_eq!(PagesInput::from(None).normalize(), None);
    }

    #[test]
    fn test_book_update_is_empty() {
        assert!(BookUpdate::default().is_empty());
        let update = BookUpdate {
            status: Some("Read".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
