//! # booktrack-core
//!
//! Core library for booktrack - a personal reading tracker.
//!
//! This library provides:
//! - Domain types for books and reading sessions
//! - Database storage layer with SQLite (CRUD, statistics, export)
//! - An in-process session timer with pause/resume
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Two independent components:
//! - **Library store** ([`Database`]): owns the books and reading_sessions
//!   tables, enforces cascade deletion, and derives aggregate statistics.
//! - **Session timer** ([`Timer`]): an in-memory stopwatch; its result is
//!   handed to the store explicitly when the caller records a session.
//!
//! ## Example
//!
//! ```rust,no_run
//! use booktrack_core::{Config, Database, PagesInput, Timer};
//!
//! let config = Config::load().expect("failed to load config");
//!
//! let db = Database::open(&config.database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let book_id = db
//!     .add_book("Dune", "Frank Herbert", PagesInput::Int(412), None)
//!     .expect("failed to add book");
//!
//! let mut timer = Timer::new();
//! timer.start().expect("timer should be idle");
//! // ... reading happens ...
//! let elapsed = timer.stop().expect("timer should be running");
//! db.add_reading_session(book_id, elapsed as i64, PagesInput::Absent, None)
//!     .expect("failed to record session");
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use timer::Timer;
pub use types::*;

// Public modules
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod timer;
pub mod types;
