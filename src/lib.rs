//! A quiet, local-first journal: daily text entries, voice notes, a bookshelf and
//! time capsules, with a small server-side proxy to a generative-AI model.
//!
//! Every record lives in one SQLite-backed key-value namespace, told apart by key
//! prefix:
//!
//! | Prefix | Record | Key suffix |
//! |--------|--------|------------|
//! | `journal-` | Text entry | `YYYY-MM-DD` |
//! | `voice-` | Voice note | creation timestamp, `:`/`.` as `-` |
//! | `time-capsule-` | Time capsule | creation epoch millis |
//! | `book-` | Book | creation epoch millis |
//! | `folder-` | Book folder | creation epoch millis |
//!
//! # Architecture
//!
//! - **Storage**: SQLite via `rusqlite`, JSON values, forward-only migrations
//! - **AI**: the server holds the API key and exposes `POST /api/generate`; clients
//!   reach it through [`ai::client::ProxyClient`]
//! - **Sessions**: the journal editor debounces saves and summaries on cancellable
//!   timers; capture devices are held by an RAII session
//!
//! # Modules
//!
//! - [`config`]: configuration from TOML files and environment variables
//! - [`db`]: database initialization, schema, migrations, and health checks
//! - [`records`]: the tagged record model and key construction
//! - [`store`]: the entry store and device-local preferences
//! - [`journal`], [`voice`], [`capsule`], [`books`], [`dashboard`]: the views' logic
//! - [`ai`]: the generator trait, upstream model, proxy router, and client helpers
//! - [`capture`]: capture device abstraction
//! - [`app`]: top-level view and theme state
//! - [`server`]: the HTTP server

pub mod ai;
pub mod app;
pub mod books;
pub mod capsule;
pub mod capture;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod journal;
pub mod records;
pub mod server;
pub mod store;
pub mod voice;
