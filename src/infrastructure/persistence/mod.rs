//! URL repository backends.
//!
//! - [`MemoryUrlRepository`] - process memory, lost on restart
//! - [`FileUrlRepository`] - memory plus a JSON snapshot file
//! - [`PgUrlRepository`] - PostgreSQL

pub mod file_url_repository;
pub mod memory_url_repository;
pub mod pg_url_repository;

pub use file_url_repository::FileUrlRepository;
pub use memory_url_repository::MemoryUrlRepository;
pub use pg_url_repository::PgUrlRepository;
