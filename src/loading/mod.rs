//! Destination-side operations: sessions, identifier quoting and the transactional loader.

pub mod identifier;
pub mod loader;
pub mod session;

pub use loader::{LoadReport, LoadState, LoadStatements, load_table, load_table_with};
pub use session::{Session, connect};
