//! recipe-browser/crates/rc-core/src/lib.rs
//!
//! Domain models, port traits and the pure list pipeline for the recipe
//! browser. Plugins implement the traits; nothing in here does I/O.

pub mod catalog;
pub mod error;
pub mod favorites;
pub mod models;
pub mod query;
pub mod traits;

// Re-exporting for easier access in other crates
pub use catalog::*;
pub use error::*;
pub use favorites::*;
pub use models::*;
pub use query::*;
pub use traits::*;
