// src/lib.rs
// =============================================================================
// Module layout for the recursive retrieval core. `main.rs` is a thin CLI
// shell around this library; tests and future embedders use these modules
// directly.
// =============================================================================

pub mod admission;
pub mod audit;
pub mod candidate;
pub mod config;
pub mod context;
pub mod driver;
pub mod extract;
pub mod fetch;
pub mod queue;
pub mod redirect;
pub mod robots;
pub mod url;
pub mod visited;

pub use config::Config;
pub use context::RetrievalContext;
pub use driver::{Driver, FinalStatus};
pub use url::ParsedUrl;
