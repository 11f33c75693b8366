//! CLI command handlers, one per file.

mod completions;
mod fetch;
mod url;

pub use completions::run_completions;
pub use fetch::run_fetch;
pub use url::run_url;
