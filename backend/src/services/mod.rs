pub mod generation;
pub mod jobs;
pub mod recipients;
pub mod revision;
pub mod templates;
