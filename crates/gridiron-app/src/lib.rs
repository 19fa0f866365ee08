// Library root: re-exports the app modules so integration tests and the
// binary share one API.

pub mod config;
pub mod season;
