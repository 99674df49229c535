// Library root: exposes the application modules to the binary and to
// integration tests.

pub mod config;
pub mod evidence;
pub mod import;
pub mod repository;
pub mod runner;
