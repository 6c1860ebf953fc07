// crates/inspect/src/lib.rs

//! A small probe for container and process tests.
//!
//! Each flag turns on one step: print a message, print an environment
//! variable, write or read the file named by `$FILE`, check the working
//! directory. Steps run in a fixed order and the first failure ends the
//! process with exit code 1; otherwise it exits with `-exit-code`.

pub mod config;
pub mod dispatcher;
pub mod environment;
pub mod error;

pub use config::InspectConfig;
pub use dispatcher::run;
pub use environment::{Environment, ProcessEnvironment};
pub use error::InspectError;
