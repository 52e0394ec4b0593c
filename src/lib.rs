pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod history;
pub mod models;
pub mod prompt;
pub mod providers;
pub mod registry;
pub mod session;
pub mod shell;
pub mod tools;
