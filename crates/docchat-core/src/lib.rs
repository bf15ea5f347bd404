//! Configuration loading, client bootstrap, and the document chat facade.

pub mod bootstrap;
pub mod chat;
pub mod config;
pub mod prompt;
pub mod vault;

pub use chat::{DocumentChat, PromptContext};
pub use config::Config;
