// rmcp's #[tool] macros generate code that calls these functions,
// but rustc/clippy can't trace through the macro-generated dispatching.
#![allow(dead_code)]

pub mod config;
pub mod driver;
pub mod error;
pub mod interaction;
pub mod locator;
pub mod report;
pub mod server;
pub mod tools;
