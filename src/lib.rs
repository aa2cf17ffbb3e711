//! Terminal administrative console for the library catalog master-data
//! API: six CRUD screens over one flag-discriminated POST protocol.

pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod resources;
pub mod screen;
pub mod tui;
