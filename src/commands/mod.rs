pub mod auto;
pub mod common;
pub mod config;
pub mod create;
pub mod delete;
pub mod list;
pub mod load;
pub mod schedule;
pub mod uninstall;
