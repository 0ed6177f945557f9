//! Filesystem helpers

pub mod locking;

pub use locking::RepoLock;
