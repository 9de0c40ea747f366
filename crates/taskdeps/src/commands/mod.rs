//! Command implementations that work outside a loaded workspace.

pub mod init;
