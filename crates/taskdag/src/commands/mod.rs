//! Command implementations that work outside an initialized repository.

pub mod init;
