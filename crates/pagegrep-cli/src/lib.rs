//! pagegrep command-line front end: configuration, commands and exit codes.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
