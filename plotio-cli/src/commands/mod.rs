//! Subcommand implementations.

pub mod convert;
pub mod info;
pub mod neutral2xml;
