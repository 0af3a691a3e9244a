//! Command-line front end for the NOM-024 catalog and compliance engine.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
