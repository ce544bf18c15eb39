//! Command-line interface for Snipprok
//!
//! The `snipprok` binary stands in for the editor: it hands a snippet and
//! the editor's parameters to an export session and reports the outcome.

pub mod cli;
pub mod commands;
