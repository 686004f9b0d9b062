//! Campus walking directions CLI library.
//!
//! Argument parsing helpers and output formatting shared by the
//! `campuswalk-cli` binary.

pub mod output;
