//! Command-line front end for the [`ehst_archive`] client.

pub mod cli;
