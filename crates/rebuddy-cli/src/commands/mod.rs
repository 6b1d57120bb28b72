//! Command handlers grouped by subcommand.

pub(crate) mod capture;
pub(crate) mod health;
pub(crate) mod labels;
pub(crate) mod upload;
