//! CLI command implementations.

pub(crate) mod calendar;
pub(crate) mod download;
pub(crate) mod markets;
