//! Options controlling a front-end run.

pub mod config;
