//! Data models for fragments, statements and configuration.

pub mod config;
pub mod fragment;
pub mod statement;
