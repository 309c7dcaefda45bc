//! Data models for the referral pipeline.

pub mod config;
pub mod form;
