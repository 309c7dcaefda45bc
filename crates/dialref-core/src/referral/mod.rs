//! Referral form extraction module.

mod assembler;
pub mod rules;

pub use assembler::{AssemblyReport, FormAssembler, ReferralDocuments, Uploads};
