//! Lead scoring, classification, and fallback orchestration.
//!
//! The pipeline runs Normalizer -> Scorer -> Classifier -> optional AI
//! enrichment -> Composer over a single fetched record; see
//! [`service::AnalysisService`] for the orchestration and the resilience
//! contract.

pub mod ai;
pub mod classifier;
pub mod composer;
pub mod directory;
pub mod domain;
pub mod normalizer;
pub mod router;
pub mod scoring;
pub mod service;

pub use domain::{AnalysisResult, Category, ClientRecord, Priority, RiskLevel};
pub use service::{AnalysisError, AnalysisService};
