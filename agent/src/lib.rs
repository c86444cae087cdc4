//! Dealflow: AI-assisted real estate deal analysis.
//!
//! ```text
//! DealParameters ─▶ prompts::build ─▶ GeminiClient::invoke ─▶ structured / extract ─▶ AnalysisResult
//!                                            │
//!                                            └─ TransportFailure ─▶ error::classify ─▶ AdvisorError
//! ```
//!
//! [`DealAdvisor`] is the entry point. The HTTP layer sits behind
//! [`analyzer::Transport`] so it can be swapped or faked.

pub mod advisor;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod types;

pub use advisor::{DealAdvisor, OutputFormat, Task};
pub use config::Config;
pub use error::{AdvisorError, Result};
pub use types::{
    AlternativeStructure, AnalysisResult, CashFlowEstimate, Complexity, DealParameters,
    FinancingOption, RiskLevel, RiskProfile,
};
