//! # nexus-llm
//!
//! Chat-model side of NEXUS-BIO:
//! - an OpenAI-compatible chat-completions client behind the [`ChatModel`] trait
//! - retry with delay, treating blank replies as failures
//! - prompt builders for table data, taxonomy, row rewrites and SQL
//! - repair of replies (code fences, chatter, labels) and of generated
//!   records (enum values, CPF, DOI, dates, amounts, foreign keys)
//! - population planning and row-count sizing from parent tables

pub mod cleanup;
pub mod client;
pub mod generate;
pub mod plan;
pub mod prompts;
pub mod retry;
pub mod sqlgen;
pub mod validate;

mod error;
mod http;

pub use client::{ChatClient, ChatModel};
pub use error::LlmError;
pub use plan::{PopulationPlan, PopulationTally};
pub use prompts::{ContextTable, FkAllowList, FkOption};
pub use retry::RetryPolicy;
pub use sqlgen::GeneratedSql;
