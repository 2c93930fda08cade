//! Destiny Quiz: a stepwise astrology and palm-reading questionnaire.

pub mod config;
pub mod error;
pub mod llm;
pub mod oracle;
pub mod quiz;
pub mod terminal;
