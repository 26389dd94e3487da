//! Prompt templates for LLM-based operations.

pub mod primary_area;

pub use primary_area::*;
