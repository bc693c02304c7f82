// src/assistant/mod.rs
// AI learning assistant core.

pub mod advice;
pub mod context;
pub mod deepseek;
pub mod extractor;
pub mod prompt;
pub mod service;
pub mod store;
pub mod types;
