// src/api/http/mod.rs

pub mod assistant;
pub mod router;
