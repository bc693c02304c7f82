// src/lib.rs

pub mod api;
pub mod assistant;
pub mod config;
pub mod db;
pub mod domain;
pub mod state;
