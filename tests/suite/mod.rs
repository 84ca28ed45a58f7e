//! Integration test modules

mod analysis;
mod cli;
mod compile;
mod config;
mod strategy;
