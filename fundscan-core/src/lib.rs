//! fundscan core — filtering engine for monthly fund disclosure files.
//!
//! This crate contains everything below the command line:
//! - Domain types (year-month periods, observations, presence records)
//! - The early-exit row scanner over `;`-delimited monthly files
//! - The presence cache (build, persist, load, per-month pre-filter)
//! - The dense date×fund quote matrix and its day-over-day companion
//! - Output writers and the run orchestrator

pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod matrix;
pub mod output;
pub mod runner;
pub mod scan;
