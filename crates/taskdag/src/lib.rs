//! taskdag - task tracking on a cycle-free dependency graph.
//!
//! Tasks are nodes and "depends on" relations are edges. Every mutation keeps
//! the graph acyclic, and status changes propagate to dependents in
//! dependency order. The crate provides both a CLI application and a
//! library with in-memory and JSONL-backed storage.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod error;
pub mod graph;
pub mod id_generation;
pub mod storage;

// Public CLI module (needed by binary)
pub mod app;
pub mod cli;

// Command implementations
pub mod commands;

pub mod output;
