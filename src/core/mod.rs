//! Core module - curation engine
//!
//! Contains the data structures and algorithms for kura.

pub mod community;
pub mod convergence;
pub mod decision;
pub mod edge;
pub mod error;
pub mod graph;
pub mod item;
pub mod policy;
pub mod providers;
pub mod report;
pub mod session;
pub mod storage;
pub mod triad;
