//! This module aggregates various utility submodules used throughout the application.

/// Whole-document JSON persistence behind the `KeyValueStore` trait.
pub mod storage;

/// Serde helpers for reading stored timestamps.
pub mod timestamp;
