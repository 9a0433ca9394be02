#![doc = "drive-upload-core: core logic library for drive-upload."]

//! This crate contains the storage-agnostic logic, data models and pipeline
//! for drive-upload. Google-specific client and CLI logic is not included here.
//! Begin new modules as submodules below.
//!
//! # Usage
//! Add this as a dependency for the archive, contract, config, and delivery code.

pub mod archive;
pub mod config;
pub mod contract;
pub mod deliver;
