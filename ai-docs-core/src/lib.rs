#![doc = "ai-docs-core: core logic library for ai-docs."]

//! This crate holds the data model, staleness ledger, extraction, storage and
//! orchestration for keeping AI-readable package docs up to date.
//! The networked summarisation client and the CLI live in the `ai-docs` crate.
//!
//! # Usage
//! Build a [`synchronise::SynchroniseConfig`] and call [`synchronise::synchronise`]
//! with any [`contract::Summariser`] and [`contract::SignatureExtractor`].

pub mod config;
pub mod consolidate;
pub mod contract;
pub mod extract;
pub mod ledger;
pub mod manifest;
pub mod signatures;
pub mod store;
pub mod synchronise;
