//! Public registry lookups.
//!
//! Resolves dependency names against npm and PyPI and classifies
//! each answer. No retries and no caching: one request per lookup.

pub mod client;

pub use client::RegistryClient;
