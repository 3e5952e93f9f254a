//! Pipeline stages for PDF transcription.
//!
//! Each submodule implements exactly one step. Only `ingest`, `poll` and
//! `request` touch the network, and only through
//! [`crate::service::DocumentService`].
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ ingest ──▶ poll ──▶ request
//! (path/blob) (upload)  (ACTIVE?)  (text)
//! ```
//!
//! 1. [`input`]   — validate a local PDF or persist an in-memory upload
//! 2. [`ingest`]  — upload once, log the resulting handle
//! 3. [`poll`]    — re-query the handle's state until it leaves PROCESSING
//! 4. [`request`] — single exchange seeded with the file; returns text verbatim

pub mod ingest;
pub mod input;
pub mod poll;
pub mod request;
