//! Discovery and retrieval of numbered image sequences from a CDN origin.
//!
//! The remote file list is unknown; only the naming convention is:
//! `{base}/{prefix}-{paddedIndex}{ext}[?token]`. The [`engine`] walks indices
//! upward, probing each candidate extension, converts whatever it finds to
//! one canonical format, and stops after a streak of missing indices.

pub mod config;
pub mod logging;

pub mod control;
pub mod convert;
pub mod engine;
pub mod http;
pub mod request;
pub mod retry;
pub mod storage;
pub mod url_model;
