//! The two batch pipelines.
//!
//! Each pipeline runs `read → validate → fit → predict → post-process →
//! build document`. Reading the payload and emitting the document are left to
//! the caller so a pipeline can be driven from any source.

pub mod forecast;
pub mod regression;
