//! HTTP client adapter for the `GenerationSubmitter` port.

mod dto;
mod http_submitter;

pub use http_submitter::{ClientBuildError, HttpGenerationSubmitter};
