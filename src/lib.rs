//! Runtime command-line client for HTTP APIs.
//!
//! An `OpenAPI` 3 description is compiled into [`model::Api`] operations,
//! each operation is exposed as a clap sub-command, bound arguments are built
//! into a [`engine::Request`], and hypermedia links in the decoded response
//! are discovered by [`links::LinkResolver`].

pub mod cache_control;
pub mod cli;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod links;
pub mod logging;
pub mod model;
pub mod param;
pub mod response;
pub mod spec;
pub mod utils;
