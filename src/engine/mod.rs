//! Request building, transport and description loading.

pub mod builder;
pub mod executor;
pub mod generator;
pub mod loader;

pub use builder::{build, ArgsBody, BodySource, Invocation, Request};
pub use executor::{execute, HttpTransport, RawResponse, Transport};
pub use generator::{bind_arguments, generate_command_tree};
