//! Host module for process execution and output relaying

pub mod command_runner;
pub mod relay;

pub use command_runner::{CommandError, CommandRunner, Invocation, InvocationResult};
pub use relay::relay;
