//! GM Command - dispatcher for single-line administrative command expressions
//!
//! A running process registers a [`HandlerSet`] of named methods; operators
//! send expressions like `Hello("true")` and get back a [`Response`] envelope.

pub mod command;
pub mod core;
pub mod demo;

pub use command::{Dispatcher, HandlerSet, Response};
pub use core::error::{CodedError, DispatchError, ErrorCode};
