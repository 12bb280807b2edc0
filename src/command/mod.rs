//! Command execution pipeline
//!
//! Converts a call-expression string into a response envelope:
//! text -> CallExpr -> HandlerSet lookup -> coerce -> invoke -> Outcome -> Response

pub mod coerce;
pub mod executor;
pub mod parser;
pub mod resolver;
pub mod response;

pub use coerce::coerce;
pub use executor::{Dispatcher, Outcome};
pub use parser::{parse_call, CallExpr};
pub use resolver::{HandlerSet, IntoMethod, IntoReturn, Method, Param, Return};
pub use response::Response;
