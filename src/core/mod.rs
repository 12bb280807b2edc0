pub mod config;
pub mod error;
pub mod types;

pub use config::ConsoleConfig;
pub use error::{BoxError, CodedError, DispatchError, ErrorCode, SyntaxError};
pub use types::{Arg, ParamKind};
