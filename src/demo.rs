//! Sample handler set used by the console and the integration tests

use crate::command::HandlerSet;
use crate::core::error::{BoxError, CodedError, ErrorCode};

/// Error code returned by `Kick` for a player that is not connected
pub const PLAYER_OFFLINE: ErrorCode = ErrorCode(101);

fn hello(fail: bool) -> Result<String, BoxError> {
    if fail {
        Err("hello gm tool error".into())
    } else {
        Ok("hello gm tool".to_string())
    }
}

fn kick(player: String) -> Result<String, CodedError> {
    if player.is_empty() || player == "nobody" {
        return Err(CodedError::new(
            PLAYER_OFFLINE,
            format!("player not online: {}", player),
        ));
    }
    Ok(format!("kicked {}", player))
}

/// Handlers available from `gm-console`
pub fn handlers() -> HandlerSet {
    HandlerSet::new()
        .method("Hello", hello)
        .method("Add", |a: isize, b: isize| a.wrapping_add(b))
        .method("Neg", |v: isize| v.wrapping_neg())
        .method("Echo", |text: String| text)
        .method("Scale", |value: f64, factor: f64| value * factor)
        .method("Ping", || ())
        .method("Kick", kick)
}
