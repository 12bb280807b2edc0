//! Command execution - dispatches parsed expressions to registered handlers

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use crate::command::coerce::coerce;
use crate::command::parser::CallExpr;
use crate::command::resolver::{HandlerSet, Return};
use crate::command::response::Response;
use crate::core::error::{BoxError, DispatchError};

/// Tracing target for per-command audit events
pub const AUDIT_TARGET: &str = "gm_command::audit";

/// Normalized result of a successful invocation
///
/// `Error` is still a successful dispatch: the handler ran and returned an
/// error value. The envelope decides how to present it.
#[derive(Debug)]
pub enum Outcome {
    Nil,
    Value(serde_json::Value),
    Error(BoxError),
}

impl From<Return> for Outcome {
    fn from(ret: Return) -> Self {
        match ret {
            Return::Empty => Outcome::Nil,
            Return::Value(value) => Outcome::Value(value),
            Return::Error(err) => Outcome::Error(err),
            Return::ValueOrError(_, Some(err)) => Outcome::Error(err),
            Return::ValueOrError(value, None) => Outcome::Value(value),
        }
    }
}

/// Owns the active handler set and runs commands against it
///
/// The set can be swapped at runtime; each dispatch works on the snapshot it
/// took when it started.
pub struct Dispatcher {
    handlers: RwLock<Arc<HandlerSet>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(HandlerSet::new())
    }
}

impl Dispatcher {
    pub fn new(handlers: HandlerSet) -> Self {
        Self {
            handlers: RwLock::new(Arc::new(handlers)),
        }
    }

    /// Replace the active handler set (last registration wins)
    pub fn register(&self, handlers: HandlerSet) {
        tracing::info!("Registered {} command handlers", handlers.len());
        let mut slot = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Arc::new(handlers);
    }

    /// Current handler set
    pub fn handlers(&self) -> Arc<HandlerSet> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolve, arity-check, coerce and invoke `name` with literal `tokens`
    ///
    /// Extra tokens beyond the declared parameters are ignored. Coercion stops
    /// at the first failing token and the handler is not called.
    pub fn dispatch(&self, name: &str, tokens: &[String]) -> Result<Outcome, DispatchError> {
        let handlers = self.handlers();
        let method = handlers.resolve(name).ok_or(DispatchError::NotFound)?;

        if method.arity() > tokens.len() {
            return Err(DispatchError::ParamNotEnough);
        }

        let args = method
            .params()
            .iter()
            .zip(tokens)
            .map(|(kind, token)| coerce(*kind, token))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(method.invoke(args)?.into())
    }

    /// Parse and dispatch one command, always producing an envelope
    ///
    /// Panics raised anywhere below (typically a faulty handler) are caught
    /// here and reported as a failure envelope.
    pub fn execute(&self, exp: &str) -> Response {
        let mut func = None;
        match panic::catch_unwind(AssertUnwindSafe(|| self.run(exp, &mut func))) {
            Ok(response) => response,
            Err(payload) => {
                let response = Response::from_fault(payload.as_ref());
                let func = func.as_deref().unwrap_or("");
                tracing::warn!(target: AUDIT_TARGET, exp, func, "Command panicked: {}", response.content);
                response
            }
        }
    }

    // `func` is filled in as soon as the name is known so a panic can still be attributed.
    fn run(&self, exp: &str, func: &mut Option<String>) -> Response {
        let expr = match CallExpr::parse(exp) {
            Ok(expr) => expr,
            Err(err) => {
                tracing::warn!(target: AUDIT_TARGET, exp, "Invalid command expression: {}", err);
                return Response::invalid_expression();
            }
        };
        *func = Some(expr.name.clone());

        match self.dispatch(&expr.name, &expr.args) {
            Ok(Outcome::Error(err)) => {
                tracing::warn!(target: AUDIT_TARGET, exp, func = %expr.name, "Handler returned error: {}", err);
                Response::from_outcome(Outcome::Error(err))
            }
            Ok(outcome) => {
                tracing::info!(target: AUDIT_TARGET, exp, func = %expr.name, "Command ok: {:?}", outcome);
                Response::from_outcome(outcome)
            }
            Err(err) => {
                tracing::warn!(target: AUDIT_TARGET, exp, func = %expr.name, "Dispatch failed: {}", err);
                Response::from_dispatch_error(err)
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.handlers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{CodedError, ErrorCode};
    use crate::core::types::ParamKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_dispatch_not_found() {
        let dispatcher = Dispatcher::default();
        let err = dispatcher.dispatch("Missing", &[]).unwrap_err();
        assert!(matches!(err, DispatchError::NotFound));
    }

    #[test]
    fn test_dispatch_arity() {
        let dispatcher = Dispatcher::new(HandlerSet::new().method("Add", |a: i64, b: i64| a + b));
        let err = dispatcher.dispatch("Add", &tokens(&["3"])).unwrap_err();
        assert!(matches!(err, DispatchError::ParamNotEnough));
    }

    #[test]
    fn test_extra_tokens_are_ignored() {
        let dispatcher = Dispatcher::new(HandlerSet::new().method("Neg", |v: i64| -v));
        let outcome = dispatcher.dispatch("Neg", &tokens(&["4", "junk", "x"])).unwrap();
        assert!(matches!(outcome, Outcome::Value(v) if v == serde_json::json!(-4)));
    }

    #[test]
    fn test_coercion_failure_skips_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let dispatcher = Dispatcher::new(HandlerSet::new().method("Add", move |a: i64, b: i64| {
            seen.fetch_add(1, Ordering::SeqCst);
            a + b
        }));

        let err = dispatcher.dispatch("Add", &tokens(&["3", "x"])).unwrap_err();
        assert_eq!(err.to_string(), "invalid int64 param: x");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_first_coercion_failure_is_reported() {
        let dispatcher = Dispatcher::new(HandlerSet::new().method("Pair", |_: u8, _: bool| ()));
        let err = dispatcher.dispatch("Pair", &tokens(&["300", "maybe"])).unwrap_err();
        assert_eq!(err.to_string(), "invalid uint8 param: 300");
    }

    #[test]
    fn test_return_normalization() {
        assert!(matches!(Outcome::from(Return::Empty), Outcome::Nil));
        assert!(matches!(
            Outcome::from(Return::ValueOrError(serde_json::json!(1), None)),
            Outcome::Value(_)
        ));
        assert!(matches!(
            Outcome::from(Return::ValueOrError(serde_json::json!(1), Some("bad".into()))),
            Outcome::Error(_)
        ));
        assert!(matches!(
            Outcome::from(Return::Error("single".into())),
            Outcome::Error(_)
        ));
    }

    #[test]
    fn test_unsupported_kind_fails_at_invocation() {
        let dispatcher = Dispatcher::new(HandlerSet::new().raw_method(
            "Teleport",
            vec![ParamKind::Unsupported("Position")],
            |_| Ok(Return::Empty),
        ));
        let resp = dispatcher.execute("Teleport(\"1,2\")");
        assert_eq!(resp, Response::cmsg_error("invalid kind param: 1,2"));
    }

    #[test]
    fn test_coded_handler_error_passes_through() {
        let dispatcher = Dispatcher::new(HandlerSet::new().method("Kick", |_: String| {
            Err::<(), _>(CodedError::new(ErrorCode(101), "player not online"))
        }));
        let resp = dispatcher.execute("Kick(\"bob\")");
        assert_eq!(resp, Response::error(ErrorCode(101), "player not online"));
    }

    #[test]
    fn test_panicking_handler_is_contained() {
        let dispatcher = Dispatcher::new(
            HandlerSet::new().method("Crash", || -> i32 { panic!("handler exploded") }),
        );
        let resp = dispatcher.execute("Crash()");
        assert_eq!(resp, Response::cmsg_error("handler exploded"));
    }

    #[test]
    fn test_panic_after_parse_keeps_func() {
        let dispatcher = Dispatcher::new(
            HandlerSet::new().method("Crash", |_: i32| -> i32 { panic!("boom") }),
        );
        let mut func = None;
        let caught = panic::catch_unwind(AssertUnwindSafe(|| dispatcher.run("Crash(1)", &mut func)));
        assert!(caught.is_err());
        assert_eq!(func.as_deref(), Some("Crash"));

        let mut func = None;
        let resp = dispatcher.run("Crash(", &mut func);
        assert_eq!(resp, Response::invalid_expression());
        assert_eq!(func, None);
    }

    #[test]
    fn test_register_replaces_set() {
        let dispatcher = Dispatcher::new(HandlerSet::new().method("Old", || 1));
        dispatcher.register(HandlerSet::new().method("New", || 2));

        assert_eq!(dispatcher.execute("Old()"), Response::cmsg_error("cmd not found"));
        assert_eq!(
            dispatcher.execute("New()"),
            Response::ok(Some(serde_json::json!(2)))
        );
    }

    #[test]
    fn test_snapshot_survives_swap() {
        let dispatcher = Dispatcher::new(HandlerSet::new().method("Old", || 1));
        let snapshot = dispatcher.handlers();
        dispatcher.register(HandlerSet::new());
        assert!(snapshot.resolve("Old").is_some());
        assert!(dispatcher.handlers().is_empty());
    }
}
