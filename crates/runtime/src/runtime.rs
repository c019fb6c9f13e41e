//! Managed computation runtime
//!
//! Wraps every effectful computation in one place that owns the dirty work:
//! installing the ambient request context, catching defects, finalizing the
//! scope on every exit path, and handing the single terminal failure to the
//! error logger before it crosses the boundary.

use std::any::Any;
use std::future::Future;

use futures::FutureExt;
use relay_config::Config;
use relay_errors::{convert, Cause, Error, InternalError, Result};
use relay_telemetry::{ErrorCategory, ErrorLogger, LogLevel};

use crate::cancel::CancellationToken;
use crate::context::{with_request, RequestContext};
use crate::scope::Scope;

/// How a managed computation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Clean success.
    Succeeded,
    /// Terminated with a classified error.
    Failed,
    /// Terminated by a defect (panic or other undeclared failure).
    Defected,
    /// Interrupted by the cancellation signal.
    Cancelled,
}

impl RunOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Defected => "defected",
            Self::Cancelled => "cancelled",
        }
    }
}

/// The managed effect runtime.
#[derive(Clone)]
pub struct Runtime {
    logger: ErrorLogger,
    allowed: Vec<ErrorCategory>,
    span_prefix: String,
    allow_blocking: bool,
    expose_defect_messages: bool,
}

impl Runtime {
    /// Runtime with default policy: log everything, allow blocking entry,
    /// keep defect text out of error messages.
    #[must_use]
    pub fn new(logger: ErrorLogger) -> Self {
        Self {
            logger,
            allowed: vec![ErrorCategory::All],
            span_prefix: "relay".to_string(),
            allow_blocking: true,
            expose_defect_messages: false,
        }
    }

    /// Runtime configured from the loaded boot configuration.
    #[must_use]
    pub fn from_config(logger: ErrorLogger, config: &Config) -> Self {
        let min_level =
            LogLevel::from_name(&config.telemetry.min_level).unwrap_or(LogLevel::Trace);
        Self {
            logger: logger.with_min_level(min_level),
            allowed: ErrorCategory::from_names(&config.telemetry.allowed_categories),
            span_prefix: config.telemetry.span_prefix.clone(),
            allow_blocking: config.runtime.allow_blocking,
            expose_defect_messages: config.runtime.expose_defect_messages,
        }
    }

    /// Run a computation to completion inside the managed environment.
    ///
    /// The closure receives the computation's [`Scope`]; cleanup registered
    /// there runs before this returns, whatever the outcome. A terminal
    /// failure is logged exactly once, here and nowhere else.
    ///
    /// # Errors
    ///
    /// Propagates the computation's classified error; defects surface as a
    /// generic internal-server exception whose full detail went to the logs.
    pub async fn execute<T, F, Fut>(
        &self,
        label: &str,
        context: RequestContext,
        f: F,
    ) -> Result<T>
    where
        F: FnOnce(Scope) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute_reporting(label, context, f).await.1
    }

    /// Like [`Runtime::execute`], also reporting how the computation ended.
    pub async fn execute_reporting<T, F, Fut>(
        &self,
        label: &str,
        context: RequestContext,
        f: F,
    ) -> (RunOutcome, Result<T>)
    where
        F: FnOnce(Scope) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let scope = Scope::new();
        let caught = std::panic::AssertUnwindSafe(with_request(context, f(scope.clone())))
            .catch_unwind()
            .await;
        self.settle(label, &scope, caught).await
    }

    /// Run a computation that may be interrupted by `token`.
    ///
    /// On cancellation the computation's future is dropped at its current
    /// await point, the scope is finalized, and a `CancelledError` is logged
    /// and returned.
    ///
    /// # Errors
    ///
    /// As [`Runtime::execute`], plus `CancelledError` when the signal fires
    /// first.
    pub async fn execute_with_signal<T, F, Fut>(
        &self,
        label: &str,
        context: RequestContext,
        token: &CancellationToken,
        f: F,
    ) -> Result<T>
    where
        F: FnOnce(Scope) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let scope = Scope::new();
        let guarded = std::panic::AssertUnwindSafe(with_request(context, f(scope.clone())))
            .catch_unwind();
        tokio::pin!(guarded);

        let caught = tokio::select! {
            caught = &mut guarded => Some(caught),
            () = token.cancelled() => None,
        };

        match caught {
            Some(caught) => self.settle(label, &scope, caught).await.1,
            None => {
                scope.finalize().await;
                let err: Error = InternalError::cancelled().into();
                self.log_terminal(label, RunOutcome::Cancelled, &err);
                Err(err)
            }
        }
    }

    /// Synchronous entry point for boot code and one-shot tools. Builds a
    /// private single-thread reactor and blocks on [`Runtime::execute`].
    ///
    /// # Errors
    ///
    /// Fails when blocking entry is disabled by configuration or the
    /// reactor cannot be built; otherwise as [`Runtime::execute`].
    pub fn execute_blocking<T, F, Fut>(
        &self,
        label: &str,
        context: RequestContext,
        f: F,
    ) -> Result<T>
    where
        F: FnOnce(Scope) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !self.allow_blocking {
            return Err(
                InternalError::unknown("blocking execution is disabled by configuration").into(),
            );
        }
        let reactor = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| convert::unknown_from("failed to build blocking reactor", &e))?;
        reactor.block_on(self.execute(label, context, f))
    }

    async fn settle<T>(
        &self,
        label: &str,
        scope: &Scope,
        caught: std::result::Result<Result<T>, Box<dyn Any + Send>>,
    ) -> (RunOutcome, Result<T>) {
        scope.finalize().await;
        match caught {
            Ok(Ok(value)) => {
                tracing::debug!(span = %self.span(label), outcome = RunOutcome::Succeeded.as_str());
                (RunOutcome::Succeeded, Ok(value))
            }
            Ok(Err(err)) => {
                self.log_terminal(label, RunOutcome::Failed, &err);
                (RunOutcome::Failed, Err(err))
            }
            Err(payload) => {
                let internal = self.classify_defect(payload.as_ref());
                let err: Error = convert::to_exception(internal.into()).into();
                self.log_terminal(label, RunOutcome::Defected, &err);
                (RunOutcome::Defected, Err(err))
            }
        }
    }

    fn classify_defect(&self, payload: &(dyn Any + Send)) -> InternalError {
        let text = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned());
        match text {
            Some(text) => {
                let base = if self.expose_defect_messages {
                    InternalError::unknown(format!("computation defected: {text}"))
                } else {
                    InternalError::unknown("computation defected")
                };
                base.with_cause(Cause::foreign("panic", text))
            }
            None => InternalError::runtime_exit("panic with non-string payload"),
        }
    }

    fn log_terminal(&self, label: &str, outcome: RunOutcome, err: &Error) {
        let span = self.span(label);
        tracing::debug!(span = %span, outcome = outcome.as_str());
        self.logger.log(&self.allowed, &span, err);
    }

    fn span(&self, label: &str) -> String {
        format!("{}.{label}", self.span_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_errors::Exception;
    use relay_telemetry::MemorySink;
    use std::sync::Arc;

    fn runtime_with_sink() -> (Runtime, MemorySink) {
        let sink = MemorySink::new();
        let runtime = Runtime::new(ErrorLogger::new(Arc::new(sink.clone())));
        (runtime, sink)
    }

    #[tokio::test]
    async fn success_is_returned_and_nothing_is_logged() {
        let (runtime, sink) = runtime_with_sink();
        let value = runtime
            .execute("register", RequestContext::new(), |_| async { Ok(21 * 2) })
            .await
            .unwrap();
        assert_eq!(value, 42);
        assert!(sink.records().is_empty());
    }

    #[tokio::test]
    async fn a_terminal_failure_is_logged_exactly_once() {
        let (runtime, sink) = runtime_with_sink();
        let err = runtime
            .execute::<(), _, _>("register", RequestContext::new(), |_| async {
                Err(Exception::conflict("email already registered").into())
            })
            .await
            .unwrap_err();

        assert_eq!(err.tag(), "ConflictException");
        assert_eq!(sink.records().len(), 1);
        assert_eq!(sink.span_trace(), vec!["+relay.register", "-relay.register"]);
    }

    #[tokio::test]
    async fn a_defect_surfaces_as_a_generic_exception() {
        let (runtime, sink) = runtime_with_sink();
        let (outcome, result) = runtime
            .execute_reporting::<(), _, _>("register", RequestContext::new(), |_| async {
                panic!("index out of bounds")
            })
            .await;

        assert_eq!(outcome, RunOutcome::Defected);
        let err = result.unwrap_err();
        assert!(err.is_exception());
        let json = err.to_json();
        assert_eq!(json["code"], "E_INTERNAL_SERVER");
        assert_eq!(json["message"], "internal server error");

        // full detail went to the log, not to the boundary
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].payload["error"]["root_cause"]["message"],
            "index out of bounds"
        );
    }

    #[tokio::test]
    async fn the_scope_is_finalized_on_every_path() {
        let (runtime, _) = runtime_with_sink();
        let flag = Arc::new(std::sync::Mutex::new(Vec::new()));

        for should_fail in [false, true] {
            let flag = Arc::clone(&flag);
            let _ = runtime
                .execute("job", RequestContext::new(), move |scope| async move {
                    let flag2 = Arc::clone(&flag);
                    scope.defer(move || async move {
                        flag2.lock().unwrap().push(should_fail);
                    });
                    if should_fail {
                        Err(Exception::not_found("contact", "c-1").into())
                    } else {
                        Ok(())
                    }
                })
                .await;
        }

        assert_eq!(*flag.lock().unwrap(), vec![false, true]);
    }

    #[tokio::test]
    async fn cancellation_finalizes_and_logs() {
        let (runtime, sink) = runtime_with_sink();
        let (handle, token) = crate::cancel::cancellation_pair();
        let cleaned = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let seen = Arc::clone(&cleaned);

        handle.cancel();
        let err = runtime
            .execute_with_signal::<(), _, _>(
                "sync",
                RequestContext::new(),
                &token,
                move |scope| async move {
                    scope.defer(move || async move {
                        seen.store(true, std::sync::atomic::Ordering::SeqCst);
                    });
                    // pends until cancellation wins the race
                    std::future::pending::<()>().await;
                    Ok(())
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.tag(), "CancelledError");
        assert!(cleaned.load(std::sync::atomic::Ordering::SeqCst));
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn the_ambient_context_is_installed() {
        let (runtime, _) = runtime_with_sink();
        let context = RequestContext::new().with_actor("ada@example.com");
        let expected = context.request_id();

        let seen = runtime
            .execute("whoami", context, |_| async {
                Ok(RequestContext::current()?.request_id())
            })
            .await
            .unwrap();

        assert_eq!(seen, expected);
    }

    #[test]
    fn blocking_entry_respects_configuration() {
        let sink = MemorySink::new();
        let logger = ErrorLogger::new(Arc::new(sink));
        let mut config = Config::default();
        config.runtime.allow_blocking = false;
        let runtime = Runtime::from_config(logger, &config);

        let err = runtime
            .execute_blocking::<(), _, _>("boot", RequestContext::new(), |_| async { Ok(()) })
            .unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn blocking_entry_runs_the_computation() {
        let (runtime, _) = runtime_with_sink();
        let value = runtime
            .execute_blocking("boot", RequestContext::new(), |_| async { Ok(7) })
            .unwrap();
        assert_eq!(value, 7);
    }
}
