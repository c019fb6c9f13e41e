//! Ambient request context
//!
//! A task-local slot holding the identity of the request being served.
//! Anything running inside a managed computation can read it without
//! threading parameters through every call; reading it outside a
//! computation is a classified internal error, never a default value.

use std::collections::HashMap;
use std::future::Future;

use relay_errors::{Error, InternalError};
use relay_types::WorkspaceId;
use uuid::Uuid;

tokio::task_local! {
    static CURRENT_REQUEST: RequestContext;
}

/// Identity of the request a computation is serving.
#[derive(Clone, Debug)]
pub struct RequestContext {
    request_id: Uuid,
    actor: Option<String>,
    workspace: Option<WorkspaceId>,
    headers: HashMap<String, String>,
}

impl RequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            actor: None,
            workspace: None,
            headers: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    #[must_use]
    pub fn with_workspace(mut self, workspace: WorkspaceId) -> Self {
        self.workspace = Some(workspace);
        self
    }

    /// Record a request header; names are lowercased on the way in.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    #[must_use]
    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    #[must_use]
    pub fn workspace(&self) -> Option<WorkspaceId> {
        self.workspace
    }

    /// Header lookup, case-insensitive on the name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Read the ambient context of the current computation.
    ///
    /// # Errors
    ///
    /// Returns `ContextUnavailableError` outside any managed computation.
    pub fn current() -> Result<Self, Error> {
        CURRENT_REQUEST
            .try_with(Clone::clone)
            .map_err(|_| InternalError::context_unavailable("request").into())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a future with `context` installed as the ambient request.
pub async fn with_request<F>(context: RequestContext, fut: F) -> F::Output
where
    F: Future,
{
    CURRENT_REQUEST.scope(context, fut).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn context_is_visible_inside_the_scope() {
        let ctx = RequestContext::new().with_actor("ada@example.com");
        let id = ctx.request_id();

        let seen = with_request(ctx, async {
            let current = RequestContext::current().unwrap();
            (current.request_id(), current.actor().map(str::to_string))
        })
        .await;

        assert_eq!(seen.0, id);
        assert_eq!(seen.1.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn header_lookup_is_case_insensitive() {
        let ctx = RequestContext::new().with_header("X-Request-Source", "mobile");
        assert_eq!(ctx.header("x-request-source"), Some("mobile"));
        assert_eq!(ctx.header("X-REQUEST-SOURCE"), Some("mobile"));
        assert_eq!(ctx.header("x-other"), None);
    }

    #[tokio::test]
    async fn context_outside_a_scope_is_a_classified_error() {
        let err = RequestContext::current().unwrap_err();
        assert!(err.is_internal());
        assert_eq!(err.tag(), "ContextUnavailableError");
    }

    #[tokio::test]
    async fn nested_scopes_shadow_the_outer_context() {
        let outer = RequestContext::new();
        let inner = RequestContext::new();
        let inner_id = inner.request_id();

        let seen = with_request(outer, async move {
            with_request(inner, async {
                RequestContext::current().unwrap().request_id()
            })
            .await
        })
        .await;

        assert_eq!(seen, inner_id);
    }
}
