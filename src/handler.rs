//! Resource actions.
//!
//! An action is any `async fn(Request) -> impl IntoReply`. A [`Resource`]
//! keeps its actions by name, e.g. `index` or `update`, and the dispatcher
//! looks one up per request through the route's action map. Every action
//! is boxed on registration and its output normalized to a [`Reply`]
//! before `make_response` sees it.
//!
//! [`Resource`]: crate::Resource

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Error;
use crate::request::Request;
use crate::response::{IntoReply, Reply};

/// What calling a stored action yields. `Err` carries both client errors
/// (`Error::Http`) and application failures.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Result<Reply, Error>> + Send + 'static>>;

#[doc(hidden)]
pub trait ErasedAction {
    fn call(&self, req: Request) -> BoxFuture;
}

#[doc(hidden)]
pub type BoxedAction = Arc<dyn ErasedAction + Send + Sync + 'static>;

/// Anything [`Resource::action`](crate::Resource::action) accepts.
///
/// Returning `Value`, `(Value, u16)`, `Response`, `Option<_>` or
/// `Result<_, HttpError>` all qualify; see [`IntoReply`]. Sealed.
pub trait Action: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_action(self) -> BoxedAction;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoReply + Send + 'static,
{
}

impl<F, Fut, R> Action for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoReply + Send + 'static,
{
    fn into_boxed_action(self) -> BoxedAction {
        Arc::new(FnAction(self))
    }
}

/// An action fn stored behind [`ErasedAction`].
struct FnAction<F>(F);

impl<F, Fut, R> ErasedAction for FnAction<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoReply + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_reply() })
    }
}
