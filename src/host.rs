use std::future::Future;
use std::pin::Pin;

use crate::screen::ScreenId;

/// Future resolved by the attachment host exactly once, when the unit it was
/// handed becomes Ready. Construction may run on any context; the stack only
/// observes completion on the main context, inside
/// [`poll_ready`](crate::NavStack::poll_ready).
pub type ReadyFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// The container that owns and parents loadable units.
///
/// The stack consumes this as an opaque service: it calls [`attach`] when a
/// push (or preload) is accepted and [`detach`] once a screen's exit is
/// logically complete, and it never infers readiness by any means other than
/// the future `attach` hands back. Widget construction and dependency
/// injection are the host's business.
///
/// [`attach`]: AttachmentHost::attach
/// [`detach`]: AttachmentHost::detach
pub trait AttachmentHost {
    /// Begin asynchronous construction of a unit. The returned future
    /// resolves exactly once, when the unit is Ready.
    fn attach(&mut self, id: ScreenId) -> ReadyFuture;

    /// Tear a unit down and release everything bound to it. Called after the
    /// exit transition is recorded and strictly before any successor screen's
    /// resume hook runs.
    fn detach(&mut self, id: ScreenId);
}
