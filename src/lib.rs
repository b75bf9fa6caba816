pub mod error;
pub mod host;
pub mod lifecycle;
pub mod loadable;
pub mod screen;
pub mod stack;

#[cfg(test)]
mod test_stack;

pub use error::{NavError, NavResult};
pub use host::{AttachmentHost, ReadyFuture};
pub use lifecycle::{ResumePolicy, ScreenLifecycle};
pub use loadable::LoadState;
pub use screen::{Screen, ScreenDelegate, ScreenId};
pub use stack::{ExitOutcome, MakeCurrentOutcome, NavStack, StackConfig};
