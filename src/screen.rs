use std::cell::RefCell;
use std::rc::Rc;

use crate::lifecycle::ResumePolicy;

/// Unique identifier for a screen, allocated by the stack at registration.
///
/// Ids are plain copyable handles; parent/child links inside the stack are
/// stored as ids rather than owning references, so screens never form
/// reference cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId(pub(crate) u64);

impl ScreenId {
    /// The raw handle value, stable for the lifetime of the stack
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Lifecycle hooks for a screen, called by the stack through dynamic dispatch.
///
/// All hooks run on the main control context, never concurrently with each
/// other or with a navigation call. They are notifications: implementations
/// must not call back into the stack from inside a hook.
pub trait ScreenDelegate {
    /// Called once, when this screen transitions from absent to
    /// attached-and-current for the first time.
    fn on_entering(&mut self, _previous: Option<ScreenId>) {}

    /// Called each time this screen regains current status after having been
    /// suspended. `previous` is the screen whose exit handed control back.
    fn on_resuming(&mut self, _previous: ScreenId) {}

    /// Called when a child becomes current above this screen.
    fn on_suspending(&mut self, _next: ScreenId) {}

    /// Called when this screen is about to be removed. Returning true vetoes
    /// the exit and the screen remains attached and current.
    fn on_exiting(&mut self, _next: Option<ScreenId>) -> bool {
        false
    }
}

/// A delegate with no behavior, useful for screens that only exist to hold
/// navigation position (and for tests).
impl ScreenDelegate for () {}

/// A caller-built screen descriptor, handed to the stack via
/// [`register`](crate::NavStack::register) or as the root at construction.
///
/// The descriptor carries no navigation identity of its own; identity, links
/// and load state live inside the stack once the screen is registered.
pub struct Screen {
    pub(crate) delegate: Rc<RefCell<dyn ScreenDelegate>>,
    pub(crate) resume_policy: ResumePolicy,
}

impl Screen {
    /// Create a screen with the given lifecycle delegate
    pub fn new(delegate: impl ScreenDelegate + 'static) -> Self {
        Self::shared(Rc::new(RefCell::new(delegate)))
    }

    /// Create a screen from a shared delegate handle. The caller keeps a
    /// reference and can observe hook effects from outside the stack.
    pub fn shared(delegate: Rc<RefCell<dyn ScreenDelegate>>) -> Self {
        Self {
            delegate,
            resume_policy: ResumePolicy::default(),
        }
    }

    /// Set the resume policy for this screen
    pub fn with_resume_policy(mut self, policy: ResumePolicy) -> Self {
        self.resume_policy = policy;
        self
    }
}
