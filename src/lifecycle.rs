/// Lifecycle state of a screen inside a navigation stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenLifecycle {
    /// Registered with the stack but not yet attached (or push still pending)
    Pending,

    /// Attached to the stack but not yet activated (root before first enter)
    Attached,

    /// Deepest attached screen, enter/resume transition completed
    Current,

    /// A child is current above this screen, state preserved
    Suspended,

    /// Exit accepted, teardown in progress
    Exiting,

    /// Removed from the stack and detached from the host
    Detached,
}

/// Policy for what happens when navigation would resume a suspended screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePolicy {
    /// Resume normally when the child above exits (default)
    Resume,

    /// Never resume; discard this screen when navigation comes back through it
    Discard,
}

impl Default for ResumePolicy {
    fn default() -> Self {
        ResumePolicy::Resume
    }
}

impl ScreenLifecycle {
    /// Whether this screen currently occupies a slot in the attached sequence
    pub fn is_attached(&self) -> bool {
        matches!(
            self,
            ScreenLifecycle::Attached | ScreenLifecycle::Current | ScreenLifecycle::Suspended
        )
    }
}
