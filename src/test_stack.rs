// Unit tests for load-state transitions and stack-level validation.
// Scenario/ordering coverage lives in tests/navigation.rs.
use crate::{
    AttachmentHost, ExitOutcome, LoadState, NavError, NavStack, ReadyFuture, Screen, ScreenId,
    ScreenLifecycle,
};

/// Host whose units are ready the moment they are attached
struct ImmediateHost {
    detached: Vec<ScreenId>,
}

impl ImmediateHost {
    fn new() -> Self {
        Self {
            detached: Vec::new(),
        }
    }
}

impl AttachmentHost for ImmediateHost {
    fn attach(&mut self, _id: ScreenId) -> ReadyFuture {
        Box::pin(std::future::ready(()))
    }

    fn detach(&mut self, id: ScreenId) {
        self.detached.push(id);
    }
}

/// Stack with an activated root over an immediate host
fn stack() -> NavStack<ImmediateHost> {
    let mut stack = NavStack::new(Screen::new(()), ImmediateHost::new());
    stack.poll_ready();
    stack
}

fn push_entered(stack: &mut NavStack<ImmediateHost>, parent: ScreenId) -> ScreenId {
    let id = stack.register(Screen::new(()));
    stack.push(parent, id).unwrap();
    stack.poll_ready();
    id
}

#[test]
fn test_load_state_transitions_fire_exactly_once() {
    let mut load = LoadState::default();
    assert!(load.is_not_loaded());

    assert!(load.request_load().is_ok());
    assert_eq!(load, LoadState::Loading);
    assert_eq!(load.request_load(), Err(NavError::InvalidState));

    assert!(load.complete().is_ok());
    assert!(load.is_ready());
    assert_eq!(load.complete(), Err(NavError::InvalidState));
}

#[test]
fn test_complete_before_request_is_invalid() {
    let mut load = LoadState::NotLoaded;
    assert_eq!(load.complete(), Err(NavError::InvalidState));
}

#[test]
fn test_root_activates_on_poll() {
    let mut stack = NavStack::new(Screen::new(()), ImmediateHost::new());
    let root = stack.root();
    assert!(!stack.is_current(root));
    assert_eq!(stack.lifecycle_of(root), Some(ScreenLifecycle::Attached));

    stack.poll_ready();
    assert!(stack.is_current(root));
    assert_eq!(stack.load_state_of(root), Some(LoadState::Ready));
}

#[test]
fn test_push_onto_unattached_parent() {
    let mut stack = stack();
    let a = stack.register(Screen::new(()));
    let b = stack.register(Screen::new(()));
    assert_eq!(stack.push(a, b), Err(NavError::NotAttached));
}

#[test]
fn test_push_unknown_ids() {
    let mut stack = stack();
    let root = stack.root();
    let ghost = ScreenId(99);
    assert_eq!(stack.push(root, ghost), Err(NavError::UnknownScreen));
    assert_eq!(stack.push(ghost, root), Err(NavError::UnknownScreen));
    assert_eq!(stack.exit(ghost), Err(NavError::UnknownScreen));
}

#[test]
fn test_push_entered_screen_again() {
    let mut stack = stack();
    let root = stack.root();
    let s1 = push_entered(&mut stack, root);
    assert_eq!(stack.push(root, s1), Err(NavError::AlreadyEntered));

    // the parent link is never reset, so an exited screen stays ineligible
    stack.exit(s1).unwrap();
    assert_eq!(stack.push(root, s1), Err(NavError::AlreadyEntered));
}

#[test]
fn test_push_onto_parent_with_attached_child() {
    let mut stack = stack();
    let root = stack.root();
    let _s1 = push_entered(&mut stack, root);
    let s2 = stack.register(Screen::new(()));
    assert_eq!(stack.push(root, s2), Err(NavError::HasChild));
}

#[test]
fn test_exit_root_is_rejected() {
    let mut stack = stack();
    let root = stack.root();
    assert_eq!(stack.exit(root), Err(NavError::InvalidOperation));
}

#[test]
fn test_exit_unattached_screen() {
    let mut stack = stack();
    let a = stack.register(Screen::new(()));
    assert_eq!(stack.exit(a), Err(NavError::NotAttached));
}

#[test]
fn test_exit_detaches_through_host() {
    let mut stack = stack();
    let root = stack.root();
    let s1 = push_entered(&mut stack, root);

    assert_eq!(stack.exit(s1), Ok(ExitOutcome::Exited));
    assert_eq!(stack.lifecycle_of(s1), Some(ScreenLifecycle::Detached));
    assert_eq!(stack.host().detached, vec![s1]);
    assert!(stack.is_current(root));
}

#[test]
fn test_exited_parent_accepts_new_child() {
    let mut stack = stack();
    let root = stack.root();
    let s1 = push_entered(&mut stack, root);
    stack.exit(s1).unwrap();

    let s2 = push_entered(&mut stack, root);
    assert!(stack.is_current(s2));
    assert_eq!(stack.attached_screens(), &[root, s2]);
}

#[test]
fn test_preload_validation() {
    let mut stack = stack();
    let root = stack.root();
    let s1 = stack.register(Screen::new(()));

    stack.preload(s1).unwrap();
    assert_eq!(stack.preload(s1), Err(NavError::InvalidState));

    stack.poll_ready();
    assert_eq!(stack.load_state_of(s1), Some(LoadState::Ready));
    assert_eq!(stack.preload(s1), Err(NavError::InvalidState));

    // ready screen commits at push time, no poll needed
    stack.push(root, s1).unwrap();
    assert!(stack.is_current(s1));
}

#[test]
fn test_preload_attached_screen_rejected() {
    let mut stack = stack();
    let root = stack.root();
    let s1 = push_entered(&mut stack, root);
    assert_eq!(stack.preload(s1), Err(NavError::AlreadyEntered));
}

#[test]
fn test_is_current_is_exclusive() {
    let mut stack = stack();
    let root = stack.root();
    let s1 = push_entered(&mut stack, root);
    let s2 = push_entered(&mut stack, s1);

    let all = [root, s1, s2];
    let current: Vec<_> = all.iter().filter(|id| stack.is_current(**id)).collect();
    assert_eq!(current, vec![&s2]);
    assert_eq!(stack.attached_screens(), &[root, s1, s2]);
}
