use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::task::Context;

use futures::task::noop_waker;

use crate::error::{NavError, NavResult};
use crate::host::{AttachmentHost, ReadyFuture};
use crate::lifecycle::{ResumePolicy, ScreenLifecycle};
use crate::loadable::LoadState;
use crate::screen::{Screen, ScreenDelegate, ScreenId};

/// Constructor-time configuration for a navigation stack
#[derive(Debug, Clone, Copy)]
pub struct StackConfig {
    /// Fire the parent's suspend hook at push time, before the child has
    /// loaded (default). When false, the suspend is deferred until the child
    /// is ready, so parent and child observe suspend/enter as adjacent events.
    pub suspend_immediately: bool,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            suspend_immediately: true,
        }
    }
}

/// Result of an exit request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The screen left the stack (or its pending push was discarded)
    Exited,

    /// The screen's exit hook vetoed; it remains attached and current
    Vetoed,
}

/// Result of a make-current rewind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MakeCurrentOutcome {
    /// Every screen above the target exited; the target is current again
    Completed,

    /// A screen in the chain vetoed its exit and the walk stopped there.
    /// Screens below the veto point are attached exactly as before.
    StoppedAt(ScreenId),
}

/// Internal outcome of a single-level exit, distinguishing the cancellation
/// of a still-pending push (which fires no events for the child) from a real
/// exit of an attached screen.
enum InnerExit {
    Exited,
    Canceled { suspend_fired: bool },
    Vetoed,
}

/// Stack-owned state for one registered screen
struct ScreenEntry {
    delegate: Rc<RefCell<dyn ScreenDelegate>>,
    resume_policy: ResumePolicy,
    load: LoadState,
    lifecycle: ScreenLifecycle,
    /// Set exactly once, when a push targeting this screen is accepted
    parent: Option<ScreenId>,
    /// Forward attachment, owned by the stack; cleared when the child exits
    child: Option<ScreenId>,
    /// Exit recorded; no lifecycle event may fire for this screen anymore
    exit_pending: bool,
}

/// A push whose target has not yet reached Ready. The record itself is the
/// cancellation token: dropping it before the future resolves is how an
/// intervening exit suppresses the enter/suspend pair without races.
struct PendingPush {
    /// None for the root activation queued at construction
    parent: Option<ScreenId>,
    child: ScreenId,
    suspend_fired: bool,
    ready: ReadyFuture,
}

struct PendingPreload {
    id: ScreenId,
    ready: ReadyFuture,
}

/// A navigation stack over asynchronously-constructed screens.
///
/// The stack owns the ordered root-to-tip sequence of attached screens and
/// sequences every lifecycle callback (enter, suspend, resume, exit) against
/// asynchronous readiness, so callbacks appear in a single deterministic
/// order even when screen construction completes out of order or late.
///
/// All mutation goes through `&mut self` on whatever context drives the
/// stack; screen loading may finish anywhere, but the stack only observes
/// completion inside [`poll_ready`](NavStack::poll_ready).
pub struct NavStack<H: AttachmentHost> {
    host: H,
    config: StackConfig,
    screens: HashMap<ScreenId, ScreenEntry>,
    /// Attached screens, root at index 0, tip last
    sequence: Vec<ScreenId>,
    root: ScreenId,
    /// External "current" pointer. Optimistic: reflects the intended target
    /// of a pending push before the target has entered.
    current: ScreenId,
    pending_pushes: Vec<PendingPush>,
    pending_preloads: Vec<PendingPreload>,
    next_id: u64,
}

impl<H: AttachmentHost> NavStack<H> {
    /// Create a stack with the given root screen and default configuration.
    /// The root occupies index 0 for the stack's whole lifetime; its enter
    /// transition fires once the host reports it ready.
    pub fn new(root: Screen, host: H) -> Self {
        Self::with_config(root, host, StackConfig::default())
    }

    pub fn with_config(root: Screen, mut host: H, config: StackConfig) -> Self {
        let root_id = ScreenId(0);
        let mut load = LoadState::default();
        load.request_load().ok();
        let ready = host.attach(root_id);

        let mut screens = HashMap::new();
        screens.insert(
            root_id,
            ScreenEntry {
                delegate: root.delegate,
                resume_policy: root.resume_policy,
                load,
                lifecycle: ScreenLifecycle::Attached,
                parent: None,
                child: None,
                exit_pending: false,
            },
        );

        log::info!("Stack created with root {:?}", root_id);

        Self {
            host,
            config,
            screens,
            sequence: vec![root_id],
            root: root_id,
            current: root_id,
            pending_pushes: vec![PendingPush {
                parent: None,
                child: root_id,
                suspend_fired: true,
                ready,
            }],
            pending_preloads: Vec::new(),
            next_id: 1,
        }
    }

    /// Introduce a caller-built screen to the stack without attaching it
    pub fn register(&mut self, screen: Screen) -> ScreenId {
        let id = ScreenId(self.next_id);
        self.next_id += 1;
        self.screens.insert(
            id,
            ScreenEntry {
                delegate: screen.delegate,
                resume_policy: screen.resume_policy,
                load: LoadState::default(),
                lifecycle: ScreenLifecycle::Pending,
                parent: None,
                child: None,
                exit_pending: false,
            },
        );
        log::debug!("Registered screen {:?}", id);
        id
    }

    /// Request that `child` become `parent`'s child.
    ///
    /// The child's parent link and the external current pointer update
    /// immediately; the enter transition is deferred until the host reports
    /// the child ready (synchronous only for an explicitly preloaded child).
    pub fn push(&mut self, parent: ScreenId, child: ScreenId) -> NavResult<()> {
        {
            let child_entry = self.screens.get(&child).ok_or(NavError::UnknownScreen)?;
            if child_entry.parent.is_some() || child_entry.lifecycle != ScreenLifecycle::Pending {
                return Err(NavError::AlreadyEntered);
            }
            if child_entry.load == LoadState::Loading && !self.has_pending_preload(child) {
                return Err(NavError::InvalidOperation);
            }
        }
        {
            let parent_entry = self.screens.get(&parent).ok_or(NavError::UnknownScreen)?;
            if !parent_entry.lifecycle.is_attached() {
                return Err(NavError::NotAttached);
            }
            if let Some(existing) = parent_entry.child {
                // an attached child blocks outright; an unresolved pending
                // one makes this a second concurrent push
                return Err(if self.is_attached(existing) {
                    NavError::HasChild
                } else {
                    NavError::InvalidOperation
                });
            }
        }

        if let Some(e) = self.screens.get_mut(&child) {
            e.parent = Some(parent);
        }
        if let Some(e) = self.screens.get_mut(&parent) {
            e.child = Some(child);
        }
        self.current = child;
        log::info!("Pushing {:?} onto {:?}", child, parent);

        let load = self
            .screens
            .get(&child)
            .map(|e| e.load)
            .unwrap_or_default();
        match load {
            // preloaded and ready: commit without a host round trip
            LoadState::Ready => {
                self.commit_push(Some(parent), child, false);
            }
            LoadState::NotLoaded => {
                if let Some(e) = self.screens.get_mut(&child) {
                    e.load.request_load()?;
                }
                let ready = self.host.attach(child);
                let suspend_fired = self.maybe_suspend_early(parent, child);
                self.pending_pushes.push(PendingPush {
                    parent: Some(parent),
                    child,
                    suspend_fired,
                    ready,
                });
                log::debug!("  {:?} is loading; push pending", child);
            }
            // preload in flight: adopt its readiness future
            LoadState::Loading => {
                if let Some(pos) = self.pending_preloads.iter().position(|p| p.id == child) {
                    let preload = self.pending_preloads.remove(pos);
                    let suspend_fired = self.maybe_suspend_early(parent, child);
                    self.pending_pushes.push(PendingPush {
                        parent: Some(parent),
                        child,
                        suspend_fired,
                        ready: preload.ready,
                    });
                    log::debug!("  {:?} still preloading; push pending", child);
                }
            }
        }
        Ok(())
    }

    /// Request that a screen (and any pending push above it) leave the stack.
    ///
    /// Exiting a screen whose own push is still pending discards the push:
    /// no lifecycle event ever fires for the screen. Exiting an attached
    /// screen runs its exit hook first; a veto leaves everything untouched.
    pub fn exit(&mut self, id: ScreenId) -> NavResult<ExitOutcome> {
        match self.exit_inner(id, true)? {
            InnerExit::Vetoed => Ok(ExitOutcome::Vetoed),
            _ => Ok(ExitOutcome::Exited),
        }
    }

    /// Rewind the stack so the target ancestor becomes current, exiting every
    /// screen above it tip-first. Each intermediate screen keeps its veto
    /// opportunity; a veto stops the walk with no partial teardown below it.
    /// The resume hook fires exactly once, on whichever screen ends up as tip.
    pub fn make_current(&mut self, id: ScreenId) -> NavResult<MakeCurrentOutcome> {
        let entry = self.screens.get(&id).ok_or(NavError::UnknownScreen)?;
        if !entry.lifecycle.is_attached() {
            return Err(NavError::NotAttached);
        }
        if entry.resume_policy == ResumePolicy::Discard && id != self.root {
            return Err(NavError::InvalidOperation);
        }
        log::info!("Rewinding stack to {:?}", id);

        let mut needs_resume = false;
        let mut last_exited = id;
        loop {
            let tip = self.current;
            if tip == id {
                break;
            }
            match self.exit_inner(tip, false)? {
                InnerExit::Exited => {
                    needs_resume = true;
                    last_exited = tip;
                }
                InnerExit::Canceled { suspend_fired } => {
                    // a silently discarded push owes its parent a resume only
                    // if the early suspend actually fired
                    if suspend_fired {
                        needs_resume = true;
                        last_exited = tip;
                    }
                }
                InnerExit::Vetoed => {
                    log::info!("Rewind stopped at {:?} (exit vetoed)", tip);
                    if needs_resume {
                        self.fire_resuming(tip, last_exited);
                        if let Some(e) = self.screens.get_mut(&tip) {
                            e.lifecycle = ScreenLifecycle::Current;
                        }
                        self.current = tip;
                    }
                    return Ok(MakeCurrentOutcome::StoppedAt(tip));
                }
            }
        }

        if needs_resume {
            self.fire_resuming(id, last_exited);
            if let Some(e) = self.screens.get_mut(&id) {
                e.lifecycle = ScreenLifecycle::Current;
            }
            self.current = id;
        }
        Ok(MakeCurrentOutcome::Completed)
    }

    /// Hand a registered, unattached screen to the host early, so a later
    /// push onto it commits synchronously. No lifecycle events fire.
    pub fn preload(&mut self, id: ScreenId) -> NavResult<()> {
        let entry = self.screens.get(&id).ok_or(NavError::UnknownScreen)?;
        if entry.parent.is_some() || entry.lifecycle != ScreenLifecycle::Pending {
            return Err(NavError::AlreadyEntered);
        }
        if entry.load != LoadState::NotLoaded {
            return Err(NavError::InvalidState);
        }
        if let Some(e) = self.screens.get_mut(&id) {
            e.load.request_load()?;
        }
        let ready = self.host.attach(id);
        self.pending_preloads.push(PendingPreload { id, ready });
        log::debug!("Preloading {:?}", id);
        Ok(())
    }

    /// Drain readiness notifications on the calling (main) context and commit
    /// the transitions they unlock, in the order the pushes were issued.
    /// Returns the number of committed transitions.
    pub fn poll_ready(&mut self) -> usize {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        let mut i = 0;
        while i < self.pending_preloads.len() {
            if self.pending_preloads[i].ready.as_mut().poll(&mut cx).is_ready() {
                let op = self.pending_preloads.remove(i);
                if let Some(e) = self.screens.get_mut(&op.id) {
                    e.load.complete().ok();
                }
                log::debug!("Preload of {:?} completed", op.id);
            } else {
                i += 1;
            }
        }

        let mut committed = 0;
        // strictly first-in-first-out: a child's readiness must not overtake
        // its parent's still-pending activation, so nothing behind an
        // unresolved push commits
        while let Some(front) = self.pending_pushes.first_mut() {
            if front.ready.as_mut().poll(&mut cx).is_pending() {
                break;
            }
            let op = self.pending_pushes.remove(0);
            self.commit_push(op.parent, op.child, op.suspend_fired);
            committed += 1;
        }
        committed
    }

    /// True iff the screen is attached, is the deepest entry, and its
    /// enter/resume transition has completed (not merely scheduled)
    pub fn is_current(&self, id: ScreenId) -> bool {
        self.sequence.last() == Some(&id)
            && self
                .screens
                .get(&id)
                .map(|e| e.lifecycle == ScreenLifecycle::Current)
                .unwrap_or(false)
    }

    /// The external current pointer: the deepest screen considered active
    /// for queries, which is the intended target of a push even while that
    /// push is still pending
    pub fn current_screen(&self) -> ScreenId {
        self.current
    }

    pub fn root(&self) -> ScreenId {
        self.root
    }

    pub fn is_attached(&self, id: ScreenId) -> bool {
        self.screens
            .get(&id)
            .map(|e| e.lifecycle.is_attached())
            .unwrap_or(false)
    }

    /// The screen's parent link, set exactly once at push time
    pub fn parent_of(&self, id: ScreenId) -> Option<ScreenId> {
        self.screens.get(&id).and_then(|e| e.parent)
    }

    pub fn lifecycle_of(&self, id: ScreenId) -> Option<ScreenLifecycle> {
        self.screens.get(&id).map(|e| e.lifecycle)
    }

    pub fn load_state_of(&self, id: ScreenId) -> Option<LoadState> {
        self.screens.get(&id).map(|e| e.load)
    }

    /// Attached screens in root-to-tip order
    pub fn attached_screens(&self) -> &[ScreenId] {
        &self.sequence
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // ---- internals ----

    fn exit_inner(&mut self, id: ScreenId, fire_resume: bool) -> NavResult<InnerExit> {
        if !self.screens.contains_key(&id) {
            return Err(NavError::UnknownScreen);
        }

        // Exit while the screen's own push is still pending: drop the record
        // so the eventual readiness callback finds nothing to commit. The
        // screen fires no lifecycle event, ever.
        if let Some(pos) = self
            .pending_pushes
            .iter()
            .position(|p| p.child == id && p.parent.is_some())
        {
            let op = self.pending_pushes.remove(pos);
            let parent = op.parent;
            if let Some(e) = self.screens.get_mut(&id) {
                e.lifecycle = ScreenLifecycle::Detached;
                e.exit_pending = true;
            }
            if let Some(p) = parent {
                if let Some(e) = self.screens.get_mut(&p) {
                    if e.child == Some(id) {
                        e.child = None;
                    }
                }
                self.current = p;
            }
            self.host.detach(id);
            log::info!("Discarded pending push of {:?}", id);
            if fire_resume && op.suspend_fired {
                // the early suspend already fired on the parent, so balance it
                if let Some(p) = parent {
                    self.fire_resuming(p, id);
                }
            }
            return Ok(InnerExit::Canceled {
                suspend_fired: op.suspend_fired,
            });
        }

        let (lifecycle, parent, child) = {
            let e = self.screens.get(&id).ok_or(NavError::UnknownScreen)?;
            (e.lifecycle, e.parent, e.child)
        };
        if !lifecycle.is_attached() {
            return Err(NavError::NotAttached);
        }
        // leaf-first: a living attached descendant blocks the exit outright
        if let Some(c) = child {
            if self.is_attached(c) {
                return Err(NavError::HasChild);
            }
        }
        if id == self.root {
            return Err(NavError::InvalidOperation);
        }

        if let Some(e) = self.screens.get_mut(&id) {
            e.exit_pending = true;
        }
        if self.fire_exiting(id, parent) {
            if let Some(e) = self.screens.get_mut(&id) {
                e.exit_pending = false;
            }
            log::info!("Exit of {:?} vetoed", id);
            return Ok(InnerExit::Vetoed);
        }

        // only once the exit is definite: a push still pending on this screen
        // is suppressed along with it. A veto above leaves the pending child
        // and the external pointer exactly as they were.
        if let Some(c) = child {
            if let Some(pos) = self.pending_pushes.iter().position(|p| p.child == c) {
                self.pending_pushes.remove(pos);
                if let Some(e) = self.screens.get_mut(&c) {
                    e.lifecycle = ScreenLifecycle::Detached;
                    e.exit_pending = true;
                }
                self.host.detach(c);
                if let Some(e) = self.screens.get_mut(&id) {
                    e.child = None;
                }
                self.current = id;
                log::info!("Discarded pending push of {:?} ({:?} is exiting)", c, id);
            }
        }

        self.teardown(id);

        if fire_resume {
            self.resume_into(parent, id);
        } else if let Some(p) = parent {
            // make_current fires the final resume itself
            self.current = p;
        }
        Ok(InnerExit::Exited)
    }

    /// Remove an attached screen from the sequence and release it through the
    /// host. Teardown completes before any successor's resume hook runs.
    fn teardown(&mut self, id: ScreenId) {
        if let Some(pos) = self.sequence.iter().position(|s| *s == id) {
            self.sequence.remove(pos);
        }
        if let Some(e) = self.screens.get_mut(&id) {
            e.lifecycle = ScreenLifecycle::Exiting;
            e.exit_pending = true;
        }
        log::debug!("Tearing down {:?}", id);
        self.host.detach(id);
        if let Some(e) = self.screens.get_mut(&id) {
            e.lifecycle = ScreenLifecycle::Detached;
        }
        let parent = self.screens.get(&id).and_then(|e| e.parent);
        if let Some(p) = parent {
            if let Some(e) = self.screens.get_mut(&p) {
                if e.child == Some(id) {
                    e.child = None;
                }
            }
        }
    }

    /// Hand current status back up the chain after an exit. A parent that
    /// declared itself non-resumable is discarded instead of resumed, and
    /// resumption cascades to the nearest eligible ancestor.
    fn resume_into(&mut self, mut target: Option<ScreenId>, mut exited: ScreenId) {
        while let Some(t) = target {
            if !self.is_attached(t) {
                return;
            }
            let (policy, parent) = match self.screens.get(&t) {
                Some(e) => (e.resume_policy, e.parent),
                None => return,
            };
            if t == self.root || policy == ResumePolicy::Resume {
                self.fire_resuming(t, exited);
                if let Some(e) = self.screens.get_mut(&t) {
                    e.lifecycle = ScreenLifecycle::Current;
                }
                self.current = t;
                log::info!("▶️  {:?} resumed; now current", t);
                return;
            }
            log::info!("💀 Discarding {:?} (ResumePolicy::Discard)", t);
            if self.fire_exiting(t, parent) {
                log::debug!("  exit veto from {:?} ignored; screen is not resume-eligible", t);
            }
            self.teardown(t);
            exited = t;
            target = parent;
        }
    }

    /// Fire the enter transition for a committed push and confirm the
    /// external current pointer
    fn commit_push(&mut self, parent: Option<ScreenId>, child: ScreenId, suspend_fired: bool) {
        // a discarded push never reaches here, but a stale record must never
        // fire events for a screen whose exit has been recorded
        let valid = self
            .screens
            .get(&child)
            .map(|e| !e.exit_pending && e.lifecycle != ScreenLifecycle::Detached)
            .unwrap_or(false);
        if !valid {
            log::debug!("Dropping stale push commit for {:?}", child);
            return;
        }

        if let Some(e) = self.screens.get_mut(&child) {
            if e.load == LoadState::Loading {
                e.load.complete().ok();
            }
        }

        if let Some(parent) = parent {
            if !suspend_fired {
                self.fire_suspending(parent, child);
            }
            if let Some(e) = self.screens.get_mut(&parent) {
                e.lifecycle = ScreenLifecycle::Suspended;
            }
            self.fire_entering(child, Some(parent));
            self.sequence.push(child);
        } else {
            // root activation: already at index 0
            self.fire_entering(child, None);
        }

        if let Some(e) = self.screens.get_mut(&child) {
            e.lifecycle = ScreenLifecycle::Current;
        }
        // a push already pending on this screen has moved the external
        // pointer deeper; do not pull it back
        let has_deeper = self.screens.get(&child).and_then(|e| e.child).is_some();
        if !has_deeper {
            self.current = child;
        }
        log::info!("{:?} entered; now current", child);
    }

    /// Fire the parent's suspend hook at push time when configured to do so.
    /// The parent's lifecycle state is not touched: it keeps reporting
    /// current until the child actually enters. A parent that has not itself
    /// entered yet (the root before activation) never suspends early; its
    /// suspend fires at commit, after its own enter.
    fn maybe_suspend_early(&mut self, parent: ScreenId, child: ScreenId) -> bool {
        let entered = self
            .screens
            .get(&parent)
            .map(|e| e.lifecycle == ScreenLifecycle::Current)
            .unwrap_or(false);
        if self.config.suspend_immediately && entered {
            self.fire_suspending(parent, child);
            true
        } else {
            false
        }
    }

    fn has_pending_preload(&self, id: ScreenId) -> bool {
        self.pending_preloads.iter().any(|p| p.id == id)
    }

    fn delegate(&self, id: ScreenId) -> Option<Rc<RefCell<dyn ScreenDelegate>>> {
        self.screens.get(&id).map(|e| Rc::clone(&e.delegate))
    }

    fn fire_entering(&self, id: ScreenId, previous: Option<ScreenId>) {
        if let Some(d) = self.delegate(id) {
            log::debug!("  on_entering for {:?} (previous {:?})", id, previous);
            d.borrow_mut().on_entering(previous);
        }
    }

    fn fire_resuming(&self, id: ScreenId, previous: ScreenId) {
        if let Some(d) = self.delegate(id) {
            log::debug!("  on_resuming for {:?} (previous {:?})", id, previous);
            d.borrow_mut().on_resuming(previous);
        }
    }

    fn fire_suspending(&self, id: ScreenId, next: ScreenId) {
        if let Some(d) = self.delegate(id) {
            log::debug!("🛑 on_suspending for {:?} (next {:?})", id, next);
            d.borrow_mut().on_suspending(next);
        }
    }

    fn fire_exiting(&self, id: ScreenId, next: Option<ScreenId>) -> bool {
        match self.delegate(id) {
            Some(d) => {
                log::debug!("  on_exiting for {:?} (next {:?})", id, next);
                d.borrow_mut().on_exiting(next)
            }
            None => false,
        }
    }
}
