//! Render roots - materialize descriptors into a container and keep them live.
//!
//! A [`RenderRoot`] binds one descriptor tree to one container element. Every
//! state change re-renders the whole tree from the root and swaps the
//! container's children wholesale; there is no diffing.
//!
//! # Render pass
//!
//! 1. Check the container is still claimed by this root
//! 2. Build the new output into a detached fragment, visiting instances
//! 3. Swap the fragment's children into the container (old output released)
//! 4. Tear down instances the pass did not visit
//! 5. Run dirty effects in visitation order
//!
//! A failed pass releases what it built and leaves the previous output alone.
//!
//! # Re-entrancy
//!
//! State updates while the root is idle render immediately. Updates issued
//! from a component body or an effect are queued and rendered right after the
//! running pass, up to [`RootOptions::max_render_passes`] passes in a row.
//!
//! # Example
//!
//! ```ignore
//! let doc = Document::new();
//! let container = doc.create_element("main")?;
//! let root = render(h!(Component::new("App", app), ()), &doc, container)?;
//! // ... dispatch events, state setters re-render `root` ...
//! root.unmount();
//! ```

mod context;
mod instance;
mod materialize;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use spark_signals::{Signal, signal};

use crate::dom::{Document, NodeId, NodeKind};
use crate::element::{Child, Element};
use crate::error::{RenderError, Result};

pub use instance::{Cleanup, PathSegment, TreePath};

pub(crate) use context::next_hook;
pub(crate) use instance::{EffectFlags, EffectSlot, HookSlot, InstanceRef, PendingEffect};

use instance::{Cleanup as Teardown, InstanceTable};
use materialize::Materializer;

// =============================================================================
// Options
// =============================================================================

/// Per-root configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootOptions {
    /// Consecutive render passes allowed before giving up with
    /// [`RenderError::RenderLoop`]. Values below 1 count as 1.
    pub max_render_passes: usize,
    /// Text of the comment node that stands in for empty output.
    pub placeholder_text: String,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            max_render_passes: 100,
            placeholder_text: "empty".to_string(),
        }
    }
}

// =============================================================================
// Root State
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Rendering,
    Effects,
}

pub(crate) struct RootInner {
    document: Document,
    container: NodeId,
    token: u64,
    options: RootOptions,
    element: RefCell<Option<Element>>,
    instances: RefCell<InstanceTable>,
    phase: Cell<Phase>,
    pending: Cell<bool>,
    unmounted: Cell<bool>,
    renders: Signal<u64>,
}

impl RootInner {
    /// Render now, or queue a pass if one is already running.
    fn flush(self: &Rc<Self>) -> Result<()> {
        if self.unmounted.get() {
            return Err(RenderError::Unmounted);
        }
        if self.phase.get() != Phase::Idle {
            self.pending.set(true);
            return Ok(());
        }

        let max_passes = self.options.max_render_passes.max(1);
        let mut passes = 0;
        loop {
            if passes == max_passes {
                self.pending.set(false);
                return Err(RenderError::RenderLoop(passes));
            }
            passes += 1;
            self.pending.set(false);
            self.render_pass()?;
            if !self.pending.get() || self.unmounted.get() {
                return Ok(());
            }
        }
    }

    fn render_pass(self: &Rc<Self>) -> Result<()> {
        if !self.document.is_claimed_by(self.container, self.token) {
            return Err(RenderError::Superseded(self.container));
        }
        let Some(element) = self.element.borrow().clone() else {
            return Ok(());
        };

        let _span = tracing::debug_span!("render_pass", container = %self.container).entered();
        self.phase.set(Phase::Rendering);

        let previous = std::mem::take(&mut *self.instances.borrow_mut());
        // Handles only; restored untouched if the pass fails.
        let committed_instances = previous.clone();
        let fragment = self.document.create_fragment();
        let mut materializer = Materializer::new(
            &self.document,
            Scheduler::for_root(self),
            &self.options.placeholder_text,
            previous,
        );
        let built = materializer.materialize(&Child::Element(element), &TreePath::root(), fragment);
        let outcome = materializer.finish();

        let committed = built.and_then(|()| {
            self.document
                .replace_children(self.container, &[fragment])
                .map_err(RenderError::from)
        });
        self.document.release(fragment);

        if let Err(err) = committed {
            tracing::debug!(%err, "render pass failed, keeping previous output");
            // Instances created by the failed pass never ran effects.
            drop(outcome);
            *self.instances.borrow_mut() = committed_instances;
            self.phase.set(Phase::Idle);
            return Err(err);
        }

        tracing::debug!(
            instances = outcome.current.len(),
            removed = outcome.unvisited.len() + outcome.discarded.len(),
            "render pass committed"
        );
        *self.instances.borrow_mut() = outcome.current;

        self.phase.set(Phase::Effects);
        run_teardowns(outcome.discarded);
        run_teardowns(outcome.unvisited.into_values());
        self.run_effects();
        self.phase.set(Phase::Idle);

        self.renders.set(self.renders.get() + 1);
        Ok(())
    }

    /// Run dirty effects, instance by instance in visitation order.
    fn run_effects(&self) {
        let instances: Vec<InstanceRef> = self.instances.borrow().values().cloned().collect();
        for instance in instances {
            // Unmount already tore down every instance it could reach.
            if self.unmounted.get() {
                break;
            }
            let jobs = instance.borrow_mut().take_dirty_effects();
            for job in jobs {
                if let Some(teardown) = job.teardown {
                    teardown();
                }
                if self.unmounted.get() {
                    continue;
                }
                tracing::trace!(
                    path = %instance.borrow().path(),
                    slot = job.slot,
                    "running effect"
                );
                let teardown = (job.run)();
                let orphan = if self.unmounted.get() {
                    teardown
                } else {
                    instance.borrow_mut().finish_effect(job.slot, job.deps, teardown)
                };
                if let Some(orphan) = orphan {
                    orphan();
                }
            }
        }
    }

    fn unmount(&self) {
        if self.unmounted.replace(true) {
            return;
        }
        let instances = std::mem::take(&mut *self.instances.borrow_mut());
        run_teardowns(instances.into_values());
        // Only clear output this root actually committed.
        let owns_output = self.renders.get() > 0
            && self.document.is_claimed_by(self.container, self.token);
        if owns_output {
            if let Err(err) = self.document.replace_children(self.container, &[]) {
                tracing::warn!(%err, "failed to clear container on unmount");
            }
        }
        self.element.borrow_mut().take();
        tracing::debug!(container = %self.container, "render root unmounted");
    }
}

fn run_teardowns(instances: impl IntoIterator<Item = InstanceRef>) {
    for instance in instances {
        let teardowns: Vec<Teardown> = instance.borrow_mut().take_teardowns();
        for teardown in teardowns {
            teardown();
        }
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Capability handed to state setters: re-render the owning root.
#[derive(Clone)]
pub(crate) struct Scheduler {
    root: Weak<RootInner>,
}

impl Scheduler {
    fn for_root(root: &Rc<RootInner>) -> Self {
        Self {
            root: Rc::downgrade(root),
        }
    }

    /// A scheduler bound to nothing; requests are ignored.
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self { root: Weak::new() }
    }

    pub(crate) fn request_render(&self) {
        let Some(root) = self.root.upgrade() else {
            tracing::trace!("state update for a dropped root ignored");
            return;
        };
        if root.unmounted.get() {
            tracing::trace!("state update for an unmounted root ignored");
            return;
        }
        if let Err(err) = root.flush() {
            tracing::error!(%err, container = %root.container, "re-render after state update failed");
        }
    }
}

// =============================================================================
// Render Root
// =============================================================================

/// Handle to a rendered tree.
///
/// State setters only hold a weak reference to the root, so the handle must
/// be kept alive for updates to render. Dropping the handle unmounts.
#[must_use = "dropping a RenderRoot unmounts it"]
pub struct RenderRoot {
    inner: Rc<RootInner>,
}

impl std::fmt::Debug for RenderRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderRoot")
            .field("container", &self.inner.container)
            .field("renders", &self.inner.renders.get())
            .field("unmounted", &self.inner.unmounted.get())
            .finish()
    }
}

impl RenderRoot {
    /// Render `element`, replacing the descriptor this root renders.
    pub fn render(&self, element: Element) -> Result<()> {
        if self.inner.unmounted.get() {
            return Err(RenderError::Unmounted);
        }
        *self.inner.element.borrow_mut() = Some(element);
        self.inner.flush()
    }

    /// Re-render the current descriptor.
    pub fn update(&self) -> Result<()> {
        self.inner.flush()
    }

    /// Run every effect teardown and clear the container.
    pub fn unmount(self) {
        self.inner.unmount();
    }

    pub fn container(&self) -> NodeId {
        self.inner.container
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub fn is_mounted(&self) -> bool {
        !self.inner.unmounted.get()
    }

    /// Number of committed render passes.
    pub fn render_count(&self) -> u64 {
        self.inner.renders.get()
    }

    /// Reactive view of [`render_count`](Self::render_count).
    pub fn render_count_signal(&self) -> Signal<u64> {
        self.inner.renders.clone()
    }
}

impl Drop for RenderRoot {
    fn drop(&mut self) {
        self.inner.unmount();
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// Claim `container` for a new root without rendering anything yet.
pub fn create_root(document: &Document, container: NodeId) -> Result<RenderRoot> {
    create_root_with(document, container, RootOptions::default())
}

/// [`create_root`] with explicit options.
///
/// Fails with [`RenderError::InvalidContainer`] unless `container` is a live
/// element. Any root previously rendering into `container` is superseded.
pub fn create_root_with(
    document: &Document,
    container: NodeId,
    options: RootOptions,
) -> Result<RenderRoot> {
    match document.kind(container) {
        Ok(NodeKind::Element) => {}
        _ => return Err(RenderError::InvalidContainer(container)),
    }
    let token = document.claim(container);
    tracing::debug!(%container, token, "render root created");
    Ok(RenderRoot {
        inner: Rc::new(RootInner {
            document: document.clone(),
            container,
            token,
            options,
            element: RefCell::new(None),
            instances: RefCell::new(InstanceTable::default()),
            phase: Cell::new(Phase::Idle),
            pending: Cell::new(false),
            unmounted: Cell::new(false),
            renders: signal(0),
        }),
    })
}

/// Render `element` into `container`, replacing its children, and run effects.
pub fn render(element: Element, document: &Document, container: NodeId) -> Result<RenderRoot> {
    let root = create_root(document, container)?;
    root.render(element)?;
    Ok(root)
}
