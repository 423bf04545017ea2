//! Component instances and their hook slots.
//!
//! Each component invocation in the tree owns one [`Instance`], addressed by a
//! [`TreePath`]. Path segments are child positions, or the child's `key` when
//! it has one, so keyed list items keep their state when siblings move.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::element::Component;

/// Teardown closure returned by an effect.
pub type Cleanup = Box<dyn FnOnce()>;

pub(crate) type EffectFn = Box<dyn FnOnce() -> Option<Cleanup>>;

pub(crate) type InstanceRef = Rc<RefCell<Instance>>;

/// Instances of one render root in visitation order.
pub(crate) type InstanceTable = IndexMap<TreePath, InstanceRef>;

// =============================================================================
// Tree Path
// =============================================================================

/// One step from a parent to a child.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

/// Position of a component instance, from the render root down.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TreePath(Vec<PathSegment>);

impl TreePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        self.child(PathSegment::Index(index))
    }

    pub fn keyed(&self, key: impl Into<String>) -> Self {
        self.child(PathSegment::Key(key.into()))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("root")?;
        for segment in &self.0 {
            match segment {
                PathSegment::Index(i) => write!(f, ".{i}")?,
                PathSegment::Key(k) => write!(f, ".[{k}]")?,
            }
        }
        Ok(())
    }
}

// =============================================================================
// Hook Slots
// =============================================================================

bitflags::bitflags! {
    /// Effect slot state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(crate) struct EffectFlags: u8 {
        /// A run is queued for the next effect pass.
        const DIRTY = 1 << 0;
        /// The effect has run at least once.
        const MOUNTED = 1 << 1;
    }
}

pub(crate) struct PendingEffect {
    pub run: EffectFn,
    pub deps: Option<Box<dyn Any>>,
}

#[derive(Default)]
pub(crate) struct EffectSlot {
    /// Dependencies of the last run.
    pub deps: Option<Box<dyn Any>>,
    pub pending: Option<PendingEffect>,
    pub teardown: Option<Cleanup>,
    pub flags: EffectFlags,
}

pub(crate) enum HookSlot {
    /// `Rc<RefCell<T>>`
    State(Rc<dyn Any>),
    /// `Rc<RefCell<T>>`
    Ref(Rc<dyn Any>),
    Memo {
        deps: Box<dyn Any>,
        value: Rc<dyn Any>,
    },
    Effect(EffectSlot),
}

impl HookSlot {
    fn name(&self) -> &'static str {
        match self {
            HookSlot::State(_) => "state",
            HookSlot::Ref(_) => "ref",
            HookSlot::Memo { .. } => "memo",
            HookSlot::Effect(_) => "effect",
        }
    }
}

/// A queued effect run taken out of its slot.
pub(crate) struct EffectJob {
    pub slot: usize,
    pub run: EffectFn,
    pub deps: Option<Box<dyn Any>>,
    pub teardown: Option<Cleanup>,
}

// =============================================================================
// Instance
// =============================================================================

pub(crate) struct Instance {
    component: TypeId,
    name: &'static str,
    path: TreePath,
    slots: Vec<HookSlot>,
}

impl Instance {
    pub fn new(component: &Component, path: TreePath) -> InstanceRef {
        Rc::new(RefCell::new(Self {
            component: component.type_id(),
            name: component.name(),
            path,
            slots: Vec::new(),
        }))
    }

    pub fn is_instance_of(&self, component: &Component) -> bool {
        self.component == component.type_id()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn path(&self) -> &TreePath {
        &self.path
    }

    pub fn slot(&self, index: usize) -> Option<&HookSlot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut HookSlot> {
        self.slots.get_mut(index)
    }

    /// Store `slot` at `index`, replacing whatever a previous render left there.
    pub fn set_slot(&mut self, index: usize, slot: HookSlot) {
        if let Some(existing) = self.slots.get_mut(index) {
            tracing::warn!(
                component = self.name,
                path = %self.path,
                index,
                was = existing.name(),
                now = slot.name(),
                "hook slot reinitialized; hooks were called in a different order"
            );
            *existing = slot;
        } else {
            self.slots.push(slot);
        }
    }

    /// Take every queued effect run, clearing its dirty flag.
    pub fn take_dirty_effects(&mut self) -> Vec<EffectJob> {
        let mut jobs = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let HookSlot::Effect(effect) = slot else { continue };
            if !effect.flags.contains(EffectFlags::DIRTY) {
                continue;
            }
            effect.flags.remove(EffectFlags::DIRTY);
            if let Some(pending) = effect.pending.take() {
                jobs.push(EffectJob {
                    slot: index,
                    run: pending.run,
                    deps: pending.deps,
                    teardown: effect.teardown.take(),
                });
            }
        }
        jobs
    }

    /// Record the result of an effect run. Returns the teardown back when the
    /// slot no longer holds an effect.
    pub fn finish_effect(
        &mut self,
        index: usize,
        deps: Option<Box<dyn Any>>,
        teardown: Option<Cleanup>,
    ) -> Option<Cleanup> {
        match self.slots.get_mut(index) {
            Some(HookSlot::Effect(effect)) => {
                effect.deps = deps;
                effect.teardown = teardown;
                effect.flags.insert(EffectFlags::MOUNTED);
                None
            }
            _ => teardown,
        }
    }

    /// Take every stored teardown, in slot order.
    pub fn take_teardowns(&mut self) -> Vec<Cleanup> {
        self.slots
            .iter_mut()
            .filter_map(|slot| match slot {
                HookSlot::Effect(effect) => {
                    effect.pending = None;
                    effect.teardown.take()
                }
                _ => None,
            })
            .collect()
    }
}
