//! Hooks - per-instance state for function components.
//!
//! Hooks are only valid while a component is rendering. Each call takes the
//! next slot of the running instance, so a component must call the same hooks
//! in the same order on every render. Calling them conditionally is not
//! detected; a slot whose stored type no longer fits is reinitialized.
//!
//! - [`use_state`] / [`use_state_lazy`] - value plus a setter that re-renders
//! - [`use_effect`] / [`use_effect_with`] - side effects after commit
//! - [`use_ref`] - mutable cell with stable identity
//! - [`use_memo`] - cached derived value
//!
//! # Example
//!
//! ```ignore
//! fn counter(_: &Props, _: &[Child]) -> Child {
//!     let (count, set_count) = use_state(0);
//!     use_effect_with(count, move || println!("count is {count}"));
//!     h!("button", Props::new().on("onClick", move |_| set_count.update(|c| c + 1)), count).into()
//! }
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::runtime::{
    Cleanup, EffectFlags, EffectSlot, HookSlot, PendingEffect, next_hook,
};

pub use state::StateSetter;

mod state {
    use std::cell::RefCell;
    use std::fmt;
    use std::rc::Rc;

    use crate::runtime::Scheduler;

    /// Setter returned by [`use_state`](super::use_state).
    ///
    /// Setting stores the value and re-renders the owning root right away, or
    /// right after the running pass when called from a render or an effect.
    pub struct StateSetter<T> {
        pub(super) cell: Rc<RefCell<T>>,
        pub(super) scheduler: Scheduler,
    }

    impl<T> Clone for StateSetter<T> {
        fn clone(&self) -> Self {
            Self {
                cell: self.cell.clone(),
                scheduler: self.scheduler.clone(),
            }
        }
    }

    impl<T> fmt::Debug for StateSetter<T> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("StateSetter(..)")
        }
    }

    impl<T: 'static> StateSetter<T> {
        /// Replace the value.
        pub fn set(&self, value: T) {
            *self.cell.borrow_mut() = value;
            self.scheduler.request_render();
        }

        /// Compute the next value from the current one.
        pub fn update(&self, f: impl FnOnce(&T) -> T) {
            let next = f(&self.cell.borrow());
            self.set(next);
        }

        /// The value as of now, which may be newer than the rendered one.
        pub fn get(&self) -> T
        where
            T: Clone,
        {
            self.cell.borrow().clone()
        }
    }
}

// =============================================================================
// State
// =============================================================================

/// Local state initialized with `initial` on the first render.
pub fn use_state<T: Clone + 'static>(initial: T) -> (T, StateSetter<T>) {
    use_state_lazy(move || initial)
}

/// Local state initialized by calling `init` on the first render only.
pub fn use_state_lazy<T: Clone + 'static>(init: impl FnOnce() -> T) -> (T, StateSetter<T>) {
    let hook = next_hook("use_state");
    let existing = match hook.instance.borrow().slot(hook.index) {
        Some(HookSlot::State(cell)) => cell.clone().downcast::<RefCell<T>>().ok(),
        _ => None,
    };
    let cell = match existing {
        Some(cell) => cell,
        None => {
            let cell = Rc::new(RefCell::new(init()));
            hook.instance
                .borrow_mut()
                .set_slot(hook.index, HookSlot::State(cell.clone()));
            cell
        }
    };
    let value = cell.borrow().clone();
    (
        value,
        StateSetter {
            cell,
            scheduler: hook.scheduler,
        },
    )
}

// =============================================================================
// Ref
// =============================================================================

/// A mutable cell that keeps its identity across renders.
///
/// Updating it does not re-render.
pub fn use_ref<T: 'static>(initial: T) -> Rc<RefCell<T>> {
    let hook = next_hook("use_ref");
    let existing = match hook.instance.borrow().slot(hook.index) {
        Some(HookSlot::Ref(cell)) => cell.clone().downcast::<RefCell<T>>().ok(),
        _ => None,
    };
    existing.unwrap_or_else(|| {
        let cell = Rc::new(RefCell::new(initial));
        hook.instance
            .borrow_mut()
            .set_slot(hook.index, HookSlot::Ref(cell.clone()));
        cell
    })
}

// =============================================================================
// Memo
// =============================================================================

/// Cache `compute(&deps)` until `deps` changes.
pub fn use_memo<T: 'static, D: PartialEq + 'static>(
    deps: D,
    compute: impl FnOnce(&D) -> T,
) -> Rc<T> {
    let hook = next_hook("use_memo");
    let (had_memo, cached) = match hook.instance.borrow().slot(hook.index) {
        Some(HookSlot::Memo { deps: old, value }) => {
            let fresh = old.downcast_ref::<D>() == Some(&deps);
            (true, fresh.then(|| value.clone().downcast::<T>().ok()).flatten())
        }
        _ => (false, None),
    };
    if let Some(value) = cached {
        return value;
    }

    let value = Rc::new(compute(&deps));
    let mut instance = hook.instance.borrow_mut();
    let stored: Rc<dyn Any> = value.clone();
    if had_memo {
        if let Some(HookSlot::Memo { deps: old, value: old_value }) = instance.slot_mut(hook.index) {
            *old = Box::new(deps);
            *old_value = stored;
        }
    } else {
        instance.set_slot(
            hook.index,
            HookSlot::Memo {
                deps: Box::new(deps),
                value: stored,
            },
        );
    }
    value
}

// =============================================================================
// Effect
// =============================================================================

/// What an effect may return: nothing, or a teardown closure.
///
/// The teardown runs before the effect runs again and when its component
/// leaves the tree or the root unmounts.
pub trait TearDown: Sized + 'static {
    fn into_cleanup(self) -> Option<Cleanup>;
}

impl TearDown for () {
    fn into_cleanup(self) -> Option<Cleanup> {
        None
    }
}

impl<F: FnOnce() + 'static> TearDown for F {
    fn into_cleanup(self) -> Option<Cleanup> {
        Some(Box::new(self))
    }
}

/// Run `effect` after every committed render of this component.
pub fn use_effect<F, R>(effect: F)
where
    F: FnOnce() -> R + 'static,
    R: TearDown,
{
    register_effect::<(), F, R>(None, effect);
}

/// Run `effect` after the first render and whenever `deps` differs from the
/// dependencies of its previous run. Pass `()` to run once.
pub fn use_effect_with<D, F, R>(deps: D, effect: F)
where
    D: PartialEq + 'static,
    F: FnOnce() -> R + 'static,
    R: TearDown,
{
    register_effect(Some(deps), effect);
}

fn register_effect<D, F, R>(deps: Option<D>, effect: F)
where
    D: PartialEq + 'static,
    F: FnOnce() -> R + 'static,
    R: TearDown,
{
    let hook = next_hook("use_effect");
    let mut instance = hook.instance.borrow_mut();
    if !matches!(instance.slot(hook.index), Some(HookSlot::Effect(_))) {
        instance.set_slot(hook.index, HookSlot::Effect(EffectSlot::default()));
    }
    let Some(HookSlot::Effect(slot)) = instance.slot_mut(hook.index) else {
        return;
    };

    let dirty = match (&deps, &slot.deps) {
        _ if !slot.flags.contains(EffectFlags::MOUNTED) => true,
        (Some(next), Some(last)) => last.downcast_ref::<D>() != Some(next),
        _ => true,
    };
    if dirty {
        slot.pending = Some(PendingEffect {
            run: Box::new(move || effect().into_cleanup()),
            deps: deps.map(|d| Box::new(d) as Box<dyn Any>),
        });
        slot.flags.insert(EffectFlags::DIRTY);
    } else {
        slot.pending = None;
        slot.flags.remove(EffectFlags::DIRTY);
    }
}
