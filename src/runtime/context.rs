//! Render context stack - which instance the running component belongs to.
//!
//! The materializer pushes a frame before invoking a component and pops it
//! afterwards, the same way the parent index stack scopes nested creation.
//! Hooks read the top frame and advance its cursor.

use std::cell::RefCell;

use super::Scheduler;
use super::instance::InstanceRef;

struct Frame {
    instance: InstanceRef,
    cursor: usize,
    scheduler: Scheduler,
}

thread_local! {
    /// Stack of component frames; the top one is currently rendering.
    static FRAMES: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Pops its frame when dropped.
pub(crate) struct FrameGuard {
    _private: (),
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        FRAMES.with(|frames| {
            frames.borrow_mut().pop();
        });
    }
}

/// Make `instance` the current component with its hook cursor at 0.
pub(crate) fn enter(instance: InstanceRef, scheduler: Scheduler) -> FrameGuard {
    FRAMES.with(|frames| {
        frames.borrow_mut().push(Frame {
            instance,
            cursor: 0,
            scheduler,
        });
    });
    FrameGuard { _private: () }
}

/// The slot a hook call resolved to.
pub(crate) struct HookCursor {
    pub instance: InstanceRef,
    pub index: usize,
    pub scheduler: Scheduler,
}

/// Claim the next hook slot of the rendering component.
///
/// # Panics
///
/// When called outside of a component render.
pub(crate) fn next_hook(hook: &'static str) -> HookCursor {
    FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        let Some(frame) = frames.last_mut() else {
            panic!("{hook} called outside of a component render");
        };
        let index = frame.cursor;
        frame.cursor += 1;
        HookCursor {
            instance: frame.instance.clone(),
            index,
            scheduler: frame.scheduler.clone(),
        }
    })
}

/// Depth of nested component renders on this thread.
pub(crate) fn depth() -> usize {
    FRAMES.with(|frames| frames.borrow().len())
}
