//! Paint-ordered collection of the live modal windows.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::scene::Scene;
use crate::window::Window;

/// Shared handle to the ordered list of live windows, bottom to top.
///
/// Always a true stack: the only element ever removed is the last one,
/// enforced by [`StackGuard`].
#[derive(Clone, Default)]
pub struct WindowStack {
    inner: Rc<RefCell<Vec<Rc<dyn Window>>>>,
}

impl WindowStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    pub fn top(&self) -> Option<Rc<dyn Window>> {
        self.inner.borrow().last().cloned()
    }

    /// Push a window. The guard pops it again on drop and insists the pop
    /// happens in reverse push order.
    #[must_use]
    pub fn push(&self, window: Rc<dyn Window>) -> StackGuard {
        self.inner.borrow_mut().push(window);
        StackGuard {
            stack: self.clone(),
            depth: self.len(),
        }
    }

    /// The windows bottom to top, detached from the live list so callers
    /// may push while iterating.
    pub fn snapshot(&self) -> SmallVec<[Rc<dyn Window>; 4]> {
        self.inner.borrow().iter().cloned().collect()
    }

    /// Repaint pass: start at the nearest-to-top full-screen window (or
    /// the bottom if there is none) and draw upward, so upper windows draw
    /// over lower ones. Only the topmost gets `has_focus`.
    pub fn compose(&self, scene: &mut Scene) {
        let windows = self.snapshot();
        if windows.is_empty() {
            return;
        }
        let mut first = windows.len() - 1;
        while first > 0 && !windows[first].is_full_screen() {
            first -= 1;
        }
        for (i, window) in windows.iter().enumerate().skip(first) {
            window.render(scene, i + 1 == windows.len());
        }
    }
}

/// Scoped pop. Dropping guards out of push order is a programming error
/// and panics rather than silently corrupting paint order.
pub struct StackGuard {
    stack: WindowStack,
    depth: usize,
}

impl StackGuard {
    /// 1-based position of the guarded window, bottom to top.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        let mut windows = self.stack.inner.borrow_mut();
        assert_eq!(
            windows.len(),
            self.depth,
            "window popped out of stack order"
        );
        windows.pop();
    }
}
