use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::action::Action;

/// Cloneable handle for queuing dispatches from observers and components.
///
/// Queued actions run after the current dispatch cycle has settled, one cycle
/// each, so a notification never re-enters the store.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    queue: Rc<RefCell<VecDeque<Action>>>,
}

impl Dispatcher {
    pub fn enqueue(&self, action: Action) {
        self.queue.borrow_mut().push_back(action);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    pub(crate) fn pop(&self) -> Option<Action> {
        self.queue.borrow_mut().pop_front()
    }

    pub(crate) fn clear(&self) -> usize {
        let mut queue = self.queue.borrow_mut();
        let dropped = queue.len();
        queue.clear();
        dropped
    }
}
