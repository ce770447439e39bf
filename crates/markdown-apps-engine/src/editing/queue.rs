use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::apps::{AppContext, EditCallback};

/// An application's new body and the block it belongs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub text: String,
    pub context: AppContext,
}

/// Collects edits reported by mounted applications until the host applies them.
///
/// Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct EditQueue {
    pending: Rc<RefCell<VecDeque<EditRequest>>>,
}

impl EditQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// An `on_edit` callback that pushes onto this queue.
    pub fn callback(&self) -> EditCallback {
        let pending = Rc::clone(&self.pending);
        Rc::new(move |text, context| {
            pending
                .borrow_mut()
                .push_back(EditRequest { text, context });
        })
    }

    pub fn push(&self, edit: EditRequest) {
        self.pending.borrow_mut().push_back(edit);
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// All pending edits, oldest first.
    pub fn drain(&self) -> Vec<EditRequest> {
        self.pending.borrow_mut().drain(..).collect()
    }

    /// The newest edit, discarding the rest.
    ///
    /// Every queued edit carries a span from the same render, so only one of them can be
    /// applied before the page has to be rendered again.
    pub fn take_last(&self) -> Option<EditRequest> {
        let mut pending = self.pending.borrow_mut();
        let last = pending.pop_back();
        if !pending.is_empty() {
            log::warn!("Dropping {} superseded edits", pending.len());
            pending.clear();
        }
        last
    }
}
