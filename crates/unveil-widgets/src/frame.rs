#![forbid(unsafe_code)]

//! Post-paint task queue.
//!
//! Work that needs laid-out content (measuring for placement, focusing newly
//! shown items) is deferred until after the next paint. The host calls
//! [`flush`] once per frame, after it has rendered; that is the engine's
//! equivalent of an animation-frame callback.
//!
//! Tasks queued while a flush is running wait for the next flush, the same
//! way a callback requested inside an animation frame runs on the following
//! frame.

use std::cell::RefCell;
use std::collections::VecDeque;

type Task = Box<dyn FnOnce()>;

thread_local! {
    static QUEUE: RefCell<VecDeque<Task>> = RefCell::new(VecDeque::new());
}

/// Queue `task` to run after the next paint.
pub fn request_after_paint(task: impl FnOnce() + 'static) {
    QUEUE.with(|q| q.borrow_mut().push_back(Box::new(task)));
}

/// Run every task queued before this call. Returns how many ran.
pub fn flush() -> usize {
    let batch = QUEUE.with(|q| std::mem::take(&mut *q.borrow_mut()));
    let count = batch.len();
    for task in batch {
        task();
    }
    if count > 0 {
        tracing::trace!(count, "post-paint tasks flushed");
    }
    count
}

/// Number of tasks waiting for the next flush.
pub fn pending() -> usize {
    QUEUE.with(|q| q.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn tasks_run_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let log = log.clone();
            request_after_paint(move || log.borrow_mut().push(i));
        }
        assert_eq!(pending(), 3);
        assert_eq!(flush(), 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        assert_eq!(pending(), 0);
    }

    #[test]
    fn tasks_queued_during_flush_wait_for_next_frame() {
        let ran = Rc::new(Cell::new(0));
        let inner = ran.clone();
        request_after_paint(move || {
            inner.set(inner.get() + 1);
            let again = inner.clone();
            request_after_paint(move || again.set(again.get() + 10));
        });

        assert_eq!(flush(), 1);
        assert_eq!(ran.get(), 1);
        assert_eq!(pending(), 1);
        assert_eq!(flush(), 1);
        assert_eq!(ran.get(), 11);
    }

    #[test]
    fn empty_flush() {
        assert_eq!(flush(), 0);
    }
}
