use std::collections::VecDeque;

use tracing::debug;

/// Linear undo/redo store around a single current value.
///
/// `past` runs oldest to newest and `future` nearest-redo first. A fresh
/// [`History::update`] discards every redo step. With a maximum depth, the
/// oldest undo steps are dropped once `past` grows beyond it.
#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    current: T,
    future: VecDeque<T>,
    max_depth: Option<usize>,
}

impl<T: Clone> History<T> {
    /// Unbounded history seeded with `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            past: VecDeque::new(),
            current: initial,
            future: VecDeque::new(),
            max_depth: None,
        }
    }

    /// History keeping at most `max_depth` undo steps. `None` is unbounded.
    pub fn with_max_depth(initial: T, max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            ..Self::new(initial)
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    /// Makes `value` current, recording the previous value for undo.
    pub fn update(&mut self, value: T) {
        let previous = std::mem::replace(&mut self.current, value);
        self.past.push_back(previous);
        self.future.clear();

        if let Some(max) = self.max_depth {
            while self.past.len() > max {
                self.past.pop_front();
            }
        }
        debug!(undo = self.past.len(), "history updated");
    }

    /// Steps back one edit. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let undone = std::mem::replace(&mut self.current, previous);
        self.future.push_front(undone);
        debug!(undo = self.past.len(), redo = self.future.len(), "undo");
        true
    }

    /// Re-applies the most recently undone edit. Returns `false` when there
    /// is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let replaced = std::mem::replace(&mut self.current, next);
        self.past.push_back(replaced);
        debug!(undo = self.past.len(), redo = self.future.len(), "redo");
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    /// Replaces the current value and forgets both stacks.
    pub fn reset(&mut self, value: T) {
        self.past.clear();
        self.future.clear();
        self.current = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_and_redo_round_trip() {
        let mut history = History::new("s0");
        history.update("s1");

        assert!(history.undo());
        assert_eq!(*history.current(), "s0");
        assert!(history.redo());
        assert_eq!(*history.current(), "s1");
    }

    #[test]
    fn fresh_edit_discards_redo_branch() {
        let mut history = History::new("s0");
        history.update("s1");
        history.undo();
        history.update("s2");

        assert!(!history.can_redo());
        assert!(!history.redo());
        assert_eq!(*history.current(), "s2");
        history.undo();
        assert_eq!(*history.current(), "s0");
    }

    #[test]
    fn empty_stacks_are_no_ops() {
        let mut history = History::new(1);
        assert!(!history.can_undo());
        assert!(!history.undo());
        assert!(!history.redo());
        assert_eq!(*history.current(), 1);
    }

    #[test]
    fn redo_order_is_nearest_first() {
        let mut history = History::new(0);
        for value in 1..=3 {
            history.update(value);
        }
        history.undo();
        history.undo();
        assert_eq!(history.redo_len(), 2);

        history.redo();
        assert_eq!(*history.current(), 2);
        history.redo();
        assert_eq!(*history.current(), 3);
    }

    #[test]
    fn bounded_history_drops_oldest_steps() {
        let mut history = History::with_max_depth(0, Some(2));
        for value in 1..=4 {
            history.update(value);
        }

        assert_eq!(history.undo_len(), 2);
        assert!(history.undo());
        assert!(history.undo());
        assert!(!history.undo());
        assert_eq!(*history.current(), 2);
    }

    #[test]
    fn reset_clears_both_stacks() {
        let mut history = History::new('a');
        history.update('b');
        history.undo();
        history.reset('z');

        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(*history.current(), 'z');
    }
}
