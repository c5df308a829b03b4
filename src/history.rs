// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::VecDeque;

use crate::Route;

/// Default number of previous [Routes](Route) kept by a [History].
pub const MAX_PREVIOUS_STATES: usize = 100;

/// Undo/redo stack of [Route] values.
///
/// As routes share unchanged segments, keeping many previous states is cheap.
#[derive(Debug, Clone)]
pub struct History {
    current: Route,
    undo: VecDeque<Route>,
    redo: Vec<Route>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Creates a history starting with an empty route.
    pub fn new() -> Self {
        Self::with_limit(MAX_PREVIOUS_STATES)
    }

    /// Creates a history remembering at most `limit` previous routes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            current: Route::new(),
            undo: VecDeque::default(),
            redo: Vec::default(),
            limit,
        }
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    /// Makes `route` the current route. Pushing a route equal to the current one is a no-op,
    /// so that no-op edits don't create undo steps.
    pub fn push(&mut self, route: Route) {
        if route == self.current {
            return;
        }

        let previous = std::mem::replace(&mut self.current, route);
        self.undo.push_back(previous);
        if self.undo.len() > self.limit {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Reverts to the previous route. Returns false if there's nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo.pop_back() {
            Some(previous) => {
                let undone = std::mem::replace(&mut self.current, previous);
                self.redo.push(undone);
                true
            }
            None => false,
        }
    }

    /// Re-applies the last undone route. Returns false if there's nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(next) => {
                let previous = std::mem::replace(&mut self.current, next);
                self.undo.push_back(previous);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Clears the route, as an undoable step.
    pub fn clear(&mut self) {
        self.push(Route::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Editor, Graph};

    #[test]
    fn undo_redo() {
        let g = Graph::new();
        let editor = Editor::new(&g);
        let mut h = History::new();

        h.push(editor.click(h.current(), 0.0, 0.0));
        h.push(editor.click(h.current(), 0.0, 0.001));
        assert_eq!(h.current().len(), 2);

        assert!(h.undo());
        assert_eq!(h.current().len(), 1);
        assert!(h.undo());
        assert!(h.current().is_empty());
        assert!(!h.undo());

        assert!(h.redo());
        assert!(h.redo());
        assert_eq!(h.current().len(), 2);
        assert!(!h.redo());
    }

    #[test]
    fn push_clears_redo_and_skips_noops() {
        let g = Graph::new();
        let editor = Editor::new(&g);
        let mut h = History::new();

        h.push(editor.click(h.current(), 0.0, 0.0));
        h.push(editor.delete_waypoint(h.current(), 5));
        assert!(h.can_undo());
        assert!(h.undo());
        assert!(!h.can_undo());

        h.push(editor.click(h.current(), 1.0, 1.0));
        assert!(!h.can_redo());

        h.clear();
        assert!(h.current().is_empty());
        assert!(h.undo());
        assert_eq!(h.current().len(), 1);
    }

    #[test]
    fn limit_drops_oldest() {
        let g = Graph::new();
        let editor = Editor::new(&g);
        let mut h = History::with_limit(2);

        for i in 0..5 {
            h.push(editor.click(h.current(), 0.0, i as f64 * 0.001));
        }
        assert!(h.undo());
        assert!(h.undo());
        assert!(!h.undo());
        assert_eq!(h.current().len(), 3);
    }
}
