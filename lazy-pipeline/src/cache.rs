// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use std::cell::RefCell;
use std::rc::Rc;

use crate::source::Source;

/// An append-only realized prefix plus an `exhausted` bit, shared by every
/// iterator handle opened against the same cached pipeline instance.
///
/// The upstream iterator is opened lazily on first access and then pulled
/// at most once per position; a second `CachingIter` racing the first one
/// sees whatever the first has already realized and only pulls upstream
/// for positions beyond that.
pub(crate) struct CacheState<T> {
    source: Source<T>,
    realized: Vec<T>,
    exhausted: bool,
    upstream: Option<Box<dyn Iterator<Item = T>>>,
}

impl<T: 'static> CacheState<T> {
    pub(crate) fn new(source: Source<T>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(CacheState {
            source,
            realized: Vec::new(),
            exhausted: false,
            upstream: None,
        }))
    }
}

/// Reads from a [`CacheState`] shared across every `open()` call made on a
/// cached pipeline. Cloning a pipeline does *not* clone this handle - each
/// clone gets its own fresh `CacheState`, per the "cache is per-pipeline-
/// instance" invariant.
pub(crate) struct CachingIter<T> {
    cache: Rc<RefCell<CacheState<T>>>,
    pos: usize,
}

impl<T: Clone + 'static> CachingIter<T> {
    pub(crate) fn new(cache: Rc<RefCell<CacheState<T>>>) -> Self {
        CachingIter { cache, pos: 0 }
    }
}

impl<T: Clone + 'static> Iterator for CachingIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let mut state = self.cache.borrow_mut();

        if self.pos < state.realized.len() {
            let item = state.realized[self.pos].clone();
            self.pos += 1;
            return Some(item);
        }

        if state.exhausted {
            return None;
        }

        if state.upstream.is_none() {
            let source = state.source.clone();
            state.upstream = Some(source.open());
        }

        match state.upstream.as_mut().expect("just initialized above").next() {
            Some(item) => {
                state.realized.push(item.clone());
                self.pos += 1;
                Some(item)
            }
            None => {
                state.exhausted = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn second_iteration_reuses_cached_items_without_recomputing() {
        let calls = Rc::new(Cell::new(0));
        let calls_inner = Rc::clone(&calls);
        let source = Source::restartable(move || {
            let calls = Rc::clone(&calls_inner);
            Box::new((0..5).map(move |x| {
                calls.set(calls.get() + 1);
                x * x
            })) as Box<dyn Iterator<Item = i32>>
        });

        let state = CacheState::new(source);
        let first: Vec<i32> = CachingIter::new(Rc::clone(&state)).collect();
        let second: Vec<i32> = CachingIter::new(Rc::clone(&state)).collect();

        assert_eq!(first, second);
        assert_eq!(calls.get(), 5, "upstream handler must run exactly once per item");
    }

    #[test]
    fn partial_then_full_traversal_extends_the_cache() {
        let source = Source::restartable(|| Box::new(0..5) as Box<dyn Iterator<Item = i32>>);
        let state = CacheState::new(source);

        let partial: Vec<i32> = CachingIter::new(Rc::clone(&state)).take(2).collect();
        assert_eq!(partial, vec![0, 1]);

        let full: Vec<i32> = CachingIter::new(Rc::clone(&state)).collect();
        assert_eq!(full, vec![0, 1, 2, 3, 4]);
    }
}
