// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use std::cell::RefCell;
use std::rc::Rc;

/// The traversal a pipeline is built on.
///
/// A source is either **restartable** (a factory that can build a fresh
/// iterator on demand, e.g. over an owned `Vec`) or **single-pass** (a
/// shared, already-started iterator, e.g. reading lines from stdin). The
/// pipeline records which kind it has but never enforces one over the
/// other; driving a single-pass source a second time without caching
/// simply observes whatever the first traversal left behind.
#[derive(Clone)]
pub(crate) enum Source<T> {
    Restartable(Rc<dyn Fn() -> Box<dyn Iterator<Item = T>>>),
    SinglePass(Rc<RefCell<Box<dyn Iterator<Item = T>>>>),
}

impl<T: 'static> Source<T> {
    pub(crate) fn restartable(factory: impl Fn() -> Box<dyn Iterator<Item = T>> + 'static) -> Self {
        Source::Restartable(Rc::new(factory))
    }

    pub(crate) fn single_pass(iter: impl Iterator<Item = T> + 'static) -> Self {
        Source::SinglePass(Rc::new(RefCell::new(Box::new(iter))))
    }

    /// Opens a fresh traversal handle. For a restartable source this calls
    /// the factory again; for a single-pass source this returns a thin
    /// handle onto the one shared iterator, so two concurrently open
    /// handles race over the same underlying items (mirroring a shared
    /// generator).
    pub(crate) fn open(&self) -> Box<dyn Iterator<Item = T>> {
        match self {
            Source::Restartable(factory) => factory(),
            Source::SinglePass(shared) => Box::new(SharedIter(Rc::clone(shared))),
        }
    }

    /// Builds a derived source of a possibly different item type by
    /// wrapping `self` with `transform`. Restartable sources stay
    /// restartable (the transform is re-applied on every `open`);
    /// single-pass sources are opened once here and the transformed
    /// iterator becomes the new shared, single-pass state.
    pub(crate) fn derive<U: 'static>(
        &self,
        transform: impl Fn(Box<dyn Iterator<Item = T>>) -> Box<dyn Iterator<Item = U>> + 'static,
    ) -> Source<U> {
        match self {
            Source::Restartable(factory) => {
                let factory = Rc::clone(factory);
                Source::Restartable(Rc::new(move || transform(factory())))
            }
            Source::SinglePass(_) => {
                let opened = self.open();
                Source::SinglePass(Rc::new(RefCell::new(transform(opened))))
            }
        }
    }
}

struct SharedIter<T>(Rc<RefCell<Box<dyn Iterator<Item = T>>>>);

impl<T> Iterator for SharedIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.0.borrow_mut().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restartable_source_can_be_opened_many_times() {
        let source = Source::restartable(|| Box::new(0..3) as Box<dyn Iterator<Item = i32>>);
        assert_eq!(source.open().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(source.open().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn single_pass_source_is_drained_once_across_clones() {
        let source = Source::single_pass(0..3);
        let cloned = source.clone();

        let mut a = source.open();
        assert_eq!(a.next(), Some(0));

        let mut b = cloned.open();
        assert_eq!(b.next(), Some(1));
        assert_eq!(a.next(), Some(2));
        assert_eq!(b.next(), None);
    }

    #[test]
    fn derive_preserves_restartability() {
        let source = Source::restartable(|| Box::new(0..3) as Box<dyn Iterator<Item = i32>>);
        let doubled = source.derive(|it| Box::new(it.map(|x| x * 2)) as Box<dyn Iterator<Item = i32>>);
        assert_eq!(doubled.open().collect::<Vec<_>>(), vec![0, 2, 4]);
        assert_eq!(doubled.open().collect::<Vec<_>>(), vec![0, 2, 4]);
    }

    #[test]
    fn derive_preserves_single_pass_semantics() {
        let source = Source::single_pass(0..3);
        let doubled = source.derive(|it| Box::new(it.map(|x| x * 2)) as Box<dyn Iterator<Item = i32>>);
        assert_eq!(doubled.open().collect::<Vec<_>>(), vec![0, 2, 4]);
        assert_eq!(doubled.open().collect::<Vec<_>>(), Vec::<i32>::new());
    }
}
