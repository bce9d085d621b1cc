// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;

use crate::cache::{CacheState, CachingIter};
use crate::error::{catch_unwind, PipelineError};
use crate::ops::Batch;
use crate::source::Source;

/// A deferred computation over a traversal of `T`.
///
/// A `Pipeline` pairs a [`Source`] with zero or more chained operations
/// (`map`, `filter`, `skip`, `take`, `batch`) and an optional cache flag.
/// Nothing runs at construction time; every chainable method returns a new
/// `Pipeline` value. Driving actually happens inside a terminal operation
/// (`to_list`, `reduce`, `count`, ...), which opens exactly one traversal
/// handle and pulls it until the terminal's own stopping condition is met.
pub struct Pipeline<T> {
    source: Source<T>,
    cache: Option<Rc<RefCell<CacheState<T>>>>,
}

impl<T> Clone for Pipeline<T> {
    /// Cloning shares the underlying source (so a restartable source stays
    /// restartable, and a single-pass source is still raced the same way
    /// across clones), but **never** shares a cache: a clone that later
    /// calls `.cache()` gets its own independent realized prefix.
    fn clone(&self) -> Self {
        Pipeline {
            source: self.source.clone(),
            cache: None,
        }
    }
}

impl<T: 'static> Pipeline<T> {
    fn from_source(source: Source<T>) -> Self {
        Pipeline { source, cache: None }
    }

    /// Builds a restartable pipeline over an owned collection. Every
    /// terminal call (and every `open()` of a derived pipeline) re-iterates
    /// the collection from the start.
    pub fn from_iter<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Clone,
    {
        let items: Rc<Vec<T>> = Rc::new(items.into_iter().collect());
        Self::from_source(Source::restartable(move || {
            let items = Rc::clone(&items);
            Box::new(PipelineVecIter { items, pos: 0 }) as Box<dyn Iterator<Item = T>>
        }))
    }

    /// Builds a single-pass pipeline over an iterator that is driven
    /// lazily, e.g. a generator reading a file or materializing values on
    /// demand. Only one traversal (across this pipeline and any of its
    /// derived pipelines that aren't cached) will ever see a given item.
    pub fn from_once(iter: impl Iterator<Item = T> + 'static) -> Self {
        Self::from_source(Source::single_pass(iter))
    }

    /// Opens exactly one traversal handle: the cache's memoizing iterator
    /// if caching is enabled, otherwise a fresh handle onto the source.
    fn open(&self) -> Box<dyn Iterator<Item = T>>
    where
        T: Clone,
    {
        match &self.cache {
            Some(cache) => Box::new(CachingIter::new(Rc::clone(cache))),
            None => self.source.open(),
        }
    }

    /// Applies `f` to every item, changing the pipeline's item type.
    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Pipeline<U> {
        let f = Rc::new(f);
        let source = self.source.derive(move |it| {
            let f = Rc::clone(&f);
            Box::new(it.map(move |x| f(x))) as Box<dyn Iterator<Item = U>>
        });
        Pipeline::from_source(source)
    }

    /// Drops items for which `p` returns `false`.
    pub fn filter(self, p: impl Fn(&T) -> bool + 'static) -> Pipeline<T> {
        let source = self
            .source
            .derive(move |it| Box::new(it.filter(move |x| p(x))) as Box<dyn Iterator<Item = T>>);
        Pipeline::from_source(source)
    }

    /// Drops the first `n` items.
    pub fn skip(self, n: usize) -> Pipeline<T> {
        let source = self.source.derive(move |it| Box::new(it.skip(n)) as Box<dyn Iterator<Item = T>>);
        Pipeline::from_source(source)
    }

    /// Yields at most the first `n` items, then stops pulling upstream.
    /// `n = 0` yields nothing.
    pub fn take(self, n: usize) -> Pipeline<T> {
        let source = self.source.derive(move |it| Box::new(it.take(n)) as Box<dyn Iterator<Item = T>>);
        Pipeline::from_source(source)
    }

    /// `skip((n-1) * size).take(size)`. Pages are 1-indexed; `n = 0` is
    /// rejected as a construction error.
    pub fn page(self, n: usize, size: usize) -> Result<Pipeline<T>, PipelineError> {
        if n < 1 {
            return Err(PipelineError::invalid_argument("page number must be at least 1"));
        }
        if size < 1 {
            return Err(PipelineError::invalid_argument("page size must be at least 1"));
        }
        Ok(self.skip((n - 1) * size).take(size))
    }

    /// Groups consecutive items into `Vec`s of up to `size` elements; the
    /// final group may be shorter. `size` must be at least 1.
    pub fn batch(self, size: usize) -> Result<Pipeline<Vec<T>>, PipelineError> {
        if size < 1 {
            return Err(PipelineError::invalid_argument("batch size must be at least 1"));
        }
        let source = self
            .source
            .derive(move |it| Box::new(Batch::new(it, size)) as Box<dyn Iterator<Item = Vec<T>>>);
        Ok(Pipeline::from_source(source))
    }

    /// Alias for [`Pipeline::batch`].
    pub fn chunk(self, size: usize) -> Result<Pipeline<Vec<T>>, PipelineError> {
        self.batch(size)
    }

    /// Enables memoization for this pipeline instance. The first terminal
    /// operation to iterate writes realized items into the cache as it
    /// produces them; later terminal calls on this same `Pipeline` value
    /// replay the cached prefix before continuing the source. Cloning the
    /// returned pipeline does not carry the cache along with it.
    pub fn cache(self) -> Pipeline<T>
    where
        T: Clone,
    {
        Pipeline {
            cache: Some(CacheState::new(self.source.clone())),
            source: self.source,
        }
    }

    // ---- terminal operations -------------------------------------------------

    /// Realizes every item into a `Vec`, in order.
    pub fn to_list(&self) -> Result<Vec<T>, PipelineError>
    where
        T: Clone,
    {
        let mut iter = self.open();
        catch_unwind(AssertUnwindSafe(|| iter.by_ref().collect()))
    }

    /// Alias for [`Pipeline::to_list`].
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.to_list().expect("user closures must not panic; see to_list for a fallible variant")
    }

    /// A lazy sequence of pages, each realized on demand as it is pulled;
    /// ends when the source is exhausted. Equivalent to driving `batch`
    /// directly as a terminal rather than a chainable operation.
    pub fn paginate(&self, size: usize) -> Result<impl Iterator<Item = Vec<T>>, PipelineError>
    where
        T: Clone,
    {
        if size < 1 {
            return Err(PipelineError::invalid_argument("page size must be at least 1"));
        }
        Ok(Batch::new(self.open(), size))
    }

    /// Left fold over the sequence with an explicit seed; infallible, since
    /// an empty sequence simply returns `init` unchanged.
    pub fn fold<Acc>(&self, init: Acc, f: impl Fn(Acc, T) -> Acc) -> Result<Acc, PipelineError>
    where
        T: Clone,
    {
        let iter = self.open();
        catch_unwind(AssertUnwindSafe(|| iter.fold(init, |acc, x| f(acc, x))))
    }

    /// Left fold with no seed; fails with [`PipelineError::EmptyReduction`]
    /// if the sequence is empty.
    pub fn reduce(&self, f: impl Fn(T, T) -> T) -> Result<T, PipelineError>
    where
        T: Clone,
    {
        let mut iter = self.open();
        catch_unwind(AssertUnwindSafe(|| iter.by_ref().reduce(f)))?.ok_or(PipelineError::EmptyReduction)
    }

    /// Sums the sequence starting from `T::default()`.
    pub fn sum(&self) -> Result<T, PipelineError>
    where
        T: Clone + std::iter::Sum<T>,
    {
        let iter = self.open();
        catch_unwind(AssertUnwindSafe(|| iter.sum()))
    }

    /// Sums the sequence starting from an explicit `start` value.
    pub fn sum_from(&self, start: T) -> Result<T, PipelineError>
    where
        T: Clone + std::ops::Add<Output = T>,
    {
        self.fold(start, |acc, x| acc + x)
    }

    /// Cardinality of the sequence; requires a full traversal.
    pub fn count(&self) -> Result<usize, PipelineError>
    where
        T: Clone,
    {
        let mut iter = self.open();
        catch_unwind(AssertUnwindSafe(move || iter.by_ref().count()))
    }

    /// Minimum item by `Ord`; fails on an empty sequence. See
    /// [`Pipeline::min_or`] for a version with a default.
    pub fn min(&self) -> Result<T, PipelineError>
    where
        T: Clone + Ord,
    {
        let iter = self.open();
        catch_unwind(AssertUnwindSafe(|| iter.min()))?.ok_or(PipelineError::EmptyReduction)
    }

    /// As [`Pipeline::min`], but returns `default` instead of failing on an
    /// empty sequence.
    pub fn min_or(&self, default: T) -> Result<T, PipelineError>
    where
        T: Clone + Ord,
    {
        match self.min() {
            Ok(v) => Ok(v),
            Err(PipelineError::EmptyReduction) => Ok(default),
            Err(e) => Err(e),
        }
    }

    /// Maximum item by `Ord`; fails on an empty sequence. See
    /// [`Pipeline::max_or`] for a version with a default.
    pub fn max(&self) -> Result<T, PipelineError>
    where
        T: Clone + Ord,
    {
        let iter = self.open();
        catch_unwind(AssertUnwindSafe(|| iter.max()))?.ok_or(PipelineError::EmptyReduction)
    }

    /// As [`Pipeline::max`], but returns `default` instead of failing on an
    /// empty sequence.
    pub fn max_or(&self, default: T) -> Result<T, PipelineError>
    where
        T: Clone + Ord,
    {
        match self.max() {
            Ok(v) => Ok(v),
            Err(PipelineError::EmptyReduction) => Ok(default),
            Err(e) => Err(e),
        }
    }

    /// The first item, if any; stops pulling upstream after one item.
    /// Fails on an empty sequence. See [`Pipeline::first_or`].
    pub fn first(&self) -> Result<T, PipelineError>
    where
        T: Clone,
    {
        let mut iter = self.open();
        catch_unwind(AssertUnwindSafe(move || iter.next()))?.ok_or(PipelineError::EmptyReduction)
    }

    /// As [`Pipeline::first`], but returns `default` instead of failing on
    /// an empty sequence.
    pub fn first_or(&self, default: T) -> Result<T, PipelineError>
    where
        T: Clone,
    {
        match self.first() {
            Ok(v) => Ok(v),
            Err(PipelineError::EmptyReduction) => Ok(default),
            Err(e) => Err(e),
        }
    }

    /// The last item; requires a full traversal. Fails on an empty
    /// sequence. See [`Pipeline::last_or`].
    pub fn last(&self) -> Result<T, PipelineError>
    where
        T: Clone,
    {
        let iter = self.open();
        catch_unwind(AssertUnwindSafe(|| iter.last()))?.ok_or(PipelineError::EmptyReduction)
    }

    /// As [`Pipeline::last`], but returns `default` instead of failing on
    /// an empty sequence.
    pub fn last_or(&self, default: T) -> Result<T, PipelineError>
    where
        T: Clone,
    {
        match self.last() {
            Ok(v) => Ok(v),
            Err(PipelineError::EmptyReduction) => Ok(default),
            Err(e) => Err(e),
        }
    }

    /// Short-circuits as soon as `p` is satisfied by one item.
    pub fn any(&self, p: impl Fn(&T) -> bool) -> Result<bool, PipelineError>
    where
        T: Clone,
    {
        let mut iter = self.open();
        catch_unwind(AssertUnwindSafe(move || iter.any(|x| p(&x))))
    }

    /// Short-circuits as soon as `p` is violated by one item.
    pub fn all(&self, p: impl Fn(&T) -> bool) -> Result<bool, PipelineError>
    where
        T: Clone,
    {
        let mut iter = self.open();
        catch_unwind(AssertUnwindSafe(move || iter.all(|x| p(&x))))
    }

    /// The first item satisfying `p`, stopping the traversal as soon as it
    /// is found.
    pub fn find(&self, p: impl Fn(&T) -> bool) -> Result<Option<T>, PipelineError>
    where
        T: Clone,
    {
        let mut iter = self.open();
        catch_unwind(AssertUnwindSafe(move || iter.find(|x| p(x))))
    }

    /// Builds a keyed map from the full sequence; not lazy, `O(output)`
    /// memory.
    pub fn group_by<K: Eq + Hash>(&self, key_fn: impl Fn(&T) -> K) -> Result<HashMap<K, Vec<T>>, PipelineError>
    where
        T: Clone,
    {
        let iter = self.open();
        catch_unwind(AssertUnwindSafe(|| {
            let mut groups: HashMap<K, Vec<T>> = HashMap::new();
            for item in iter {
                groups.entry(key_fn(&item)).or_default().push(item);
            }
            groups
        }))
    }
}

struct PipelineVecIter<T> {
    items: Rc<Vec<T>>,
    pos: usize,
}

impl<T: Clone> Iterator for PipelineVecIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.items.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn map_filter_take_composes_and_preserves_order() {
        let pipeline = Pipeline::from_iter(0..10).filter(|x| x % 2 == 0).map(|x| x * 10).take(3);
        assert_eq!(pipeline.to_list().unwrap(), vec![0, 20, 40]);
    }

    #[test]
    fn restartable_pipeline_yields_the_same_sequence_every_time() {
        let pipeline = Pipeline::from_iter(vec!["a", "b", "c"]).map(|s| s.to_uppercase());
        assert_eq!(pipeline.to_list().unwrap(), pipeline.to_list().unwrap());
    }

    #[test]
    fn take_short_circuits_before_exhausting_upstream() {
        let pulled = Rc::new(Cell::new(0));
        let pulled_inner = Rc::clone(&pulled);
        let pipeline = Pipeline::from_once((0..1_000_000).map(move |x| {
            pulled_inner.set(pulled_inner.get() + 1);
            x
        }))
        .take(5);

        assert_eq!(pipeline.to_list().unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(pulled.get(), 5);
    }

    #[test]
    fn batch_groups_and_rejects_zero_size() {
        let pipeline = Pipeline::from_iter(0..5);
        assert!(matches!(pipeline.clone().batch(0), Err(PipelineError::InvalidArgument(_))));
        let batched = pipeline.batch(2).unwrap();
        assert_eq!(batched.to_list().unwrap(), vec![vec![0, 1], vec![2, 3], vec![4]]);
    }

    #[test]
    fn page_rejects_page_number_below_one() {
        let pipeline = Pipeline::from_iter(0..20);
        assert!(matches!(pipeline.clone().page(0, 5), Err(PipelineError::InvalidArgument(_))));
        let page2 = pipeline.page(2, 5).unwrap();
        assert_eq!(page2.to_list().unwrap(), vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn paginate_yields_lazy_pages_on_demand() {
        let pipeline = Pipeline::from_iter(0..7);
        let mut pages = pipeline.paginate(3).unwrap();
        assert_eq!(pages.next(), Some(vec![0, 1, 2]));
        assert_eq!(pages.next(), Some(vec![3, 4, 5]));
        assert_eq!(pages.next(), Some(vec![6]));
        assert_eq!(pages.next(), None);
    }

    #[test]
    fn reduce_fails_on_empty_sequence() {
        let empty: Pipeline<i32> = Pipeline::from_iter(Vec::new());
        assert!(matches!(empty.reduce(|a, b| a + b), Err(PipelineError::EmptyReduction)));
    }

    #[test]
    fn reduce_folds_left_to_right() {
        let pipeline = Pipeline::from_iter(1..=4);
        assert_eq!(pipeline.reduce(|a, b| a * b).unwrap(), 24);
    }

    #[test]
    fn sum_and_count() {
        let pipeline = Pipeline::from_iter(1..=5);
        assert_eq!(pipeline.clone().sum().unwrap(), 15);
        assert_eq!(pipeline.count().unwrap(), 5);
    }

    #[test]
    fn min_max_fail_on_empty_and_honor_default() {
        let empty: Pipeline<i32> = Pipeline::from_iter(Vec::new());
        assert!(matches!(empty.min(), Err(PipelineError::EmptyReduction)));
        assert_eq!(empty.min_or(42).unwrap(), 42);
        assert_eq!(empty.max_or(7).unwrap(), 7);
    }

    #[test]
    fn first_and_last() {
        let pipeline = Pipeline::from_iter(vec![1, 2, 3]);
        assert_eq!(pipeline.first().unwrap(), 1);
        assert_eq!(pipeline.last().unwrap(), 3);
        let empty: Pipeline<i32> = Pipeline::from_iter(Vec::new());
        assert_eq!(empty.first_or(-1).unwrap(), -1);
    }

    #[test]
    fn any_all_and_find() {
        let pipeline = Pipeline::from_iter(vec![1, 2, 3, 4]);
        assert!(pipeline.any(|x| *x == 3).unwrap());
        assert!(pipeline.all(|x| *x > 0).unwrap());
        assert_eq!(pipeline.find(|x| *x % 2 == 0).unwrap(), Some(2));
    }

    #[test]
    fn group_by_partitions_the_full_sequence() {
        let pipeline = Pipeline::from_iter(0..6);
        let groups = pipeline.group_by(|x| x % 2).unwrap();
        assert_eq!(groups[&0], vec![0, 2, 4]);
        assert_eq!(groups[&1], vec![1, 3, 5]);
    }

    #[test]
    fn cache_reuses_realized_items_on_repeated_terminal_calls() {
        let calls = Rc::new(Cell::new(0));
        let calls_inner = Rc::clone(&calls);
        let pipeline = Pipeline::from_iter(0..5)
            .map(move |x| {
                calls_inner.set(calls_inner.get() + 1);
                x * x
            })
            .cache();

        let first = pipeline.to_list().unwrap();
        let second = pipeline.to_list().unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn cloning_a_cached_pipeline_does_not_share_the_cache() {
        let calls = Rc::new(Cell::new(0));
        let calls_inner = Rc::clone(&calls);
        let pipeline = Pipeline::from_iter(0..3)
            .map(move |x| {
                calls_inner.set(calls_inner.get() + 1);
                x
            })
            .cache();

        let clone = pipeline.clone();
        pipeline.to_list().unwrap();
        clone.to_list().unwrap();

        assert_eq!(calls.get(), 6, "clone must recompute through its own fresh cache");
    }

    #[test]
    fn handler_panic_is_captured_as_a_pipeline_error() {
        let pipeline = Pipeline::from_iter(vec![1, 2, 3]).map(|x| if x == 2 { panic!("boom") } else { x });
        assert!(matches!(pipeline.to_list(), Err(PipelineError::HandlerPanic(_))));
    }
}
