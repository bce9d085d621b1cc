// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Scenario 5 from the testable-properties list: a pipeline fed by a
//! million-item source must not materialize more of it than the terminal
//! operation's own stopping condition requires.

use std::cell::Cell;
use std::rc::Rc;

use lazy_pipeline::Pipeline;

#[test]
fn take_over_a_million_item_source_only_pulls_what_it_needs() {
    let pulled = Rc::new(Cell::new(0usize));
    let pulled_inner = Rc::clone(&pulled);

    let pipeline = Pipeline::from_once((0..1_000_000u64).map(move |x| {
        pulled_inner.set(pulled_inner.get() + 1);
        x
    }))
    .filter(|x| x % 2 == 0)
    .map(|x| x * x)
    .take(10);

    let result = pipeline.to_list().unwrap();

    assert_eq!(result, (0..).step_by(2).map(|x: u64| x * x).take(10).collect::<Vec<_>>());
    assert!(
        pulled.get() < 100,
        "take(10) should short-circuit long before exhausting a million-item source, pulled {}",
        pulled.get()
    );
}

#[test]
fn first_over_a_huge_source_pulls_a_single_item() {
    let pulled = Rc::new(Cell::new(0usize));
    let pulled_inner = Rc::clone(&pulled);

    let pipeline = Pipeline::from_once((0..1_000_000u64).map(move |x| {
        pulled_inner.set(pulled_inner.get() + 1);
        x
    }));

    assert_eq!(pipeline.first().unwrap(), 0);
    assert_eq!(pulled.get(), 1);
}

#[test]
fn find_stops_at_the_first_match() {
    let pulled = Rc::new(Cell::new(0usize));
    let pulled_inner = Rc::clone(&pulled);

    let pipeline = Pipeline::from_once((0..1_000_000u64).map(move |x| {
        pulled_inner.set(pulled_inner.get() + 1);
        x
    }));

    assert_eq!(pipeline.find(|x| *x == 42).unwrap(), Some(42));
    assert_eq!(pulled.get(), 43);
}

#[test]
fn batched_traversal_over_a_large_source_stays_bounded_per_page() {
    let pipeline = Pipeline::from_iter(0..1_000_000u64);
    let mut pages = pipeline.paginate(1_000).unwrap();

    let first_page = pages.next().unwrap();
    assert_eq!(first_page.len(), 1_000);
    assert_eq!(first_page[0], 0);
    assert_eq!(first_page[999], 999);
}
