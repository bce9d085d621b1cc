// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Property tests for the pipeline algebra's structural identities.

use lazy_pipeline::Pipeline;
use proptest::prelude::*;

proptest! {
    #[test]
    fn page_is_equivalent_to_skip_then_take(
        items in prop::collection::vec(any::<i32>(), 0..200),
        n in 1usize..10,
        size in 1usize..20,
    ) {
        let via_page = Pipeline::from_iter(items.clone()).page(n, size).unwrap().to_list().unwrap();
        let via_skip_take = Pipeline::from_iter(items).skip((n - 1) * size).take(size).to_list().unwrap();
        prop_assert_eq!(via_page, via_skip_take);
    }

    #[test]
    fn flattening_a_batch_recovers_the_original_sequence(
        items in prop::collection::vec(any::<i32>(), 0..200),
        size in 1usize..15,
    ) {
        let batched = Pipeline::from_iter(items.clone()).batch(size).unwrap().to_list().unwrap();
        let flattened: Vec<i32> = batched.into_iter().flatten().collect();
        prop_assert_eq!(flattened, items);
    }

    #[test]
    fn batches_are_never_larger_than_requested_and_only_the_last_may_be_short(
        items in prop::collection::vec(any::<i32>(), 0..200),
        size in 1usize..15,
    ) {
        let batched = Pipeline::from_iter(items).batch(size).unwrap().to_list().unwrap();
        let last_index = batched.len().checked_sub(1);
        for (i, group) in batched.iter().enumerate() {
            prop_assert!(group.len() <= size);
            if Some(i) != last_index {
                prop_assert_eq!(group.len(), size);
            }
        }
    }

    #[test]
    fn paginate_matches_chunking_the_full_realized_list(
        items in prop::collection::vec(any::<i32>(), 0..200),
        size in 1usize..15,
    ) {
        let pipeline = Pipeline::from_iter(items.clone());
        let paginated: Vec<Vec<i32>> = pipeline.paginate(size).unwrap().collect();
        let expected: Vec<Vec<i32>> = items.chunks(size).map(|c| c.to_vec()).collect();
        prop_assert_eq!(paginated, expected);
    }
}
