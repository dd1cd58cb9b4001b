// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

mod report;

use crate::{Element, GuardStack, MemorySink, Protection, StackConfig};

/// Every guard on, with a small capacity floor so growth is easy to reach.
pub(crate) fn small_config(min_capacity: usize) -> StackConfig {
    StackConfig::default()
        .with_protection(Protection::ALL)
        .with_min_capacity(min_capacity)
}

/// Builds a stack reporting into a fresh `MemorySink`.
pub(crate) fn capturing<T: Element>(
    capacity: usize,
    config: StackConfig,
) -> (GuardStack<T>, MemorySink) {
    let sink = MemorySink::new();
    let stack = GuardStack::build(capacity, config, sink.clone()).expect("Failed to build()");

    (stack, sink)
}
