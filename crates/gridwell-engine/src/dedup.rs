// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Bounded event-id deduplication window.
//!
//! Per-partition-worker LRU: a hash set for membership plus an insertion
//! ring; the oldest id is evicted once the window is full. Ids enter the
//! window only after their observation persisted, so a store failure keeps
//! the id eligible for redelivery.

use ahash::AHashSet;
use std::collections::VecDeque;

/// Bounded set of recently applied event ids.
#[derive(Debug)]
pub struct DedupWindow {
    seen: AHashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl DedupWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: AHashSet::with_capacity(capacity.min(16_384)),
            order: VecDeque::with_capacity(capacity.min(16_384)),
            capacity: capacity.max(1),
        }
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.seen.contains(event_id)
    }

    /// Record an id, evicting the oldest beyond capacity.
    pub fn insert(&mut self, event_id: String) {
        if !self.seen.insert(event_id.clone()) {
            return;
        }
        self.order.push_back(event_id);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.seen.remove(&evicted);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
