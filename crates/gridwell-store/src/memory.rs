// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory store backend.
//!
//! Sharded by namespace: one `parking_lot::Mutex` per namespace map, held
//! only for the duration of a single operation and never across an await.
//! TTL is enforced lazily: expired entries are skipped by reads and
//! re-created by the next write.

use ahash::AHashMap;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use gridwell_types::{
    epoch_ms_now, CellAggregate, DwellResult, FeedbackAuditEntry, GridCellId, ObjectKey,
    ObjectState, PartitionKey, RecentEvent, TimelineEntry,
};

use crate::locks::ObjectLockManager;
use crate::StateStore;

/// Capacity and retention settings for the in-memory backend.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Rolling retention after last write.
    pub state_ttl: Duration,
    /// Entries retained per object timeline.
    pub timeline_cap: usize,
    /// Live-feed ring capacity.
    pub recent_events_capacity: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            state_ttl: Duration::from_secs(86_400),
            timeline_cap: 100,
            recent_events_capacity: 100,
        }
    }
}

/// A value with a refresh-on-write expiry.
struct Expiring<T> {
    value: T,
    expires_at: Instant,
}

impl<T> Expiring<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn refresh(&mut self, ttl: Duration) {
        self.expires_at = Instant::now() + ttl;
    }

    fn expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

type AggregateKey = (PartitionKey, GridCellId);
type Contributions = AHashMap<String, u64>;

/// Production in-memory backend for [`StateStore`].
pub struct MemoryStore {
    settings: StoreSettings,
    object_states: Mutex<AHashMap<ObjectKey, Expiring<ObjectState>>>,
    aggregates: Mutex<AHashMap<AggregateKey, Expiring<Contributions>>>,
    timelines: Mutex<AHashMap<ObjectKey, Expiring<VecDeque<TimelineEntry>>>>,
    recent: Mutex<VecDeque<RecentEvent>>,
    audit: Mutex<Vec<FeedbackAuditEntry>>,
    locks: ObjectLockManager,
}

impl MemoryStore {
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            settings,
            object_states: Mutex::new(AHashMap::new()),
            aggregates: Mutex::new(AHashMap::new()),
            timelines: Mutex::new(AHashMap::new()),
            recent: Mutex::new(VecDeque::new()),
            audit: Mutex::new(Vec::new()),
            locks: ObjectLockManager::new(),
        }
    }

    fn ttl(&self) -> Duration {
        self.settings.state_ttl
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreSettings::default())
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get_object_state(&self, key: &ObjectKey) -> DwellResult<Option<ObjectState>> {
        let mut states = self.object_states.lock();
        match states.get(key) {
            Some(entry) if !entry.expired() => Ok(Some(entry.value.clone())),
            Some(_) => {
                states.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put_object_state(&self, key: &ObjectKey, state: &ObjectState) -> DwellResult<()> {
        let mut states = self.object_states.lock();
        states.insert(key.clone(), Expiring::new(state.clone(), self.ttl()));
        Ok(())
    }

    async fn delete_object_state(&self, key: &ObjectKey) -> DwellResult<()> {
        self.object_states.lock().remove(key);
        Ok(())
    }

    async fn list_object_states(
        &self,
        partition: &PartitionKey,
    ) -> DwellResult<Vec<(ObjectKey, ObjectState)>> {
        let states = self.object_states.lock();
        Ok(states
            .iter()
            .filter(|(key, entry)| {
                !entry.expired()
                    && key.collector_id == partition.collector_id
                    && key.camera_id == partition.camera_id
            })
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect())
    }

    async fn scan_open_states(&self) -> DwellResult<Vec<(ObjectKey, ObjectState)>> {
        let states = self.object_states.lock();
        Ok(states
            .iter()
            .filter(|(_, entry)| !entry.expired() && entry.value.is_active())
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect())
    }

    async fn add_contribution(
        &self,
        partition: &PartitionKey,
        cell: &GridCellId,
        object_id: &str,
        dwell_ms: u64,
    ) -> DwellResult<()> {
        let mut aggregates = self.aggregates.lock();
        let key = (partition.clone(), cell.clone());
        let ttl = self.ttl();
        match aggregates.get_mut(&key) {
            Some(entry) if !entry.expired() => {
                *entry.value.entry(object_id.to_string()).or_insert(0) += dwell_ms;
                entry.refresh(ttl);
            }
            _ => {
                let mut contributions = Contributions::new();
                contributions.insert(object_id.to_string(), dwell_ms);
                aggregates.insert(key, Expiring::new(contributions, ttl));
            }
        }
        Ok(())
    }

    async fn remove_contribution(
        &self,
        partition: &PartitionKey,
        cell: &GridCellId,
        object_id: &str,
    ) -> DwellResult<()> {
        let mut aggregates = self.aggregates.lock();
        let key = (partition.clone(), cell.clone());
        let ttl = self.ttl();
        if let Some(entry) = aggregates.get_mut(&key) {
            if entry.expired() {
                aggregates.remove(&key);
                return Ok(());
            }
            entry.value.remove(object_id);
            if entry.value.is_empty() {
                aggregates.remove(&key);
            } else {
                entry.refresh(ttl);
            }
        }
        Ok(())
    }

    async fn rename_contributor(
        &self,
        partition: &PartitionKey,
        old_object_id: &str,
        new_object_id: &str,
    ) -> DwellResult<()> {
        let mut aggregates = self.aggregates.lock();
        let ttl = self.ttl();
        for ((part, _), entry) in aggregates.iter_mut() {
            if part != partition || entry.expired() {
                continue;
            }
            if let Some(dwell) = entry.value.remove(old_object_id) {
                *entry.value.entry(new_object_id.to_string()).or_insert(0) += dwell;
                entry.refresh(ttl);
            }
        }
        Ok(())
    }

    async fn get_aggregate(
        &self,
        partition: &PartitionKey,
        cell: &GridCellId,
    ) -> DwellResult<Option<CellAggregate>> {
        let aggregates = self.aggregates.lock();
        let key = (partition.clone(), cell.clone());
        Ok(aggregates.get(&key).and_then(|entry| {
            if entry.expired() {
                return None;
            }
            let mut aggregate = CellAggregate::new(cell.clone());
            aggregate.contributions = entry.value.clone();
            Some(aggregate)
        }))
    }

    async fn list_aggregates(&self, partition: &PartitionKey) -> DwellResult<Vec<CellAggregate>> {
        let aggregates = self.aggregates.lock();
        Ok(aggregates
            .iter()
            .filter(|((part, _), entry)| part == partition && !entry.expired())
            .map(|((_, cell), entry)| {
                let mut aggregate = CellAggregate::new(cell.clone());
                aggregate.contributions = entry.value.clone();
                aggregate
            })
            .collect())
    }

    async fn prepend_timeline(&self, key: &ObjectKey, entry: TimelineEntry) -> DwellResult<()> {
        let mut timelines = self.timelines.lock();
        let ttl = self.ttl();
        let cap = self.settings.timeline_cap;
        match timelines.get_mut(key) {
            Some(existing) if !existing.expired() => {
                existing.value.push_front(entry);
                existing.value.truncate(cap);
                existing.refresh(ttl);
            }
            _ => {
                let mut deque = VecDeque::with_capacity(8);
                deque.push_front(entry);
                timelines.insert(key.clone(), Expiring::new(deque, ttl));
            }
        }
        Ok(())
    }

    async fn read_timeline(
        &self,
        key: &ObjectKey,
        limit: usize,
    ) -> DwellResult<Vec<TimelineEntry>> {
        let timelines = self.timelines.lock();
        Ok(match timelines.get(key) {
            Some(entry) if !entry.expired() => {
                entry.value.iter().take(limit).cloned().collect()
            }
            _ => Vec::new(),
        })
    }

    async fn take_timeline(&self, key: &ObjectKey) -> DwellResult<Vec<TimelineEntry>> {
        let mut timelines = self.timelines.lock();
        Ok(match timelines.remove(key) {
            Some(entry) if !entry.expired() => entry.value.into_iter().collect(),
            _ => Vec::new(),
        })
    }

    async fn splice_timeline(
        &self,
        key: &ObjectKey,
        entries: Vec<TimelineEntry>,
    ) -> DwellResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut timelines = self.timelines.lock();
        let ttl = self.ttl();
        let cap = self.settings.timeline_cap;
        let existing = match timelines.remove(key) {
            Some(entry) if !entry.expired() => entry.value,
            _ => VecDeque::new(),
        };
        let mut merged: VecDeque<TimelineEntry> = entries.into();
        merged.extend(existing);
        merged.truncate(cap);
        timelines.insert(key.clone(), Expiring::new(merged, ttl));
        Ok(())
    }

    async fn push_recent(&self, event: RecentEvent) -> DwellResult<()> {
        let mut recent = self.recent.lock();
        let mut event = event;
        event.recorded_at_ms = epoch_ms_now();
        recent.push_back(event);
        while recent.len() > self.settings.recent_events_capacity {
            recent.pop_front();
        }
        Ok(())
    }

    async fn read_recent(&self, limit: usize) -> DwellResult<Vec<RecentEvent>> {
        let recent = self.recent.lock();
        Ok(recent.iter().rev().take(limit).cloned().collect())
    }

    async fn append_audit(&self, entry: FeedbackAuditEntry) -> DwellResult<()> {
        self.audit.lock().push(entry);
        Ok(())
    }

    async fn read_audit(&self, limit: usize) -> DwellResult<Vec<FeedbackAuditEntry>> {
        let audit = self.audit.lock();
        Ok(audit.iter().rev().take(limit).cloned().collect())
    }

    fn locks(&self) -> &ObjectLockManager {
        &self.locks
    }
}
