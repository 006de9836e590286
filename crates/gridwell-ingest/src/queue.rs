// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Partitioned in-process ingress queue.
//!
//! One unbounded channel per `(collector, camera)` partition: producers
//! never block, insertion order is preserved per partition, and a control
//! channel announces each new partition so the engine supervisor can spawn
//! exactly one consumer worker for it.

use ahash::AHashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use gridwell_types::{Observation, PartitionKey};

/// Logical topic name for normalized observations.
pub const RAW_DETECTIONS_TOPIC: &str = "raw.detections";

/// A newly created partition and its consumer end.
pub struct PartitionStream {
    pub partition: PartitionKey,
    pub receiver: mpsc::UnboundedReceiver<Observation>,
}

/// Producer side of the ingress queue.
pub struct IngressQueue {
    partitions: Mutex<AHashMap<PartitionKey, mpsc::UnboundedSender<Observation>>>,
    registrations: mpsc::UnboundedSender<PartitionStream>,
}

impl IngressQueue {
    /// Build the queue and the registration stream the consumer supervisor
    /// listens on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PartitionStream>) {
        let (registrations, registration_rx) = mpsc::unbounded_channel();
        (
            Self {
                partitions: Mutex::new(AHashMap::new()),
                registrations,
            },
            registration_rx,
        )
    }

    /// Append one observation to its partition, creating the partition on
    /// first use.
    pub fn publish(&self, observation: Observation) {
        let partition = observation.partition();
        let mut partitions = self.partitions.lock();

        let sender = partitions.entry(partition.clone()).or_insert_with(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            debug!(topic = RAW_DETECTIONS_TOPIC, partition = %partition, "creating partition");
            if self
                .registrations
                .send(PartitionStream {
                    partition: partition.clone(),
                    receiver: rx,
                })
                .is_err()
            {
                warn!(partition = %partition, "no consumer supervisor; partition will not drain");
            }
            tx
        });

        if sender.send(observation).is_err() {
            // Consumer gone; only happens during shutdown.
            warn!(partition = %partition, "partition consumer closed, dropping observation");
        }
    }

    /// Append a batch in order.
    pub fn publish_all(&self, observations: impl IntoIterator<Item = Observation>) {
        for observation in observations {
            self.publish(observation);
        }
    }

    /// Number of partitions seen so far.
    pub fn partition_count(&self) -> usize {
        self.partitions.lock().len()
    }
}
