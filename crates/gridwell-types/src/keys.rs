// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Stream and object keys.
//!
//! A partition is the `(collector, camera)` pair and is the unit of
//! ordering; an object key extends it with the tracked object id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The unit of ordering: one camera stream from one collector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKey {
    pub collector_id: String,
    pub camera_id: String,
}

impl PartitionKey {
    pub fn new(collector_id: impl Into<String>, camera_id: impl Into<String>) -> Self {
        Self {
            collector_id: collector_id.into(),
            camera_id: camera_id.into(),
        }
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.collector_id, self.camera_id)
    }
}

/// Identity of one tracked object within a partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    pub collector_id: String,
    pub camera_id: String,
    pub object_id: String,
}

impl ObjectKey {
    pub fn new(
        collector_id: impl Into<String>,
        camera_id: impl Into<String>,
        object_id: impl Into<String>,
    ) -> Self {
        Self {
            collector_id: collector_id.into(),
            camera_id: camera_id.into(),
            object_id: object_id.into(),
        }
    }

    pub fn partition(&self) -> PartitionKey {
        PartitionKey::new(self.collector_id.clone(), self.camera_id.clone())
    }

    /// Same partition, different object.
    pub fn sibling(&self, object_id: impl Into<String>) -> Self {
        Self {
            collector_id: self.collector_id.clone(),
            camera_id: self.camera_id.clone(),
            object_id: object_id.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.collector_id, self.camera_id, self.object_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_partition_projection() {
        let key = ObjectKey::new("col-1", "cam-2", "obj-A");
        assert_eq!(key.partition(), PartitionKey::new("col-1", "cam-2"));
        assert_eq!(key.sibling("obj-B").object_id, "obj-B");
        assert_eq!(key.to_string(), "col-1:cam-2:obj-A");
    }
}
