// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persisted floor state.
//!
//! A `FloorRecord` is what gets written next to each map image: the
//! explored brush centres plus the last pan/zoom of that floor.

use serde::{Deserialize, Serialize};

fn default_zoom() -> f32 {
    1.0
}

/// Complete floor state for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorRecord {
    /// Revealed brush centres in image pixels. Order is irrelevant and
    /// duplicates are harmless.
    pub explored_areas: Vec<(u32, u32)>,
    #[serde(default)]
    pub pan_offset: [i32; 2],
    #[serde(default = "default_zoom")]
    pub zoom_factor: f32,
}

impl FloorRecord {
    /// Create a record with the given explored centres and the default view.
    pub fn new(explored_areas: Vec<(u32, u32)>) -> Self {
        Self {
            explored_areas,
            pan_offset: [0, 0],
            zoom_factor: default_zoom(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_fields_are_optional() {
        let record: FloorRecord = serde_json::from_str(r#"{"explored_areas": [[1, 2], [3, 4]]}"#).unwrap();
        assert_eq!(record, FloorRecord::new(vec![(1, 2), (3, 4)]));
    }

    #[test]
    fn test_json_shape() {
        let record = FloorRecord {
            explored_areas: vec![(10, 20)],
            pan_offset: [-5, 7],
            zoom_factor: 1.5,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "explored_areas": [[10, 20]],
                "pan_offset": [-5, 7],
                "zoom_factor": 1.5
            })
        );
    }

    #[test]
    fn test_explored_areas_are_required() {
        assert!(serde_json::from_str::<FloorRecord>(r#"{"zoom_factor": 1.0}"#).is_err());
        assert!(serde_json::from_str::<FloorRecord>(r#"{"explored_areas": [[1]]}"#).is_err());
        assert!(serde_json::from_str::<FloorRecord>(r#"{"explored_areas": [[-1, 2]]}"#).is_err());
    }
}
