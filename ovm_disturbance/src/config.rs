/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

use std::time::Duration;
use serde::{Deserialize,Serialize};
use ovm_common::datetime::{days,deserialize_duration,serialize_duration};

/// what to do with windows that are still open when the snapshot stream ends
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,Default)]
pub enum EndOfScanPolicy {
    /// emit if the occurrence threshold is reached, regardless of window duration
    #[default]
    Emit,

    /// emit only if the occurrence threshold is reached and `end - begin` exceeds the timeframe
    RequireDuration
}

/// bounds for caller supplied detection queries
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(default)]
pub struct QueryLimits {
    pub max_radius_meters: u32,
    pub max_altitude_meters: u32,
    pub max_occurrences: u32,
    pub max_timeframe_minutes: u32,

    #[serde(deserialize_with = "deserialize_duration", serialize_with = "serialize_duration")]
    pub max_scan_range: Duration,

    pub max_queries: usize,
}

impl Default for QueryLimits {
    fn default ()->Self {
        QueryLimits {
            max_radius_meters: 50_000,
            max_altitude_meters: 15_000,
            max_occurrences: 1000,
            max_timeframe_minutes: 1440,
            max_scan_range: days(31),
            max_queries: 1000,
        }
    }
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(default)]
pub struct DisturbanceConfig {
    /// callsigns (e.g. ambulance helicopters) that never count as disturbance
    pub ignore_callsigns: Vec<String>,

    pub end_of_scan: EndOfScanPolicy,
    pub limits: QueryLimits,

    /// max number of snapshots the report trajectories extend before and after the first sighting
    pub trajectory_lookback: usize,
    pub trajectory_lookahead: usize,

    /// added to the query radius for report viewports
    pub bbox_padding_meters: f64,
}

impl Default for DisturbanceConfig {
    fn default ()->Self {
        DisturbanceConfig {
            ignore_callsigns: vec![ "LIFELN1".to_string() ],
            end_of_scan: EndOfScanPolicy::default(),
            limits: QueryLimits::default(),
            trajectory_lookback: 15,
            trajectory_lookahead: 15,
            bbox_padding_meters: 1000.0,
        }
    }
}
