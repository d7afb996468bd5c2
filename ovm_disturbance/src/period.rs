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

use std::{collections::BTreeMap, fmt};
use chrono::{DateTime,Utc};
use serde::{Deserialize,Serialize};
use ovm_common::datetime::{TimeKey,elapsed_minutes};

use crate::query::DetectionQuery;

/// first sighting of an aircraft within a disturbance period
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallsignInfo {
    pub callsign: String,

    #[serde(default, skip_serializing_if = "ovm_common::is_none")]
    pub icao24: Option<String>,

    pub first_seen: TimeKey,
    pub altitude: f64,
}

/// a finalized incident that satisfied the occurrence threshold of its query
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisturbancePeriod {
    pub query: DetectionQuery,
    pub begin: TimeKey,
    pub end: TimeKey,

    /// number of distinct callsigns
    pub hit_count: u32,

    /// over all qualifying readings, not over aircraft
    pub average_altitude: f64,

    /// normalized callsign -> timestamp of first qualifying reading
    pub callsigns: BTreeMap<String,TimeKey>,

    /// per aircraft details in order of appearance
    pub flights: Vec<CallsignInfo>,
}

impl DisturbancePeriod {
    pub fn duration_minutes (&self)->f64 {
        match (self.begin.to_datetime(), self.end.to_datetime()) {
            (Ok(b), Ok(e)) => elapsed_minutes( &e, &b),
            _ => 0.0
        }
    }

    pub fn contains_callsign (&self, normalized: &str)->bool { self.callsigns.contains_key( normalized) }
}

impl fmt::Display for DisturbancePeriod {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!( f, "{}: {}..{} ({:.1} min), {} flights, avg alt {:.0}m",
                self.query.id, self.begin, self.end, self.duration_minutes(), self.hit_count, self.average_altitude)
    }
}
