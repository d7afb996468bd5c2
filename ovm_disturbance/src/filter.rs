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

use std::collections::HashSet;
use ovm_common::{geo::GeoPoint, strings::normalize_callsign};
use ovm_telemetry::AircraftState;

/// normalized callsigns that never count as disturbance
#[derive(Debug,Clone,Default)]
pub struct IgnoreList(HashSet<String>);

impl IgnoreList {
    pub fn new<I,S> (callsigns: I)->Self where I: IntoIterator<Item=S>, S: AsRef<str> {
        IgnoreList( callsigns.into_iter().map( |cs| normalize_callsign( cs.as_ref())).collect())
    }

    pub fn contains (&self, normalized: &str)->bool { self.0.contains( normalized) }
    pub fn len (&self)->usize { self.0.len() }
    pub fn is_empty (&self)->bool { self.0.is_empty() }

    /// the query independent checks for an aircraft record, done once per snapshot.
    /// Rejects records without altitude, ignored callsigns and records without usable position
    pub fn candidate<'a> (&self, ac: &'a AircraftState)->Option<Candidate<'a>> {
        let altitude = ac.altitude?;

        let callsign = ac.normalized_callsign();
        if callsign.is_empty() || self.contains( &callsign) {
            return None
        }

        if !ac.has_position() {
            return None
        }

        Some( Candidate { callsign, icao24: ac.icao24.as_deref(), position: ac.position(), altitude })
    }
}

/// an aircraft record that passed the cheap rejects and now has to be checked against each query
#[derive(Debug,Clone)]
pub struct Candidate<'a> {
    pub callsign: String,
    pub icao24: Option<&'a str>,
    pub position: GeoPoint,
    pub altitude: f64,
}
