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

use std::{fmt, sync::Arc};
use serde::{Serialize,Deserialize,Deserializer,de::IgnoredAny};
use tracing::debug;
use ovm_common::{datetime::TimeKey, geo::GeoPoint, strings::{normalize_callsign,is_same_callsign}};

pub mod errors;
use errors::{OvmTelemetryError,Result};

pub mod memory_store;
pub use memory_store::MemoryStore;

pub mod opensky;

/* #region aircraft and snapshot model **********************************************************************************/

/// a single aircraft record of a telemetry snapshot.
/// `callsign` is kept in its raw transponder form (which can include padding whitespace), use
/// [`AircraftState::normalized_callsign`] to compare with user input
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct AircraftState {
    pub callsign: String,

    #[serde(default, skip_serializing_if = "ovm_common::is_none")]
    pub icao24: Option<String>,

    pub latitude: f64,
    pub longitude: f64,

    /// meters above mean sea level, `None` if the aircraft is on the ground or did not report
    #[serde(default, alias = "geo_altitude", alias = "baro_altitude")]
    pub altitude: Option<f64>,
}

impl AircraftState {
    pub fn new (callsign: impl ToString, latitude: f64, longitude: f64, altitude: Option<f64>)->Self {
        AircraftState { callsign: callsign.to_string(), icao24: None, latitude, longitude, altitude }
    }

    pub fn with_icao24 (mut self, icao24: impl ToString)->Self {
        self.icao24 = Some(icao24.to_string());
        self
    }

    pub fn position (&self)->GeoPoint { GeoPoint::from_lat_lon_degrees( self.latitude, self.longitude) }

    pub fn normalized_callsign (&self)->String { normalize_callsign( &self.callsign) }

    pub fn has_callsign (&self, normalized: &str)->bool { is_same_callsign( &self.callsign, normalized) }

    /// does this record carry a usable position (not 0/0 and within WGS84 ranges)
    pub fn has_position (&self)->bool {
        !(self.latitude == 0.0 && self.longitude == 0.0) && self.position().is_valid()
    }
}

impl fmt::Display for AircraftState {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        match self.altitude {
            Some(alt) => write!( f, "{}[{:.5},{:.5},{:.0}m]", self.callsign.trim(), self.latitude, self.longitude, alt),
            None => write!( f, "{}[{:.5},{:.5},-]", self.callsign.trim(), self.latitude, self.longitude)
        }
    }
}

/// the state of all tracked aircraft at a given time.
/// The aircraft list is shared so that snapshots can be handed out by stores without copying
#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct TelemetrySnapshot {
    pub timestamp: TimeKey,

    #[serde(deserialize_with = "deserialize_aircraft_lenient")]
    pub aircraft: Arc<Vec<AircraftState>>,
}

impl TelemetrySnapshot {
    pub fn new (timestamp: TimeKey, aircraft: Vec<AircraftState>)->Self {
        TelemetrySnapshot { timestamp, aircraft: Arc::new(aircraft) }
    }

    pub fn len (&self)->usize { self.aircraft.len() }
    pub fn is_empty (&self)->bool { self.aircraft.is_empty() }

    pub fn find_callsign (&self, normalized: &str)->Option<&AircraftState> {
        self.aircraft.iter().find( |ac| ac.has_callsign( normalized))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaybeAircraft {
    Valid(AircraftState),
    Invalid(IgnoredAny)
}

/// malformed aircraft records are skipped instead of failing the whole snapshot
fn deserialize_aircraft_lenient<'de,D> (deserializer: D)->std::result::Result<Arc<Vec<AircraftState>>,D::Error>
    where D: Deserializer<'de>
{
    let records: Vec<MaybeAircraft> = Vec::deserialize( deserializer)?;
    let n_records = records.len();

    let aircraft: Vec<AircraftState> = records.into_iter().filter_map( |r| match r {
        MaybeAircraft::Valid(ac) => Some(ac),
        MaybeAircraft::Invalid(_) => None
    }).collect();

    if aircraft.len() < n_records {
        debug!("skipped {} malformed aircraft records", n_records - aircraft.len());
    }
    Ok( Arc::new(aircraft))
}

/* #endregion aircraft and snapshot model */

/* #region store interface **********************************************************************************************/

/// lazily evaluated sequence of snapshots. Each item can fail individually, e.g. if the store connection
/// is lost mid-iteration
pub type SnapshotIter<'a> = Box<dyn Iterator<Item=Result<TelemetrySnapshot>> + Send + 'a>;

/// the abstract time-indexed snapshot store all detection and reconstruction operates on.
/// Implementations have to be safe to share between concurrently running detection jobs
pub trait TelemetryStore: Send + Sync {

    /// all snapshots with `timestamp >= ts_gte`, in ascending timestamp order
    fn ascending_from (&self, ts_gte: TimeKey)->Result<SnapshotIter<'_>>;

    /// all snapshots with `timestamp <= ts_lte`, in descending timestamp order
    fn descending_from (&self, ts_lte: TimeKey)->Result<SnapshotIter<'_>>;

    /// insert or replace the snapshot for `snapshot.timestamp`
    fn upsert (&self, snapshot: TelemetrySnapshot)->Result<()>;

    /// drop snapshots older than `ts`, returning the number of removed snapshots.
    /// Stores without retention support keep everything
    fn remove_before (&self, ts: TimeKey)->Result<usize> { Ok(0) }

    /// the most recent timestamp in the store, if any
    fn latest_timestamp (&self)->Result<Option<TimeKey>> {
        match self.descending_from( TimeKey::MAX)?.next() {
            Some(res) => res.map( |s| Some(s.timestamp)),
            None => Ok(None)
        }
    }
}

impl<T: TelemetryStore + ?Sized> TelemetryStore for Arc<T> {
    fn ascending_from (&self, ts_gte: TimeKey)->Result<SnapshotIter<'_>> { self.as_ref().ascending_from( ts_gte) }
    fn descending_from (&self, ts_lte: TimeKey)->Result<SnapshotIter<'_>> { self.as_ref().descending_from( ts_lte) }
    fn upsert (&self, snapshot: TelemetrySnapshot)->Result<()> { self.as_ref().upsert( snapshot) }
    fn remove_before (&self, ts: TimeKey)->Result<usize> { self.as_ref().remove_before( ts) }
    fn latest_timestamp (&self)->Result<Option<TimeKey>> { self.as_ref().latest_timestamp() }
}

/* #endregion store interface */
