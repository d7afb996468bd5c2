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

use std::{collections::BTreeMap, sync::Arc};
use chrono::TimeDelta;
use serde::{Deserialize,Serialize};
use uom::si::{f64::Length, length::meter};
use ovm_common::{datetime::TimeKey, geo::GeoPoint, strings::normalize_callsign};
use ovm_telemetry::{SnapshotIter, TelemetryStore};

use crate::errors::{OvmDisturbanceError, Result, invalid_argument};

/// the reconstructed path of one aircraft, with coordinates as (lon,lat) in ascending time order
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trajectory {
    pub callsign: String,
    pub coords: Vec<(f64,f64)>,
    pub average_altitude: f64,
}

impl Trajectory {
    pub fn empty (callsign: impl ToString)->Self {
        Trajectory { callsign: callsign.to_string(), coords: Vec::new(), average_altitude: 0.0 }
    }

    pub fn len (&self)->usize { self.coords.len() }
    pub fn is_empty (&self)->bool { self.coords.is_empty() }

    pub fn positions (&self)->impl Iterator<Item=GeoPoint> + '_ {
        self.coords.iter().map( |(lon,lat)| GeoPoint::from_lon_lat_degrees( *lon, *lat))
    }

    fn from_points (callsign: String, points: &BTreeMap<TimeKey,TrackPoint>)->Self {
        if points.is_empty() {
            return Trajectory::empty( callsign)
        }
        let coords: Vec<(f64,f64)> = points.values().map( |p| (p.lon, p.lat)).collect();
        let total_altitude: f64 = points.values().map( |p| p.altitude).sum();
        let average_altitude = total_altitude / coords.len() as f64;
        Trajectory { callsign, coords, average_altitude }
    }
}

#[derive(Debug,Clone,Copy)]
struct TrackPoint { lon: f64, lat: f64, altitude: f64 }

/// builds trajectories of single aircraft from the snapshots around a given time
pub struct TrajectoryReconstructor {
    store: Arc<dyn TelemetryStore>,
}

impl TrajectoryReconstructor {
    pub fn new (store: Arc<dyn TelemetryStore>)->Self {
        TrajectoryReconstructor { store }
    }

    /// the path of `callsign` around `anchor`, from at most `lookback` snapshots at or before and `lookahead`
    /// snapshots at or after the anchor. Each direction stops at the first snapshot that does not contain the
    /// callsign, or after the first position that is more than `2 * radius_meters` away from `origin`.
    /// Readings without altitude are skipped
    pub fn reconstruct (&self, callsign: &str, anchor: TimeKey, lookback: usize, lookahead: usize,
                        origin: &GeoPoint, radius_meters: f64)->Result<Trajectory>
    {
        let callsign = normalize_callsign( callsign);
        let max_distance = Length::new::<meter>( 2.0 * radius_meters);
        let mut points: BTreeMap<TimeKey,TrackPoint> = BTreeMap::new();

        if lookback > 0 {
            walk( self.store.descending_from( anchor)?, lookback, &callsign, origin, max_distance, &mut points)?;
        }
        if lookahead > 0 {
            walk( self.store.ascending_from( anchor)?, lookahead, &callsign, origin, max_distance, &mut points)?;
        }

        Ok( Trajectory::from_points( callsign, &points))
    }

    /// all known positions of `callsign` within `center ± duration_minutes/2`
    pub fn trajectory_in_period (&self, callsign: &str, center: TimeKey, duration_minutes: u32)->Result<Trajectory> {
        let callsign = normalize_callsign( callsign);
        let center_date = center.to_datetime().map_err( |e| invalid_argument!("center: {e}"))?;
        let half = TimeDelta::seconds( duration_minutes as i64 * 30);
        let begin = TimeKey::from_datetime( &(center_date - half));
        let end = TimeKey::from_datetime( &(center_date + half));

        let mut points: BTreeMap<TimeKey,TrackPoint> = BTreeMap::new();
        for res in self.store.ascending_from( begin)? {
            let snapshot = res?;
            if snapshot.timestamp > end {
                break
            }
            if let Some(ac) = snapshot.find_callsign( &callsign) {
                if let Some(altitude) = ac.altitude {
                    points.insert( snapshot.timestamp, TrackPoint { lon: ac.longitude, lat: ac.latitude, altitude });
                }
            }
        }

        Ok( Trajectory::from_points( callsign, &points))
    }
}

fn walk (snapshots: SnapshotIter<'_>, limit: usize, callsign: &str, origin: &GeoPoint, max_distance: Length,
         points: &mut BTreeMap<TimeKey,TrackPoint>)->Result<()>
{
    for res in snapshots.take( limit) {
        let snapshot = res?;
        let Some(ac) = snapshot.find_callsign( callsign) else {
            break
        };

        if let Some(altitude) = ac.altitude {
            points.insert( snapshot.timestamp, TrackPoint { lon: ac.longitude, lat: ac.latitude, altitude });
            if origin.distance_to( &ac.position()) > max_distance {
                break
            }
        }
    }
    Ok(())
}
