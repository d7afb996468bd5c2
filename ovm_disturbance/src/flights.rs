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
use serde::{Deserialize,Serialize};
use uom::si::{f64::Length, length::meter};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use ovm_common::{datetime::TimeKey, geo::GeoPoint};

use crate::DisturbanceScanner;
use crate::filter::Candidate;
use crate::query::{validate_area,validate_range};
use crate::trajectory::{Trajectory,TrajectoryReconstructor};
use crate::errors::{OvmDisturbanceError, Result};

/// an aircraft that was seen below the altitude threshold within the radius of an area
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightSighting {
    pub callsign: String,

    #[serde(default, skip_serializing_if = "ovm_common::is_none")]
    pub icao24: Option<String>,

    pub first_seen: TimeKey,
    pub altitude: f64,

    #[serde(default, skip_serializing_if = "ovm_common::is_none")]
    pub trajectory: Option<Trajectory>,
}

impl DisturbanceScanner {

    /// all distinct aircraft that were at least once within `radius_meters` of `origin` and below `altitude_meters`
    /// during `begin..=end`, in order of their first sighting. No window or threshold logic applies.
    /// If `with_trajectories` is set, each sighting gets a trajectory reconstructed around its first sighting
    pub fn find_flights (&self, origin: &GeoPoint, begin: TimeKey, end: TimeKey, radius_meters: u32, altitude_meters: u32,
                         with_trajectories: bool, cancel: &CancellationToken)->Result<Vec<FlightSighting>>
    {
        let limits = &self.config().limits;
        validate_range( begin, end, limits)?;
        validate_area( origin, radius_meters, altitude_meters, limits)?;

        let radius = Length::new::<meter>( radius_meters as f64);
        let altitude_threshold = altitude_meters as f64;
        let mut seen: HashSet<String> = HashSet::new();
        let mut sightings: Vec<FlightSighting> = Vec::new();

        for res in self.store().ascending_from( begin)? {
            if cancel.is_cancelled() {
                return Err( OvmDisturbanceError::Cancelled)
            }

            let snapshot = res?;
            if snapshot.timestamp > end {
                break
            }

            for ac in snapshot.aircraft.iter() {
                if let Some(c) = self.ignore_list().candidate( ac) {
                    if !seen.contains( &c.callsign)
                        && c.altitude < altitude_threshold
                        && origin.distance_to( &c.position) < radius
                    {
                        seen.insert( c.callsign.clone());
                        sightings.push( FlightSighting {
                            callsign: c.callsign,
                            icao24: c.icao24.map( |s| s.to_string()),
                            first_seen: snapshot.timestamp,
                            altitude: c.altitude,
                            trajectory: None
                        });
                    }
                }
            }
        }

        if with_trajectories {
            let config = self.config();
            let reconstructor = TrajectoryReconstructor::new( self.store().clone());
            for s in &mut sightings {
                s.trajectory = Some( reconstructor.reconstruct( &s.callsign, s.first_seen, config.trajectory_lookback,
                                                                config.trajectory_lookahead, origin, radius_meters as f64)?);
            }
        }

        debug!("found {} flights within {}m of {}", sightings.len(), radius_meters, origin);
        Ok(sightings)
    }
}
