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

use std::{collections::HashSet, fmt};
use chrono::{DateTime,TimeDelta,Utc};
use serde::{Deserialize,Serialize};
use uom::si::{f64::Length, length::meter};
use ovm_common::{datetime::TimeKey, geo::GeoPoint};

use crate::config::QueryLimits;
use crate::errors::{OvmDisturbanceError, Result, invalid_argument};

/// what counts as disturbance for a given location (usually a complainant's home).
/// Queries are supplied per `detect` call and never stored
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionQuery {
    #[serde(alias = "user")]
    pub id: String,

    pub origin: GeoPoint,
    pub radius_meters: u32,
    pub altitude_threshold_meters: u32,

    /// min number of distinct aircraft within a window
    pub occurrence_threshold: u32,

    /// max gap between qualifying readings before a window closes
    pub timeframe_minutes: u32,
}

impl DetectionQuery {
    pub fn new (id: impl ToString, origin: GeoPoint, radius_meters: u32, altitude_threshold_meters: u32,
                occurrence_threshold: u32, timeframe_minutes: u32)->Self
    {
        DetectionQuery { id: id.to_string(), origin, radius_meters, altitude_threshold_meters, occurrence_threshold, timeframe_minutes }
    }

    pub fn timeframe (&self)->TimeDelta { TimeDelta::minutes( self.timeframe_minutes as i64) }

    pub fn radius (&self)->Length { Length::new::<meter>( self.radius_meters as f64) }

    /// the per-query part of a qualifying reading: below the altitude threshold and within the radius.
    /// Altitude is checked first since it does not need a distance computation
    #[inline]
    pub fn matches (&self, position: &GeoPoint, altitude: f64)->bool {
        altitude < self.altitude_threshold_meters as f64
            && self.origin.distance_to( position) < self.radius()
    }

    pub fn validate (&self, limits: &QueryLimits)->Result<()> {
        if self.id.trim().is_empty() {
            return Err( invalid_argument!("query without id"))
        }
        if !self.origin.is_valid() {
            return Err( invalid_argument!("query {} has invalid origin {}", self.id, self.origin))
        }
        check_range( &self.id, "radiusMeters", self.radius_meters, limits.max_radius_meters)?;
        check_range( &self.id, "altitudeThresholdMeters", self.altitude_threshold_meters, limits.max_altitude_meters)?;
        check_range( &self.id, "occurrenceThreshold", self.occurrence_threshold, limits.max_occurrences)?;
        check_range( &self.id, "timeframeMinutes", self.timeframe_minutes, limits.max_timeframe_minutes)?;
        Ok(())
    }
}

fn check_range (id: &str, name: &str, value: u32, max: u32)->Result<()> {
    if value == 0 || value > max {
        Err( invalid_argument!("query {} has {} out of range 1..={}: {}", id, name, max, value))
    } else {
        Ok(())
    }
}

impl fmt::Display for DetectionQuery {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!( f, "{}: {} r={}m alt<{}m n>={} t={}min", self.id, self.origin, self.radius_meters,
                self.altitude_threshold_meters, self.occurrence_threshold, self.timeframe_minutes)
    }
}

/// check a scan time range. Returns the begin and end dates
pub fn validate_range (begin: TimeKey, end: TimeKey, limits: &QueryLimits)->Result<(DateTime<Utc>,DateTime<Utc>)> {
    let begin_date = begin.to_datetime().map_err( |e| invalid_argument!("begin: {e}"))?;
    let end_date = end.to_datetime().map_err( |e| invalid_argument!("end: {e}"))?;

    if begin > end {
        return Err( invalid_argument!("begin {} is after end {}", begin, end))
    }
    let max_range = TimeDelta::from_std( limits.max_scan_range).unwrap_or( TimeDelta::MAX);
    if end_date - begin_date > max_range {
        return Err( invalid_argument!("scan range {}..{} exceeds {:?}", begin, end, limits.max_scan_range))
    }

    Ok( (begin_date, end_date) )
}

/// check a complete `detect` request
pub fn validate_request (queries: &[DetectionQuery], begin: TimeKey, end: TimeKey, limits: &QueryLimits)->Result<(DateTime<Utc>,DateTime<Utc>)> {
    let dates = validate_range( begin, end, limits)?;

    if queries.len() > limits.max_queries {
        return Err( invalid_argument!("too many queries: {} (max {})", queries.len(), limits.max_queries))
    }

    let mut ids: HashSet<&str> = HashSet::with_capacity( queries.len());
    for q in queries {
        q.validate( limits)?;
        if !ids.insert( q.id.as_str()) {
            return Err( invalid_argument!("duplicate query id {}", q.id))
        }
    }

    Ok(dates)
}

/// check radius and altitude of an ad hoc area query
pub fn validate_area (origin: &GeoPoint, radius_meters: u32, altitude_meters: u32, limits: &QueryLimits)->Result<()> {
    if !origin.is_valid() {
        return Err( invalid_argument!("invalid origin {}", origin))
    }
    check_range( "area", "radiusMeters", radius_meters, limits.max_radius_meters)?;
    check_range( "area", "altitudeThresholdMeters", altitude_meters, limits.max_altitude_meters)
}
