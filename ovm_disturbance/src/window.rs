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

use std::collections::BTreeMap;
use chrono::{DateTime,TimeDelta,Utc};
use tracing::debug;
use ovm_common::datetime::TimeKey;

use crate::config::EndOfScanPolicy;
use crate::period::{CallsignInfo,DisturbancePeriod};
use crate::query::DetectionQuery;
use crate::errors::{OvmDisturbanceError, Result, internal_inconsistency};

/// the open accumulator of a candidate incident for one query.
/// Callsigns are expected to be normalized by the caller
#[derive(Debug,Clone)]
pub struct DisturbanceWindow {
    begin: TimeKey,
    begin_date: DateTime<Utc>,
    last_event: TimeKey,
    last_event_date: DateTime<Utc>,
    hit_count: u32,
    reading_count: u32,
    total_altitude: f64,
    first_seen: BTreeMap<String,TimeKey>,
    flights: Vec<CallsignInfo>,
}

impl DisturbanceWindow {
    pub fn open (timestamp: TimeKey, date: DateTime<Utc>, callsign: &str, icao24: Option<&str>, altitude: f64)->Self {
        let mut window = DisturbanceWindow {
            begin: timestamp,
            begin_date: date,
            last_event: timestamp,
            last_event_date: date,
            hit_count: 0,
            reading_count: 0,
            total_altitude: 0.0,
            first_seen: BTreeMap::new(),
            flights: Vec::new(),
        };
        window.add_reading( timestamp, date, callsign, icao24, altitude);
        window
    }

    pub fn add_reading (&mut self, timestamp: TimeKey, date: DateTime<Utc>, callsign: &str, icao24: Option<&str>, altitude: f64) {
        self.last_event = timestamp;
        self.last_event_date = date;
        self.reading_count += 1;
        self.total_altitude += altitude;

        if !self.first_seen.contains_key( callsign) {
            self.hit_count += 1;
            self.first_seen.insert( callsign.to_string(), timestamp);
            self.flights.push( CallsignInfo {
                callsign: callsign.to_string(),
                icao24: icao24.map( |s| s.to_string()),
                first_seen: timestamp,
                altitude
            });
        }
    }

    pub fn begin (&self)->TimeKey { self.begin }
    pub fn last_event (&self)->TimeKey { self.last_event }
    pub fn hit_count (&self)->u32 { self.hit_count }
    pub fn reading_count (&self)->u32 { self.reading_count }
    pub fn total_altitude (&self)->f64 { self.total_altitude }

    pub fn has_seen (&self, callsign: &str)->bool { self.first_seen.contains_key( callsign) }
    pub fn seen_callsigns (&self)->impl Iterator<Item=&str> { self.first_seen.keys().map( |k| k.as_str()) }

    pub fn average_altitude (&self)->f64 {
        if self.reading_count > 0 { self.total_altitude / self.reading_count as f64 } else { 0.0 }
    }

    pub fn duration (&self)->TimeDelta { self.last_event_date - self.begin_date }

    /// has the gap since the last qualifying reading reached `timeframe` at `date`
    pub fn has_expired (&self, date: DateTime<Utc>, timeframe: TimeDelta)->bool {
        date - self.last_event_date >= timeframe
    }

    /// turn into a period if the occurrence threshold of `query` is met, discard otherwise
    pub fn into_period (self, query: &DetectionQuery)->Result<Option<DisturbancePeriod>> {
        if self.reading_count == 0 || self.hit_count as usize != self.first_seen.len() {
            return Err( internal_inconsistency!("window {} of query {} has {} hits for {} readings and {} callsigns",
                        self.begin, query.id, self.hit_count, self.reading_count, self.first_seen.len()))
        }

        if self.hit_count >= query.occurrence_threshold {
            let average_altitude = self.average_altitude();
            Ok( Some( DisturbancePeriod {
                query: query.clone(),
                begin: self.begin,
                end: self.last_event,
                hit_count: self.hit_count,
                average_altitude,
                callsigns: self.first_seen,
                flights: self.flights,
            }))
        } else {
            debug!("discarding window {}..{} of query {} with {} hits", self.begin, self.last_event, query.id, self.hit_count);
            Ok(None)
        }
    }
}

/// the window slot of a single query within a scan. Holds at most one open window.
/// Each snapshot is processed as `begin_snapshot`, any number of `record` calls for qualifying
/// readings, and `end_snapshot`
#[derive(Debug,Clone)]
pub struct WindowSlot {
    query: DetectionQuery,
    window: Option<DisturbanceWindow>,
    hit_in_snapshot: bool,
}

impl WindowSlot {
    pub fn new (query: DetectionQuery)->Self {
        WindowSlot { query, window: None, hit_in_snapshot: false }
    }

    pub fn query (&self)->&DetectionQuery { &self.query }
    pub fn window (&self)->Option<&DisturbanceWindow> { self.window.as_ref() }
    pub fn is_open (&self)->bool { self.window.is_some() }

    pub fn begin_snapshot (&mut self) {
        self.hit_in_snapshot = false;
    }

    /// a qualifying reading of the current snapshot. If the open window expired without any snapshot
    /// in between (e.g. a gap in telemetry) it is closed first and its period is returned
    pub fn record (&mut self, timestamp: TimeKey, date: DateTime<Utc>, callsign: &str, icao24: Option<&str>, altitude: f64)->Result<Option<DisturbancePeriod>> {
        let mut closed = None;
        if self.is_expired( date) {
            closed = self.close()?;
        }

        self.hit_in_snapshot = true;
        match &mut self.window {
            Some(window) => window.add_reading( timestamp, date, callsign, icao24, altitude),
            None => self.window = Some( DisturbanceWindow::open( timestamp, date, callsign, icao24, altitude))
        }
        Ok(closed)
    }

    /// close the window if the current snapshot had no qualifying reading and the timeframe has elapsed
    pub fn end_snapshot (&mut self, date: DateTime<Utc>)->Result<Option<DisturbancePeriod>> {
        if !self.hit_in_snapshot && self.is_expired( date) {
            self.close()
        } else {
            Ok(None)
        }
    }

    /// evaluate a window that is still open at the end of the snapshot stream
    pub fn finalize (&mut self, policy: EndOfScanPolicy)->Result<Option<DisturbancePeriod>> {
        match self.window.take() {
            Some(window) => match policy {
                EndOfScanPolicy::Emit => window.into_period( &self.query),
                EndOfScanPolicy::RequireDuration => {
                    if window.duration() > self.query.timeframe() {
                        window.into_period( &self.query)
                    } else {
                        debug!("discarding short window {}..{} of query {} at end of scan", window.begin, window.last_event, self.query.id);
                        Ok(None)
                    }
                }
            }
            None => Ok(None)
        }
    }

    fn is_expired (&self, date: DateTime<Utc>)->bool {
        self.window.as_ref().is_some_and( |w| w.has_expired( date, self.query.timeframe()))
    }

    fn close (&mut self)->Result<Option<DisturbancePeriod>> {
        match self.window.take() {
            Some(window) => window.into_period( &self.query),
            None => Ok(None)
        }
    }
}
