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

use std::sync::Arc;
use chrono::{DateTime,Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug,info,warn};
use ovm_common::datetime::TimeKey;
use ovm_telemetry::{TelemetrySnapshot, TelemetryStore};

use crate::config::DisturbanceConfig;
use crate::filter::{Candidate,IgnoreList};
use crate::period::DisturbancePeriod;
use crate::query::{DetectionQuery,validate_request};
use crate::window::WindowSlot;
use crate::errors::{OvmDisturbanceError, Result};

/// finds disturbance periods for any number of queries in a single ascending pass over the store.
/// The scanner itself is immutable, concurrent `detect` calls each own their window state
pub struct DisturbanceScanner {
    store: Arc<dyn TelemetryStore>,
    config: Arc<DisturbanceConfig>,
    ignore_list: IgnoreList,
}

impl DisturbanceScanner {
    /// create a scanner that uses the ignore list of `config`
    pub fn new (store: Arc<dyn TelemetryStore>, config: Arc<DisturbanceConfig>)->Self {
        let ignore_list = IgnoreList::new( &config.ignore_callsigns);
        DisturbanceScanner { store, config, ignore_list }
    }

    pub fn with_ignore_list (mut self, ignore_list: IgnoreList)->Self {
        self.ignore_list = ignore_list;
        self
    }

    pub fn store (&self)->&Arc<dyn TelemetryStore> { &self.store }
    pub fn config (&self)->&DisturbanceConfig { self.config.as_ref() }
    pub fn ignore_list (&self)->&IgnoreList { &self.ignore_list }

    pub fn detect (&self, queries: &[DetectionQuery], begin: TimeKey, end: TimeKey)->Result<Vec<DisturbancePeriod>> {
        self.detect_cancellable( queries, begin, end, &CancellationToken::new())
    }

    /// scan all snapshots with `begin <= timestamp <= end`. The token is checked once per snapshot, a
    /// cancelled scan returns `Cancelled` and no partial result. Periods are ordered by begin, then query id
    pub fn detect_cancellable (&self, queries: &[DetectionQuery], begin: TimeKey, end: TimeKey,
                               cancel: &CancellationToken)->Result<Vec<DisturbancePeriod>>
    {
        validate_request( queries, begin, end, &self.config.limits)?;

        let mut slots: Vec<WindowSlot> = queries.iter().cloned().map( WindowSlot::new).collect();
        let mut periods: Vec<DisturbancePeriod> = Vec::new();
        let mut n_snapshots = 0;

        debug!("scanning {}..{} for {} queries", begin, end, slots.len());

        for res in self.store.ascending_from( begin)? {
            if cancel.is_cancelled() {
                return Err( OvmDisturbanceError::Cancelled)
            }

            let snapshot = res?;
            if snapshot.timestamp > end {
                break
            }
            let date = match snapshot.timestamp.to_datetime() {
                Ok(date) => date,
                Err(e) => { warn!("skipping snapshot: {e}"); continue }
            };
            n_snapshots += 1;

            let candidates: Vec<Candidate> = snapshot.aircraft.iter().filter_map( |ac| self.ignore_list.candidate( ac)).collect();
            self.process_snapshot( &mut slots, &snapshot, date, &candidates, &mut periods)?;
        }

        for slot in &mut slots {
            if let Some(period) = slot.finalize( self.config.end_of_scan)? {
                emit( period, &mut periods);
            }
        }

        periods.sort_by( |a,b| a.begin.cmp( &b.begin).then_with( || a.query.id.cmp( &b.query.id)));
        debug!("scanned {} snapshots, found {} disturbance periods", n_snapshots, periods.len());
        Ok(periods)
    }

    fn process_snapshot (&self, slots: &mut [WindowSlot], snapshot: &TelemetrySnapshot, date: DateTime<Utc>,
                         candidates: &[Candidate], periods: &mut Vec<DisturbancePeriod>)->Result<()>
    {
        for slot in slots.iter_mut() {
            slot.begin_snapshot();

            for c in candidates {
                if slot.query().matches( &c.position, c.altitude) {
                    if let Some(period) = slot.record( snapshot.timestamp, date, &c.callsign, c.icao24, c.altitude)? {
                        emit( period, periods);
                    }
                }
            }

            if let Some(period) = slot.end_snapshot( date)? {
                emit( period, periods);
            }
        }
        Ok(())
    }
}

fn emit (period: DisturbancePeriod, periods: &mut Vec<DisturbancePeriod>) {
    info!("query {}: disturbance detected. {} flights in {:.1} minutes, {}..{}",
          period.query.id, period.hit_count, period.duration_minutes(), period.begin, period.end);
    periods.push( period);
}
