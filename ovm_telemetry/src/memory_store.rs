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

use std::{collections::BTreeMap, fs::File, io::{BufReader,BufWriter}, path::Path, sync::{Arc,RwLock,RwLockReadGuard,RwLockWriteGuard}};
use tracing::{debug,warn};
use ovm_common::datetime::TimeKey;

use crate::{AircraftState, SnapshotIter, TelemetrySnapshot, TelemetryStore};
use crate::errors::{OvmTelemetryError, Result, unavailable};

/// RwLock-synchronized in-memory snapshot store, ordered by timestamp.
/// Query results are detached from the lock (aircraft lists are shared `Arc`s)
pub struct MemoryStore {
    snapshots: RwLock<BTreeMap<TimeKey,Arc<Vec<AircraftState>>>>
}

impl MemoryStore {
    pub fn new ()->Self {
        MemoryStore { snapshots: RwLock::new( BTreeMap::new()) }
    }

    pub fn from_snapshots<I> (snapshots: I)->Self where I: IntoIterator<Item=TelemetrySnapshot> {
        let map: BTreeMap<TimeKey,Arc<Vec<AircraftState>>> = snapshots.into_iter().map( |s| (s.timestamp, s.aircraft)).collect();
        MemoryStore { snapshots: RwLock::new( map) }
    }

    /// load a JSON array of snapshots. Records that do not parse as snapshot are skipped
    pub fn from_json_file<P: AsRef<Path>> (path: P)->Result<Self> {
        let store = MemoryStore::new();
        store.extend_from_json_file( path)?;
        Ok(store)
    }

    /// add all snapshots from a JSON file, returning the number of snapshots added
    pub fn extend_from_json_file<P: AsRef<Path>> (&self, path: P)->Result<usize> {
        let path = path.as_ref();
        let reader = BufReader::new( File::open(path)?);
        let records: Vec<serde_json::Value> = serde_json::from_reader( reader)?;

        let mut map = self.write_lock()?;
        let mut n_added = 0;
        for (i,rec) in records.into_iter().enumerate() {
            match serde_json::from_value::<TelemetrySnapshot>( rec) {
                Ok(s) => {
                    map.insert( s.timestamp, s.aircraft);
                    n_added += 1;
                }
                Err(e) => warn!("skipping malformed snapshot {} in {:?}: {}", i, path, e)
            }
        }
        debug!("loaded {} snapshots from {:?}", n_added, path);
        Ok(n_added)
    }

    pub fn write_json_file<P: AsRef<Path>> (&self, path: P)->Result<()> {
        let snapshots: Vec<TelemetrySnapshot> = {
            let map = self.read_lock()?;
            map.iter().map( |(k,v)| TelemetrySnapshot { timestamp: *k, aircraft: v.clone() }).collect()
        };
        let writer = BufWriter::new( File::create( path)?);
        Ok( serde_json::to_writer( writer, &snapshots)? )
    }

    pub fn len (&self)->usize { self.snapshots.read().map( |m| m.len()).unwrap_or(0) }
    pub fn is_empty (&self)->bool { self.len() == 0 }

    pub fn get (&self, ts: TimeKey)->Result<Option<TelemetrySnapshot>> {
        let map = self.read_lock()?;
        Ok( map.get(&ts).map( |ac| TelemetrySnapshot { timestamp: ts, aircraft: ac.clone() }))
    }

    fn read_lock (&self)->Result<RwLockReadGuard<'_,BTreeMap<TimeKey,Arc<Vec<AircraftState>>>>> {
        self.snapshots.read().map_err( |_| unavailable!("snapshot store lock poisoned"))
    }

    fn write_lock (&self)->Result<RwLockWriteGuard<'_,BTreeMap<TimeKey,Arc<Vec<AircraftState>>>>> {
        self.snapshots.write().map_err( |_| unavailable!("snapshot store lock poisoned"))
    }
}

impl Default for MemoryStore {
    fn default ()->Self { MemoryStore::new() }
}

impl TelemetryStore for MemoryStore {
    fn ascending_from (&self, ts_gte: TimeKey)->Result<SnapshotIter<'_>> {
        let map = self.read_lock()?;
        let snapshots: Vec<TelemetrySnapshot> = map.range( ts_gte..)
            .map( |(k,v)| TelemetrySnapshot { timestamp: *k, aircraft: v.clone() })
            .collect();
        Ok( Box::new( snapshots.into_iter().map( Ok)))
    }

    fn descending_from (&self, ts_lte: TimeKey)->Result<SnapshotIter<'_>> {
        let map = self.read_lock()?;
        let snapshots: Vec<TelemetrySnapshot> = map.range( ..=ts_lte).rev()
            .map( |(k,v)| TelemetrySnapshot { timestamp: *k, aircraft: v.clone() })
            .collect();
        Ok( Box::new( snapshots.into_iter().map( Ok)))
    }

    fn upsert (&self, snapshot: TelemetrySnapshot)->Result<()> {
        let mut map = self.write_lock()?;
        map.insert( snapshot.timestamp, snapshot.aircraft);
        Ok(())
    }

    fn remove_before (&self, ts: TimeKey)->Result<usize> {
        let mut map = self.write_lock()?;
        let retained = map.split_off( &ts);
        let n_removed = map.len();
        *map = retained;
        Ok(n_removed)
    }

    fn latest_timestamp (&self)->Result<Option<TimeKey>> {
        let map = self.read_lock()?;
        Ok( map.keys().next_back().copied())
    }
}
