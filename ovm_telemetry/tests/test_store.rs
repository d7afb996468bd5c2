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

use std::fs;
use ovm_common::datetime::TimeKey;
use ovm_telemetry::{AircraftState, MemoryStore, TelemetrySnapshot, TelemetryStore, errors::Result};

// run with "cargo test --test test_store -- --nocapture"

fn tk (v: i64)->TimeKey { TimeKey::new(v).unwrap() }

fn snapshot (ts: i64, callsigns: &[&str])->TelemetrySnapshot {
    let aircraft = callsigns.iter().map( |cs| AircraftState::new( cs, 52.0, 4.7, Some(800.0))).collect();
    TelemetrySnapshot::new( tk(ts), aircraft)
}

fn sample_store ()->MemoryStore {
    MemoryStore::from_snapshots( vec![
        snapshot( 20240101120000, &["KLM123"]),
        snapshot( 20240101120500, &["KLM123", "PH-ABC"]),
        snapshot( 20240101121000, &["PH-ABC"]),
        snapshot( 20240102000000, &[]),
    ])
}

fn timestamps (it: ovm_telemetry::SnapshotIter<'_>)->Vec<i64> {
    it.map( |r| r.unwrap().timestamp.value()).collect()
}

#[test]
fn test_ascending() {
    let store = sample_store();

    let ts = timestamps( store.ascending_from( tk(20240101120500)).unwrap());
    println!("ascending: {ts:?}");
    assert_eq!( ts, vec![20240101120500, 20240101121000, 20240102000000]);

    let ts = timestamps( store.ascending_from( tk(20240101120001)).unwrap());
    assert_eq!( ts[0], 20240101120500);

    assert!( store.ascending_from( tk(20250101000000)).unwrap().next().is_none());
}

#[test]
fn test_descending() {
    let store = sample_store();

    let ts = timestamps( store.descending_from( tk(20240101120500)).unwrap());
    println!("descending: {ts:?}");
    assert_eq!( ts, vec![20240101120500, 20240101120000]);

    assert!( store.descending_from( tk(20230101000000)).unwrap().next().is_none());
}

#[test]
fn test_upsert_replaces() {
    let store = sample_store();
    assert_eq!( store.len(), 4);

    store.upsert( snapshot( 20240101120000, &["AAA", "BBB"])).unwrap();
    assert_eq!( store.len(), 4);

    let s = store.get( tk(20240101120000)).unwrap().unwrap();
    assert_eq!( s.len(), 2);
    assert!( s.find_callsign("BBB").is_some());
    assert!( s.find_callsign("KLM123").is_none());

    assert_eq!( store.latest_timestamp().unwrap(), Some(tk(20240102000000)));
}

#[test]
fn test_remove_before() {
    let store = sample_store();
    let n = store.remove_before( tk(20240101121000)).unwrap();
    assert_eq!( n, 2);
    assert_eq!( timestamps( store.ascending_from( TimeKey::MIN).unwrap()), vec![20240101121000, 20240102000000]);
}

#[test]
fn test_callsign_matching() {
    let ac = AircraftState::new( "KLM 1234 ", 52.0, 4.7, None);
    assert!( ac.has_callsign("KLM1234"));
    assert!( !ac.has_callsign("KLM123"));
    assert_eq!( ac.normalized_callsign(), "KLM1234");
}

#[test]
fn test_has_position() {
    assert!( AircraftState::new( "A", 52.0, 4.7, None).has_position());
    assert!( !AircraftState::new( "A", 0.0, 0.0, None).has_position());
    assert!( !AircraftState::new( "A", 95.0, 4.7, None).has_position());
}

#[test]
fn test_json_file() {
    let path = std::env::temp_dir().join( "ovm_telemetry_test_store.json");
    fs::write( &path, r#"[
        { "timestamp": 20240101120000, "aircraft": [
            { "callsign": "KLM123 ", "icao24": "484abc", "latitude": 52.0, "longitude": 4.7, "altitude": 800.0 },
            { "callsign": "BROKEN", "latitude": "not a number", "longitude": 4.7 },
            { "callsign": "GROUND", "latitude": 52.1, "longitude": 4.8, "altitude": null },
            { "callsign": "OLD", "latitude": 52.1, "longitude": 4.8, "geo_altitude": 1200.0 }
        ]},
        { "timestamp": "yesterday", "aircraft": [] },
        { "timestamp": 20240101120500, "aircraft": [] }
    ]"#).unwrap();

    let store = MemoryStore::from_json_file( &path).unwrap();
    assert_eq!( store.len(), 2);

    let s = store.get( tk(20240101120000)).unwrap().unwrap();
    for ac in s.aircraft.iter() { println!("  {ac}") }
    assert_eq!( s.len(), 3);
    assert_eq!( s.aircraft[0].icao24.as_deref(), Some("484abc"));
    assert_eq!( s.aircraft[1].altitude, None);
    assert_eq!( s.aircraft[2].altitude, Some(1200.0));

    let out_path = std::env::temp_dir().join( "ovm_telemetry_test_store_out.json");
    store.write_json_file( &out_path).unwrap();
    let reloaded = MemoryStore::from_json_file( &out_path).unwrap();
    assert_eq!( reloaded.len(), 2);
    assert_eq!( reloaded.get( tk(20240101120000)).unwrap().unwrap().aircraft, s.aircraft);

    fs::remove_file( &path).ok();
    fs::remove_file( &out_path).ok();
}
