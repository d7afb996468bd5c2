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

use std::{f64::consts::PI, sync::Arc};
use ovm_common::{datetime::TimeKey, geo::GeoPoint};
use ovm_telemetry::{AircraftState, MemoryStore, TelemetrySnapshot, TelemetryStore};
use ovm_disturbance::{Trajectory, TrajectoryReconstructor};

// run with "cargo test --test test_trajectory -- --nocapture"

const ORIGIN_LAT: f64 = 52.0;
const ORIGIN_LON: f64 = 4.7;
const METERS_PER_DEG_LAT: f64 = 6371008.8 * PI / 180.0;

/// north offsets in meters of a flight crossing the origin, one snapshot per minute starting at 12:00
const OFFSETS: [f64;11] = [5000.0, 3000.0, 1500.0, 800.0, 300.0, 0.0, -300.0, -900.0, -1600.0, -2500.0, -4000.0];

fn origin ()->GeoPoint { GeoPoint::from_lat_lon_degrees( ORIGIN_LAT, ORIGIN_LON) }

fn tk (m: u32)->TimeKey { TimeKey::from_ymd_hms( 2024, 1, 1, 12, m, 0).unwrap() }

fn lat (meters: f64)->f64 { ORIGIN_LAT + meters / METERS_PER_DEG_LAT }

fn flight_store<F> (mut adjust: F)->TrajectoryReconstructor where F: FnMut(u32,&mut Vec<AircraftState>) {
    let store = MemoryStore::new();
    for (i,offset) in OFFSETS.iter().enumerate() {
        let m = i as u32;
        let mut aircraft = vec![
            AircraftState::new( "KLM123  ", lat(*offset), ORIGIN_LON, Some(500.0 + 10.0 * m as f64)),
            AircraftState::new( "OTHER", lat(100.0), ORIGIN_LON, Some(300.0)),
        ];
        adjust( m, &mut aircraft);
        store.upsert( TelemetrySnapshot::new( tk(m), aircraft)).unwrap();
    }
    TrajectoryReconstructor::new( Arc::new( store))
}

fn minutes_of (t: &Trajectory)->Vec<u32> {
    // recover the snapshot minute from the latitude
    t.coords.iter().map( |(_,la)| {
        let offset = (la - ORIGIN_LAT) * METERS_PER_DEG_LAT;
        OFFSETS.iter().position( |o| (o - offset).abs() < 0.01).unwrap() as u32
    }).collect()
}

fn assert_ascending (t: &Trajectory) {
    let minutes = minutes_of( t);
    assert!( minutes.windows(2).all( |w| w[0] < w[1]), "not ascending: {minutes:?}");
}

#[test]
fn test_stops_beyond_twice_radius() {
    let r = flight_store( |_,_| {});
    let t = r.reconstruct( "KLM123", tk(5), 15, 15, &origin(), 1000.0).unwrap();
    println!("{:?} -> {:?}", minutes_of(&t), t);

    assert_eq!( t.callsign, "KLM123");
    // backwards 5,4,3,2 and 1 (3000m, recorded but stops), forward 6,7,8 and 9 (2500m, stops)
    assert_eq!( minutes_of(&t), vec![1,2,3,4,5,6,7,8,9]);
    assert_ascending( &t);

    let expected_avg = (1..=9).map( |m| 500.0 + 10.0 * m as f64).sum::<f64>() / 9.0;
    assert!( (t.average_altitude - expected_avg).abs() < 1e-9);
}

#[test]
fn test_lookback_lookahead_limits() {
    let r = flight_store( |_,_| {});
    let t = r.reconstruct( "KLM123", tk(5), 2, 2, &origin(), 1000.0).unwrap();
    assert_eq!( minutes_of(&t), vec![4,5,6]);

    let t = r.reconstruct( "KLM123", tk(5), 0, 3, &origin(), 1000.0).unwrap();
    assert_eq!( minutes_of(&t), vec![5,6,7]);
}

#[test]
fn test_stops_at_missing_callsign() {
    let r = flight_store( |m,aircraft| if m == 7 || m == 3 { aircraft.remove(0); });
    let t = r.reconstruct( "KLM123", tk(5), 15, 15, &origin(), 1000.0).unwrap();
    assert_eq!( minutes_of(&t), vec![4,5,6]);
}

#[test]
fn test_skips_unknown_altitude() {
    let r = flight_store( |m,aircraft| if m == 3 || m == 6 { aircraft[0].altitude = None; });
    let t = r.reconstruct( "KLM123", tk(5), 15, 15, &origin(), 1000.0).unwrap();
    assert_eq!( minutes_of(&t), vec![1,2,4,5,7,8,9]);
    assert_ascending( &t);
}

#[test]
fn test_anchor_between_snapshots() {
    let r = flight_store( |_,_| {});
    let anchor = TimeKey::from_ymd_hms( 2024, 1, 1, 12, 5, 30).unwrap();
    let t = r.reconstruct( "KLM123", anchor, 1, 1, &origin(), 1000.0).unwrap();
    assert_eq!( minutes_of(&t), vec![5,6]);
}

#[test]
fn test_unknown_callsign() {
    let r = flight_store( |_,_| {});
    let t = r.reconstruct( "NOPE", tk(5), 15, 15, &origin(), 1000.0).unwrap();
    assert!( t.is_empty());
    assert_eq!( t.average_altitude, 0.0);
}

#[test]
fn test_trajectory_in_period() {
    let r = flight_store( |_,_| {});
    let t = r.trajectory_in_period( "KLM 123", tk(5), 4).unwrap();
    println!("{t:?}");
    assert_eq!( minutes_of(&t), vec![3,4,5,6,7]);

    // no distance limit here
    let t = r.trajectory_in_period( "KLM123", tk(5), 60).unwrap();
    assert_eq!( t.len(), OFFSETS.len());
}

#[test]
fn test_serialize() {
    let t = Trajectory { callsign: "KLM123".into(), coords: vec![(4.7,52.0),(4.8,52.1)], average_altitude: 500.0 };
    let s = serde_json::to_string( &t).unwrap();
    println!("{s}");
    assert_eq!( s, r#"{"callsign":"KLM123","coords":[[4.7,52.0],[4.8,52.1]],"averageAltitude":500.0}"#);
}
