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

use std::{collections::BTreeMap, f64::consts::PI, sync::{Arc, atomic::{AtomicUsize,Ordering}}};
use tokio_util::sync::CancellationToken;
use ovm_common::{datetime::TimeKey, geo::{GeoBoundingBox,GeoPoint,bbox_from_radius,to_web_mercator}};
use ovm_telemetry::{AircraftState, MemoryStore, TelemetrySnapshot, TelemetryStore};
use ovm_disturbance::{
    DetectionQuery, DisturbanceConfig, DisturbancePeriod, DisturbanceReporter, DisturbanceScanner, GeoJsonRenderer,
    Trajectory, TrajectoryRenderer, errors::{OvmDisturbanceError, Result}
};

// run with "cargo test --test test_report -- --nocapture"

const ORIGIN_LAT: f64 = 52.0;
const ORIGIN_LON: f64 = 4.7;
const METERS_PER_DEG_LAT: f64 = 6371008.8 * PI / 180.0;

fn origin ()->GeoPoint { GeoPoint::from_lat_lon_degrees( ORIGIN_LAT, ORIGIN_LON) }

fn tk (m: u32)->TimeKey { TimeKey::from_ymd_hms( 2024, 1, 1, 12, m, 0).unwrap() }

fn ac (callsign: &str, meters: f64, altitude: Option<f64>)->AircraftState {
    AircraftState::new( callsign, ORIGIN_LAT + meters / METERS_PER_DEG_LAT, ORIGIN_LON, altitude)
}

/// A passes at 12:02, B at 12:04..12:05, C is too high, LIFELN1 is ignored
fn store ()->Arc<dyn TelemetryStore> {
    let store = MemoryStore::new();
    let snapshots = vec![
        TelemetrySnapshot::new( tk(0), vec![ ac("A", 3000.0, Some(600.0)), ac("LIFELN1", 100.0, Some(200.0)) ]),
        TelemetrySnapshot::new( tk(1), vec![ ac("A", 1500.0, Some(600.0)), ac("C", 100.0, Some(3000.0)) ]),
        TelemetrySnapshot::new( tk(2), vec![ ac("A", 500.0, Some(600.0)).with_icao24("484abc") ]),
        TelemetrySnapshot::new( tk(3), vec![ ac("A", -1500.0, Some(600.0)), ac("B", 2500.0, Some(700.0)) ]),
        TelemetrySnapshot::new( tk(4), vec![ ac("A", -3000.0, Some(600.0)), ac("B", 900.0, Some(700.0)) ]),
        TelemetrySnapshot::new( tk(5), vec![ ac("B", 200.0, Some(700.0)) ]),
        TelemetrySnapshot::new( tk(6), vec![ ac("B", -2500.0, Some(700.0)) ]),
    ];
    for s in snapshots { store.upsert( s).unwrap() }
    Arc::new( store)
}

fn config ()->Arc<DisturbanceConfig> { Arc::new( DisturbanceConfig::default()) }

fn query ()->DetectionQuery { DetectionQuery::new( "home", origin(), 1000, 1000, 2, 10) }

#[test]
fn test_find_flights() {
    let scanner = DisturbanceScanner::new( store(), config());
    let flights = scanner.find_flights( &origin(), tk(0), tk(6), 1000, 1000, false, &CancellationToken::new()).unwrap();
    println!("{flights:#?}");

    assert_eq!( flights.len(), 2);
    assert_eq!( flights[0].callsign, "A");
    assert_eq!( flights[0].first_seen, tk(2));
    assert_eq!( flights[0].icao24.as_deref(), Some("484abc"));
    assert_eq!( flights[1].callsign, "B");
    assert_eq!( flights[1].first_seen, tk(4));
    assert!( flights.iter().all( |f| f.trajectory.is_none()));
}

#[test]
fn test_find_flights_with_trajectories() {
    let scanner = DisturbanceScanner::new( store(), config());
    let flights = scanner.find_flights( &origin(), tk(0), tk(6), 1000, 1000, true, &CancellationToken::new()).unwrap();

    let a = flights[0].trajectory.as_ref().unwrap();
    assert_eq!( a.len(), 5); // 12:00 (3000m) ... 12:04 (3000m)
    let b = flights[1].trajectory.as_ref().unwrap();
    assert_eq!( b.len(), 4); // 12:03 ... 12:06
}

#[test]
fn test_find_flights_invalid() {
    let scanner = DisturbanceScanner::new( store(), config());
    let res = scanner.find_flights( &origin(), tk(0), tk(6), 0, 1000, false, &CancellationToken::new());
    assert!( matches!( res, Err(OvmDisturbanceError::InvalidArgument(_))));

    let res = scanner.find_flights( &GeoPoint::from_lat_lon_degrees( 100.0, 4.7), tk(0), tk(6), 1000, 1000, false, &CancellationToken::new());
    assert!( matches!( res, Err(OvmDisturbanceError::InvalidArgument(_))));
}

fn detect_period ()->DisturbancePeriod {
    let scanner = DisturbanceScanner::new( store(), config());
    let mut periods = scanner.detect( &[query()], tk(0), tk(6)).unwrap();
    assert_eq!( periods.len(), 1);
    periods.remove(0)
}

#[test]
fn test_detected_period() {
    let p = detect_period();
    println!("{p}");
    assert_eq!( p.begin, tk(2));
    assert_eq!( p.end, tk(5));
    assert_eq!( p.hit_count, 2);
    assert_eq!( p.flights[0].icao24.as_deref(), Some("484abc"));
    assert!( (p.average_altitude - (600.0 + 700.0 + 700.0) / 3.0).abs() < 1e-9);
}

struct CountingRenderer { calls: AtomicUsize }

impl TrajectoryRenderer for CountingRenderer {
    fn render (&self, period: &DisturbancePeriod, trajectories: &BTreeMap<String,Trajectory>, bbox: &GeoBoundingBox)->Result<Vec<u8>> {
        self.calls.fetch_add( 1, Ordering::Relaxed);
        Ok( format!("{}:{}", period.query.id, trajectories.len()).into_bytes())
    }
}

struct FailingRenderer;

impl TrajectoryRenderer for FailingRenderer {
    fn render (&self, _: &DisturbancePeriod, _: &BTreeMap<String,Trajectory>, _: &GeoBoundingBox)->Result<Vec<u8>> {
        Err( OvmDisturbanceError::RenderError("no tiles".into()))
    }
}

#[test]
fn test_build_report() {
    let period = detect_period();
    let reporter = DisturbanceReporter::new( store(), config());

    let report = reporter.build_report( &period, None).unwrap();
    assert!( report.image.is_none());
    assert_eq!( report.trajectories.len(), 2);
    assert_eq!( report.trajectories["A"].len(), 5);
    assert_eq!( report.bbox, bbox_from_radius( &origin(), 2000.0));
    assert!( report.bbox.strictly_contains( &origin()));

    let renderer = CountingRenderer { calls: AtomicUsize::new(0) };
    let reports = reporter.build_reports( &[period.clone(), period.clone()], Some(&renderer)).unwrap();
    assert_eq!( renderer.calls.load( Ordering::Relaxed), 2);
    assert_eq!( reports[0].image.as_deref(), Some("home:2".as_bytes()));

    let res = reporter.build_report( &period, Some(&FailingRenderer));
    assert!( matches!( res, Err(OvmDisturbanceError::RenderError(_))));
}

#[test]
fn test_geojson_renderer() {
    let period = detect_period();
    let reporter = DisturbanceReporter::new( store(), config());
    let report = reporter.build_report( &period, Some(&GeoJsonRenderer)).unwrap();

    let doc: serde_json::Value = serde_json::from_slice( report.image.as_ref().unwrap()).unwrap();
    println!("{doc}");
    assert_eq!( doc["type"], "FeatureCollection");
    assert_eq!( doc["features"].as_array().unwrap().len(), 3);
    assert_eq!( doc["features"][1]["properties"]["callsign"], "A");
    assert_eq!( doc["features"][1]["geometry"]["coordinates"].as_array().unwrap().len(), 5);

    let (x_min, y_min) = to_web_mercator( report.bbox.lon_min, report.bbox.lat_min);
    let (x_max, y_max) = to_web_mercator( report.bbox.lon_max, report.bbox.lat_max);
    assert!( (doc["mercatorBbox"][0].as_f64().unwrap() - x_min).abs() < 1e-6);
    assert!( (doc["mercatorBbox"][1].as_f64().unwrap() - y_min).abs() < 1e-6);
    assert!( (doc["mercatorBbox"][2].as_f64().unwrap() - x_max).abs() < 1e-6);
    assert!( (doc["mercatorBbox"][3].as_f64().unwrap() - y_max).abs() < 1e-6);
    assert!( x_min < x_max && y_min < y_max);
}

#[test]
fn test_serialization() {
    let period = detect_period();
    let reporter = DisturbanceReporter::new( store(), config());
    let report = reporter.build_report( &period, Some(&GeoJsonRenderer)).unwrap();

    let json = serde_json::to_value( &report).unwrap();
    println!("{}", serde_json::to_string_pretty( &json).unwrap());

    assert!( json.get("image").is_none());
    let p = &json["period"];
    assert_eq!( p["begin"], 20240101120200_i64);
    assert_eq!( p["hitCount"], 2);
    assert_eq!( p["callsigns"]["B"], 20240101120400_i64);
    assert_eq!( p["query"]["radiusMeters"], 1000);
    assert_eq!( p["query"]["origin"]["lat"], 52.0);
    assert_eq!( p["flights"][0]["firstSeen"], 20240101120200_i64);

    let back: DisturbancePeriod = serde_json::from_value( p.clone()).unwrap();
    assert_eq!( back, period);
}

#[test]
fn test_query_from_ron() {
    let queries: Vec<DetectionQuery> = ovm_common::config::parse_ron( r#"[
        ( id: "home", origin: ( lat: 52.0, lon: 4.7 ), radiusMeters: 1000, altitudeThresholdMeters: 1000,
          occurrenceThreshold: 2, timeframeMinutes: 10 )
    ]"#).unwrap();
    assert_eq!( queries[0], query());
}
