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

use std::{sync::Arc, time::Duration};
use chrono::{DateTime,TimeDelta,Utc};
use serde::{Serialize,Deserialize};
use serde_json::Value;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug,info,warn};
use ovm_common::{datetime::{TimeKey,deserialize_duration,serialize_duration,secs,days}, geo::GeoBoundingBox};

use crate::{AircraftState, TelemetrySnapshot, TelemetryStore};
use crate::errors::{OvmTelemetryError, Result, parse_error};

/// which of the two altitudes reported in a state vector we use
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq)]
pub enum AltitudeSource {
    Geometric,
    Barometric
}

#[derive(Serialize,Deserialize,Debug,Clone)]
#[serde(default)]
pub struct OpenSkyConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub bbox: GeoBoundingBox,  // area for which we request state vectors

    #[serde(deserialize_with = "deserialize_duration", serialize_with = "serialize_duration")]
    pub poll_interval: Duration,

    /// how long snapshots are kept in the store (zero means forever)
    #[serde(deserialize_with = "deserialize_duration", serialize_with = "serialize_duration")]
    pub retention: Duration,

    pub altitude_source: AltitudeSource,
}

impl Default for OpenSkyConfig {
    fn default ()->Self {
        OpenSkyConfig {
            url: "https://opensky-network.org/api/states/all".to_string(),
            username: None,
            password: None,
            bbox: GeoBoundingBox::new( 50.75, 53.7, 3.2, 7.22),
            poll_interval: secs(60),
            retention: days(30),
            altitude_source: AltitudeSource::Geometric,
        }
    }
}

/* #region state vector parsing *****************************************************************************************/

// field indices of OpenSky state vectors
const ICAO24: usize = 0;
const CALLSIGN: usize = 1;
const LONGITUDE: usize = 5;
const LATITUDE: usize = 6;
const BARO_ALTITUDE: usize = 7;
const ON_GROUND: usize = 8;
const GEO_ALTITUDE: usize = 13;

#[derive(Deserialize,Debug)]
pub struct StatesResponse {
    pub time: i64,  // epoch seconds
    pub states: Option<Vec<Value>>
}

/// translate a single state vector array. Returns `None` for records without callsign or position.
/// Aircraft on the ground or without the selected altitude get `altitude: None`
pub fn parse_state_vector (sv: &Value, altitude_source: AltitudeSource)->Option<AircraftState> {
    let fields = sv.as_array()?;

    let callsign = fields.get(CALLSIGN)?.as_str()?;
    if callsign.trim().is_empty() { return None }

    let longitude = fields.get(LONGITUDE)?.as_f64()?;
    let latitude = fields.get(LATITUDE)?.as_f64()?;

    let on_ground = fields.get(ON_GROUND).and_then( |v| v.as_bool()).unwrap_or(false);
    let altitude = if on_ground {
        None
    } else {
        let idx = match altitude_source {
            AltitudeSource::Geometric => GEO_ALTITUDE,
            AltitudeSource::Barometric => BARO_ALTITUDE
        };
        fields.get(idx).and_then( |v| v.as_f64())
    };

    let icao24 = fields.get(ICAO24).and_then( |v| v.as_str()).map( |s| s.to_string());

    Some( AircraftState { callsign: callsign.to_string(), icao24, latitude, longitude, altitude })
}

/// turn a `/states/all` response into a snapshot keyed by the response time
pub fn parse_states_response (response: &StatesResponse, altitude_source: AltitudeSource)->Result<TelemetrySnapshot> {
    let date = DateTime::<Utc>::from_timestamp( response.time, 0).ok_or_else( || parse_error!("invalid response time {}", response.time))?;
    let timestamp = TimeKey::from_datetime( &date);

    let aircraft: Vec<AircraftState> = match &response.states {
        Some(states) => {
            let aircraft: Vec<AircraftState> = states.iter().filter_map( |sv| parse_state_vector( sv, altitude_source)).collect();
            if aircraft.len() < states.len() {
                debug!("skipped {} incomplete state vectors", states.len() - aircraft.len());
            }
            aircraft
        }
        None => Vec::new()
    };

    Ok( TelemetrySnapshot::new( timestamp, aircraft))
}

pub fn parse_states_json (json: &str, altitude_source: AltitudeSource)->Result<TelemetrySnapshot> {
    let response: StatesResponse = serde_json::from_str( json)?;
    parse_states_response( &response, altitude_source)
}

/* #endregion state vector parsing */

/* #region acquisition **************************************************************************************************/

/// something that can produce the current telemetry snapshot
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn fetch_snapshot (&self)->Result<TelemetrySnapshot>;
}

pub struct OpenSkyConnector {
    config: Arc<OpenSkyConfig>,
    client: reqwest::Client,
}

impl OpenSkyConnector {
    pub fn new (config: Arc<OpenSkyConfig>)->Self {
        OpenSkyConnector { config, client: reqwest::Client::new() }
    }

    pub fn config (&self)->&OpenSkyConfig { self.config.as_ref() }

    /// fetch one snapshot and store it
    pub async fn poll_once (&self, store: &dyn TelemetryStore)->Result<TimeKey> {
        poll_once( self, store).await
    }
}

#[async_trait]
impl TelemetrySource for OpenSkyConnector {
    async fn fetch_snapshot (&self)->Result<TelemetrySnapshot> {
        let bbox = &self.config.bbox;
        let mut req = self.client.get( &self.config.url)
            .query( &[("lamin", bbox.lat_min), ("lomin", bbox.lon_min), ("lamax", bbox.lat_max), ("lomax", bbox.lon_max)]);

        if let Some(user) = &self.config.username {
            req = req.basic_auth( user, self.config.password.as_ref());
        }

        let response: StatesResponse = req.send().await?.error_for_status()?.json().await?;
        parse_states_response( &response, self.config.altitude_source)
    }
}

pub async fn poll_once (source: &dyn TelemetrySource, store: &dyn TelemetryStore)->Result<TimeKey> {
    let snapshot = source.fetch_snapshot().await?;
    let timestamp = snapshot.timestamp;
    debug!("storing snapshot {} with {} aircraft", timestamp, snapshot.len());
    store.upsert( snapshot)?;
    Ok(timestamp)
}

/// poll `source` every `interval` until `cancel` is triggered. Failed polls are logged and retried
/// with the next tick. If `retention` is not zero, snapshots older than that are removed after each poll
pub async fn run_logger (source: Arc<dyn TelemetrySource>, store: Arc<dyn TelemetryStore>,
                         interval: Duration, retention: Duration, cancel: CancellationToken)->Result<()>
{
    let retention = if retention.is_zero() { None } else {
        Some( TimeDelta::from_std( retention).map_err( |e| OvmTelemetryError::OpFailedError( format!("invalid retention: {e}")))?)
    };
    let mut ticker = tokio::time::interval( interval);
    info!("telemetry logger started with interval {:?}", interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                match poll_once( source.as_ref(), store.as_ref()).await {
                    Ok(timestamp) => {
                        if let Some(retention) = retention {
                            prune( store.as_ref(), timestamp, retention);
                        }
                    }
                    Err(e) => warn!("telemetry poll failed: {e}")
                }
            }
        }
    }

    info!("telemetry logger terminated");
    Ok(())
}

fn prune (store: &dyn TelemetryStore, latest: TimeKey, retention: TimeDelta) {
    let cutoff = latest.to_datetime().map( |d| TimeKey::from_datetime( &(d - retention)));
    match cutoff {
        Ok(cutoff) => match store.remove_before( cutoff) {
            Ok(n) if n > 0 => debug!("removed {} snapshots before {}", n, cutoff),
            Ok(_) => {}
            Err(e) => warn!("failed to prune store: {e}")
        }
        Err(e) => warn!("cannot compute retention cutoff: {e}")
    }
}

/* #endregion acquisition */
