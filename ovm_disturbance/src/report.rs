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
use serde::{Deserialize,Serialize};
use serde_json::{json, Value};
use tracing::debug;
use ovm_common::geo::{GeoBoundingBox,bbox_from_radius};
use ovm_telemetry::TelemetryStore;

use crate::config::DisturbanceConfig;
use crate::period::DisturbancePeriod;
use crate::trajectory::{Trajectory,TrajectoryReconstructor};
use crate::errors::{OvmDisturbanceError, Result};

/// external collaborator that turns a period and its trajectories into an image. We never look at the bytes
pub trait TrajectoryRenderer: Send + Sync {
    fn render (&self, period: &DisturbancePeriod, trajectories: &BTreeMap<String,Trajectory>, bbox: &GeoBoundingBox)->Result<Vec<u8>>;
}

/// a period together with what is needed to visualize it
#[derive(Serialize,Deserialize,Debug,Clone)]
#[serde(rename_all = "camelCase")]
pub struct DisturbanceReport {
    pub period: DisturbancePeriod,
    pub trajectories: BTreeMap<String,Trajectory>,
    pub bbox: GeoBoundingBox,

    #[serde(skip)]
    pub image: Option<Vec<u8>>,
}

pub struct DisturbanceReporter {
    reconstructor: TrajectoryReconstructor,
    config: Arc<DisturbanceConfig>,
}

impl DisturbanceReporter {
    pub fn new (store: Arc<dyn TelemetryStore>, config: Arc<DisturbanceConfig>)->Self {
        DisturbanceReporter { reconstructor: TrajectoryReconstructor::new( store), config }
    }

    /// reconstruct trajectories for all callsigns of `period` around their first sighting and compute the
    /// (padded) viewport. The image is only created if there is a renderer
    pub fn build_report (&self, period: &DisturbancePeriod, renderer: Option<&dyn TrajectoryRenderer>)->Result<DisturbanceReport> {
        let query = &period.query;
        let radius = query.radius_meters as f64;

        let mut trajectories: BTreeMap<String,Trajectory> = BTreeMap::new();
        for (callsign, first_seen) in &period.callsigns {
            let trajectory = self.reconstructor.reconstruct( callsign, *first_seen, self.config.trajectory_lookback,
                                                             self.config.trajectory_lookahead, &query.origin, radius)?;
            trajectories.insert( callsign.clone(), trajectory);
        }

        let bbox = bbox_from_radius( &query.origin, radius + self.config.bbox_padding_meters);

        let image = match renderer {
            Some(renderer) => Some( renderer.render( period, &trajectories, &bbox)?),
            None => None
        };

        debug!("built report for query {} with {} trajectories", query.id, trajectories.len());
        Ok( DisturbanceReport { period: period.clone(), trajectories, bbox, image })
    }

    pub fn build_reports (&self, periods: &[DisturbancePeriod], renderer: Option<&dyn TrajectoryRenderer>)->Result<Vec<DisturbanceReport>> {
        periods.iter().map( |p| self.build_report( p, renderer)).collect()
    }
}

/// renders trajectories as a GeoJSON FeatureCollection with one LineString per callsign plus the query origin
/// and the viewport. The viewport is also given in web mercator meters (`mercatorBbox`) for tile based map clients
pub struct GeoJsonRenderer;

impl TrajectoryRenderer for GeoJsonRenderer {
    fn render (&self, period: &DisturbancePeriod, trajectories: &BTreeMap<String,Trajectory>, bbox: &GeoBoundingBox)->Result<Vec<u8>> {
        let origin = &period.query.origin;

        let mut features: Vec<Value> = Vec::with_capacity( trajectories.len() + 1);
        features.push( json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [origin.longitude_degrees(), origin.latitude_degrees()] },
            "properties": { "id": period.query.id, "radius": period.query.radius_meters }
        }));

        for (callsign, trajectory) in trajectories {
            let coords: Vec<[f64;2]> = trajectory.coords.iter().map( |(lon,lat)| [*lon, *lat]).collect();
            features.push( json!({
                "type": "Feature",
                "geometry": { "type": "LineString", "coordinates": coords },
                "properties": { "callsign": callsign, "averageAltitude": trajectory.average_altitude }
            }));
        }

        let (x_min, y_min, x_max, y_max) = bbox.to_web_mercator();
        let doc = json!({
            "type": "FeatureCollection",
            "bbox": [bbox.lon_min, bbox.lat_min, bbox.lon_max, bbox.lat_max],
            "mercatorBbox": [x_min, y_min, x_max, y_max],
            "features": features
        });

        serde_json::to_vec( &doc).map_err( |e| OvmDisturbanceError::RenderError( e.to_string()))
    }
}
