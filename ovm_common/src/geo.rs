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
#![allow(unused,uncommon_codepoints,non_snake_case)]

/// this module provides the geometric primitives of OVM: spherical (great circle) distances between
/// lat/lon positions, the viewport bounding box around a location of interest, and the web mercator
/// projection used to render trajectories.
/// Positions wrap [geo](https://docs.rs/geo/latest/geo/index.html) points (x = longitude, y = latitude) so that
/// they can be used with 3rd party algorithms without copying, distances are available as
/// [uom](https://docs.rs/uom/latest/uom/) `Length` values or plain meters.

use std::fmt;
use serde::{Serialize,Deserialize};
use geo::{Coord, Distance, Haversine, Point};
use uom::si::f64::Length;
use uom::si::length::meter;

use crate::{cos, tan, ln, PI};
use crate::geo_constants::{BBOX_EARTH_RADIUS_KM, WEB_MERCATOR_MAX};

pub type GeoCoord = Coord<f64>;

/* #region GeoPoint ***********************************************************************************************/

/// a wrapper for geo::Point that uses geodetic degrees stored as f64
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(into="LatLon", from="LatLon")]
pub struct GeoPoint(Point);

impl GeoPoint {
    pub fn from_lon_lat_degrees (lon: f64, lat: f64) -> Self {
        GeoPoint( Point::new( lon, lat))
    }

    /// the order used by query origins (which follow the usual "lat,lon" notation)
    pub fn from_lat_lon_degrees (lat: f64, lon: f64) -> Self {
        GeoPoint( Point::new( lon, lat))
    }

    pub fn from_point (p: Point) -> Self { GeoPoint(p) }

    #[inline] pub fn longitude_degrees (&self) -> f64 { self.0.x() }
    #[inline] pub fn latitude_degrees (&self) -> f64 { self.0.y() }

    pub fn point (&self) -> &Point { &self.0 }
    pub fn coord (&self) -> GeoCoord { self.0.0 }

    /// (lon,lat) tuple as used for trajectory coordinates
    pub fn lon_lat (&self) -> (f64,f64) { (self.0.x(), self.0.y()) }

    pub fn is_valid (&self) -> bool {
        let lat = self.latitude_degrees();
        let lon = self.longitude_degrees();
        lat.is_finite() && lon.is_finite() && lat.abs() <= 90.0 && lon.abs() <= 180.0
    }

    /// great circle distance to other point
    pub fn distance_to (&self, other: &GeoPoint) -> Length {
        let dist = Haversine.distance( self.0, other.0);
        Length::new::<meter>(dist)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.0.y(), self.0.x())
    }
}

/// serialization proxy. We accept the "lat"/"lon" short forms and "latitude"/"longitude"
#[derive(Serialize,Deserialize)]
struct LatLon {
    #[serde(alias="latitude")]
    lat: f64,
    #[serde(alias="longitude")]
    lon: f64,
}

impl From<GeoPoint> for LatLon {
    fn from (p: GeoPoint)->Self { LatLon{ lat: p.latitude_degrees(), lon: p.longitude_degrees() } }
}

impl From<LatLon> for GeoPoint {
    fn from (ll: LatLon)->Self { GeoPoint::from_lat_lon_degrees( ll.lat, ll.lon) }
}

/* #endregion GeoPoint */

/// great circle (haversine) surface distance in meters between two points, based on the mean earth radius
pub fn distance_meters (a: &GeoPoint, b: &GeoPoint) -> f64 {
    a.distance_to( b).get::<meter>()
}

/* #region GeoBoundingBox ****************************************************************************************/

/// a lat/lon aligned box in degrees
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(rename_all="camelCase")]
pub struct GeoBoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl GeoBoundingBox {
    pub fn new (lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64)->Self {
        GeoBoundingBox { lat_min, lat_max, lon_min, lon_max }
    }

    /// the equirectangular approximation of a box around `origin` that encloses a circle of
    /// `radius_meters`, using a 6378km earth radius. Undefined at the poles
    pub fn around (origin: &GeoPoint, radius_meters: f64)->Self {
        let r = (radius_meters / 1000.0) / BBOX_EARTH_RADIUS_KM;
        let t1 = 180.0 / PI;
        let t2 = t1 / cos( origin.latitude_degrees() * PI / 180.0);

        GeoBoundingBox {
            lat_min: origin.latitude_degrees() - r * t1,
            lat_max: origin.latitude_degrees() + r * t1,
            lon_min: origin.longitude_degrees() - r * t2,
            lon_max: origin.longitude_degrees() + r * t2,
        }
    }

    pub fn contains (&self, p: &GeoPoint)->bool {
        let lat = p.latitude_degrees();
        let lon = p.longitude_degrees();
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }

    /// strictly inside (not on the boundary)
    pub fn strictly_contains (&self, p: &GeoPoint)->bool {
        let lat = p.latitude_degrees();
        let lon = p.longitude_degrees();
        lat > self.lat_min && lat < self.lat_max && lon > self.lon_min && lon < self.lon_max
    }

    pub fn lat_extent (&self)->f64 { self.lat_max - self.lat_min }
    pub fn lon_extent (&self)->f64 { self.lon_max - self.lon_min }

    /// (lat_min, lat_max, lon_min, lon_max) - the order used by upstream providers
    pub fn as_tuple (&self)->(f64,f64,f64,f64) { (self.lat_min, self.lat_max, self.lon_min, self.lon_max) }

    /// the box corners in EPSG:3857 meters as (x_min, y_min, x_max, y_max)
    pub fn to_web_mercator (&self)->(f64,f64,f64,f64) {
        let (x_min,y_min) = to_web_mercator( self.lon_min, self.lat_min);
        let (x_max,y_max) = to_web_mercator( self.lon_max, self.lat_max);
        (x_min, y_min, x_max, y_max)
    }
}

impl fmt::Display for GeoBoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[lat: {}..{}, lon: {}..{}]", self.lat_min, self.lat_max, self.lon_min, self.lon_max)
    }
}

/// function form of [`GeoBoundingBox::around`]
#[inline]
pub fn bbox_from_radius (origin: &GeoPoint, radius_meters: f64)->GeoBoundingBox {
    GeoBoundingBox::around( origin, radius_meters)
}

/* #endregion GeoBoundingBox */

/// convert EPSG:4326 lon/lat degrees into EPSG:3857 (web mercator) x/y meters
pub fn to_web_mercator (lon: f64, lat: f64)->(f64,f64) {
    let x = lon * WEB_MERCATOR_MAX / 180.0;
    let y = (ln( tan( (90.0 + lat) * PI / 360.0)) / (PI / 180.0)) * (WEB_MERCATOR_MAX / 180.0);
    (x,y)
}
