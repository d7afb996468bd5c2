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

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, TimeZone, Timelike, Utc};
use serde::{Serialize,Deserialize,Serializer,Deserializer};
use std::time::Duration;
use std::fmt;
use parse_duration::parse;

use crate::define_error;

define_error!{ pub TimeKeyError =
    InvalidKey(i64) : "not a valid YYYYMMDDHHMMSS time key: {0}",
    OutOfRange(String) : "time out of encodable range: {0}"
}

/* #region TimeKey ************************************************************************************************/

/// the native key of the telemetry store: a UTC date encoded as decimal integer `YYYYMMDDHHMMSS`.
/// The numeric order of keys is the chronological order. Arithmetic on keys is meaningless, convert
/// into `DateTime<Utc>` for anything that involves durations
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash)]
#[serde(transparent)]
pub struct TimeKey(i64);

const YEAR: i64 = 10_000_000_000;
const MONTH: i64 = 100_000_000;
const DAY: i64 = 1_000_000;
const HOUR: i64 = 10_000;
const MINUTE: i64 = 100;

impl TimeKey {
    pub const MIN: TimeKey = TimeKey(0);
    pub const MAX: TimeKey = TimeKey(i64::MAX);

    /// create a validated key
    pub fn new (key: i64)->Result<Self,TimeKeyError> {
        let tk = TimeKey(key);
        tk.to_datetime()?;
        Ok(tk)
    }

    /// wrap a key we got from a trusted source (e.g. the store) without validation
    pub const fn from_raw (key: i64)->Self { TimeKey(key) }

    /// note that sub-second fractions are truncated
    pub fn from_datetime<Tz: TimeZone> (dt: &DateTime<Tz>)->Self {
        let dt = dt.with_timezone(&Utc);
        TimeKey(
            dt.year() as i64 * YEAR
            + dt.month() as i64 * MONTH
            + dt.day() as i64 * DAY
            + dt.hour() as i64 * HOUR
            + dt.minute() as i64 * MINUTE
            + dt.second() as i64
        )
    }

    pub fn from_ymd_hms (year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32)->Result<Self,TimeKeyError> {
        NaiveDate::from_ymd_opt( year, month, day)
            .and_then( |d| d.and_hms_opt( hour, min, sec))
            .map( |ndt| TimeKey::from_datetime( &ndt.and_utc()))
            .ok_or_else( || TimeKeyError::OutOfRange( format!("{year}-{month}-{day} {hour}:{min}:{sec}")))
    }

    pub fn now ()->Self { TimeKey::from_datetime( &Utc::now()) }

    pub fn value (&self)->i64 { self.0 }

    pub fn to_datetime (&self)->Result<DateTime<Utc>,TimeKeyError> {
        let v = self.0;
        if v < 0 || v / YEAR > 9999 { return Err( TimeKeyError::InvalidKey(v)) }

        let year = (v / YEAR) as i32;
        let month = ((v / MONTH) % 100) as u32;
        let day = ((v / DAY) % 100) as u32;
        let hour = ((v / HOUR) % 100) as u32;
        let min = ((v / MINUTE) % 100) as u32;
        let sec = (v % 100) as u32;

        NaiveDate::from_ymd_opt( year, month, day)
            .and_then( |d| d.and_hms_opt( hour, min, sec))
            .map( |ndt| ndt.and_utc())
            .ok_or( TimeKeyError::InvalidKey(v))
    }

    /// the key that is `delta` later (or earlier if negative)
    pub fn offset (&self, delta: TimeDelta)->Result<Self,TimeKeyError> {
        let dt = self.to_datetime()?;
        dt.checked_add_signed( delta)
            .map( |d| TimeKey::from_datetime(&d))
            .ok_or_else( || TimeKeyError::OutOfRange( format!("{} + {}", self.0, delta)))
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<DateTime<Utc>> for TimeKey {
    fn from (dt: DateTime<Utc>)->Self { TimeKey::from_datetime(&dt) }
}

impl TryFrom<TimeKey> for DateTime<Utc> {
    type Error = TimeKeyError;
    fn try_from (tk: TimeKey)->Result<Self,Self::Error> { tk.to_datetime() }
}

/* #endregion TimeKey */

// simple Duration ctors that read better in config defaults
#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }
#[inline] pub fn minutes (n: u64)->Duration { Duration::from_secs(n * 60) }
#[inline] pub fn hours (n: u64)->Duration { Duration::from_secs(n * 3600) }
#[inline] pub fn days (n: u64)->Duration { Duration::from_secs(n * 86400) }

/// fractional minutes between two dates (negative if `later` is before `earlier`)
pub fn elapsed_minutes (later: &DateTime<Utc>, earlier: &DateTime<Utc>)->f64 {
    (*later - *earlier).num_milliseconds() as f64 / 60_000.0
}

/// has at least `minutes` passed between `earlier` and `later`
pub fn has_elapsed_minutes (later: &DateTime<Utc>, earlier: &DateTime<Utc>, minutes: u32)->bool {
    (*later - *earlier) >= TimeDelta::minutes( minutes as i64)
}

//--- support for serde

pub fn deserialize_duration <'a,D>(deserializer: D) -> Result<Duration,D::Error>
    where D: Deserializer<'a>
{
    String::deserialize(deserializer).and_then( |string| {
        parse(string.as_str())
            .map_err( |e| serde::de::Error::custom(format!("{:?}",e)))
    })
}

pub fn serialize_duration<S: Serializer> (dur: &Duration, s: S) -> Result<S::Ok, S::Error>  {
    let dfm = format!("{:?}", dur);
    s.serialize_str(&dfm)
}
