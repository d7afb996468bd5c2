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

//! detection of low altitude aircraft disturbances around given locations, and reconstruction
//! of the involved flight paths

pub mod errors;
pub mod config;
pub use config::{DisturbanceConfig,EndOfScanPolicy,QueryLimits};

pub mod query;
pub use query::DetectionQuery;

pub mod period;
pub use period::{CallsignInfo,DisturbancePeriod};

pub mod filter;
pub use filter::IgnoreList;

pub mod window;
pub use window::{DisturbanceWindow,WindowSlot};

pub mod scanner;
pub use scanner::DisturbanceScanner;

pub mod trajectory;
pub use trajectory::{Trajectory,TrajectoryReconstructor};

pub mod flights;
pub use flights::FlightSighting;

pub mod report;
pub use report::{DisturbanceReport,DisturbanceReporter,GeoJsonRenderer,TrajectoryRenderer};
