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

use thiserror::Error;
use ovm_common::map_to_opaque_error;
use ovm_telemetry::errors::OvmTelemetryError;

pub type Result<T> = std::result::Result<T,OvmDisturbanceError>;

#[derive(Error,Debug)]
pub enum OvmDisturbanceError {

    /// malformed query or time range, detected before the store is touched
    #[error("invalid argument {0}")]
    InvalidArgument(String),

    /// the telemetry store failed, no partial results are returned
    #[error("upstream unavailable {0}")]
    UpstreamUnavailable(String),

    #[error("internal inconsistency {0}")]
    InternalInconsistency(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("render error {0}")]
    RenderError(String),
}

map_to_opaque_error!{ OvmTelemetryError => OvmDisturbanceError::UpstreamUnavailable }

macro_rules! invalid_argument {
    ($fmt:literal $(, $arg:expr )* ) => {
        OvmDisturbanceError::InvalidArgument( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use invalid_argument;

macro_rules! internal_inconsistency {
    ($fmt:literal $(, $arg:expr )* ) => {
        OvmDisturbanceError::InternalInconsistency( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use internal_inconsistency;
