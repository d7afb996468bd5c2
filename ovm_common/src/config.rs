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

/// loading of config structs from files. Configs are normally RON files but we also accept JSON,
/// which is the format most tools can generate. The format is determined by the file extension
///
/// use like so:
/// ```ignore
/// let config: DisturbanceConfig = load_config( "configs/disturbance.ron")?;
/// ```

use std::{fs, path::Path};
use serde::de::DeserializeOwned;

use crate::define_error;

define_error!{ pub ConfigError =
    IOError( #[from] std::io::Error ) : "config IO error: {0}",
    ParseError(String) : "config parse error: {0}",
    UnsupportedFormat(String) : "unsupported config file format: {0}"
}

pub type Result<T> = std::result::Result<T,ConfigError>;

pub fn load_config<C,P> (path: P)->Result<C> where C: DeserializeOwned, P: AsRef<Path> {
    let path = path.as_ref();
    let content = fs::read_to_string( path)?;

    match path.extension().and_then( |ext| ext.to_str()) {
        Some("ron") => parse_ron( &content),
        Some("json") => parse_json( &content),
        _ => Err( ConfigError::UnsupportedFormat( path.display().to_string()))
    }
}

/// if there is no explicit path we use the default config
pub fn load_config_or_default<C,P> (path: Option<P>)->Result<C> where C: DeserializeOwned + Default, P: AsRef<Path> {
    match path {
        Some(path) => load_config( path),
        None => Ok( C::default())
    }
}

pub fn parse_ron<C> (s: &str)->Result<C> where C: DeserializeOwned {
    ron::from_str( s).map_err( |e| ConfigError::ParseError( e.to_string()))
}

pub fn parse_json<C> (s: &str)->Result<C> where C: DeserializeOwned {
    serde_json::from_str( s).map_err( |e| ConfigError::ParseError( e.to_string()))
}
