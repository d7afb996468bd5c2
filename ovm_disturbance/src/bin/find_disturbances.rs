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

use std::{fs, path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use ovm_common::{config::{load_config,load_config_or_default}, datetime::TimeKey};
use ovm_telemetry::{MemoryStore, TelemetryStore};
use ovm_disturbance::{
    DetectionQuery, DisturbanceConfig, DisturbanceReporter, DisturbanceScanner, GeoJsonRenderer, TrajectoryRenderer
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "find disturbance periods in recorded aircraft telemetry")]
pub struct Args {
    /// RON or JSON file with the list of detection queries
    #[arg(short,long)]
    pub queries: PathBuf,

    /// optional RON or JSON disturbance config
    #[arg(short,long)]
    pub config: Option<PathBuf>,

    /// begin of scan as YYYYMMDDHHMMSS (UTC)
    #[arg(short,long)]
    pub begin: i64,

    /// end of scan as YYYYMMDDHHMMSS (UTC)
    #[arg(short,long)]
    pub end: i64,

    /// output reports with trajectories instead of plain periods
    #[arg(short,long)]
    pub reports: bool,

    /// directory to write GeoJSON renderings of reports to
    #[arg(long)]
    pub geojson: Option<PathBuf>,

    /// JSON file with recorded snapshots
    pub snapshots: PathBuf,
}

fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::from_default_env())  // use RUST_LOG to set max level
        .with_writer( std::io::stderr)
        .init();

    let args = Args::parse();

    let config: DisturbanceConfig = load_config_or_default( args.config.as_ref())?;
    let config = Arc::new( config);
    let queries: Vec<DetectionQuery> = load_config( &args.queries)?;

    let store: Arc<dyn TelemetryStore> = Arc::new( MemoryStore::from_json_file( &args.snapshots)
        .with_context( || format!("failed to load snapshots from {:?}", args.snapshots))?);

    let begin = TimeKey::new( args.begin)?;
    let end = TimeKey::new( args.end)?;

    let scanner = DisturbanceScanner::new( store.clone(), config.clone());
    let periods = scanner.detect( &queries, begin, end)?;

    if args.reports || args.geojson.is_some() {
        let reporter = DisturbanceReporter::new( store, config);
        let renderer = args.geojson.as_ref().map( |_| &GeoJsonRenderer as &dyn TrajectoryRenderer);
        let reports = reporter.build_reports( &periods, renderer)?;

        if let Some(dir) = &args.geojson {
            fs::create_dir_all( dir)?;
            for report in &reports {
                if let Some(image) = &report.image {
                    let path = dir.join( format!("{}_{}.geojson", report.period.query.id, report.period.begin));
                    fs::write( &path, image)?;
                    eprintln!("wrote {:?}", path);
                }
            }
        }
        println!("{}", serde_json::to_string_pretty( &reports)?);

    } else {
        println!("{}", serde_json::to_string_pretty( &periods)?);
    }

    Ok(())
}
