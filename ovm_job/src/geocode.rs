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
use serde::{Deserialize,Serialize};
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::{sync::Mutex, time::Instant};
use tracing::debug;
use ovm_common::{datetime::{days,deserialize_duration,serialize_duration}, geo::GeoPoint};

use crate::errors::{OvmJobError, Result};

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(default)]
pub struct GeocodeCacheConfig {
    /// entries older than this are treated as misses
    #[serde(deserialize_with = "deserialize_duration", serialize_with = "serialize_duration")]
    pub ttl: Duration,
}

impl Default for GeocodeCacheConfig {
    fn default ()->Self { GeocodeCacheConfig { ttl: days(30) } }
}

/// the external address lookup service
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode (&self, address: &str)->Result<GeoPoint>;
}

#[derive(Debug,Clone,Copy)]
struct CacheEntry {
    position: GeoPoint,
    fetched: Instant,
}

type Slot = Arc<Mutex<Option<CacheEntry>>>;

/// address -> position cache in front of a [`Geocoder`].
/// Each address has its own async lock slot so that concurrent lookups of the same address
/// wait for a single upstream request, while lookups of different addresses proceed in parallel
pub struct GeocodeCache {
    geocoder: Arc<dyn Geocoder>,
    ttl: Duration,
    slots: DashMap<String,Slot>,
}

impl GeocodeCache {
    pub fn new (geocoder: Arc<dyn Geocoder>, config: &GeocodeCacheConfig)->Self {
        GeocodeCache { geocoder, ttl: config.ttl, slots: DashMap::new() }
    }

    pub fn ttl (&self)->Duration { self.ttl }

    /// get the cached position or fetch and store it
    pub async fn get (&self, address: &str)->Result<GeoPoint> {
        let key = normalize_address( address);
        if key.is_empty() {
            return Err( OvmJobError::GeocodeError( "empty address".to_string()))
        }

        // don't hold the DashMap shard lock across the await
        let slot: Slot = self.slots.entry( key.clone()).or_insert_with( || Arc::new( Mutex::new( None))).value().clone();

        let mut entry = slot.lock().await;
        if let Some(e) = entry.as_ref() {
            if e.fetched.elapsed() < self.ttl {
                return Ok(e.position)
            }
            debug!("geocode entry for '{}' expired", key);
        }

        let position = self.geocoder.geocode( &key).await?;
        *entry = Some( CacheEntry { position, fetched: Instant::now() });
        Ok(position)
    }

    /// the cached position if it is still valid, without fetching
    pub fn peek (&self, address: &str)->Option<GeoPoint> {
        let slot = self.slots.get( &normalize_address( address))?.value().clone();
        let entry = slot.try_lock().ok()?;
        entry.as_ref().filter( |e| e.fetched.elapsed() < self.ttl).map( |e| e.position)
    }

    /// drop the cached position of `address`. A slot held by a pending lookup stays in the map, only its
    /// entry is cleared
    pub fn invalidate (&self, address: &str)->bool {
        let key = normalize_address( address);
        if self.slots.remove_if( &key, |_,slot| Arc::strong_count( slot) == 1).is_some() {
            return true
        }
        match self.slots.get( &key) {
            Some(slot) => slot.try_lock().map( |mut entry| entry.take().is_some()).unwrap_or(false),
            None => false
        }
    }

    /// remove expired and empty entries. Slots that are referenced by a pending lookup are kept
    pub fn purge_expired (&self)->usize {
        let n = self.slots.len();
        let ttl = self.ttl;
        self.slots.retain( |_,slot| {
            if Arc::strong_count( slot) > 1 {
                return true
            }
            match slot.try_lock() {
                Ok(entry) => entry.as_ref().is_some_and( |e| e.fetched.elapsed() < ttl),
                Err(_) => true
            }
        });
        n - self.slots.len()
    }

    pub fn len (&self)->usize { self.slots.len() }
    pub fn is_empty (&self)->bool { self.slots.is_empty() }
}

/// case and whitespace insensitive address key
pub fn normalize_address (address: &str)->String {
    address.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize,Ordering};

    struct CountingGeocoder { calls: AtomicUsize }

    #[async_trait]
    impl Geocoder for CountingGeocoder {
        async fn geocode (&self, address: &str)->Result<GeoPoint> {
            self.calls.fetch_add( 1, Ordering::SeqCst);
            Ok( GeoPoint::from_lat_lon_degrees( 52.0, 4.7))
        }
    }

    fn cache ()->(Arc<CountingGeocoder>, GeocodeCache) {
        let geocoder = Arc::new( CountingGeocoder { calls: AtomicUsize::new(0) });
        let cache = GeocodeCache::new( geocoder.clone(), &GeocodeCacheConfig::default());
        (geocoder, cache)
    }

    // a lookup that has cloned its (still empty) slot but not yet locked it
    fn pending_slot (cache: &GeocodeCache, key: &str)->Slot {
        cache.slots.entry( key.to_string()).or_insert_with( || Arc::new( Mutex::new( None))).value().clone()
    }

    #[tokio::test]
    async fn test_purge_keeps_pending_slot() {
        let (geocoder, cache) = cache();
        let pending = pending_slot( &cache, "damrak 1, amsterdam");

        assert_eq!( cache.purge_expired(), 0);
        assert_eq!( cache.len(), 1);

        cache.get( "Damrak 1, Amsterdam").await.unwrap();
        let slot = cache.slots.get( "damrak 1, amsterdam").unwrap().value().clone();
        assert!( Arc::ptr_eq( &slot, &pending));
        assert!( pending.lock().await.is_some());
        assert_eq!( geocoder.calls.load( Ordering::SeqCst), 1);

        drop( (slot, pending));
        assert_eq!( cache.purge_expired(), 0); // still valid
    }

    #[tokio::test]
    async fn test_invalidate_pending_slot() {
        let (geocoder, cache) = cache();
        cache.get( "Damrak 1, Amsterdam").await.unwrap();

        let pending = pending_slot( &cache, "damrak 1, amsterdam");
        assert!( cache.invalidate( "Damrak 1, Amsterdam"));
        assert_eq!( cache.len(), 1);
        assert!( cache.peek( "Damrak 1, Amsterdam").is_none());
        drop( pending);

        cache.get( "Damrak 1, Amsterdam").await.unwrap();
        assert_eq!( geocoder.calls.load( Ordering::SeqCst), 2);

        assert!( cache.invalidate( "Damrak 1, Amsterdam"));
        assert!( cache.is_empty());
        assert!( !cache.invalidate( "Damrak 1, Amsterdam"));
    }
}
