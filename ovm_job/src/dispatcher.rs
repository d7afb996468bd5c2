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

use std::{fmt, sync::{Arc, atomic::{AtomicU64,AtomicUsize,Ordering}}, time::Duration};
use serde::{Deserialize,Serialize};
use dashmap::DashMap;
use tokio::{sync::Semaphore, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug,warn};
use ovm_common::datetime::{deserialize_duration,serialize_duration};

use crate::errors::{OvmJobError, Result};

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(default)]
pub struct JobConfig {
    /// max number of jobs running at the same time
    pub max_concurrent: usize,

    /// max number of jobs waiting for a run slot. Zero means unbounded
    pub max_waiting: usize,

    /// zero means no timeout
    #[serde(deserialize_with = "deserialize_duration", serialize_with = "serialize_duration")]
    pub timeout: Duration,
}

impl Default for JobConfig {
    fn default ()->Self {
        JobConfig { max_concurrent: 8, max_waiting: 0, timeout: Duration::ZERO }
    }
}

pub type JobId = u64;

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq,Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Finished,
    Failed(String),
    Cancelled
}

impl JobStatus {
    pub fn is_done (&self)->bool {
        !matches!( self, JobStatus::Queued | JobStatus::Running)
    }
}

/// the caller side of a submitted job
pub struct JobHandle<T> {
    id: JobId,
    cancel: CancellationToken,
    join: JoinHandle<Result<T>>,
}

impl<T> JobHandle<T> {
    pub fn id (&self)->JobId { self.id }

    /// request cancellation. Queued jobs are dropped, running jobs see their token cancelled
    pub fn cancel (&self) { self.cancel.cancel() }

    pub fn cancellation_token (&self)->&CancellationToken { &self.cancel }

    pub async fn join (self)->Result<T> {
        match self.join.await {
            Ok(result) => result,
            Err(e) => Err( OvmJobError::JobFailed( e.to_string()))
        }
    }
}

impl<T> fmt::Debug for JobHandle<T> {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!( f, "JobHandle({})", self.id)
    }
}

/// runs blocking work (such as disturbance scans) with a bounded number of concurrent jobs.
/// Jobs beyond that bound wait for a semaphore permit in submission order. Each job gets its own
/// cancellation token, which is also cancelled on timeout.
/// Must be used from within a tokio runtime
pub struct JobDispatcher {
    config: JobConfig,
    permits: Arc<Semaphore>,
    n_waiting: Arc<AtomicUsize>,
    next_id: AtomicU64,
    jobs: Arc<DashMap<JobId,JobStatus>>,
}

impl JobDispatcher {
    pub fn new (config: JobConfig)->Self {
        let permits = Arc::new( Semaphore::new( config.max_concurrent.max(1)));
        JobDispatcher {
            config,
            permits,
            n_waiting: Arc::new( AtomicUsize::new(0)),
            next_id: AtomicU64::new(1),
            jobs: Arc::new( DashMap::new()),
        }
    }

    pub fn config (&self)->&JobConfig { &self.config }

    pub fn status (&self, id: JobId)->Option<JobStatus> { self.jobs.get( &id).map( |e| e.value().clone()) }

    pub fn waiting_count (&self)->usize { self.n_waiting.load( Ordering::Relaxed) }

    pub fn running_count (&self)->usize {
        self.jobs.iter().filter( |e| *e.value() == JobStatus::Running).count()
    }

    /// drop status entries of completed jobs, returning the number of removed entries
    pub fn purge_done (&self)->usize {
        let n = self.jobs.len();
        self.jobs.retain( |_,status| !status.is_done());
        n - self.jobs.len()
    }

    /// queue a blocking job. `f` is called with the job's cancellation token once a run slot is available.
    /// If a job returns an error after it was cancelled the job counts as cancelled
    pub fn submit<F,T,E> (&self, f: F)->Result<JobHandle<T>>
        where F: FnOnce(CancellationToken)->std::result::Result<T,E> + Send + 'static,
              T: Send + 'static,
              E: fmt::Display + Send + 'static
    {
        self.reserve_waiting_slot()?;

        let id = self.next_id.fetch_add( 1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        self.jobs.insert( id, JobStatus::Queued);

        let task = run_job( id, f, cancel.clone(), self.permits.clone(), self.n_waiting.clone(), self.jobs.clone(), self.timeout());
        let join = tokio::spawn( task);

        debug!("queued job {}", id);
        Ok( JobHandle { id, cancel, join })
    }

    /// submit and wait for the result
    pub async fn run<F,T,E> (&self, f: F)->Result<T>
        where F: FnOnce(CancellationToken)->std::result::Result<T,E> + Send + 'static,
              T: Send + 'static,
              E: fmt::Display + Send + 'static
    {
        self.submit( f)?.join().await
    }

    fn timeout (&self)->Option<Duration> {
        if self.config.timeout.is_zero() { None } else { Some(self.config.timeout) }
    }

    fn reserve_waiting_slot (&self)->Result<()> {
        let max_waiting = self.config.max_waiting;
        self.n_waiting.fetch_update( Ordering::AcqRel, Ordering::Acquire, |n| {
            if max_waiting > 0 && n >= max_waiting { None } else { Some(n + 1) }
        }).map( |_| ()).map_err( |n| OvmJobError::QueueFull(n))
    }
}

async fn run_job<F,T,E> (id: JobId, f: F, cancel: CancellationToken, permits: Arc<Semaphore>, n_waiting: Arc<AtomicUsize>,
                         jobs: Arc<DashMap<JobId,JobStatus>>, timeout: Option<Duration>)->Result<T>
    where F: FnOnce(CancellationToken)->std::result::Result<T,E> + Send + 'static,
          T: Send + 'static,
          E: fmt::Display + Send + 'static
{
    let permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        permit = permits.acquire_owned() => permit.ok()
    };
    n_waiting.fetch_sub( 1, Ordering::AcqRel);

    let Some(permit) = permit else {
        jobs.insert( id, JobStatus::Cancelled);
        return Err( OvmJobError::Cancelled)
    };

    jobs.insert( id, JobStatus::Running);
    debug!("running job {}", id);

    // the permit is released when the blocking work returns, even if we stopped waiting for it
    let token = cancel.clone();
    let work = tokio::task::spawn_blocking( move || {
        let _permit = permit;
        f( token)
    });

    let joined = match timeout {
        Some(to) => match time::timeout( to, work).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!("job {} timed out after {:?}", id, to);
                cancel.cancel();
                jobs.insert( id, JobStatus::Failed( format!("timeout after {:?}", to)));
                return Err( OvmJobError::Timeout(to))
            }
        }
        None => work.await
    };

    let (status, result) = match joined {
        Ok(Ok(value)) => (JobStatus::Finished, Ok(value)),
        Ok(Err(_)) if cancel.is_cancelled() => (JobStatus::Cancelled, Err( OvmJobError::Cancelled)),
        Ok(Err(e)) => {
            let msg = e.to_string();
            (JobStatus::Failed( msg.clone()), Err( OvmJobError::JobFailed( msg)))
        }
        Err(e) => {
            let msg = format!("job panicked: {e}");
            (JobStatus::Failed( msg.clone()), Err( OvmJobError::JobFailed( msg)))
        }
    };

    debug!("job {} done: {:?}", id, status);
    jobs.insert( id, status);
    result
}
