//! Dynamic capability refresh scheduler
//!
//! Runs one registration cycle as soon as it starts, then one more on every
//! tick of a 24 hour timer for the lifetime of the process. A cycle that fails,
//! times out or panics is logged and the scheduler waits for the next tick.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};
use uuid::Uuid;

use crate::catalog_client::{self, CatalogRegistry, RegistrationError, RegistrationRequest};
use crate::config::{AdapterConfig, REFRESH_INTERVAL};
use crate::mesh::OPERATION;
use crate::supervisor::{panic_message, spawn_supervised};
use crate::{filter, source};

/// Lifecycle of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleState {
    /// Constructed, no cycle has run yet
    Idle,
    /// Eager cycle done or in progress, repeating on the timer
    Running,
}

/// One Source Resolver -> Filter Builder -> Registration Client pass
pub struct RegistrationCycle {
    registry: Arc<dyn CatalogRegistry>,
    config: Arc<AdapterConfig>,
}

impl RegistrationCycle {
    pub fn new(registry: Arc<dyn CatalogRegistry>, config: Arc<AdapterConfig>) -> Self {
        Self { registry, config }
    }

    /// Assemble this cycle's request from the current configuration
    pub fn build_request(&self) -> RegistrationRequest {
        RegistrationRequest {
            server_address: self.config.server_address(),
            adapter_address: self.config.adapter_address(),
            source: source::resolve(&self.config.overrides, &self.config.mesh.version),
            filter: filter::build(),
            mesh: self.config.mesh.clone(),
            operation: OPERATION.to_string(),
            timeout: self.config.registration_timeout,
        }
    }

    pub async fn run(&self) -> Result<(), RegistrationError> {
        let request = self.build_request();
        catalog_client::register_dynamic(self.registry.as_ref(), &request).await
    }
}

/// Owns the refresh timer. One instance per process, started once.
pub struct RefreshScheduler {
    cycle: RegistrationCycle,
    period: Duration,
    state: ScheduleState,
    cycles_run: u64,
    consecutive_failures: u32,
}

impl RefreshScheduler {
    pub fn new(registry: Arc<dyn CatalogRegistry>, config: Arc<AdapterConfig>) -> Self {
        Self {
            cycle: RegistrationCycle::new(registry, config),
            period: REFRESH_INTERVAL,
            state: ScheduleState::Idle,
            cycles_run: 0,
            consecutive_failures: 0,
        }
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    /// Run forever: one eager cycle, then one per timer tick.
    ///
    /// Cycles are awaited inline, so a new one never starts while the previous
    /// call is still in flight.
    pub async fn run(mut self) {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.state = ScheduleState::Running;
        info!(
            "Starting dynamic capability refresh (interval: {} hours)",
            self.period.as_secs() / 3600
        );

        self.run_cycle().await;
        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// Start [`run`](Self::run) as a supervised background task
    pub fn spawn(self) -> JoinHandle<()> {
        spawn_supervised("dynamic-capability-refresh", self.run())
    }

    async fn run_cycle(&mut self) {
        let cycle_id = Uuid::new_v4();
        self.cycles_run += 1;

        let outcome = AssertUnwindSafe(self.cycle.run()).catch_unwind().await;
        match outcome {
            Ok(Ok(())) => {
                self.consecutive_failures = 0;
                info!(
                    "Latest workload components successfully registered (cycle {}, id {})",
                    self.cycles_run, cycle_id
                );
            }
            Ok(Err(e)) => {
                self.consecutive_failures += 1;
                info!(
                    "Dynamic registration cycle {} failed ({} in a row, id {}): {}",
                    self.cycles_run, self.consecutive_failures, cycle_id, e
                );
            }
            Err(panic) => {
                self.consecutive_failures += 1;
                error!(
                    "Dynamic registration cycle {} panicked (id {}): {}",
                    self.cycles_run,
                    cycle_id,
                    panic_message(panic.as_ref())
                );
            }
        }
    }
}
