//! Supervised background tasks
//!
//! Registration work runs beside the request-serving path and must never take
//! it down. Tasks spawned here have their panics caught and logged.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Spawn `task` on the runtime, logging instead of propagating a panic
pub fn spawn_supervised<F>(name: &'static str, task: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        debug!("Background task {} started", name);
        match AssertUnwindSafe(task).catch_unwind().await {
            Ok(()) => debug!("Background task {} finished", name),
            Err(panic) => error!("Background task {} panicked: {}", name, panic_message(panic.as_ref())),
        }
    })
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
