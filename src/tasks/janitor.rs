//! TTL Janitor Task
//!
//! Background task that periodically removes expired cache entries.
//!
//! The sweep loop always runs on its own named thread driving a private
//! current-thread Tokio runtime, so it lives exactly as long as the owning
//! cache, whatever runtime (if any) the cache was created in.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tokio::runtime::Builder;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::backend::{self, Backend};

// == Public Constants ==
/// Default interval between sweeps.
pub const DEFAULT_JANITOR_INTERVAL: Duration = Duration::from_secs(60);

/// Shortest accepted sweep interval; smaller values are raised to this.
pub const MIN_JANITOR_INTERVAL: Duration = Duration::from_millis(1);

// == Janitor ==
/// Handle to a running sweep loop.
///
/// Dropping the handle stops the loop. Only the cache that created a janitor
/// holds it, so at most one sweeper exists per cache.
pub struct Janitor {
    shutdown_tx: watch::Sender<bool>,
    /// `None` once stopped, or if the thread could not be spawned
    worker: Option<thread::JoinHandle<()>>,
    interval: Duration,
}

impl Janitor {
    // == Start ==
    /// Starts sweeping `backend` every `interval` on a dedicated thread.
    pub fn start<B: Backend>(backend: Arc<Mutex<B>>, interval: Duration) -> Self {
        let interval = interval.max(MIN_JANITOR_INTERVAL);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = spawn_thread(run(backend, interval, shutdown_rx));

        Self {
            shutdown_tx,
            worker,
            interval,
        }
    }

    // == Stop ==
    /// Signals the loop to exit and waits for the thread to finish, so no
    /// sweep runs once this returns.
    pub fn stop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("TTL janitor thread panicked");
            }
        }
    }

    /// Returns the effective sweep interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true while the sweep loop has not exited.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Janitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Janitor")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

fn spawn_thread<F>(sweep_loop: F) -> Option<thread::JoinHandle<()>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let spawned = thread::Builder::new()
        .name("ttl-cache-janitor".to_string())
        .spawn(move || match Builder::new_current_thread().enable_time().build() {
            Ok(runtime) => runtime.block_on(sweep_loop),
            Err(e) => error!("Failed to build janitor runtime: {}", e),
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            error!("Failed to spawn janitor thread: {}", e);
            None
        }
    }
}

async fn run<B: Backend>(
    backend: Arc<Mutex<B>>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    info!("Starting TTL janitor with interval of {:?}", interval);

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                sweep(&backend);
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    debug!("TTL janitor stopped");
}

// == Sweep ==
/// Runs one sweep under the backend lock. Returns the number of entries removed.
pub fn sweep<B: Backend>(backend: &Mutex<B>) -> usize {
    let removed = backend::lock(backend).clean();

    if removed > 0 {
        info!("TTL cleanup: removed {} expired entries", removed);
    } else {
        debug!("TTL cleanup: no expired entries found");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn shared_backend() -> Arc<Mutex<MemoryBackend<String>>> {
        Arc::new(Mutex::new(MemoryBackend::new()))
    }

    fn add(backend: &Mutex<MemoryBackend<String>>, key: &str, ttl: Duration) {
        backend::lock(backend)
            .add(key.to_string(), "value".to_string(), ttl)
            .unwrap();
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let backend = shared_backend();
        add(&backend, "expire_soon", Duration::from_millis(5));
        add(&backend, "long_lived", Duration::from_secs(3600));

        thread::sleep(Duration::from_millis(20));

        assert_eq!(sweep(&backend), 1);
        assert_eq!(backend::lock(&backend).len(), 1);
    }

    #[tokio::test]
    async fn test_janitor_removes_expired_entries() {
        let backend = shared_backend();
        add(&backend, "expire_soon", Duration::from_millis(20));

        let janitor = Janitor::start(backend.clone(), Duration::from_millis(25));

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(backend::lock(&backend).is_empty(), "Expired entry should have been cleaned up");
        assert!(janitor.is_running());
    }

    #[tokio::test]
    async fn test_janitor_preserves_valid_entries() {
        let backend = shared_backend();
        add(&backend, "long_lived", Duration::from_secs(3600));

        let _janitor = Janitor::start(backend.clone(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(100)).await;

        let value = backend::lock(&backend).get("long_lived");
        assert_eq!(value.unwrap(), "value");
    }

    #[tokio::test]
    async fn test_janitor_can_be_stopped() {
        let mut janitor = Janitor::start(shared_backend(), Duration::from_millis(10));

        janitor.stop();

        assert!(!janitor.is_running(), "Thread should be joined after stop");
    }

    #[tokio::test]
    async fn test_stopped_janitor_no_longer_sweeps() {
        let backend = shared_backend();
        let mut janitor = Janitor::start(backend.clone(), Duration::from_millis(10));
        janitor.stop();

        add(&backend, "expire_soon", Duration::from_millis(1));
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(backend::lock(&backend).len(), 1);
    }

    #[test]
    fn test_janitor_without_runtime() {
        let backend = shared_backend();
        add(&backend, "expire_soon", Duration::from_millis(10));

        let mut janitor = Janitor::start(backend.clone(), Duration::from_millis(20));

        thread::sleep(Duration::from_millis(200));
        assert!(backend::lock(&backend).is_empty());

        janitor.stop();
        assert!(!janitor.is_running());
    }

    #[test]
    fn test_janitor_outlives_creating_runtime() {
        let backend = shared_backend();

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let janitor = runtime.block_on(async {
            Janitor::start(backend.clone(), Duration::from_millis(10))
        });
        drop(runtime);

        add(&backend, "expire_soon", Duration::from_millis(5));
        thread::sleep(Duration::from_millis(200));

        assert!(backend::lock(&backend).is_empty(), "Sweeps must continue after the runtime is gone");
        assert!(janitor.is_running());
    }

    #[test]
    fn test_janitor_inside_runtime_without_timers() {
        let backend = shared_backend();
        add(&backend, "expire_soon", Duration::from_millis(5));

        // No enable_time(): starting must neither panic nor depend on this runtime
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let janitor = runtime.block_on(async {
            Janitor::start(backend.clone(), Duration::from_millis(10))
        });

        thread::sleep(Duration::from_millis(200));
        assert!(backend::lock(&backend).is_empty());
        assert!(janitor.is_running());
    }

    #[test]
    fn test_drop_joins_thread() {
        let backend = shared_backend();
        let janitor = Janitor::start(backend.clone(), Duration::from_millis(1));
        drop(janitor);

        // Joined on drop, so nothing sweeps from here on
        add(&backend, "expire_soon", Duration::from_millis(1));
        thread::sleep(Duration::from_millis(50));
        assert_eq!(backend::lock(&backend).len(), 1);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let janitor = Janitor::start(shared_backend(), Duration::ZERO);
        assert_eq!(janitor.interval(), MIN_JANITOR_INTERVAL);
    }
}
