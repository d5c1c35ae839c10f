//! Background thread driving periodic sweeps.

use crate::monitor::deadline::DeadlineMonitor;
use crate::repo::Store;
use crossbeam_channel::{bounded, select, tick, Sender};
use log::{error, info};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const THREAD_NAME: &str = "deadline-monitor";

/// Starts sweep threads.
pub struct MonitorScheduler;

impl MonitorScheduler {
    /// Spawns the monitor thread. The first sweep runs one `interval` after start.
    ///
    /// Sweeps run sequentially on the spawned thread. The ticker keeps at most
    /// one pending tick, so a slow sweep delays the next one instead of
    /// queueing a burst.
    ///
    /// # Errors
    /// Returns the OS error when the thread cannot be spawned.
    pub fn start<S>(monitor: DeadlineMonitor<S>, interval: Duration) -> io::Result<MonitorHandle>
    where
        S: Store + ?Sized + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let completed = Arc::new(AtomicU64::new(0));
        let thread_completed = Arc::clone(&completed);

        let join = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                let ticker = tick(interval);
                info!(
                    "event=monitor_start module=monitor status=ok interval_ms={}",
                    interval.as_millis()
                );
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            run_guarded(&monitor);
                            thread_completed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
                info!("event=monitor_stop module=monitor status=ok");
            })?;

        Ok(MonitorHandle {
            stop_tx: Some(stop_tx),
            join: Some(join),
            completed,
        })
    }
}

fn run_guarded<S: Store + ?Sized>(monitor: &DeadlineMonitor<S>) {
    match panic::catch_unwind(AssertUnwindSafe(|| monitor.tick())) {
        Ok(Ok(_)) => {}
        Ok(Err(err)) => {
            error!("event=monitor_tick module=monitor status=error error={err}");
        }
        Err(_) => {
            error!("event=monitor_tick module=monitor status=panic");
        }
    }
}

/// Owner of a running monitor thread. Dropping it stops the thread.
pub struct MonitorHandle {
    stop_tx: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
    completed: Arc<AtomicU64>,
}

impl MonitorHandle {
    /// Number of sweeps finished so far, including failed ones.
    pub fn completed_ticks(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Signals the thread and waits for the in-flight sweep to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                error!("event=monitor_stop module=monitor status=error reason=thread_panicked");
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
