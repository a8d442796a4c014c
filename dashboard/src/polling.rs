use std::future::Future;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Failed cycles back off exponentially up to this bound; a success resets
/// the delay to the configured interval.
const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// A running poll loop. Snapshots arrive over `recv`; `stop` (or drop)
/// cancels the task.
pub struct Poller<T> {
    rx: mpsc::Receiver<T>,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl<T> Poller<T> {
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        self.handle.abort();
    }
}

/// Spawns a cancellable poll loop. The next cycle only starts after the
/// in-flight fetch finishes, so requests never overlap.
pub fn spawn_poller<T, F, Fut, E>(name: &'static str, every: Duration, fetch: F) -> Poller<T>
where
    T: Send + 'static,
    E: std::fmt::Display + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send,
{
    let (tx, rx) = mpsc::channel(8);
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        let mut delay = every;
        loop {
            let succeeded = match fetch().await {
                Ok(snapshot) => {
                    if tx.send(snapshot).await.is_err() {
                        break;
                    }
                    true
                }
                Err(e) => {
                    log::warn!("{} poll failed: {}", name, e);
                    false
                }
            };

            let sleep_for = if succeeded {
                delay = every;
                every
            } else {
                let current = delay;
                delay = (delay * 2).min(MAX_BACKOFF);
                current
            };

            tokio::select! {
                _ = tokio::time::sleep(sleep_for) => {}
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        log::debug!("{} poller stopped", name);
                        break;
                    }
                }
            }
        }
    });

    Poller {
        rx,
        shutdown,
        handle,
    }
}
