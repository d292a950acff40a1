//! Single-flight request deduplication.
//!
//! At most one in-flight fetch per key: concurrent callers for the same
//! key wait on the leader's shared result instead of issuing their own
//! fetch. Waiters are capped; past the cap they resolve to `None` so a
//! wedged fetch cannot hang every caller behind it. The entry is removed
//! once the fetch settles, so the next distinct request starts fresh.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use metrics::counter;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::timeout;

pub const DEFAULT_WAIT_CAP: Duration = Duration::from_secs(15);

/// Cloneable failure fanned out to every subscriber of a flight.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct FlightError(String);

impl FlightError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Clone)]
enum FlightState<V> {
    Pending,
    Done(Result<V, FlightError>),
}

enum Role<V> {
    Leader(watch::Sender<FlightState<V>>),
    Follower(watch::Receiver<FlightState<V>>),
}

pub struct SingleFlight<K, V> {
    inflight: Mutex<HashMap<K, watch::Receiver<FlightState<V>>>>,
    wait_cap: Duration,
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(wait_cap: Duration) -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
            wait_cap,
        }
    }

    /// Run `fetch` unless a flight for `key` is already underway, in which
    /// case wait for its outcome. `Ok(None)` means the wait cap elapsed
    /// before the leader finished.
    pub async fn run<F, Fut>(&self, key: K, fetch: F) -> Result<Option<V>, FlightError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, FlightError>>,
    {
        let role = {
            let mut inflight = self.lock();
            match inflight.get(&key) {
                Some(rx) => Role::Follower(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(FlightState::Pending);
                    inflight.insert(key.clone(), rx);
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Leader(tx) => {
                counter!("vetrina_flight_leader_total").increment(1);
                let outcome = fetch().await;
                // Remove before broadcasting: a caller arriving after this
                // point starts a fresh flight instead of reading a settled
                // one.
                self.lock().remove(&key);
                let _ = tx.send(FlightState::Done(outcome.clone()));
                outcome.map(Some)
            }
            Role::Follower(mut rx) => {
                counter!("vetrina_flight_follower_total").increment(1);
                let wait = async {
                    loop {
                        {
                            let state = rx.borrow_and_update();
                            if let FlightState::Done(outcome) = &*state {
                                return outcome.clone();
                            }
                        }
                        if rx.changed().await.is_err() {
                            return Err(FlightError::new("fetch abandoned"));
                        }
                    }
                };
                match timeout(self.wait_cap, wait).await {
                    Ok(outcome) => outcome.map(Some),
                    Err(_) => {
                        counter!("vetrina_flight_timeout_total").increment(1);
                        Ok(None)
                    }
                }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, watch::Receiver<FlightState<V>>>> {
        match self.inflight.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[cfg(test)]
    fn inflight_len(&self) -> usize {
        self.lock().len()
    }
}
