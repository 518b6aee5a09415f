//! Periodic refresh of a `PoolClient` snapshot.

use log::{error, info, warn};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::activity::ActivityEvent;
use crate::error::ClientError;
use crate::instructions::rpc::StakingRpc;
use crate::pool_client::{PoolClient, Snapshot};

/// Result of one completed refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionView {
    pub snapshot: Snapshot,
    /// Empty when the activity read failed.
    pub activity: Vec<ActivityEvent>,
}

#[derive(Clone, Debug, Default)]
pub enum SessionState {
    /// No refresh has completed yet.
    #[default]
    Idle,
    Ready(Arc<SessionView>),
    /// The pool does not exist yet.
    NotInitialized,
    Failed(Arc<ClientError>),
}

impl SessionState {
    pub fn view(&self) -> Option<&SessionView> {
        match self {
            SessionState::Ready(view) => Some(view),
            _ => None,
        }
    }
}

async fn refresh<R: StakingRpc>(
    client: &PoolClient<R>,
    user: Option<Pubkey>,
    activity_limit: usize,
) -> SessionState {
    let (snapshot, activity) = tokio::join!(
        client.snapshot(user.as_ref()),
        client.recent_activity(activity_limit),
    );
    match snapshot {
        Ok(snapshot) => {
            let activity = activity.unwrap_or_else(|err| {
                warn!("activity unavailable: {err}");
                Vec::new()
            });
            SessionState::Ready(Arc::new(SessionView { snapshot, activity }))
        }
        Err(ClientError::PoolNotInitialized) => SessionState::NotInitialized,
        Err(err) => {
            error!("refresh failed: {err}");
            SessionState::Failed(Arc::new(err))
        }
    }
}

/// Owns the refresh timer of one view of the pool and the latest state it
/// produced.
///
/// Every tick starts an independent refresh; refreshes are not coalesced, so
/// the one that completes last wins. `stop` (or drop) cancels the timer only;
/// a refresh already in flight finishes and its state is dropped unobserved.
pub struct PollingSession<R> {
    client: Arc<PoolClient<R>>,
    user: Option<Pubkey>,
    interval: Duration,
    activity_limit: usize,
    state: Arc<watch::Sender<SessionState>>,
    timer: Option<JoinHandle<()>>,
}

impl<R: StakingRpc + 'static> PollingSession<R> {
    pub fn new(
        client: Arc<PoolClient<R>>,
        user: Option<Pubkey>,
        interval: Duration,
        activity_limit: usize,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        PollingSession {
            client,
            user,
            interval,
            activity_limit,
            state: Arc::new(state),
            timer: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Starts ticking; the first refresh runs immediately. No-op when running.
    pub fn start(&mut self) {
        if self.timer.is_some() {
            return;
        }
        info!(
            "polling pool {} every {:?}",
            self.client.addresses().pool,
            self.interval
        );
        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        let user = self.user;
        let limit = self.activity_limit;
        let period = self.interval;
        self.timer = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let client = Arc::clone(&client);
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let next = refresh(&client, user, limit).await;
                    state.send_replace(next);
                });
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            info!("polling stopped");
        }
    }

    /// Refreshes once, outside the timer, and publishes the result.
    pub async fn refresh_now(&self) -> SessionState {
        let next = refresh(&self.client, self.user, self.activity_limit).await;
        self.state.send_replace(next.clone());
        next
    }
}

impl<R> Drop for PollingSession<R> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
