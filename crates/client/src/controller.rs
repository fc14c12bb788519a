//! Feed controller: drives the gateway and publishes feed state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use chorus_core::error::{FeedError, FeedResult};
use chorus_core::models::{GroupId, Message, MessageId};
use chorus_core::ports::{MessageGateway, PaginationRequest};

use crate::session::{FeedConfig, Session};
use crate::state::FeedState;

/// Result of a paging call on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and merged; `added` new edges entered the feed.
    Loaded { added: usize },
    /// Nothing was fetched: a load is already in flight or there is nothing more to load.
    Skipped,
    /// A page was fetched but the feed was re-seeded meanwhile, so it was dropped.
    Discarded,
}

/// Owns the client copy of one group's feed.
///
/// All state changes go through the watch sender, which is the single
/// writer. Subscribers read snapshots and never wait on the network.
pub struct FeedController {
    gateway: Arc<dyn MessageGateway>,
    group_id: GroupId,
    session: Session,
    config: FeedConfig,
    state: watch::Sender<FeedState>,
    next_provisional: AtomicU32,
}

impl FeedController {
    pub fn new(
        gateway: Arc<dyn MessageGateway>,
        group_id: GroupId,
        session: Session,
        config: FeedConfig,
    ) -> Self {
        let (state, _) = watch::channel(FeedState::new());
        Self {
            gateway,
            group_id,
            session,
            config,
            state,
            next_provisional: AtomicU32::new(0),
        }
    }

    /// Observe the feed. The receiver sees every published state.
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    /// Copy of the current feed state.
    pub fn snapshot(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// Fetch the newest page and seed the feed with it.
    ///
    /// On failure the feed is left as it was.
    #[instrument(skip_all, fields(group = %self.group_id))]
    pub async fn load_initial(&self) -> FeedResult<LoadOutcome> {
        let request = PaginationRequest::head(self.group_id, self.config.page_size);
        let connection = self.gateway.fetch_messages(request).await.inspect_err(|e| {
            warn!(error = %e, "Initial load failed");
        })?;

        let added = connection.edges.len();
        self.state.send_modify(|s| s.apply_initial(connection));
        debug!(added, "Feed seeded");
        Ok(LoadOutcome::Loaded { added })
    }

    /// Fetch the page below the oldest confirmed edge and append it.
    ///
    /// Only one call is in flight per feed; concurrent calls return
    /// [`LoadOutcome::Skipped`] without fetching. Also skipped when the
    /// last page reported nothing older. A page that comes back after the
    /// feed was re-seeded is dropped with [`LoadOutcome::Discarded`].
    #[instrument(skip_all, fields(group = %self.group_id))]
    pub async fn load_older(&self) -> FeedResult<LoadOutcome> {
        let mut after = None;
        let mut generation = 0;
        self.state.send_if_modified(|s| {
            if s.loading_older() || !s.page_info().has_next_page {
                return false;
            }
            generation = s.generation();
            after = s.oldest_confirmed_cursor().cloned();
            if after.is_some() {
                s.set_loading_older(true);
            }
            after.is_some()
        });

        let Some(after) = after else {
            debug!("Load older skipped");
            return Ok(LoadOutcome::Skipped);
        };

        let request = PaginationRequest::older(self.group_id, self.config.page_size, after);
        match self.gateway.fetch_messages(request).await {
            Ok(connection) => {
                let mut outcome = LoadOutcome::Discarded;
                self.state.send_modify(|s| {
                    s.set_loading_older(false);
                    if s.generation() == generation {
                        outcome = LoadOutcome::Loaded {
                            added: s.append_older(connection),
                        };
                    }
                });
                match outcome {
                    LoadOutcome::Loaded { added } => debug!(added, "Older page merged"),
                    _ => debug!("Feed re-seeded during load, older page dropped"),
                }
                Ok(outcome)
            }
            Err(e) => {
                self.state.send_modify(|s| s.set_loading_older(false));
                warn!(error = %e, "Load older failed");
                Err(e)
            }
        }
    }

    /// Fetch messages newer than the newest confirmed edge and prepend them.
    ///
    /// A full page may hide a gap between the fetched rows and the feed,
    /// so the feed is re-seeded from the head instead.
    #[instrument(skip_all, fields(group = %self.group_id))]
    pub async fn refresh_newer(&self) -> FeedResult<LoadOutcome> {
        let (before, generation) = {
            let state = self.state.borrow();
            (state.newest_confirmed_cursor().cloned(), state.generation())
        };
        let Some(before) = before else {
            return self.load_initial().await;
        };

        let request = PaginationRequest::newer(self.group_id, self.config.page_size, before);
        let connection = self.gateway.fetch_messages(request).await.inspect_err(|e| {
            warn!(error = %e, "Refresh failed");
        })?;

        let page_size = usize::try_from(self.config.page_size).unwrap_or(0);
        if connection.edges.len() >= page_size {
            debug!("Refresh page full, re-seeding feed");
            return self.load_initial().await;
        }

        let mut outcome = LoadOutcome::Discarded;
        self.state.send_if_modified(|s| {
            if s.generation() != generation {
                return false;
            }
            outcome = LoadOutcome::Loaded {
                added: s.prepend_newer(connection),
            };
            true
        });
        debug!(outcome = ?outcome, "Refresh merged");
        Ok(outcome)
    }

    /// Send a message with an optimistic provisional edge.
    ///
    /// The provisional edge is at the head of the feed before the mutation
    /// is dispatched. On success it becomes the confirmed message; on
    /// failure it is removed and [`FeedError::MutationFailed`] is returned.
    #[instrument(skip_all, fields(group = %self.group_id, author = %self.session.user_id))]
    pub async fn send(&self, text: impl Into<String>) -> FeedResult<Message> {
        let text = text.into();
        let provisional_id = MessageId::provisional(self.next_provisional.fetch_add(1, Ordering::Relaxed));

        let provisional = Message {
            id: provisional_id,
            group_id: self.group_id,
            author_id: self.session.user_id,
            text: text.clone(),
            created_at: Utc::now(),
        };
        self.state.send_modify(|s| s.insert_provisional(provisional));

        let result = self
            .gateway
            .create_message(self.group_id, self.session.user_id, text)
            .await;

        match result {
            Ok(confirmed) => {
                let id = confirmed.id;
                let merged = confirmed.clone();
                let mut outcome = None;
                self.state
                    .send_modify(|s| outcome = Some(s.reconcile(provisional_id, merged)));
                debug!(id = %id, outcome = ?outcome, "Send confirmed");
                Ok(confirmed)
            }
            Err(e) => {
                self.state.send_modify(|s| {
                    s.rollback(provisional_id);
                });
                warn!(error = %e, "Send failed, provisional message removed");
                Err(match e {
                    FeedError::MutationFailed(_) => e,
                    other => FeedError::MutationFailed(other.to_string()),
                })
            }
        }
    }
}
