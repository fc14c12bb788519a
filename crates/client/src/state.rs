//! Client feed state and its transitions.
//!
//! The state is a plain value. Every event that changes it (a fetched
//! page, a send, a server answer) is one method here, so the controller
//! can apply it atomically and observers always see a consistent feed.

use std::collections::HashSet;

use chorus_core::cursor;
use chorus_core::models::{Message, MessageId};
use chorus_core::ports::{Connection, Cursor, Edge, PageInfo};

/// A group's feed as held by the client, newest first.
///
/// Identifiers are unique across `edges`. Provisional edges (sent but not
/// yet confirmed) carry non-positive ids and are listed in `pending`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    edges: Vec<Edge<Message>>,
    page_info: PageInfo,
    pending: HashSet<MessageId>,
    known: HashSet<MessageId>,
    loading_older: bool,
    generation: u64,
}

/// How a confirmed message was merged into the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The provisional edge gave way to the confirmed message, placed by id
    /// among the confirmed edges (at the head unless newer ones arrived).
    Replaced,
    /// The confirmed message was already in the feed; the provisional edge was dropped.
    Deduplicated,
    /// No provisional edge was left; the confirmed message was inserted by id.
    Inserted,
    /// Nothing to do: no provisional edge and the message is already present.
    Unchanged,
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edges(&self) -> &[Edge<Message>] {
        &self.edges
    }

    pub fn page_info(&self) -> &PageInfo {
        &self.page_info
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Whether a load-older request is in flight.
    pub fn loading_older(&self) -> bool {
        self.loading_older
    }

    /// Number of times the feed was re-seeded from a head page.
    ///
    /// Pages fetched against an earlier generation no longer line up with
    /// the edges and must not be merged.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self, id: MessageId) -> bool {
        self.pending.contains(&id)
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.known.contains(&id)
    }

    /// Cursor of the oldest confirmed edge, used as `after` when loading older.
    pub fn oldest_confirmed_cursor(&self) -> Option<&Cursor> {
        self.edges
            .iter()
            .rev()
            .find(|e| !self.pending.contains(&e.node.id))
            .map(|e| &e.cursor)
    }

    /// Cursor of the newest confirmed edge, used as `before` when refreshing.
    pub fn newest_confirmed_cursor(&self) -> Option<&Cursor> {
        self.edges
            .iter()
            .find(|e| !self.pending.contains(&e.node.id))
            .map(|e| &e.cursor)
    }

    pub(crate) fn set_loading_older(&mut self, loading: bool) {
        self.loading_older = loading;
    }

    /// Seed the feed from a head page.
    ///
    /// Provisional edges still waiting for the server stay at the head;
    /// every confirmed edge is replaced by the page's edges.
    pub fn apply_initial(&mut self, connection: Connection<Message>) {
        let pending = &self.pending;
        self.edges.retain(|e| pending.contains(&e.node.id));
        self.known = self.pending.clone();

        for edge in connection.edges {
            if self.known.insert(edge.node.id) {
                self.edges.push(edge);
            }
        }
        self.page_info = connection.page_info;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Append a page of older messages at the tail.
    ///
    /// Edges already in the feed are dropped. The page info is replaced.
    /// Returns the number of edges appended.
    pub fn append_older(&mut self, connection: Connection<Message>) -> usize {
        let before = self.edges.len();
        for edge in connection.edges {
            if self.known.insert(edge.node.id) {
                self.edges.push(edge);
            }
        }
        self.page_info = connection.page_info;
        self.edges.len() - before
    }

    /// Insert a page of newer messages above the newest confirmed edge.
    ///
    /// Provisional edges stay on top. The paging flags are left as they
    /// were; only the start cursor moves. Returns the number of edges added.
    pub fn prepend_newer(&mut self, connection: Connection<Message>) -> usize {
        let at = self
            .edges
            .iter()
            .position(|e| !self.pending.contains(&e.node.id))
            .unwrap_or(self.edges.len());

        let fresh: Vec<Edge<Message>> = connection
            .edges
            .into_iter()
            .filter(|e| self.known.insert(e.node.id))
            .collect();
        let added = fresh.len();
        self.edges.splice(at..at, fresh);

        if let Some(cursor) = self.newest_confirmed_cursor().cloned() {
            self.page_info.start_cursor = Some(cursor);
        }
        added
    }

    /// Put a just-sent message at the head as a provisional edge.
    ///
    /// The message id must come from the provisional subspace.
    pub fn insert_provisional(&mut self, message: Message) {
        debug_assert!(message.id.is_provisional());
        let id = message.id;
        self.pending.insert(id);
        self.known.insert(id);
        self.edges.insert(
            0,
            Edge {
                cursor: cursor::provisional(id),
                node: message,
            },
        );
    }

    /// Merge the server's answer for a provisional message.
    pub fn reconcile(&mut self, provisional: MessageId, confirmed: Message) -> Reconciled {
        self.pending.remove(&provisional);
        self.known.remove(&provisional);
        let had_edge = match self.edges.iter().position(|e| e.node.id == provisional) {
            Some(index) => {
                self.edges.remove(index);
                true
            }
            None => false,
        };

        if self.known.contains(&confirmed.id) {
            return if had_edge {
                Reconciled::Deduplicated
            } else {
                Reconciled::Unchanged
            };
        }

        self.insert_confirmed(confirmed);
        if had_edge {
            Reconciled::Replaced
        } else {
            Reconciled::Inserted
        }
    }

    /// Insert a confirmed message below the provisional edges, before the
    /// first confirmed edge with a smaller id.
    fn insert_confirmed(&mut self, message: Message) {
        let id = message.id;
        let at = self
            .edges
            .iter()
            .position(|e| !self.pending.contains(&e.node.id) && e.node.id < id)
            .unwrap_or(self.edges.len());

        self.known.insert(id);
        self.edges.insert(
            at,
            Edge {
                cursor: cursor::encode(id),
                node: message,
            },
        );
    }

    /// Drop a provisional edge after its send failed.
    ///
    /// Returns whether an edge was removed.
    pub fn rollback(&mut self, provisional: MessageId) -> bool {
        if !self.pending.remove(&provisional) {
            return false;
        }
        self.known.remove(&provisional);
        let before = self.edges.len();
        self.edges.retain(|e| e.node.id != provisional);
        self.edges.len() != before
    }
}

#[cfg(test)]
mod tests {
    use chorus_core::models::{GroupId, UserId};
    use chrono::Utc;

    use super::*;

    fn message(id: i64) -> Message {
        Message {
            id: MessageId(id),
            group_id: GroupId(1),
            author_id: UserId(1),
            text: format!("message {}", id),
            created_at: Utc::now(),
        }
    }

    /// Page of confirmed edges for the given ids (passed newest first).
    fn page(ids: impl IntoIterator<Item = i64>, has_next_page: bool) -> Connection<Message> {
        let edges: Vec<Edge<Message>> = ids
            .into_iter()
            .map(|id| Edge {
                node: message(id),
                cursor: cursor::encode(MessageId(id)),
            })
            .collect();
        Connection {
            page_info: PageInfo {
                has_next_page,
                has_previous_page: false,
                start_cursor: edges.first().map(|e| e.cursor.clone()),
                end_cursor: edges.last().map(|e| e.cursor.clone()),
            },
            edges,
        }
    }

    fn ids(state: &FeedState) -> Vec<i64> {
        state.edges().iter().map(|e| e.node.id.get()).collect()
    }

    #[test]
    fn test_initial_load_stores_page_verbatim() {
        let mut state = FeedState::new();
        let connection = page((41..=50).rev(), true);
        state.apply_initial(connection.clone());

        assert_eq!(ids(&state), (41..=50).rev().collect::<Vec<_>>());
        assert_eq!(state.page_info(), &connection.page_info);
        assert_eq!(state.oldest_confirmed_cursor(), Some(&cursor::encode(MessageId(41))));
    }

    #[test]
    fn test_append_older_extends_tail() {
        let mut state = FeedState::new();
        state.apply_initial(page((41..=50).rev(), true));

        let appended = state.append_older(page((31..=40).rev(), false));

        assert_eq!(appended, 10);
        assert_eq!(ids(&state), (31..=50).rev().collect::<Vec<_>>());
        assert!(!state.page_info().has_next_page);
    }

    // Test critique: fusionner deux fois la même page équivaut à la fusionner une fois
    #[test]
    fn test_merge_is_idempotent() {
        let mut once = FeedState::new();
        once.apply_initial(page((41..=50).rev(), true));
        once.append_older(page((31..=40).rev(), true));

        let mut twice = once.clone();
        let appended = twice.append_older(page((31..=40).rev(), true));

        assert_eq!(appended, 0);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_overlapping_page_only_adds_new_ids() {
        let mut state = FeedState::new();
        state.apply_initial(page((41..=50).rev(), true));

        let appended = state.append_older(page((36..=45).rev(), true));

        assert_eq!(appended, 5);
        assert_eq!(ids(&state), (36..=50).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_prepend_newer_keeps_order_and_flags() {
        let mut state = FeedState::new();
        state.apply_initial(page((41..=50).rev(), true));

        let added = state.prepend_newer(page([53, 52, 51, 50], false));

        assert_eq!(added, 3);
        assert_eq!(ids(&state), (41..=53).rev().collect::<Vec<_>>());
        assert!(state.page_info().has_next_page);
        assert_eq!(state.page_info().start_cursor, Some(cursor::encode(MessageId(53))));
    }

    #[test]
    fn test_provisional_edge_goes_to_head() {
        let mut state = FeedState::new();
        state.apply_initial(page([3, 2, 1], false));
        state.insert_provisional(message(0));

        assert_eq!(ids(&state), vec![0, 3, 2, 1]);
        assert!(state.is_pending(MessageId(0)));
        assert!(cursor::is_provisional(&state.edges()[0].cursor));
        // Le curseur de pagination reste celui d'un message confirmé
        assert_eq!(state.newest_confirmed_cursor(), Some(&cursor::encode(MessageId(3))));
    }

    #[test]
    fn test_reconcile_replaces_in_place() {
        let mut state = FeedState::new();
        state.apply_initial(page([3, 2, 1], false));
        state.insert_provisional(message(0));

        let outcome = state.reconcile(MessageId(0), message(4));

        assert_eq!(outcome, Reconciled::Replaced);
        assert_eq!(ids(&state), vec![4, 3, 2, 1]);
        assert!(!state.is_pending(MessageId(0)));
        assert!(!state.contains(MessageId(0)));
        assert_eq!(state.edges()[0].cursor, cursor::encode(MessageId(4)));
    }

    // Test critique: la réponse du serveur arrive après un refresh qui contient déjà le message
    #[test]
    fn test_reconcile_after_refresh_drops_provisional() {
        let mut state = FeedState::new();
        state.apply_initial(page([3, 2, 1], false));
        state.insert_provisional(message(0));
        state.prepend_newer(page([4], false));
        assert_eq!(ids(&state), vec![0, 4, 3, 2, 1]);

        let outcome = state.reconcile(MessageId(0), message(4));

        assert_eq!(outcome, Reconciled::Deduplicated);
        assert_eq!(ids(&state), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_reconcile_without_provisional_edge() {
        let mut state = FeedState::new();
        state.apply_initial(page([3, 2, 1], false));

        assert_eq!(state.reconcile(MessageId(-5), message(3)), Reconciled::Unchanged);
        assert_eq!(state.reconcile(MessageId(-5), message(4)), Reconciled::Inserted);
        assert_eq!(ids(&state), vec![4, 3, 2, 1]);
    }

    // Test critique: un message confirmé sans arête provisoire reste sous les envois en attente
    // et sous les messages confirmés plus récents
    #[test]
    fn test_inserted_confirmation_keeps_order() {
        let mut state = FeedState::new();
        state.apply_initial(page([3, 2, 1], false));
        state.insert_provisional(message(-1));
        state.prepend_newer(page([5], false));
        assert_eq!(ids(&state), vec![-1, 5, 3, 2, 1]);

        assert_eq!(state.reconcile(MessageId(-7), message(4)), Reconciled::Inserted);

        assert_eq!(ids(&state), vec![-1, 5, 4, 3, 2, 1]);
        assert!(state.is_pending(MessageId(-1)));
    }

    // Test critique: un message plus récent chargé pendant l'envoi garde la tête
    #[test]
    fn test_reconcile_below_newer_confirmed_message() {
        let mut state = FeedState::new();
        state.apply_initial(page([3, 2, 1], false));
        state.insert_provisional(message(0));
        state.prepend_newer(page([5], false));
        assert_eq!(ids(&state), vec![0, 5, 3, 2, 1]);

        let outcome = state.reconcile(MessageId(0), message(4));

        assert_eq!(outcome, Reconciled::Replaced);
        assert_eq!(ids(&state), vec![5, 4, 3, 2, 1]);
        assert_eq!(state.edges()[1].cursor, cursor::encode(MessageId(4)));
    }

    #[test]
    fn test_reseed_bumps_generation() {
        let mut state = FeedState::new();
        assert_eq!(state.generation(), 0);
        state.apply_initial(page([3, 2, 1], true));
        let seeded = state.generation();

        state.append_older(page(Vec::new(), false));
        state.prepend_newer(page([4], false));
        assert_eq!(state.generation(), seeded);

        state.apply_initial(page([4, 3], true));
        assert_eq!(state.generation(), seeded + 1);
    }

    #[test]
    fn test_rollback_leaves_other_edges() {
        let mut state = FeedState::new();
        state.apply_initial(page([3, 2, 1], false));
        let before = state.clone();
        state.insert_provisional(message(0));

        assert!(state.rollback(MessageId(0)));
        assert_eq!(state, before);
        assert!(!state.rollback(MessageId(0)));
    }

    #[test]
    fn test_initial_load_keeps_pending_sends() {
        let mut state = FeedState::new();
        state.apply_initial(page([3, 2, 1], false));
        state.insert_provisional(message(0));

        state.apply_initial(page([5, 4, 3], true));

        assert_eq!(ids(&state), vec![0, 5, 4, 3]);
        assert!(state.is_pending(MessageId(0)));
        assert!(!state.contains(MessageId(1)));
    }
}
