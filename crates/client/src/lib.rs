//! Client side of the Chorus message feed.
//!
//! Holds a local copy of one group's feed and keeps it consistent while
//! pages arrive and messages are sent:
//!
//! - [`FeedState`] - ordered edges, last page info and pending sends, with
//!   one pure transition per event
//! - [`FeedController`] - drives a [`MessageGateway`] and publishes every
//!   transition through a `tokio::sync::watch` channel
//!
//! ```ignore
//! let controller = FeedController::new(gateway, group_id, Session::new(user_id), FeedConfig::default());
//! let mut feed = controller.subscribe();
//!
//! controller.load_initial().await?;
//! controller.send("hello").await?;
//! ```
//!
//! [`MessageGateway`]: chorus_core::ports::MessageGateway

mod controller;
mod session;
mod state;

pub use controller::{FeedController, LoadOutcome};
pub use session::{FeedConfig, Session};
pub use state::{FeedState, Reconciled};
