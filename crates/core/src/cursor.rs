//! Cursor codec.
//!
//! A cursor is the standard base64 encoding of the decimal message id
//! (`41` becomes `"NDE="`). Cursors are opaque outside this module: order
//! is only ever derived from the decoded [`MessageId`], never by comparing
//! cursor strings.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{FeedError, FeedResult};
use crate::models::MessageId;
use crate::ports::Cursor;

/// Prefix of cursors minted for provisional (unconfirmed) messages.
///
/// The prefix is not valid base64 so [`decode`] always rejects these
/// cursors and they can never be used as a pagination boundary.
const PROVISIONAL_PREFIX: &str = "~local:";

/// Longest accepted cursor, enough for any `i64` in base64.
const MAX_CURSOR_LENGTH: usize = 32;

/// Encode a message identifier into an opaque cursor.
pub fn encode(id: MessageId) -> Cursor {
    Cursor {
        value: STANDARD.encode(id.get().to_string()),
    }
}

/// Decode a cursor back into the message identifier it was built from.
///
/// Fails with [`FeedError::BadCursor`] if the token is not base64, does
/// not hold a decimal integer, or names a non-positive identifier.
pub fn decode(cursor: &Cursor) -> FeedResult<MessageId> {
    let value = cursor.value.as_str();
    if value.is_empty() || value.len() > MAX_CURSOR_LENGTH {
        return Err(bad_cursor(value, "unexpected length"));
    }

    let bytes = STANDARD
        .decode(value)
        .map_err(|e| bad_cursor(value, &e.to_string()))?;
    let text = std::str::from_utf8(&bytes).map_err(|_| bad_cursor(value, "not utf-8"))?;

    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad_cursor(value, "not a decimal identifier"));
    }

    let id = text
        .parse::<i64>()
        .map(MessageId)
        .map_err(|e| bad_cursor(value, &e.to_string()))?;

    if !id.is_valid() {
        return Err(bad_cursor(value, "identifier out of range"));
    }

    Ok(id)
}

/// Cursor attached to a provisional edge on the client.
pub fn provisional(id: MessageId) -> Cursor {
    Cursor {
        value: format!("{}{}", PROVISIONAL_PREFIX, id.get().unsigned_abs()),
    }
}

/// Whether a cursor was minted by [`provisional`].
pub fn is_provisional(cursor: &Cursor) -> bool {
    cursor.value.starts_with(PROVISIONAL_PREFIX)
}

fn bad_cursor(value: &str, reason: &str) -> FeedError {
    metrics::counter!("bad_cursor_total").increment(1);
    FeedError::BadCursor(format!("{:?}: {}", value, reason))
}
