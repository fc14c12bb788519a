//! Connection assembly.

use crate::cursor;
use crate::models::Message;
use crate::ports::{Connection, Edge, PageInfo};

use super::boundary::PageBoundaries;

/// Build a connection from fetched rows and the probed page boundaries.
///
/// Row order is kept as edge order; every row becomes exactly one edge.
pub fn assemble(rows: Vec<Message>, boundaries: PageBoundaries) -> Connection<Message> {
    debug_assert!(
        rows.windows(2).all(|w| w[0].id > w[1].id),
        "rows must be strictly newest first"
    );

    let edges: Vec<Edge<Message>> = rows
        .into_iter()
        .map(|message| Edge {
            cursor: cursor::encode(message.id),
            node: message,
        })
        .collect();

    let page_info = PageInfo {
        has_next_page: boundaries.has_next_page,
        has_previous_page: boundaries.has_previous_page,
        start_cursor: edges.first().map(|e| e.cursor.clone()),
        end_cursor: edges.last().map(|e| e.cursor.clone()),
    };

    Connection { edges, page_info }
}
