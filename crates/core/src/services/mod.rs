mod boundary;
mod connection;
mod feed;
mod range_query;

pub use boundary::{BoundaryProber, PageBoundaries};
pub use connection::assemble;
pub use feed::{FeedService, LocalGateway, MAX_MESSAGE_LENGTH};
pub use range_query::{RangeQuery, ScanDirection};
