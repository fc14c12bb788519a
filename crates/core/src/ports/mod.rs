mod gateway;
mod pagination;
mod repository;

pub use gateway::*;
pub use pagination::*;
pub use repository::*;
