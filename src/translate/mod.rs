//! Translation from the request dialect into typed plans: filter objects
//! become predicate trees, include entries become attach plans, and order
//! paths become sort keys. The store renders the result to SQL.

pub mod filter;
pub mod include;
pub mod order;

pub use filter::{CompareOp, LogicalOp, Operand, Predicate};
pub use include::AttachNode;
pub use order::SortKey;
