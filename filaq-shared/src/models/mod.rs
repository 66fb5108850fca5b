//! Database models
//!
//! Each model owns its table's queries:
//!
//! - `company`: Tenant root; every user and queue hangs off a company
//! - `user`: Staff accounts, one company each
//! - `queue`: Named, prefix-tagged ticket sequences
//! - `ticket`: One customer's position in a queue

pub mod company;
pub mod queue;
pub mod ticket;
pub mod user;
