//! Concrete StatSource clients.
//!
//! - [`lcd`]: on-chain smart-query transport
//! - [`mirror`]: farm, staking and governance contract clients
//! - [`mirror_graph`]: off-chain statistics over GraphQL

pub mod lcd;
pub mod mirror;
pub mod mirror_graph;

pub use lcd::LcdClient;
pub use mirror::{query_pool_liquidity, GovClient, MirrorFarmClient, MirrorStakingClient};
pub use mirror_graph::MirrorGraphClient;
