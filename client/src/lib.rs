pub mod activity;
pub mod config;
pub mod error;
pub mod instructions;
pub mod pool_client;
pub mod session;

pub use activity::{classify, ActivityEvent, ActivityKind, TransactionRecord};
pub use config::{load_cfg, ClientConfig};
pub use error::ClientError;
pub use instructions::rpc::StakingRpc;
pub use pool_client::{Fetched, PoolClient, PoolStats, Snapshot};
pub use session::{PollingSession, SessionState, SessionView};
