pub mod analysis;
pub mod audit;
pub mod config;
pub mod decision;
pub mod distribution;
pub mod error;
pub mod orchestrator;
pub mod player;
pub mod rank;
pub mod redistribute;
pub mod report;
pub mod swap;
pub mod team;
pub mod weight;

pub use config::BalanceConfig;
pub use error::InputError;
pub use orchestrator::{balance, run, BalanceInput};
pub use report::{BalanceReport, StoredReport};
