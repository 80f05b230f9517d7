pub mod config;
pub mod logging;

pub mod cabinet;
pub mod checksum;
pub mod control;
pub mod handler;
pub mod join;
pub mod page;
pub mod sink;
pub mod storage;
pub mod transport;
pub mod url_model;
pub mod walker;

#[cfg(test)]
mod testing;

pub use cabinet::{Cabinet, RunSummary, ROOT_PATH};
pub use config::{CabinetConfig, ReportSelection};
pub use control::CancelFlag;
pub use transport::{Session, SessionCookies, Transport, TransportError};
