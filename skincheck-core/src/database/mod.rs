pub mod infrastructure;
pub mod ports;

pub use infrastructure::postgres::{PostgresDatabase, PostgresScanRepository};
pub use ports::scans::ScanRepository;
