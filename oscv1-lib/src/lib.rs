pub mod audit;
pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod handshake;
pub mod session;
pub mod signal;
pub mod transport;


// Re-export the session-facing types for easy access
pub use audit::{AuditConfig, RateReport, audit_all, audit_rate};
pub use command::{Command, RateMode};
pub use error::Error;
pub use frame::{DecodeStats, FrameDecoder, Sample};
pub use session::{Session, SessionConfig, SessionState};
pub use signal::SignalStats;
pub use transport::{ByteStreamPort, SerialBytePort, discover_port, list_ports};
