mod persist;
mod service;
mod session;

pub use persist::{Snapshot, SnapshotSender, SnapshotWriter};
pub use service::PracticeService;
pub use session::{PracticeSession, SessionEvent, SettingsChange};
