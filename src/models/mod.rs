pub mod mode;
pub mod presence;
pub mod settings;
pub mod snapshot;
pub mod target;

pub use mode::Mode;
pub use presence::PresenceStatus;
pub use settings::Settings;
pub use snapshot::ActivitySnapshot;
pub use target::TargetApp;
