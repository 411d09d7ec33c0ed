pub mod checkpoint_store;
pub mod digest_source;
pub mod notifier;
pub mod ticket_source;
pub mod version_source;

pub use checkpoint_store::CheckpointStore;
pub use digest_source::DigestSource;
pub use notifier::NotifierService;
pub use ticket_source::TicketSourceService;
pub use version_source::{KnownVersionStore, VersionSource};
