// Adapters layer: concrete implementations of the domain ports.

pub mod clock;
pub mod memory;
pub mod sqlite;

pub use clock::{ConfiguredClock, FixedClock, SystemClock};
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
