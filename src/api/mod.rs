mod types;
mod client;
mod error;
mod memory;
mod store;

pub use types::*;
pub use client::SupabaseClient;
pub use error::ApiError;
pub use memory::MemoryStore;
pub use store::TripStore;
