//! Storage backends for the user collection

pub mod memory;
pub mod supabase;
pub mod traits;

// Re-export the storage seam and its implementations
pub use memory::MemoryStore;
pub use supabase::SupabaseStore;
pub use traits::UserStore;
