//! The in-process object cache.
//!
//! The cache is a read-through accelerator only; the store remains authoritative and every entry is safe to
//! evict at any time. Consistency is eventual and TTL-bounded by design: mutations invalidate the affected
//! key namespaces, and anything missed ages out.
mod memory;

pub use memory::MemoryCache;

/// Cache key namespaces. Keys are glob-invalidated; prefix discipline is what prevents one namespace from
/// ever matching another by accident.
pub mod keys {
    /// Every cached order list, across all users. Used by webhook-driven invalidation, which does not know
    /// the affected user.
    pub const ORDERS_ALL_USERS: &str = "orders:user:*";
    pub const ORDERS_ALL_SINGLE_USERS: &str = "orders:oneuser:*";

    /// A single user's cached per-order detail view.
    pub fn one_user(user_id: &str) -> String {
        format!("orders:oneuser:{user_id}")
    }
}
