// ============================================================================
// SWCACHE - Storefront Worker Cache
// File: plugins/mod.rs
// Role: Response filter chains applied around cache reads and writes
// ----------------------------------------------------------------------------

pub mod filters;

pub use filters::{FilterChain, FilterVerdict, ResponseFilter};
