// ============================================================================
// SWCACHE - Storefront Worker Cache
// File: routing/mod.rs
// Role: Request routing (resource class selection)
// ----------------------------------------------------------------------------

pub mod classifier;
