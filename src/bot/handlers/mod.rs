//! Handlers invoked by the router.
//!
//! Handlers own all data access and session mutation. Each one writes to the store
//! before it advances or clears the session, so a failed write leaves the
//! conversation where it was.

/// Order, product and feedback management for the shop admin
pub mod admin;
/// Catalog browsing, ordering and support for customers
pub mod customer;
/// Steps of the multi-message flows
pub mod wizard;
