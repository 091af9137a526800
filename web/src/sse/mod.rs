//! SSE HTTP handlers for the web layer.
//!
//! Only the Axum side of live updates lives here: opening auction and
//! notification streams, explicit unsubscribe and presence reads. The
//! registry, presence store and cross-instance relay live in the `sse` crate.

pub mod handler;
