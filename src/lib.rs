//! PanoDesk: core services for a 360° virtual-tour hosting console.
//!
//! Tours group ordered panoramic scenes; scenes carry operator-placed
//! hotspots. The [`db`] store is the source of truth, exposed over HTTP by
//! [`api`] and consumed through the [`sync`] boundary. The [`viewer`] module
//! derives the render-time scene catalogue and drives optimistic editing.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod sync;
pub mod viewer;
