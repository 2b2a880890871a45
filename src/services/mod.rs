//! Business logic services for the usage guard.
//!
//! Services hold the resources and registry they need and are resolved from
//! the [`Context`](crate::context::Context) through `FromRef`.
//!
//! - [`UsageService`] - run scanners and aggregate dependent records
//! - [`DeleteService`] - guarded, single-flight delete flows
//! - [`EditService`] - key-field edit guard

mod delete;
mod edit;
mod flight;
mod usage;

pub use delete::{DeleteService, DeleteStart, DeleteTicket};
pub use edit::EditService;
pub use flight::{FlightSlot, InFlight};
pub use usage::UsageService;
