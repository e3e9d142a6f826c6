//! Backend handlers
//!
//! Each handler kind turns an external id into a composite JSON document and
//! maps it onto attribute uris:
//!
//! - [`O2ARegistryHandler`] (`o2a_registry`) - item plus contacts, parameters and units
//! - [`SensorManagementHandler`] (`sensor_management_system`) - device plus contact roles
//! - [`InstrumentPoolHandler`] (`gfz_gipp`) - single instrument document
//!
//! [`HandlerRegistry`] maps configured names to constructors.

pub mod gfz_gipp;
pub mod o2a_registry;
pub mod registry;
pub mod sms;
mod r#trait;

pub use gfz_gipp::InstrumentPoolHandler;
pub use o2a_registry::O2ARegistryHandler;
pub use r#trait::{Handler, HandlerSettings};
pub use registry::{HandlerConstructor, HandlerRegistry};
pub use sms::SensorManagementHandler;
