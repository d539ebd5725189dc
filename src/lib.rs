pub mod error;
pub mod model;
pub mod route_compute;
pub mod runtime;

pub use error::{RoutingError, RoutingResult};
