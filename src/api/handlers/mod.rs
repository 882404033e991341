//! HTTP handlers.

mod directory;
mod metrics;
mod status;

pub use directory::{
    all_names_handler, by_name_handler, nearby_handler, register_handler, welcome_handler,
};
pub use metrics::metrics_handler;
pub use status::status_handler;
