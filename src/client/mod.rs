//! Client data layer: a typed HTTP client for the users endpoints and the
//! list/form state a front end keeps on top of it.

pub mod api;
pub mod dashboard;
pub mod form;

pub use api::*;
pub use dashboard::*;
pub use form::*;
