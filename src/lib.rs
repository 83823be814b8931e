//! Future wealth projection from recurring SIP contributions, salary growth
//! and inflation.

pub mod api;
pub mod core;
