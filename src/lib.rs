pub mod calendar;
pub mod clock;
pub mod config;
pub mod guard;
pub mod limits;
pub mod model;
pub mod observability;
pub mod rollover;
pub mod service;
pub mod store;
pub mod validation;
