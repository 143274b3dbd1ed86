// src/services/mod.rs
pub mod cache;
pub mod calculations;
pub mod currency;
pub mod drilldown;
pub mod fipe_official;
pub mod parallelum;
pub mod resolver;
pub mod source;
