//! Transport to the persistence service.

pub mod rest;

pub use rest::RestFeatureStore;
