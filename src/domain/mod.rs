//! Domain layer: value objects and the product/feed/legacy aggregates
pub mod aggregates;
pub mod value_objects;
