//! Record-level validation

pub mod confidence_scorer;
