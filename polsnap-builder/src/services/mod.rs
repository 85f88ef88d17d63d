//! Stateless text services

pub mod news_deduplicator;
