//! Data model shared by resolvers, merge, scoring and storage

pub mod election;
pub mod field_result;
pub mod snapshot;

pub use election::{ElectionBasis, ElectionField, ElectionInfo, ElectionKind, ElectionMethod};
pub use field_result::{FailureKind, FieldResult, FieldStatus, Outcome, Provenance, ReasonCode};
pub use snapshot::{
    ControlMethod, CountrySnapshot, Elections, FreedomRating, FreedomStatus, Government, Leader,
    LeaderRole, LegislatureControlBasis, NewsItem, PartyControlEntry, Quality, Snapshot,
    TrendDirection, TrendPoint, TrendSeries, DEFAULT_LEGISLATURE_BODY, EXECUTIVE_BODY,
};
