//! Result Classifier
//!
//! Pure mapping from raw adapter outcomes to [`FieldResult`]s.
//!
//! | Raw outcome                      | Status      | Reason              |
//! |----------------------------------|-------------|---------------------|
//! | payload, non-blank               | per grade   | per grade           |
//! | payload, blank (empty str/list)  | `unknown`   | `no_signal`         |
//! | zero rows                        | `unknown`   | `no_signal`         |
//! | timeout / connect error          | `unknown`   | `transport_failure` |
//! | non-2xx                          | `unknown`   | `http_error`        |
//! | empty or unparsable body         | `unknown`   | `parse_failure`     |
//! | challenge page                   | `blocked`   | `blocked`           |

use crate::models::{ElectionInfo, FieldResult, FreedomRating, Provenance, ReasonCode, TrendSeries};
use crate::sources::{SourceFailure, SourceResult};

/// How directly a payload was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    /// Direct source hit
    Direct,
    /// Derived via a fallback strategy
    Computed(ReasonCode),
    /// Projected from indirect evidence
    Estimated(ReasonCode),
}

/// Payloads that can be blank
pub trait FieldValue {
    fn is_blank(&self) -> bool;
}

impl FieldValue for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl<T> FieldValue for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl FieldValue for ElectionInfo {
    fn is_blank(&self) -> bool {
        false
    }
}

impl FieldValue for FreedomRating {
    fn is_blank(&self) -> bool {
        false
    }
}

impl FieldValue for TrendSeries {
    fn is_blank(&self) -> bool {
        self.points.is_empty()
    }
}

/// Wrap a payload; blank payloads are demoted to `unknown` / `no_signal`
pub fn settle<T: FieldValue>(value: T, grade: Grade, provenance: Vec<Provenance>) -> FieldResult<T> {
    if value.is_blank() {
        return FieldResult::unknown(ReasonCode::NoSignal).with_provenance(provenance);
    }

    let result = match grade {
        Grade::Direct => FieldResult::ok(value),
        Grade::Computed(reason) => FieldResult::computed(value, reason),
        Grade::Estimated(reason) => FieldResult::estimated(value, reason),
    };
    result.with_provenance(provenance)
}

/// Map an adapter failure to a valueless result
pub fn from_failure<T>(failure: &SourceFailure, provenance: Vec<Provenance>) -> FieldResult<T> {
    let result = match ReasonCode::from(failure.kind) {
        ReasonCode::Blocked => FieldResult::blocked(),
        reason => FieldResult::unknown(reason),
    };
    result.with_provenance(provenance)
}

/// Classify a raw adapter outcome
pub fn classify<T: FieldValue>(
    raw: SourceResult<Option<T>>,
    grade: Grade,
    provenance: Vec<Provenance>,
) -> FieldResult<T> {
    match raw {
        Ok(Some(value)) => settle(value, grade, provenance),
        Ok(None) => FieldResult::unknown(ReasonCode::NoSignal).with_provenance(provenance),
        Err(failure) => from_failure(&failure, provenance),
    }
}
