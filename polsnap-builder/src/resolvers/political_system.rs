//! Political system labels

use super::classifier::{classify, Grade};
use crate::models::{FieldResult, Provenance};
use crate::sources::GovernmentSource;

/// Labels in source order; an empty list is `unknown` / `no_signal`
pub async fn resolve(source: &dyn GovernmentSource, entity: &str) -> FieldResult<Vec<String>> {
    let provenance = vec![Provenance::new(source.endpoint(), Some(entity))];
    let labels = source.political_system(entity).await.map(Some);
    classify(labels, Grade::Direct, provenance)
}
