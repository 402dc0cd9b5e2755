//! Merge settled fragments into one composite, keyed by tag.

use crate::aggregate::types::{AggregateError, CompositeResult, Fragment};
use crate::upstream::DependencyKind;

/// Build a composite from exactly one noun and two adjective fragments.
///
/// Adjectives fill `adj1`/`adj2` in the order they appear in `fragments`.
pub fn compose(fragments: &[Fragment]) -> Result<CompositeResult, AggregateError> {
    let mut nouns = Vec::with_capacity(1);
    let mut adjectives = Vec::with_capacity(2);

    for fragment in fragments {
        match fragment.kind {
            DependencyKind::Noun => nouns.push(fragment.value()),
            DependencyKind::Adjective => adjectives.push(fragment.value()),
        }
    }

    match (nouns.as_slice(), adjectives.as_slice()) {
        ([noun], [adj1, adj2]) => Ok(CompositeResult::new(*noun, *adj1, *adj2)),
        _ => {
            tracing::error!(
                nouns = nouns.len(),
                adjectives = adjectives.len(),
                "Composite contract violated"
            );
            Err(AggregateError::Contract {
                nouns: nouns.len(),
                adjectives: adjectives.len(),
            })
        }
    }
}
