use crate::domain::model::Reference;
use crate::domain::ports::CatalogStore;

/// Resolves free text to the first catalog row whose title contains it.
///
/// Matching is a case-insensitive substring test. When several rows match,
/// the first one in catalog row order wins; matches are not ranked against
/// each other. `None` is a valid empty result, not an error.
pub fn resolve<C: CatalogStore + ?Sized>(catalog: &C, text: &str) -> Option<Reference> {
    let matches = catalog.find_titles_containing(text);
    if matches.len() > 1 {
        tracing::debug!("'{}' matched {} rows, taking the first", text, matches.len());
    }

    matches.first().map(|found| Reference {
        item: found.item.clone(),
        anchor_user: found.owner.clone(),
    })
}
