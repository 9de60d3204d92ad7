use crate::domain::model::ItemId;
use crate::domain::ports::CatalogStore;

/// What a query removes from the item universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion<'q> {
    /// Everything this user has already consumed.
    ConsumedBy(&'q str),
    /// The reference item of a similar-books query.
    Reference(&'q str),
}

/// Eligible candidates in universe order. Never mutates the catalog.
pub fn eligible_candidates<'c, C>(exclusion: Exclusion<'_>, catalog: &'c C) -> Vec<&'c ItemId>
where
    C: CatalogStore + ?Sized,
{
    let universe = catalog.all_item_ids();

    match exclusion {
        Exclusion::ConsumedBy(user_id) => match catalog.consumed_items(user_id) {
            Some(consumed) => universe.iter().filter(|id| !consumed.contains(*id)).collect(),
            None => universe.iter().collect(),
        },
        Exclusion::Reference(reference) => universe.iter().filter(|id| id.as_str() != reference).collect(),
    }
}
