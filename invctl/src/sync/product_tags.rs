//! Reconciliation of a product's tag set.
//!
//! Callers supply the complete desired set of tag ids for one product. The reconciler
//! reads the rows that exist, computes the two set differences, and writes only those:
//! one bulk delete for tags no longer wanted, then one bulk insert for new tags.
//! Memberships present on both sides are never touched, so reconciling twice with the
//! same input performs no writes the second time.
//!
//! The store is abstracted by [`TagLinkStore`]. Whether the read and the two writes share
//! a transaction is decided by whoever constructs the store.

use crate::db::errors::Result;
use crate::types::{ProductId, TagId};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Association operations needed to reconcile one product's tags.
#[async_trait::async_trait]
pub trait TagLinkStore: Send {
    /// Tag ids currently linked to the product
    async fn linked_tag_ids(&mut self, product_id: ProductId) -> Result<HashSet<TagId>>;

    /// Remove the links between the product and each of `tag_ids`, returning rows removed
    async fn unlink_tags(&mut self, product_id: ProductId, tag_ids: &[TagId]) -> Result<u64>;

    /// Link the product to each of `tag_ids`, returning rows inserted
    async fn link_tags(&mut self, product_id: ProductId, tag_ids: &[TagId]) -> Result<u64>;
}

/// The writes that take a product from its current tag set to a desired one.
///
/// The two vectors are disjoint and sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff {
    pub to_insert: Vec<TagId>,
    pub to_delete: Vec<TagId>,
}

impl TagDiff {
    pub fn between(current: &HashSet<TagId>, desired: &HashSet<TagId>) -> Self {
        let mut to_insert: Vec<TagId> = desired.difference(current).copied().collect();
        let mut to_delete: Vec<TagId> = current.difference(desired).copied().collect();
        to_insert.sort_unstable();
        to_delete.sort_unstable();
        Self { to_insert, to_delete }
    }

    /// Diff for a product that has no links yet
    pub fn initial(desired: &[TagId]) -> Self {
        Self::between(&HashSet::new(), &desired.iter().copied().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_delete.is_empty()
    }
}

/// Make the product's linked tags equal `desired`, returning the writes performed.
///
/// Duplicates in `desired` collapse. An empty `desired` unlinks everything.
#[instrument(skip(store, desired), fields(desired = desired.len()), err)]
pub async fn reconcile<S>(store: &mut S, product_id: ProductId, desired: &[TagId]) -> Result<TagDiff>
where
    S: TagLinkStore + ?Sized,
{
    let current = store.linked_tag_ids(product_id).await?;
    let desired: HashSet<TagId> = desired.iter().copied().collect();

    let diff = TagDiff::between(&current, &desired);
    apply(store, product_id, &diff).await?;
    Ok(diff)
}

/// Issue the bulk delete and then the bulk insert described by `diff`, skipping empty halves.
#[instrument(skip(store, diff), fields(inserts = diff.to_insert.len(), deletes = diff.to_delete.len()), err)]
pub async fn apply<S>(store: &mut S, product_id: ProductId, diff: &TagDiff) -> Result<()>
where
    S: TagLinkStore + ?Sized,
{
    if diff.is_empty() {
        debug!("Tag set unchanged");
        return Ok(());
    }

    if !diff.to_delete.is_empty() {
        let removed = store.unlink_tags(product_id, &diff.to_delete).await?;
        debug!(removed, "Unlinked tags");
    }
    if !diff.to_insert.is_empty() {
        let added = store.link_tags(product_id, &diff.to_insert).await?;
        debug!(added, "Linked tags");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Unlink(Vec<TagId>),
        Link(Vec<TagId>),
    }

    /// Association table kept in memory, recording every write.
    #[derive(Default)]
    struct MemoryStore {
        rows: BTreeSet<(ProductId, TagId)>,
        writes: Vec<Call>,
    }

    impl MemoryStore {
        fn with_links(product_id: ProductId, tags: &[TagId]) -> Self {
            Self {
                rows: tags.iter().map(|&t| (product_id, t)).collect(),
                writes: Vec::new(),
            }
        }

        fn tags_of(&self, product_id: ProductId) -> BTreeSet<TagId> {
            self.rows.iter().filter(|(p, _)| *p == product_id).map(|(_, t)| *t).collect()
        }
    }

    #[async_trait::async_trait]
    impl TagLinkStore for MemoryStore {
        async fn linked_tag_ids(&mut self, product_id: ProductId) -> Result<HashSet<TagId>> {
            Ok(self.tags_of(product_id).into_iter().collect())
        }

        async fn unlink_tags(&mut self, product_id: ProductId, tag_ids: &[TagId]) -> Result<u64> {
            self.writes.push(Call::Unlink(tag_ids.to_vec()));
            let before = self.rows.len();
            self.rows.retain(|(p, t)| !(*p == product_id && tag_ids.contains(t)));
            Ok((before - self.rows.len()) as u64)
        }

        async fn link_tags(&mut self, product_id: ProductId, tag_ids: &[TagId]) -> Result<u64> {
            self.writes.push(Call::Link(tag_ids.to_vec()));
            let mut added = 0;
            for &tag_id in tag_ids {
                // The primary key would reject this in Postgres
                assert!(self.rows.insert((product_id, tag_id)), "duplicate link ({product_id}, {tag_id})");
                added += 1;
            }
            Ok(added)
        }
    }

    fn set(tags: &[TagId]) -> BTreeSet<TagId> {
        tags.iter().copied().collect()
    }

    #[tokio::test]
    async fn replaces_only_the_changed_memberships() {
        let mut store = MemoryStore::with_links(1, &[1, 2, 3]);

        let diff = reconcile(&mut store, 1, &[2, 3, 4]).await.unwrap();

        assert_eq!(diff.to_delete, vec![1]);
        assert_eq!(diff.to_insert, vec![4]);
        assert_eq!(store.writes, vec![Call::Unlink(vec![1]), Call::Link(vec![4])]);
        assert_eq!(store.tags_of(1), set(&[2, 3, 4]));
    }

    #[tokio::test]
    async fn first_tag_on_an_untagged_product() {
        let mut store = MemoryStore::default();

        let diff = reconcile(&mut store, 7, &[5]).await.unwrap();

        assert!(diff.to_delete.is_empty());
        assert_eq!(store.writes, vec![Call::Link(vec![5])]);
        assert_eq!(store.tags_of(7), set(&[5]));
    }

    #[tokio::test]
    async fn second_identical_call_writes_nothing() {
        let mut store = MemoryStore::with_links(1, &[1, 9]);

        reconcile(&mut store, 1, &[3, 9]).await.unwrap();
        let writes_after_first = store.writes.len();

        let diff = reconcile(&mut store, 1, &[9, 3]).await.unwrap();
        assert!(diff.is_empty());
        assert_eq!(store.writes.len(), writes_after_first);
        assert_eq!(store.tags_of(1), set(&[3, 9]));
    }

    #[tokio::test]
    async fn empty_desired_set_unlinks_everything() {
        let mut store = MemoryStore::with_links(2, &[4, 5, 6]);

        let diff = reconcile(&mut store, 2, &[]).await.unwrap();

        assert_eq!(diff.to_delete, vec![4, 5, 6]);
        assert_eq!(store.writes, vec![Call::Unlink(vec![4, 5, 6])]);
        assert!(store.tags_of(2).is_empty());
    }

    #[tokio::test]
    async fn equal_sets_ignore_order_and_duplicates() {
        let mut store = MemoryStore::with_links(3, &[1, 2]);

        let diff = reconcile(&mut store, 3, &[2, 1, 2, 1]).await.unwrap();

        assert!(diff.is_empty());
        assert!(store.writes.is_empty());
    }

    #[tokio::test]
    async fn duplicate_desired_ids_are_linked_once() {
        let mut store = MemoryStore::default();

        reconcile(&mut store, 4, &[8, 8, 8]).await.unwrap();

        assert_eq!(store.writes, vec![Call::Link(vec![8])]);
        assert_eq!(store.tags_of(4), set(&[8]));
    }

    #[tokio::test]
    async fn other_products_are_left_alone() {
        let mut store = MemoryStore::with_links(1, &[1, 2]);
        store.rows.insert((2, 1));
        store.rows.insert((2, 2));

        reconcile(&mut store, 1, &[]).await.unwrap();

        assert!(store.tags_of(1).is_empty());
        assert_eq!(store.tags_of(2), set(&[1, 2]));
    }

    #[tokio::test]
    async fn every_subset_pair_reaches_the_desired_set_minimally() {
        let universe: [TagId; 4] = [1, 2, 3, 4];
        let subsets: Vec<Vec<TagId>> = (0u8..16)
            .map(|mask| universe.iter().enumerate().filter(|(i, _)| mask & (1 << *i) != 0).map(|(_, t)| *t).collect())
            .collect();

        for current in &subsets {
            for desired in &subsets {
                let mut store = MemoryStore::with_links(1, current);
                let diff = reconcile(&mut store, 1, desired).await.unwrap();

                let current = set(current);
                let desired = set(desired);
                assert_eq!(store.tags_of(1), desired);

                let inserted = set(&diff.to_insert);
                let deleted = set(&diff.to_delete);
                assert!(inserted.is_disjoint(&deleted));
                let touched: BTreeSet<TagId> = inserted.union(&deleted).copied().collect();
                let symmetric: BTreeSet<TagId> = current.symmetric_difference(&desired).copied().collect();
                assert_eq!(touched, symmetric);

                // Deletes always precede inserts
                if let (Some(unlink), Some(link)) = (
                    store.writes.iter().position(|c| matches!(c, Call::Unlink(_))),
                    store.writes.iter().position(|c| matches!(c, Call::Link(_))),
                ) {
                    assert!(unlink < link);
                }
                assert!(store.writes.len() <= 2);
            }
        }
    }

    #[test]
    fn initial_diff_never_deletes() {
        let diff = TagDiff::initial(&[3, 1, 3]);
        assert_eq!(diff.to_insert, vec![1, 3]);
        assert!(diff.to_delete.is_empty());
        assert!(TagDiff::initial(&[]).is_empty());
    }
}
