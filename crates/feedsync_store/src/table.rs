//! The keyed row table shared by every store implementation.

use crate::item::{feed_order, Item, ItemKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Persisted form of a table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct TableData {
    pub last_local_id: i64,
    pub draft: Option<String>,
    pub items: Vec<Item>,
}

/// Rows keyed by [`ItemKey`], plus local id allocation state.
#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    rows: HashMap<ItemKey, Item>,
    last_local_id: i64,
    draft: Option<String>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a table from persisted data.
    ///
    /// Returns `None` if a row cannot be keyed.
    pub fn from_data(data: TableData) -> Option<Self> {
        let mut table = Self {
            rows: HashMap::with_capacity(data.items.len()),
            last_local_id: data.last_local_id,
            draft: data.draft,
        };
        for item in data.items {
            let key = item.key()?;
            if let ItemKey::Local(local_id) = key {
                table.last_local_id = table.last_local_id.max(local_id);
            }
            table.rows.insert(key, item);
        }
        Some(table)
    }

    pub fn to_data(&self) -> TableData {
        TableData {
            last_local_id: self.last_local_id,
            draft: self.draft.clone(),
            items: self.ordered(),
        }
    }

    /// Hands out a local id strictly greater than any seen so far.
    ///
    /// Ids follow wall-clock milliseconds so newer offline rows sort first
    /// across restarts.
    pub fn allocate_local_id(&mut self) -> i64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        self.last_local_id = now.max(self.last_local_id + 1);
        self.last_local_id
    }

    pub fn get(&self, key: ItemKey) -> Option<Item> {
        self.rows.get(&key).cloned()
    }

    /// Upserts a row, normalizing its identity fields.
    pub fn put(&mut self, mut item: Item) -> Item {
        if item.id > 0 {
            item = item.into_synced();
        } else {
            item.id = 0;
            item.is_synced = false;
            let local_id = match item.local_id {
                Some(local_id) => {
                    self.last_local_id = self.last_local_id.max(local_id);
                    local_id
                }
                None => self.allocate_local_id(),
            };
            item.local_id = Some(local_id);
        }

        if let Some(key) = item.key() {
            self.rows.insert(key, item.clone());
        }
        item
    }

    pub fn delete(&mut self, key: ItemKey) -> Option<Item> {
        self.rows.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn ordered(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self.rows.values().cloned().collect();
        items.sort_by(feed_order);
        items
    }

    pub fn unsynced(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self
            .rows
            .iter()
            .filter(|(key, _)| key.is_local())
            .map(|(_, item)| item.clone())
            .collect();
        items.sort_by(feed_order);
        items
    }

    pub fn max_synced_id(&self) -> i64 {
        self.rows
            .keys()
            .filter_map(ItemKey::server_id)
            .max()
            .unwrap_or(0)
    }

    pub fn draft(&self) -> Option<String> {
        self.draft.clone()
    }

    pub fn set_draft(&mut self, draft: Option<String>) {
        self.draft = draft;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_allocates_local_id() {
        let mut table = Table::new();
        let stored = table.put(Item::new("offline"));

        assert_eq!(stored.id, 0);
        assert!(!stored.is_synced);
        let local_id = stored.local_id.unwrap();
        assert_eq!(table.get(ItemKey::Local(local_id)), Some(stored));
    }

    #[test]
    fn local_ids_strictly_increase() {
        let mut table = Table::new();
        let a = table.allocate_local_id();
        let b = table.allocate_local_id();
        let c = table.put(Item::new("x")).local_id.unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn put_with_server_id_clears_local_identity() {
        let mut table = Table::new();
        let mut item = Item::new("server");
        item.id = 9;
        item.local_id = Some(5);

        let stored = table.put(item);
        assert!(stored.is_synced);
        assert_eq!(stored.local_id, None);
        assert_eq!(table.max_synced_id(), 9);
        assert!(table.unsynced().is_empty());
    }

    #[test]
    fn round_trip_through_data() {
        let mut table = Table::new();
        table.put(Item::new("a"));
        let mut synced = Item::new("b");
        synced.id = 4;
        table.put(synced);
        table.set_draft(Some("draft".into()));

        let restored = Table::from_data(table.to_data()).unwrap();
        assert_eq!(restored.ordered(), table.ordered());
        assert_eq!(restored.draft(), Some("draft".into()));
        assert!(restored.last_local_id >= table.last_local_id);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn ordered_view_is_well_formed(ids in prop::collection::vec(0i64..50, 0..40)) {
                let mut table = Table::new();
                for id in &ids {
                    let mut item = Item::new(format!("post {}", id));
                    item.id = *id;
                    table.put(item);
                }

                let ordered = table.ordered();
                prop_assert_eq!(ordered.len(), table.len());

                let first_synced = ordered.iter().position(|i| i.is_synced).unwrap_or(ordered.len());
                prop_assert!(ordered[..first_synced].iter().all(|i| !i.is_synced));
                prop_assert!(ordered[first_synced..].iter().all(|i| i.is_synced));
                prop_assert!(ordered[first_synced..].windows(2).all(|w| w[0].id > w[1].id));
                prop_assert!(ordered[..first_synced]
                    .windows(2)
                    .all(|w| w[0].local_id > w[1].local_id));
            }
        }
    }
}
