use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{EvidencePhoto, ItemPatch, ItemView, NewItem};
use crate::normalize::is_duplicate;

use super::Snapshot;

/// One inventory item as held in a client's offline cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CachedItem {
    pub local_id: Uuid,
    /// `None` until the item has been registered with the server.
    pub server_id: Option<Uuid>,
    pub name: String,
    pub code: String,
    pub quantity: i32,
    pub category: String,
    pub condition: String,
    pub location: Option<String>,
    pub acquired_on: Option<NaiveDate>,
    pub description: Option<String>,
    /// Last known availability; only meaningful for server copies.
    pub available: Option<i64>,
    #[serde(default)]
    pub photos: Vec<EvidencePhoto>,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub needs_sync: bool,
}

impl CachedItem {
    pub fn from_server(view: &ItemView, local_id: Uuid) -> Self {
        let item = &view.item;
        Self {
            local_id,
            server_id: Some(item.id),
            name: item.name.clone(),
            code: item.code.clone(),
            quantity: item.quantity,
            category: item.category.clone(),
            condition: item.condition.clone(),
            location: item.location.clone(),
            acquired_on: item.acquired_on,
            description: item.description.clone(),
            available: Some(view.available()),
            photos: view.photos.clone(),
            last_modified: item.updated_at,
            needs_sync: false,
        }
    }

    /// Registration payload for an item created offline.
    pub fn to_new_item(&self) -> NewItem {
        NewItem {
            name: self.name.clone(),
            code: self.code.clone(),
            quantity: self.quantity,
            category: self.category.clone(),
            condition: self.condition.clone(),
            location: self.location.clone(),
            acquired_on: self.acquired_on,
            description: self.description.clone(),
        }
    }

    /// Full-field update payload for an item edited offline.
    pub fn to_patch(&self) -> ItemPatch {
        ItemPatch {
            name: Some(self.name.clone()),
            code: Some(self.code.clone()),
            quantity: Some(self.quantity),
            category: Some(self.category.clone()),
            condition: Some(self.condition.clone()),
            location: Some(self.location.clone().unwrap_or_default()),
            acquired_on: Some(self.acquired_on),
            description: Some(self.description.clone().unwrap_or_default()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocalCache {
    pub items: Vec<CachedItem>,
    /// `as_of` of the last snapshot merged in.
    pub last_pulled: Option<DateTime<Utc>>,
}

impl LocalCache {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Entries that must be pushed before the next pull.
    pub fn dirty(&self) -> impl Iterator<Item = &CachedItem> {
        self.items.iter().filter(|i| i.needs_sync)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub cache: LocalCache,
    /// Local ids still waiting to be pushed.
    pub pending_push: Vec<Uuid>,
    /// Local ids that would be registered anew with a code the server
    /// already holds; pushing them fails with `DuplicateCode`.
    pub code_conflicts: Vec<Uuid>,
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

/// Merges a server snapshot into the local cache, last writer wins.
///
/// - items only on the server are added;
/// - on both sides, a dirty local copy newer than the server's `updated_at`
///   is kept, otherwise the server copy replaces it (ties go to the server);
/// - clean local copies missing from the snapshot were deleted elsewhere and
///   are dropped;
/// - dirty local copies missing from the snapshot are kept for push; if the
///   server had known them, their server id is cleared so the push registers
///   them again.
pub fn reconcile(cache: &LocalCache, snapshot: &Snapshot) -> Reconciliation {
    let by_server_id: HashMap<Uuid, &CachedItem> = cache
        .items
        .iter()
        .filter_map(|i| i.server_id.map(|id| (id, i)))
        .collect();

    let mut merged = Vec::with_capacity(snapshot.items.len());
    let mut seen = HashSet::new();
    let mut pending_push = Vec::new();
    let (mut added, mut updated, mut removed) = (0, 0, 0);

    for view in &snapshot.items {
        let server_id = view.item.id;
        seen.insert(server_id);
        match by_server_id.get(&server_id) {
            None => {
                merged.push(CachedItem::from_server(view, server_id));
                added += 1;
            }
            Some(local) if local.needs_sync && local.last_modified > view.item.updated_at => {
                pending_push.push(local.local_id);
                merged.push((*local).clone());
            }
            Some(local) => {
                let fresh = CachedItem::from_server(view, local.local_id);
                if fresh != **local {
                    updated += 1;
                }
                merged.push(fresh);
            }
        }
    }

    for local in &cache.items {
        match local.server_id {
            Some(id) if seen.contains(&id) => {}
            Some(_) if !local.needs_sync => removed += 1,
            Some(_) => {
                pending_push.push(local.local_id);
                merged.push(CachedItem {
                    server_id: None,
                    ..local.clone()
                });
            }
            None => {
                pending_push.push(local.local_id);
                merged.push(CachedItem {
                    needs_sync: true,
                    ..local.clone()
                });
            }
        }
    }

    let code_conflicts = merged
        .iter()
        .filter(|local| local.server_id.is_none())
        .filter(|local| {
            snapshot
                .items
                .iter()
                .any(|view| is_duplicate(&local.code, &view.item.code))
        })
        .map(|local| local.local_id)
        .collect();

    Reconciliation {
        cache: LocalCache {
            items: merged,
            last_pulled: Some(snapshot.as_of),
        },
        pending_push,
        code_conflicts,
        added,
        updated,
        removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InventoryItem;
    use chrono::Duration;

    fn server_item(name: &str, updated_at: DateTime<Utc>) -> ItemView {
        ItemView {
            item: InventoryItem {
                id: Uuid::new_v4(),
                owner_id: Uuid::nil(),
                name: name.to_string(),
                code: format!("{}/1", name),
                code_key: format!("{}/1", name.to_lowercase()),
                quantity: 3,
                category: "tools".into(),
                condition: "good".into(),
                location: None,
                acquired_on: None,
                description: None,
                created_at: updated_at,
                updated_at,
            },
            borrowed: 1,
            photos: vec![],
        }
    }

    fn snapshot(items: Vec<ItemView>, as_of: DateTime<Utc>) -> Snapshot {
        Snapshot {
            items,
            loans: vec![],
            as_of,
        }
    }

    #[test]
    fn test_server_only_items_are_added() {
        let now = Utc::now();
        let result = reconcile(&LocalCache::default(), &snapshot(vec![server_item("Drill", now)], now));
        assert_eq!(result.added, 1);
        assert_eq!(result.cache.items[0].available, Some(2));
        assert_eq!(result.cache.last_pulled, Some(now));
        assert!(result.pending_push.is_empty());
    }

    #[test]
    fn test_newer_dirty_local_copy_wins() {
        let now = Utc::now();
        let view = server_item("Drill", now - Duration::minutes(5));
        let mut local = CachedItem::from_server(&view, Uuid::new_v4());
        local.name = "Drill (edited)".into();
        local.needs_sync = true;
        local.last_modified = now;
        let cache = LocalCache {
            items: vec![local.clone()],
            last_pulled: None,
        };

        let result = reconcile(&cache, &snapshot(vec![view], now));
        assert_eq!(result.cache.items, vec![local.clone()]);
        assert_eq!(result.pending_push, vec![local.local_id]);
    }

    #[test]
    fn test_newer_server_copy_wins_and_ties_go_to_server() {
        let now = Utc::now();
        for local_time in [now - Duration::minutes(1), now] {
            let view = server_item("Drill", now);
            let mut local = CachedItem::from_server(&view, Uuid::new_v4());
            local.name = "stale".into();
            local.needs_sync = true;
            local.last_modified = local_time;
            let cache = LocalCache {
                items: vec![local.clone()],
                last_pulled: None,
            };

            let result = reconcile(&cache, &snapshot(vec![view], now));
            assert_eq!(result.cache.items[0].name, "Drill");
            assert_eq!(result.cache.items[0].local_id, local.local_id);
            assert!(!result.cache.items[0].needs_sync);
            assert_eq!(result.updated, 1);
        }
    }

    #[test]
    fn test_clean_item_deleted_on_server_is_dropped() {
        let now = Utc::now();
        let view = server_item("Drill", now);
        let cache = LocalCache {
            items: vec![CachedItem::from_server(&view, Uuid::new_v4())],
            last_pulled: None,
        };
        let result = reconcile(&cache, &snapshot(vec![], now));
        assert!(result.cache.items.is_empty());
        assert_eq!(result.removed, 1);
    }

    #[test]
    fn test_offline_items_are_kept_for_push() {
        let now = Utc::now();
        let deleted_elsewhere = {
            let mut c = CachedItem::from_server(&server_item("Saw", now), Uuid::new_v4());
            c.needs_sync = true;
            c
        };
        let created_offline = CachedItem {
            server_id: None,
            needs_sync: true,
            ..CachedItem::from_server(&server_item("Tape", now), Uuid::new_v4())
        };
        let cache = LocalCache {
            items: vec![deleted_elsewhere.clone(), created_offline.clone()],
            last_pulled: None,
        };

        let result = reconcile(&cache, &snapshot(vec![], now));
        assert_eq!(
            result.pending_push,
            vec![deleted_elsewhere.local_id, created_offline.local_id]
        );
        assert!(result.cache.items.iter().all(|i| i.server_id.is_none()));
        assert_eq!(result.cache.dirty().count(), 2);
        assert!(result.code_conflicts.is_empty());
    }

    #[test]
    fn test_offline_item_with_taken_code_is_flagged() {
        let now = Utc::now();
        let server = server_item("Drill", now);
        let clash = CachedItem {
            server_id: None,
            needs_sync: true,
            code: "DRILL-01".into(),
            ..CachedItem::from_server(&server_item("Other drill", now), Uuid::new_v4())
        };
        let fresh = CachedItem {
            server_id: None,
            needs_sync: true,
            ..CachedItem::from_server(&server_item("Tape", now), Uuid::new_v4())
        };
        let cache = LocalCache {
            items: vec![clash.clone(), fresh.clone()],
            last_pulled: None,
        };

        let result = reconcile(&cache, &snapshot(vec![server], now));
        assert_eq!(result.code_conflicts, vec![clash.local_id]);
        assert_eq!(result.pending_push, vec![clash.local_id, fresh.local_id]);
    }

    #[test]
    fn test_push_payloads_carry_every_field() {
        let now = Utc::now();
        let mut cached = CachedItem::from_server(&server_item("Drill", now), Uuid::new_v4());
        cached.location = None;
        cached.acquired_on = None;

        let attrs = cached.to_new_item();
        assert_eq!(attrs.code, cached.code);
        assert_eq!(attrs.quantity, 3);

        let patch = cached.to_patch();
        assert_eq!(patch.name.as_deref(), Some("Drill"));
        // Cleared fields are sent as blanks so the server clears them too.
        assert_eq!(patch.location.as_deref(), Some(""));
        assert_eq!(patch.acquired_on, Some(None));
    }

    #[test]
    fn test_cache_json_roundtrip_uses_camel_case() {
        let now = Utc::now();
        let cache = LocalCache {
            items: vec![CachedItem::from_server(&server_item("Drill", now), Uuid::new_v4())],
            last_pulled: Some(now),
        };
        let json = cache.to_json().unwrap();
        assert!(json.contains("needsSync"));
        assert!(json.contains("lastModified"));
        assert_eq!(LocalCache::from_json(&json).unwrap(), cache);
    }
}
