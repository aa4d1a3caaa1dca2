//! Bidirectional many-to-many bindings between engine resources and dialogs.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

/// Maps engine resource IDs to the set of dialog IDs subscribed to them.
///
/// A trait, not a concrete struct, so a distributed implementation can stand in without
/// touching the event pump or request handlers that depend on it.
pub trait DialogManager: Send + Sync {
    fn bind(&self, dialog_id: &str, resource_id: &str);
    fn unbind(&self, dialog_id: &str, resource_id: &str);
    fn list(&self, resource_id: &str) -> HashSet<String>;
    fn remove(&self, dialog_id: &str);
}

/// Default in-memory implementation: two maps behind one lock each, per the
/// resource→dialogs / dialog→resources index pattern.
#[derive(Default)]
pub struct InMemoryDialogManager {
    by_resource: RwLock<HashMap<String, HashSet<String>>>,
    by_dialog: RwLock<HashMap<String, HashSet<String>>>,
}

impl InMemoryDialogManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DialogManager for InMemoryDialogManager {
    fn bind(&self, dialog_id: &str, resource_id: &str) {
        self.by_resource.write().entry(resource_id.to_string()).or_default().insert(dialog_id.to_string());
        self.by_dialog.write().entry(dialog_id.to_string()).or_default().insert(resource_id.to_string());
    }

    fn unbind(&self, dialog_id: &str, resource_id: &str) {
        if let Some(dialogs) = self.by_resource.write().get_mut(resource_id) {
            dialogs.remove(dialog_id);
        }
        if let Some(resources) = self.by_dialog.write().get_mut(dialog_id) {
            resources.remove(resource_id);
        }
    }

    fn list(&self, resource_id: &str) -> HashSet<String> {
        self.by_resource.read().get(resource_id).cloned().unwrap_or_default()
    }

    fn remove(&self, dialog_id: &str) {
        let resources = self.by_dialog.write().remove(dialog_id).unwrap_or_default();
        let mut by_resource = self.by_resource.write();
        for resource_id in resources {
            if let Some(dialogs) = by_resource.get_mut(&resource_id) {
                dialogs.remove(dialog_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_on_unknown_resource_is_empty() {
        let manager = InMemoryDialogManager::new();
        assert!(manager.list("unknown").is_empty());
    }

    #[test]
    fn bind_then_list_returns_dialog() {
        let manager = InMemoryDialogManager::new();
        manager.bind("d1", "c1");
        let dialogs = manager.list("c1");
        assert_eq!(dialogs, HashSet::from(["d1".to_string()]));
    }

    #[test]
    fn bind_is_idempotent() {
        let manager = InMemoryDialogManager::new();
        manager.bind("d1", "c1");
        manager.bind("d1", "c1");
        assert_eq!(manager.list("c1").len(), 1);
    }

    #[test]
    fn unbind_removes_only_that_pair() {
        let manager = InMemoryDialogManager::new();
        manager.bind("d1", "c1");
        manager.bind("d2", "c1");
        manager.unbind("d1", "c1");
        assert_eq!(manager.list("c1"), HashSet::from(["d2".to_string()]));
    }

    #[test]
    fn unbind_unknown_pair_is_a_no_op() {
        let manager = InMemoryDialogManager::new();
        manager.unbind("d1", "c1");
        assert!(manager.list("c1").is_empty());
    }

    #[test]
    fn remove_clears_dialog_from_every_resource() {
        let manager = InMemoryDialogManager::new();
        manager.bind("d1", "c1");
        manager.bind("d1", "c2");
        manager.remove("d1");
        assert!(manager.list("c1").is_empty());
        assert!(manager.list("c2").is_empty());
    }

    #[test]
    fn a_resource_supports_many_dialogs_and_a_dialog_supports_many_resources() {
        let manager = InMemoryDialogManager::new();
        manager.bind("d1", "c1");
        manager.bind("d2", "c1");
        manager.bind("d1", "c2");
        assert_eq!(manager.list("c1").len(), 2);
        manager.remove("d1");
        assert_eq!(manager.list("c1"), HashSet::from(["d2".to_string()]));
        assert!(manager.list("c2").is_empty());
    }
}
