mod backend;
mod path;

use crate::error::{Result, StoreError};
use crate::model::{Profile, ProfileId};
use log::info;
use std::path::Path;

pub use backend::{FileBackend, Format, Layout, MalformedPolicy};
pub use path::{APP_NAME, default_data_dir, resolve_data_dir};

#[derive(Debug, Clone)]
struct Entry<P> {
    id: ProfileId,
    profile: P,
}

/// Ordered, file-backed collection of one profile kind.
///
/// Every mutation rewrites the whole file before returning. If the write
/// fails the mutation is undone, so the collection in memory always matches
/// the last successful save.
#[derive(Debug)]
pub struct Store<P> {
    backend: FileBackend,
    entries: Vec<Entry<P>>,
    next_id: u64,
}

impl<P: Profile> Store<P> {
    pub fn open(backend: FileBackend) -> Result<Self> {
        let mut store = Self {
            backend,
            entries: Vec::new(),
            next_id: 0,
        };
        store.load()?;
        Ok(store)
    }

    /// Rebuilds the collection from the backing file. Every entry gets a
    /// fresh id.
    pub fn load(&mut self) -> Result<()> {
        let profiles: Vec<P> = self.backend.load()?;
        self.entries.clear();
        for profile in profiles {
            let id = self.allocate_id();
            self.entries.push(Entry { id, profile });
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.backend.path()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProfileId, &P)> {
        self.entries.iter().map(|entry| (entry.id, &entry.profile))
    }

    pub fn profiles(&self) -> Vec<P> {
        self.entries
            .iter()
            .map(|entry| entry.profile.clone())
            .collect()
    }

    /// Indices of the profiles matching `needle`; all of them when it is blank.
    pub fn filter(&self, needle: &str) -> Vec<usize> {
        let needle = needle.trim();
        if needle.is_empty() {
            return (0..self.entries.len()).collect();
        }
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.profile.matches(needle))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn get(&self, index: usize) -> Result<&P> {
        self.check_index(index)?;
        Ok(&self.entries[index].profile)
    }

    pub fn id_at(&self, index: usize) -> Result<ProfileId> {
        self.check_index(index)?;
        Ok(self.entries[index].id)
    }

    pub fn index_of(&self, id: ProfileId) -> Result<usize> {
        self.entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(StoreError::UnknownId(id))
    }

    pub fn get_by_id(&self, id: ProfileId) -> Result<&P> {
        let index = self.index_of(id)?;
        Ok(&self.entries[index].profile)
    }

    /// Appends `profile` and persists. The new entry sits at the previous
    /// length.
    pub fn add(&mut self, profile: P) -> Result<ProfileId> {
        let id = self.allocate_id();
        info!("adding {} '{}'", P::KIND.label(), profile.name());
        self.entries.push(Entry { id, profile });
        if let Err(err) = self.save() {
            self.entries.pop();
            return Err(err);
        }
        Ok(id)
    }

    pub fn update(&mut self, index: usize, profile: P) -> Result<()> {
        self.check_index(index)?;
        info!("updating {} at {}", P::KIND.label(), index);
        let previous = std::mem::replace(&mut self.entries[index].profile, profile);
        if let Err(err) = self.save() {
            self.entries[index].profile = previous;
            return Err(err);
        }
        Ok(())
    }

    pub fn update_by_id(&mut self, id: ProfileId, profile: P) -> Result<()> {
        let index = self.index_of(id)?;
        self.update(index, profile)
    }

    /// Removes and returns the entry at `index`; later entries shift left.
    pub fn delete(&mut self, index: usize) -> Result<P> {
        self.check_index(index)?;
        info!("deleting {} at {}", P::KIND.label(), index);
        let entry = self.entries.remove(index);
        if let Err(err) = self.save() {
            self.entries.insert(index, entry);
            return Err(err);
        }
        Ok(entry.profile)
    }

    pub fn delete_by_id(&mut self, id: ProfileId) -> Result<P> {
        let index = self.index_of(id)?;
        self.delete(index)
    }

    /// Copy of the entry at `index` named with a " (Copy)" suffix. Nothing
    /// is persisted until the caller adds it.
    pub fn duplicate(&self, index: usize) -> Result<P> {
        Ok(self.get(index)?.duplicated())
    }

    /// Moves the entry at `from` so that it ends up at `to`.
    pub fn move_entry(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        if let Err(err) = self.save() {
            let entry = self.entries.remove(to);
            self.entries.insert(from, entry);
            return Err(err);
        }
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let profiles: Vec<&P> = self.entries.iter().map(|entry| &entry.profile).collect();
        self.backend.save(&profiles)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(StoreError::NotFound {
                index,
                len: self.entries.len(),
            })
        }
    }

    fn allocate_id(&mut self) -> ProfileId {
        let id = ProfileId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DirectConnection, PortForward, ProfileKind, ProxyJump};
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn connection(name: &str) -> DirectConnection {
        DirectConnection {
            name: name.to_string(),
            user: "me".to_string(),
            host: format!("{name}.example.com"),
            port: 22,
            key: String::new(),
        }
    }

    fn direct_store() -> (TempDir, Store<DirectConnection>) {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("direct_connections.yaml");
        let store = Store::open(FileBackend::for_kind(ProfileKind::DirectConnection, path))
            .expect("open");
        (dir, store)
    }

    fn reopen<P: Profile>(store: &Store<P>) -> Store<P> {
        Store::open(FileBackend::for_kind(P::KIND, store.path().to_path_buf())).expect("reopen")
    }

    fn names(store: &Store<DirectConnection>) -> Vec<String> {
        store.iter().map(|(_, p)| p.name.clone()).collect()
    }

    #[test]
    fn add_then_get_last_returns_equal_profile() {
        let (_dir, mut store) = direct_store();
        store.add(connection("office")).expect("add");
        store.add(connection("lab")).expect("add");

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(store.len() - 1).expect("get"), &connection("lab"));
    }

    #[test]
    fn add_keeps_insertion_order_across_reload() {
        let (_dir, mut store) = direct_store();
        for name in ["zeta", "alpha", "mid"] {
            store.add(connection(name)).expect("add");
        }

        let reloaded = reopen(&store);
        assert_eq!(names(&reloaded), vec!["zeta", "alpha", "mid"]);
        assert_eq!(reloaded.profiles(), store.profiles());
    }

    #[test]
    fn mixed_mutations_round_trip() {
        let (_dir, mut store) = direct_store();
        for name in ["a", "b", "c", "d"] {
            store.add(connection(name)).expect("add");
        }
        store.delete(1).expect("delete");
        let mut edited = connection("c2");
        edited.port = 2222;
        edited.key = "/keys/c".to_string();
        store.update(1, edited.clone()).expect("update");
        store.add(connection("e")).expect("add");

        assert_eq!(names(&store), vec!["a", "c2", "d", "e"]);
        let reloaded = reopen(&store);
        assert_eq!(reloaded.profiles(), store.profiles());
        assert_eq!(reloaded.get(1).expect("get"), &edited);
    }

    #[test]
    fn delete_shifts_following_entries_left() {
        let (_dir, mut store) = direct_store();
        for name in ["a", "b", "c"] {
            store.add(connection(name)).expect("add");
        }

        let removed = store.delete(0).expect("delete");
        assert_eq!(removed.name, "a");
        assert_eq!(store.get(0).expect("get").name, "b");
        assert_eq!(store.get(1).expect("get").name, "c");
    }

    #[test]
    fn out_of_range_indices_are_not_found() {
        let (_dir, mut store) = direct_store();
        store.add(connection("only")).expect("add");

        assert!(matches!(
            store.get(1),
            Err(StoreError::NotFound { index: 1, len: 1 })
        ));
        assert!(store.update(5, connection("x")).unwrap_err().is_not_found());
        assert!(store.delete(1).unwrap_err().is_not_found());
        assert!(store.duplicate(3).unwrap_err().is_not_found());
        assert!(store.move_entry(0, 1).unwrap_err().is_not_found());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn empty_store_rejects_index_zero() {
        let (_dir, store) = direct_store();
        assert!(store.is_empty());
        assert!(store.get(0).unwrap_err().is_not_found());
    }

    #[test]
    fn duplicate_does_not_persist() {
        let (_dir, mut store) = direct_store();
        store.add(connection("office")).expect("add");

        let copy = store.duplicate(0).expect("duplicate");
        assert_eq!(copy.name, "office (Copy)");
        assert_eq!(copy.host, "office.example.com");
        assert_eq!(store.len(), 1);
        assert_eq!(reopen(&store).len(), 1);

        store.add(copy).expect("add");
        assert_eq!(names(&reopen(&store)), vec!["office", "office (Copy)"]);
    }

    #[test]
    fn ids_are_stable_across_updates_moves_and_deletes() {
        let (_dir, mut store) = direct_store();
        let a = store.add(connection("a")).expect("add");
        let b = store.add(connection("b")).expect("add");
        let c = store.add(connection("c")).expect("add");
        assert_ne!(a, b);

        store.update_by_id(b, connection("b2")).expect("update");
        store.move_entry(2, 0).expect("move");
        store.delete_by_id(a).expect("delete");

        assert_eq!(store.index_of(c).expect("index"), 0);
        assert_eq!(store.index_of(b).expect("index"), 1);
        assert_eq!(store.get_by_id(b).expect("get").name, "b2");
        assert_eq!(store.id_at(0).expect("id"), c);
        assert!(matches!(store.index_of(a), Err(StoreError::UnknownId(id)) if id == a));
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let (_dir, mut store) = direct_store();
        let first = store.add(connection("a")).expect("add");
        store.delete_by_id(first).expect("delete");
        let second = store.add(connection("b")).expect("add");
        assert_ne!(first, second);
    }

    #[test]
    fn move_entry_reorders_and_persists() {
        let (_dir, mut store) = direct_store();
        for name in ["a", "b", "c"] {
            store.add(connection(name)).expect("add");
        }
        store.move_entry(0, 2).expect("move");
        assert_eq!(names(&store), vec!["b", "c", "a"]);
        assert_eq!(names(&reopen(&store)), vec!["b", "c", "a"]);
    }

    #[test]
    fn failed_save_rolls_back_mutation() {
        let dir = tempdir().expect("tempdir");
        let data_dir = dir.path().join("data");
        let path = data_dir.join("direct_connections.yaml");
        let mut store =
            Store::open(FileBackend::for_kind(ProfileKind::DirectConnection, path)).expect("open");
        store.add(connection("kept")).expect("add");
        store.add(connection("second")).expect("add");

        // Swap the data directory for a plain file so the next write fails.
        fs::remove_dir_all(&data_dir).expect("remove");
        fs::write(&data_dir, "blocker").expect("write");

        assert!(matches!(
            store.add(connection("lost")),
            Err(StoreError::Io { .. })
        ));
        assert!(store.update(0, connection("changed")).is_err());
        assert!(store.delete(0).is_err());
        assert!(store.move_entry(0, 1).is_err());
        assert_eq!(names(&store), vec!["kept", "second"]);
    }

    #[test]
    fn filter_returns_matching_indices() {
        let (_dir, mut store) = direct_store();
        store.add(connection("office")).expect("add");
        store.add(connection("prod")).expect("add");

        assert_eq!(store.filter("PROD"), vec![1]);
        assert_eq!(store.filter("example"), vec![0, 1]);
        assert_eq!(store.filter("  "), vec![0, 1]);
        assert_eq!(store.filter(" prod "), vec![1]);
        assert!(store.filter("nothing").is_empty());
    }

    #[test]
    fn reload_picks_up_external_edits() {
        let (_dir, mut store) = direct_store();
        store.add(connection("a")).expect("add");
        fs::write(
            store.path(),
            "- name: edited\n  user: root\n  host: h\n  port: 2200\n",
        )
        .expect("write");

        store.load().expect("load");
        let profile = store.get(0).expect("get");
        assert_eq!(profile.name, "edited");
        assert_eq!(profile.port, 2200);
        assert_eq!(profile.key, "");
    }

    #[test]
    fn json_stores_open_empty_on_missing_or_malformed_file() {
        let dir = tempdir().expect("tempdir");
        let forwards = dir.path().join("port_forwards.json");
        let store: Store<PortForward> =
            Store::open(FileBackend::for_kind(ProfileKind::PortForward, forwards)).expect("open");
        assert!(store.is_empty());

        let jumps = dir.path().join("proxy_jumps.json");
        fs::write(&jumps, "{ this is not json").expect("write");
        let store: Store<ProxyJump> =
            Store::open(FileBackend::for_kind(ProfileKind::ProxyJump, jumps)).expect("open");
        assert!(store.is_empty());
    }

    #[test]
    fn yaml_store_refuses_malformed_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("direct_connections.yaml");
        fs::write(&path, "- name: [").expect("write");
        let result: Result<Store<DirectConnection>> =
            Store::open(FileBackend::for_kind(ProfileKind::DirectConnection, path));
        assert!(matches!(result, Err(StoreError::MalformedData { .. })));
    }

    #[test]
    fn proxy_jump_store_round_trips_all_fields() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("proxy_jumps.json");
        let mut store: Store<ProxyJump> =
            Store::open(FileBackend::for_kind(ProfileKind::ProxyJump, path)).expect("open");
        let jump = ProxyJump {
            name: "core switch".to_string(),
            target_user: "admin".to_string(),
            target_host: "10.1.1.1".to_string(),
            target_port: 22,
            jump_user: "ops".to_string(),
            jump_host: "gw".to_string(),
            jump_port: 2222,
            key: "/keys/ops".to_string(),
            device_type: "cisco_ios".to_string(),
        };
        store.add(jump.clone()).expect("add");

        let reloaded = reopen(&store);
        assert_eq!(reloaded.get(0).expect("get"), &jump);
    }
}
