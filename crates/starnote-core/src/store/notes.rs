//! Note repository over the `notes` preference file

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::models::{normalize_tag, normalize_tags, Note, NoteId};
use crate::prefs::{PreferenceStore, Preferences};

const NOTES_FILE: &str = "notes";
const KEY_NOTES: &str = "notes";
const KEY_DELETED_IDS: &str = "deleted_ids";
const KEY_LAST_SYNC_AT: &str = "last_sync_at";
const KEY_TAGS: &str = "tags";

/// Input for a new note; the id is always generated by the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub name: String,
    pub content: String,
    pub tags: Vec<String>,
    /// Defaults to now
    pub timestamp: Option<i64>,
}

/// Trait for note storage operations
pub trait NoteRepository: Send + Sync {
    /// Append a new note with a fresh id
    fn create(&self, draft: NoteDraft) -> Result<Note>;

    /// Get an active note by ID
    fn get(&self, id: &NoteId) -> Result<Option<Note>>;

    /// Get a note by ID, including soft-deleted ones
    fn get_any(&self, id: &NoteId) -> Result<Option<Note>>;

    /// Active notes in insertion order
    fn list(&self) -> Result<Vec<Note>>;

    /// Every stored note, soft-deleted ones included
    fn list_all(&self) -> Result<Vec<Note>>;

    /// Replace the note with the same id, or append it
    fn upsert(&self, note: &Note) -> Result<Note>;

    /// Soft delete a note and tombstone its id
    fn delete(&self, id: &NoteId) -> Result<()>;

    /// Active notes with `start <= timestamp < end`
    fn list_in_range(&self, start: i64, end: i64) -> Result<Vec<Note>>;

    /// Active notes carrying `tag`
    fn list_by_tag(&self, tag: &str) -> Result<Vec<Note>>;

    /// Active notes whose name or body contains `query`
    fn search(&self, query: &str) -> Result<Vec<Note>>;

    /// Known tag labels, sorted
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Register a tag label; returns false if it was already known
    fn add_tag(&self, tag: &str) -> Result<bool>;

    /// Rename a tag everywhere; returns the number of notes rewritten
    fn rename_tag(&self, from: &str, to: &str) -> Result<usize>;

    /// Remove a tag everywhere; returns the number of notes rewritten
    fn delete_tag(&self, tag: &str) -> Result<usize>;

    /// Erase soft-deleted notes; returns how many were erased
    fn purge_deleted(&self) -> Result<usize>;

    /// Tombstoned ids not yet reported to the server
    fn deleted_ids(&self) -> Result<Vec<NoteId>>;

    /// Take the server's collection as the whole local collection
    ///
    /// `None` leaves the notes as they are. The tombstones in `reported` are
    /// cleared and the sync time recorded in the same commit; tombstones
    /// written after the request was built survive for the next sync.
    fn replace_from_server(
        &self,
        notes: Option<Vec<Note>>,
        reported: &[NoteId],
        synced_at: i64,
    ) -> Result<()>;

    /// When the last successful sync finished (Unix ms)
    fn last_synced_at(&self) -> Result<Option<i64>>;
}

/// Decoded contents of the `notes` preference file
struct NoteState {
    prefs: Preferences,
    notes: Vec<Note>,
    deleted_ids: BTreeSet<NoteId>,
    tags: BTreeSet<String>,
}

impl NoteState {
    fn decode(prefs: Preferences) -> Self {
        let notes = prefs.get_json::<Vec<Note>>(KEY_NOTES).unwrap_or_default();
        let deleted_ids = prefs
            .get_json::<BTreeSet<NoteId>>(KEY_DELETED_IDS)
            .unwrap_or_default();
        let tags = prefs
            .get_json::<BTreeSet<String>>(KEY_TAGS)
            .unwrap_or_default();
        Self {
            prefs,
            notes,
            deleted_ids,
            tags,
        }
    }

    fn encode(mut self) -> Result<Preferences> {
        self.prefs.put_json(KEY_NOTES, &self.notes)?;
        self.prefs.put_json(KEY_DELETED_IDS, &self.deleted_ids)?;
        self.prefs.put_json(KEY_TAGS, &self.tags)?;
        Ok(self.prefs)
    }

    fn active(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(|note| !note.is_deleted)
    }

    fn remember_tags(&mut self, tags: &[String]) {
        self.tags.extend(tags.iter().cloned());
    }
}

/// `PreferenceStore`-backed implementation of `NoteRepository`
pub struct PreferenceNoteRepository {
    store: Arc<dyn PreferenceStore>,
    write_lock: Mutex<()>,
}

impl PreferenceNoteRepository {
    /// Create a repository on top of the given store
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<NoteState> {
        Ok(NoteState::decode(self.store.load(NOTES_FILE)?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))
    }

    /// Load, mutate, and commit the notes file as one unit
    fn modify<T>(&self, change: impl FnOnce(&mut NoteState) -> Result<T>) -> Result<T> {
        let _guard = self.lock()?;
        let mut state = self.read()?;
        let outcome = change(&mut state)?;
        self.store.commit(&state.encode()?)?;
        Ok(outcome)
    }

    fn filter_active(&self, predicate: impl Fn(&Note) -> bool) -> Result<Vec<Note>> {
        let state = self.read()?;
        Ok(state
            .active()
            .filter(|note| predicate(note))
            .cloned()
            .collect())
    }
}

fn require_tag(label: &str) -> Result<String> {
    normalize_tag(label).ok_or_else(|| Error::InvalidInput("Tag cannot be empty".into()))
}

impl NoteRepository for PreferenceNoteRepository {
    fn create(&self, draft: NoteDraft) -> Result<Note> {
        let mut note = Note::new(draft.name, draft.content).with_tags(&draft.tags);
        if note.is_empty() {
            return Err(Error::InvalidInput(
                "A note needs a name or some content".into(),
            ));
        }
        if let Some(timestamp) = draft.timestamp {
            note = note.at(timestamp);
        }

        self.modify(|state| {
            state.remember_tags(&note.tags);
            state.notes.push(note.clone());
            Ok(())
        })?;

        tracing::debug!("Created note {}", note.id);
        Ok(note)
    }

    fn get(&self, id: &NoteId) -> Result<Option<Note>> {
        let state = self.read()?;
        let found = state.active().find(|note| &note.id == id).cloned();
        Ok(found)
    }

    fn get_any(&self, id: &NoteId) -> Result<Option<Note>> {
        let state = self.read()?;
        Ok(state.notes.into_iter().find(|note| &note.id == id))
    }

    fn list(&self) -> Result<Vec<Note>> {
        self.filter_active(|_| true)
    }

    fn list_all(&self) -> Result<Vec<Note>> {
        Ok(self.read()?.notes)
    }

    fn upsert(&self, note: &Note) -> Result<Note> {
        let mut note = note.clone();
        note.tags = normalize_tags(&note.tags);

        self.modify(|state| {
            state.remember_tags(&note.tags);
            if let Some(existing) = state.notes.iter_mut().find(|n| n.id == note.id) {
                *existing = note.clone();
            } else {
                state.notes.push(note.clone());
            }
            Ok(())
        })?;

        tracing::debug!("Saved note {}", note.id);
        Ok(note)
    }

    fn delete(&self, id: &NoteId) -> Result<()> {
        self.modify(|state| {
            let note = state
                .notes
                .iter_mut()
                .find(|note| &note.id == id && !note.is_deleted)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            note.is_deleted = true;
            state.deleted_ids.insert(id.clone());
            Ok(())
        })?;

        tracing::debug!("Soft-deleted note {}", id);
        Ok(())
    }

    fn list_in_range(&self, start: i64, end: i64) -> Result<Vec<Note>> {
        self.filter_active(|note| note.is_within(start, end))
    }

    fn list_by_tag(&self, tag: &str) -> Result<Vec<Note>> {
        let Some(tag) = normalize_tag(tag) else {
            return Ok(Vec::new());
        };
        self.filter_active(|note| note.has_tag(&tag))
    }

    fn search(&self, query: &str) -> Result<Vec<Note>> {
        self.filter_active(|note| note.matches_query(query))
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self.read()?.tags.into_iter().collect())
    }

    fn add_tag(&self, tag: &str) -> Result<bool> {
        let tag = require_tag(tag)?;
        self.modify(|state| Ok(state.tags.insert(tag)))
    }

    fn rename_tag(&self, from: &str, to: &str) -> Result<usize> {
        let from = require_tag(from)?;
        let to = require_tag(to)?;
        if from == to {
            return Ok(0);
        }

        let rewritten = self.modify(|state| {
            let mut rewritten = 0;
            for note in state.notes.iter_mut().filter(|note| note.has_tag(&from)) {
                let renamed = note
                    .tags
                    .iter()
                    .map(|tag| if *tag == from { to.as_str() } else { tag.as_str() });
                note.tags = normalize_tags(renamed);
                rewritten += 1;
            }
            if state.tags.remove(&from) || rewritten > 0 {
                state.tags.insert(to.clone());
            }
            Ok(rewritten)
        })?;

        tracing::debug!("Renamed tag '{}' to '{}' on {} notes", from, to, rewritten);
        Ok(rewritten)
    }

    fn delete_tag(&self, tag: &str) -> Result<usize> {
        let tag = require_tag(tag)?;

        let rewritten = self.modify(|state| {
            let mut rewritten = 0;
            for note in state.notes.iter_mut().filter(|note| note.has_tag(&tag)) {
                note.tags.retain(|existing| *existing != tag);
                rewritten += 1;
            }
            state.tags.remove(&tag);
            Ok(rewritten)
        })?;

        tracing::debug!("Deleted tag '{}' from {} notes", tag, rewritten);
        Ok(rewritten)
    }

    fn purge_deleted(&self) -> Result<usize> {
        self.modify(|state| {
            let before = state.notes.len();
            state.notes.retain(|note| !note.is_deleted);
            Ok(before - state.notes.len())
        })
    }

    fn deleted_ids(&self) -> Result<Vec<NoteId>> {
        Ok(self.read()?.deleted_ids.into_iter().collect())
    }

    fn replace_from_server(
        &self,
        notes: Option<Vec<Note>>,
        reported: &[NoteId],
        synced_at: i64,
    ) -> Result<()> {
        self.modify(|state| {
            if let Some(notes) = notes {
                for note in &notes {
                    state.tags.extend(normalize_tags(&note.tags));
                }
                state.notes = notes;
            }
            for id in reported {
                state.deleted_ids.remove(id);
            }
            state.prefs.put_i64(KEY_LAST_SYNC_AT, synced_at);
            Ok(())
        })
    }

    fn last_synced_at(&self) -> Result<Option<i64>> {
        Ok(self.read()?.prefs.get_i64(KEY_LAST_SYNC_AT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryPreferenceStore;
    use pretty_assertions::assert_eq;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn setup() -> (Arc<MemoryPreferenceStore>, PreferenceNoteRepository) {
        let store = Arc::new(MemoryPreferenceStore::new());
        let repo = PreferenceNoteRepository::new(store.clone());
        (store, repo)
    }

    fn draft(name: &str, tags: &[&str]) -> NoteDraft {
        NoteDraft {
            name: name.to_string(),
            content: format!("{name} body"),
            tags: tags.iter().map(ToString::to_string).collect(),
            timestamp: None,
        }
    }

    #[test]
    fn test_create_then_list_contains_note_once() {
        let (_, repo) = setup();
        let note = repo.create(draft("Orion", &[])).unwrap();

        let notes = repo.list().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, note.id);
        assert_eq!(notes[0].name, "Orion");
    }

    #[test]
    fn test_create_rejects_empty_note() {
        let (_, repo) = setup();
        let result = repo.create(NoteDraft::default());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(repo.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let (_, repo) = setup();
        let first = repo.create(draft("first", &[])).unwrap();
        let second = repo.create(draft("second", &[])).unwrap();
        let third = repo.create(draft("third", &[])).unwrap();

        let ids: Vec<NoteId> = repo.list().unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
    }

    #[test]
    fn test_soft_delete_hides_note_but_keeps_it_stored() {
        let (_, repo) = setup();
        let note = repo.create(draft("Lyra", &[])).unwrap();
        repo.delete(&note.id).unwrap();

        assert!(repo.list().unwrap().is_empty());
        assert!(repo.get(&note.id).unwrap().is_none());

        let stored = repo.get_any(&note.id).unwrap().unwrap();
        assert!(stored.is_deleted);
        assert_eq!(repo.list_all().unwrap().len(), 1);
        assert_eq!(repo.deleted_ids().unwrap(), vec![note.id.clone()]);

        assert_eq!(repo.purge_deleted().unwrap(), 1);
        assert!(repo.get_any(&note.id).unwrap().is_none());
        assert_eq!(repo.deleted_ids().unwrap(), vec![note.id]);
    }

    #[test]
    fn test_delete_writes_flag_and_tombstone_in_one_commit() {
        let (store, repo) = setup();
        let note = repo.create(draft("Cygnus", &[])).unwrap();
        repo.delete(&note.id).unwrap();

        let prefs = store.load(NOTES_FILE).unwrap();
        let notes: Vec<Note> = prefs.get_json(KEY_NOTES).unwrap();
        let deleted: Vec<NoteId> = prefs.get_json(KEY_DELETED_IDS).unwrap();
        assert!(notes[0].is_deleted);
        assert_eq!(deleted, vec![note.id]);
    }

    #[test]
    fn test_delete_unknown_note_is_not_found() {
        let (_, repo) = setup();
        let missing = NoteId::new();
        assert!(matches!(repo.delete(&missing), Err(Error::NotFound(_))));
        assert!(repo.deleted_ids().unwrap().is_empty());
    }

    #[test]
    fn test_upsert_replaces_in_place_or_appends() {
        let (_, repo) = setup();
        let first = repo.create(draft("first", &[])).unwrap();
        repo.create(draft("second", &[])).unwrap();

        let mut edited = first.clone();
        edited.content = "edited".to_string();
        repo.upsert(&edited).unwrap();

        let notes = repo.list().unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, first.id);
        assert_eq!(notes[0].content, "edited");

        let foreign = Note::new("from elsewhere", "");
        repo.upsert(&foreign).unwrap();
        let notes = repo.list().unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[2].id, foreign.id);
    }

    #[test]
    fn test_range_query_is_half_open() {
        let (_, repo) = setup();
        let day = 20_000 * DAY_MS;
        let at = |name: &str, timestamp: i64| NoteDraft {
            timestamp: Some(timestamp),
            ..draft(name, &[])
        };

        repo.create(at("before", day - 1)).unwrap();
        let start = repo.create(at("start", day)).unwrap();
        let late = repo.create(at("late", day + DAY_MS - 1)).unwrap();
        repo.create(at("end", day + DAY_MS)).unwrap();
        let deleted = repo.create(at("deleted", day + 10)).unwrap();
        repo.delete(&deleted.id).unwrap();

        let ids: Vec<NoteId> = repo
            .list_in_range(day, day + DAY_MS)
            .unwrap()
            .into_iter()
            .map(|note| note.id)
            .collect();
        assert_eq!(ids, vec![start.id, late.id]);
        assert!(repo.list_in_range(day, day).unwrap().is_empty());
    }

    #[test]
    fn test_rename_tag_rewrites_every_note() {
        let (_, repo) = setup();
        let a = repo.create(draft("a", &["moon", "sky"])).unwrap();
        let b = repo.create(draft("b", &["moon"])).unwrap();
        let c = repo.create(draft("c", &["sky"])).unwrap();

        assert_eq!(repo.rename_tag("moon", "luna").unwrap(), 2);

        assert_eq!(repo.get(&a.id).unwrap().unwrap().tags, vec!["luna", "sky"]);
        assert_eq!(repo.get(&b.id).unwrap().unwrap().tags, vec!["luna"]);
        assert_eq!(repo.get(&c.id).unwrap().unwrap().tags, vec!["sky"]);
        assert_eq!(repo.list_tags().unwrap(), vec!["luna", "sky"]);
        assert!(repo.list_by_tag("moon").unwrap().is_empty());
        assert_eq!(repo.list_by_tag("luna").unwrap().len(), 2);
    }

    #[test]
    fn test_rename_tag_merges_duplicates() {
        let (_, repo) = setup();
        let note = repo.create(draft("a", &["moon", "luna"])).unwrap();
        repo.rename_tag("moon", "luna").unwrap();
        assert_eq!(repo.get(&note.id).unwrap().unwrap().tags, vec!["luna"]);
    }

    #[test]
    fn test_delete_tag_strips_notes_and_known_set() {
        let (_, repo) = setup();
        let note = repo.create(draft("a", &["moon", "sky"])).unwrap();
        repo.add_tag("planets").unwrap();

        assert_eq!(repo.delete_tag("moon").unwrap(), 1);
        assert_eq!(repo.get(&note.id).unwrap().unwrap().tags, vec!["sky"]);
        assert_eq!(repo.list_tags().unwrap(), vec!["planets", "sky"]);
    }

    #[test]
    fn test_add_tag_reports_existing() {
        let (_, repo) = setup();
        assert!(repo.add_tag(" comet ").unwrap());
        assert!(!repo.add_tag("comet").unwrap());
        assert!(repo.add_tag("   ").is_err());
    }

    #[test]
    fn test_search_matches_name_and_body() {
        let (_, repo) = setup();
        repo.create(draft("Jupiter moons", &[])).unwrap();
        repo.create(NoteDraft {
            name: String::new(),
            content: "Saw Jupiter rising".to_string(),
            ..NoteDraft::default()
        })
        .unwrap();
        repo.create(draft("Saturn", &[])).unwrap();

        assert_eq!(repo.search("jupiter").unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_notes_read_as_empty() {
        let (store, repo) = setup();
        let mut prefs = Preferences::new(NOTES_FILE);
        prefs.put_string(KEY_NOTES, "[{broken");
        store.commit(&prefs).unwrap();

        assert!(repo.list_all().unwrap().is_empty());
        repo.create(draft("fresh", &[])).unwrap();
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn test_replace_from_server_is_whole_list() {
        let (_, repo) = setup();
        let local = repo.create(draft("local only", &[])).unwrap();
        let gone = repo.create(draft("gone", &[])).unwrap();
        repo.delete(&gone.id).unwrap();

        let remote = Note::new("remote", "from server").with_tags(["meteor"]);
        repo.replace_from_server(Some(vec![remote.clone()]), &[gone.id.clone()], 99)
            .unwrap();

        let notes = repo.list_all().unwrap();
        assert_eq!(notes, vec![remote]);
        assert!(repo.get_any(&local.id).unwrap().is_none());
        assert!(repo.deleted_ids().unwrap().is_empty());
        assert_eq!(repo.last_synced_at().unwrap(), Some(99));
        assert!(repo.list_tags().unwrap().contains(&"meteor".to_string()));
    }

    #[test]
    fn test_replace_from_server_without_notes_keeps_local() {
        let (_, repo) = setup();
        let local = repo.create(draft("keep", &[])).unwrap();
        repo.replace_from_server(None, &[], 7).unwrap();

        assert_eq!(repo.list().unwrap()[0].id, local.id);
        assert_eq!(repo.last_synced_at().unwrap(), Some(7));
    }

    #[test]
    fn test_replace_from_server_keeps_unreported_tombstones() {
        let (_, repo) = setup();
        let reported = repo.create(draft("reported", &[])).unwrap();
        let late = repo.create(draft("late", &[])).unwrap();
        repo.delete(&reported.id).unwrap();
        repo.delete(&late.id).unwrap();

        repo.replace_from_server(None, &[reported.id], 5).unwrap();

        assert_eq!(repo.deleted_ids().unwrap(), vec![late.id]);
    }

    #[test]
    fn test_rename_unknown_tag_changes_nothing() {
        let (_, repo) = setup();
        repo.create(draft("Vega", &["stars"])).unwrap();

        assert_eq!(repo.rename_tag("ghost", "x").unwrap(), 0);
        assert_eq!(repo.list_tags().unwrap(), vec!["stars".to_string()]);
    }
}
