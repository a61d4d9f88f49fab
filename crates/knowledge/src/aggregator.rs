//! The knowledge aggregator: two document collections and their persistence.
//!
//! Project files are the primary source of truth for the active task; the
//! global knowledge base holds persistent reference material shared across
//! projects. Both are held in memory and mirrored to storage on mutation.

use crate::role_spec;
use cortex_core::knowledge::KnowledgeDocument;
use cortex_core::message::now_millis;
use cortex_core::persona::PersonaSet;
use cortex_core::storage::{KeyValueStore, keys};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

/// Which collection a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Project,
    Global,
}

impl Scope {
    fn storage_key(self) -> &'static str {
        match self {
            Scope::Project => keys::PROJECT_DOCS,
            Scope::Global => keys::GLOBAL_DOCS,
        }
    }
}

/// Generate a document id from the wall clock, with a process-local counter
/// so two uploads in the same millisecond never collide.
fn next_id() -> String {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    format!("{}-{}", now_millis(), SEQ.fetch_add(1, Ordering::Relaxed))
}

/// In-memory view of both document collections, backed by a key-value store.
pub struct KnowledgeBase {
    store: Arc<dyn KeyValueStore>,
    project: Vec<KnowledgeDocument>,
    global: Vec<KnowledgeDocument>,
}

impl KnowledgeBase {
    /// Open the aggregator, hydrating both collections from storage.
    ///
    /// A missing or malformed payload yields an empty collection; opening
    /// never fails.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let project = load_collection(&*store, keys::PROJECT_DOCS);
        let global = load_collection(&*store, keys::GLOBAL_DOCS);
        Self {
            store,
            project,
            global,
        }
    }

    pub fn project_docs(&self) -> &[KnowledgeDocument] {
        &self.project
    }

    pub fn global_docs(&self) -> &[KnowledgeDocument] {
        &self.global
    }

    /// Add a document to one collection and persist it.
    ///
    /// An empty or absent type tag defaults to `text/plain`. Returns the
    /// stored document, id assigned.
    pub fn add_document(
        &mut self,
        scope: Scope,
        name: &str,
        doc_type: Option<&str>,
        content: &str,
    ) -> &KnowledgeDocument {
        let doc_type = match doc_type {
            Some(t) if !t.is_empty() => t,
            _ => "text/plain",
        };
        let doc = KnowledgeDocument::new(next_id(), name, doc_type, content);
        info!(scope = ?scope, name = %doc.name, "Adding knowledge document");
        let docs = self.docs_mut(scope);
        docs.push(doc);
        self.persist(scope);
        // Just pushed, so the collection is non-empty.
        &self.docs(scope)[self.docs(scope).len() - 1]
    }

    /// Remove a document by id. Removing an absent id is a no-op.
    pub fn remove_document(&mut self, scope: Scope, id: &str) {
        let docs = self.docs_mut(scope);
        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() != before {
            self.persist(scope);
        }
    }

    /// Regenerate the role specification digest from the current persona set
    /// and place it at the front of the project files.
    ///
    /// When the rendered digest is byte-identical to the stored one this is
    /// a no-op, so repeated syncs with an unchanged persona set never churn
    /// storage. Returns whether anything changed.
    pub fn sync_role_spec(&mut self, personas: &PersonaSet) -> bool {
        let content = role_spec::render(personas);
        if let Some(existing) = self.project.iter().find(|d| d.id == role_spec::ROLE_SPEC_ID)
            && existing.content == content
        {
            return false;
        }

        let digest = KnowledgeDocument::new(
            role_spec::ROLE_SPEC_ID,
            role_spec::ROLE_SPEC_NAME,
            role_spec::ROLE_SPEC_TYPE,
            content,
        );
        self.project.retain(|d| d.id != role_spec::ROLE_SPEC_ID);
        self.project.insert(0, digest);
        self.persist(Scope::Project);
        true
    }

    fn docs(&self, scope: Scope) -> &Vec<KnowledgeDocument> {
        match scope {
            Scope::Project => &self.project,
            Scope::Global => &self.global,
        }
    }

    fn docs_mut(&mut self, scope: Scope) -> &mut Vec<KnowledgeDocument> {
        match scope {
            Scope::Project => &mut self.project,
            Scope::Global => &mut self.global,
        }
    }

    fn persist(&self, scope: Scope) {
        let docs = self.docs(scope);
        let json = match serde_json::to_string(docs) {
            Ok(j) => j,
            Err(e) => {
                warn!(scope = ?scope, error = %e, "Failed to serialize knowledge documents");
                return;
            }
        };
        if let Err(e) = self.store.set(scope.storage_key(), &json) {
            warn!(scope = ?scope, error = %e, "Failed to persist knowledge documents");
        }
    }
}

fn load_collection(store: &dyn KeyValueStore, key: &str) -> Vec<KnowledgeDocument> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(key, error = %e, "Failed to read knowledge documents");
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(docs) => docs,
        Err(e) => {
            warn!(key, error = %e, "Malformed knowledge documents, starting empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_personas::defaults;
    use cortex_storage::MemoryStore;

    fn fresh() -> (Arc<dyn KeyValueStore>, KnowledgeBase) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let kb = KnowledgeBase::open(store.clone());
        (store, kb)
    }

    #[test]
    fn add_defaults_the_type_tag() {
        let (_, mut kb) = fresh();
        kb.add_document(Scope::Project, "notes.txt", None, "hello");
        kb.add_document(Scope::Project, "spec.md", Some("text/markdown"), "# hi");
        assert_eq!(kb.project_docs()[0].doc_type, "text/plain");
        assert_eq!(kb.project_docs()[1].doc_type, "text/markdown");
    }

    #[test]
    fn generated_ids_are_unique() {
        let (_, mut kb) = fresh();
        for i in 0..50 {
            kb.add_document(Scope::Global, &format!("doc{i}"), None, "x");
        }
        let mut ids: Vec<&str> = kb.global_docs().iter().map(|d| d.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn remove_is_idempotent() {
        let (_, mut kb) = fresh();
        let id = kb
            .add_document(Scope::Global, "ref.md", None, "x")
            .id
            .clone();
        kb.remove_document(Scope::Global, &id);
        assert!(kb.global_docs().is_empty());
        kb.remove_document(Scope::Global, &id);
        kb.remove_document(Scope::Global, "never-existed");
        assert!(kb.global_docs().is_empty());
    }

    #[test]
    fn mutations_survive_reopen() {
        let (store, mut kb) = fresh();
        kb.add_document(Scope::Project, "data.csv", Some("text/csv"), "a,b");
        kb.add_document(Scope::Global, "glossary.md", None, "terms");

        let reopened = KnowledgeBase::open(store);
        assert_eq!(reopened.project_docs().len(), 1);
        assert_eq!(reopened.project_docs()[0].name, "data.csv");
        assert_eq!(reopened.global_docs().len(), 1);
    }

    #[test]
    fn malformed_stored_payload_starts_empty() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(keys::PROJECT_DOCS, "not json").unwrap();
        let kb = KnowledgeBase::open(store);
        assert!(kb.project_docs().is_empty());
    }

    #[test]
    fn sync_places_digest_at_front_and_is_idempotent() {
        let (_, mut kb) = fresh();
        kb.add_document(Scope::Project, "first.txt", None, "x");

        let personas = defaults();
        assert!(kb.sync_role_spec(&personas));
        assert_eq!(kb.project_docs()[0].id, role_spec::ROLE_SPEC_ID);
        assert_eq!(kb.project_docs()[0].name, role_spec::ROLE_SPEC_NAME);
        assert_eq!(kb.project_docs().len(), 2);

        // Same personas: no change, no duplicate.
        assert!(!kb.sync_role_spec(&personas));
        assert_eq!(kb.project_docs().len(), 2);
    }

    #[test]
    fn sync_replaces_digest_on_persona_change() {
        let (_, mut kb) = fresh();
        assert!(kb.sync_role_spec(&defaults()));
        let first = kb.project_docs()[0].content.clone();

        let changed = cortex_personas::hydrate(Some(r#"{"OPS":{"description":"Keeps it up"}}"#));
        assert!(kb.sync_role_spec(&changed));
        assert_eq!(kb.project_docs().len(), 1);
        assert_ne!(kb.project_docs()[0].content, first);
        assert!(kb.project_docs()[0].content.contains("Keeps it up"));
    }
}
