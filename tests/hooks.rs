//! End-to-end tests of the audit hooks against the file-backed store

use std::collections::HashMap;

use serde::Serialize;
use tempfile::TempDir;

use auditlog::audit::{
    context, Action, AuditContext, Auditlog, Change, M2mAction, M2mOperation, ModelEvent,
    ModelOptions,
};
use auditlog::models::{Auditable, ObjectPk};
use auditlog::storage::{JsonlStore, LogStore};

#[derive(Debug, Clone, Serialize)]
struct Book {
    id: Option<i64>,
    title: String,
    price_cents: i64,
    #[serde(skip)]
    authors: Vec<i64>,
}

impl Auditable for Book {
    const MODEL_NAME: &'static str = "book";

    fn pk(&self) -> Option<ObjectPk> {
        self.id.map(ObjectPk::Int)
    }

    fn object_repr(&self) -> String {
        self.title.clone()
    }

    fn related_keys(&self, field: &str) -> Vec<ObjectPk> {
        match field {
            "authors" => self.authors.iter().copied().map(ObjectPk::Int).collect(),
            _ => Vec::new(),
        }
    }
}

/// A tiny stand-in for the host's table of books
#[derive(Default)]
struct Shelf {
    rows: HashMap<ObjectPk, Book>,
    next_id: i64,
}

impl Shelf {
    fn save(&mut self, auditlog: &Auditlog<JsonlStore>, book: &mut Book) {
        let created = book.id.is_none();
        if created {
            self.next_id += 1;
            book.id = Some(self.next_id);
        } else {
            auditlog
                .dispatch(ModelEvent::PreSave {
                    instance: &*book,
                    lookup: &self.rows,
                })
                .unwrap();
        }

        self.rows.insert(book.pk().unwrap(), book.clone());
        auditlog
            .dispatch(ModelEvent::PostSave {
                instance: &*book,
                created,
            })
            .unwrap();
    }

    fn delete(&mut self, auditlog: &Auditlog<JsonlStore>, book: &Book) {
        self.rows.remove(&book.pk().unwrap());
        auditlog
            .dispatch(ModelEvent::PostDelete { instance: book })
            .unwrap();
    }
}

fn setup() -> (Auditlog<JsonlStore>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonlStore::new(temp_dir.path().join("audit.log"));
    let mut auditlog = Auditlog::new(store);
    auditlog.register::<Book>(
        ModelOptions::new()
            .map_field("price_cents", "Price (cents)")
            .m2m_field("authors", "book_authors"),
    );
    (auditlog, temp_dir)
}

fn book(title: &str, price_cents: i64) -> Book {
    Book {
        id: None,
        title: title.to_string(),
        price_cents,
        authors: Vec::new(),
    }
}

#[test]
fn full_lifecycle_is_recorded_in_order() {
    let (auditlog, _temp) = setup();
    let mut shelf = Shelf::default();
    let _guard = context::enter(
        AuditContext::new()
            .with_actor("librarian")
            .with_remote_addr("192.0.2.10"),
    );

    let mut dune = book("Dune", 999);
    shelf.save(&auditlog, &mut dune);

    dune.price_cents = 1299;
    shelf.save(&auditlog, &mut dune);

    // saving again without changes must not add an entry
    shelf.save(&auditlog, &mut dune);

    shelf.delete(&auditlog, &dune);

    let entries = auditlog
        .store()
        .get_for_object("book", &ObjectPk::Int(1))
        .unwrap();
    let actions: Vec<_> = entries.iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![Action::Create, Action::Update, Action::Delete]);

    assert!(entries.iter().all(|e| e.actor.as_deref() == Some("librarian")));
    assert!(entries
        .iter()
        .all(|e| e.remote_addr.as_deref() == Some("192.0.2.10")));
    assert_eq!(entries[0].object_repr, "Dune");
    assert_eq!(entries[1].changes, r#"{"price_cents":[999,1299]}"#);
}

#[test]
fn update_renders_with_display_names() {
    let (auditlog, _temp) = setup();
    let mut shelf = Shelf::default();

    let mut emma = book("Emma", 500);
    shelf.save(&auditlog, &mut emma);
    emma.price_cents = 450;
    shelf.save(&auditlog, &mut emma);

    let update = auditlog.store().recent(1).unwrap().remove(0);
    let display = update.changes_display_dict(auditlog.registry()).unwrap();
    assert_eq!(display.render(": ", " → ", "; "), "Price (cents): 500 → 450");
}

#[test]
fn relation_changes_follow_the_clear_protocol() {
    let (auditlog, _temp) = setup();
    let mut shelf = Shelf::default();

    let mut omens = book("Good Omens", 1500);
    shelf.save(&auditlog, &mut omens);

    let added = [ObjectPk::Int(11), ObjectPk::Int(12)];
    for action in [M2mAction::PreAdd, M2mAction::PostAdd] {
        auditlog
            .dispatch(ModelEvent::M2mChanged {
                instance: &omens,
                through: "book_authors",
                action,
                pk_set: &added,
            })
            .unwrap();
    }
    omens.authors = vec![11, 12];

    for action in [M2mAction::PreClear, M2mAction::PostClear] {
        auditlog
            .dispatch(ModelEvent::M2mChanged {
                instance: &omens,
                through: "book_authors",
                action,
                pk_set: &[],
            })
            .unwrap();
        omens.authors.clear();
    }

    let m2m: Vec<_> = auditlog
        .store()
        .entries()
        .unwrap()
        .into_iter()
        .filter(|e| e.action == Action::M2mChange)
        .collect();
    assert_eq!(m2m.len(), 2);

    let operations: Vec<_> = m2m
        .iter()
        .map(|e| match e.changes_dict().unwrap().get("authors") {
            Some(Change::Relation(rel)) => (rel.operation(), rel.keys().to_vec()),
            other => panic!("expected relation change, got {:?}", other),
        })
        .collect();
    assert_eq!(
        operations,
        vec![
            (M2mOperation::Add, added.to_vec()),
            (M2mOperation::Clear, added.to_vec()),
        ]
    );
}

#[test]
fn unregistering_stops_recording() {
    let (mut auditlog, _temp) = setup();
    let mut shelf = Shelf::default();

    let mut first = book("First", 100);
    shelf.save(&auditlog, &mut first);
    assert!(auditlog.unregister::<Book>());

    let mut second = book("Second", 200);
    shelf.save(&auditlog, &mut second);

    assert_eq!(auditlog.store().entry_count().unwrap(), 1);
}

#[test]
fn entries_survive_reopening_the_log() {
    let (auditlog, temp) = setup();
    let mut shelf = Shelf::default();
    let mut book = book("Persisted", 100);
    shelf.save(&auditlog, &mut book);

    let reopened = JsonlStore::new(temp.path().join("audit.log"));
    let entries = reopened.get_for_model("book").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0], auditlog.store().entries().unwrap()[0]);
}
