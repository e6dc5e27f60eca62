//! History CLI commands
//!
//! Lists and inspects the entries of an audit log.

use crate::audit::{Change, LogEntry};
use crate::config::Settings;
use crate::error::{AuditError, AuditResult};
use crate::storage::LogStore;

/// Filters for the `history` command
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub model: Option<String>,
    pub pk: Option<String>,
    pub actor: Option<String>,
    pub limit: usize,
}

impl HistoryFilter {
    fn matches(&self, entry: &LogEntry) -> bool {
        self.model.as_ref().map_or(true, |m| &entry.content_type == m)
            && self.pk.as_ref().map_or(true, |pk| &entry.object_pk == pk)
            && self
                .actor
                .as_ref()
                .map_or(true, |a| entry.actor.as_ref() == Some(a))
    }
}

/// Select the entries matching `filter`, keeping the most recent `limit`
pub fn select_entries<S: LogStore>(
    store: &S,
    filter: &HistoryFilter,
) -> AuditResult<Vec<LogEntry>> {
    let mut entries: Vec<_> = store
        .entries()?
        .into_iter()
        .filter(|e| filter.matches(e))
        .collect();

    if filter.limit > 0 {
        let start = entries.len().saturating_sub(filter.limit);
        entries = entries.split_off(start);
    }
    Ok(entries)
}

/// Print the matching entries, oldest first
pub fn handle_history_command<S: LogStore>(
    store: &S,
    settings: &Settings,
    filter: &HistoryFilter,
) -> AuditResult<()> {
    let entries = select_entries(store, filter)?;

    if entries.is_empty() {
        println!("No log entries found.");
        return Ok(());
    }

    println!(
        "{:12} {:20} {:10} {:16} {:10} {}",
        "ID", "Timestamp", "Action", "Model", "PK", "Changes"
    );
    println!("{}", "-".repeat(90));

    let display = &settings.display;
    for entry in &entries {
        let changes = entry
            .changes_str(&display.colon, &display.arrow, &display.separator)
            .unwrap_or_else(|_| entry.changes.clone());

        println!(
            "{:12} {:20} {:10} {:16} {:10} {}",
            entry.id.to_string(),
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.action.to_string(),
            entry.content_type,
            entry.object_pk,
            changes
        );
    }

    println!();
    println!("{} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" });

    Ok(())
}

/// Find an entry by full or short identifier
pub fn find_entry<S: LogStore>(store: &S, identifier: &str) -> AuditResult<LogEntry> {
    let mut matches = store
        .entries()?
        .into_iter()
        .filter(|e| e.id.matches(identifier));

    match (matches.next(), matches.next()) {
        (Some(entry), None) => Ok(entry),
        (Some(_), Some(_)) => Err(AuditError::Storage(format!(
            "Identifier '{}' matches more than one entry",
            identifier
        ))),
        (None, _) => Err(AuditError::entry_not_found(identifier)),
    }
}

/// Print one entry with its per-field changes
pub fn handle_show_command<S: LogStore>(
    store: &S,
    settings: &Settings,
    identifier: &str,
) -> AuditResult<()> {
    let entry = find_entry(store, identifier)?;

    println!("Entry:    {} ({})", entry.id, entry.id.as_uuid());
    println!("When:     {}", entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Action:   {}", entry.action);
    println!("Object:   {} {} ({})", entry.content_type, entry.object_pk, entry.object_repr);
    if let Some(actor) = &entry.actor {
        println!("Actor:    {}", actor);
    }
    if let Some(addr) = &entry.remote_addr {
        println!("From:     {}", addr);
    }
    if let Some(data) = &entry.additional_data {
        println!("Data:     {}", data);
    }

    let changes = entry.changes_dict()?;
    if changes.is_empty() {
        println!("Changes:  (none)");
        return Ok(());
    }

    println!("Changes:");
    for (field, change) in &changes {
        let rendered = match change {
            Change::Field(_) => change.render(&settings.display.arrow),
            Change::Relation(_) => change.render(""),
        };
        println!("  {}{}{}", field, settings.display.colon, rendered);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_entries;
    use crate::storage::MemoryStore;

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        for entry in sample_entries() {
            store.append(entry).unwrap();
        }
        store
    }

    #[test]
    fn test_select_by_actor() {
        let filter = HistoryFilter {
            actor: Some("editor".into()),
            ..HistoryFilter::default()
        };
        let entries = select_entries(&store(), &filter).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].actor.as_deref(), Some("editor"));
    }

    #[test]
    fn test_select_by_model_and_pk() {
        let filter = HistoryFilter {
            model: Some("article".into()),
            pk: Some("1".into()),
            ..HistoryFilter::default()
        };
        assert_eq!(select_entries(&store(), &filter).unwrap().len(), 2);

        let other = HistoryFilter {
            model: Some("comment".into()),
            ..HistoryFilter::default()
        };
        assert!(select_entries(&store(), &other).unwrap().is_empty());
    }

    #[test]
    fn test_select_limit_keeps_latest() {
        let filter = HistoryFilter {
            limit: 1,
            ..HistoryFilter::default()
        };
        let entries = select_entries(&store(), &filter).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].actor.as_deref(), Some("editor"));
    }

    #[test]
    fn test_find_entry() {
        let store = store();
        let target = store.entries().unwrap()[1].clone();

        let found = find_entry(&store, &target.id.to_string()).unwrap();
        assert_eq!(found.id, target.id);

        let err = find_entry(&store, "log-zzzzzzzz").unwrap_err();
        assert!(err.is_not_found());
    }
}
