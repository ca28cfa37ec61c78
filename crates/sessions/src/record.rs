use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

/// One accumulated-state entry: either a single overwrite value (e.g. a plot
/// outline) or an ordered append list (e.g. research notes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StateValue {
    Single(String),
    Many(Vec<String>),
}

impl StateValue {
    /// Flatten to one text block. Append lists join with blank lines.
    pub fn as_text(&self) -> String {
        match self {
            StateValue::Single(s) => s.clone(),
            StateValue::Many(items) => items.join("\n\n"),
        }
    }
}

/// One ongoing pipeline conversation.
///
/// Records are shared via `Arc` so that state written during one run is
/// visible to every later holder of the same session. The state map has its
/// own lock; concurrent runs against one session are last-write-wins on
/// individual keys, which the pipeline accepts by design.
#[derive(Debug)]
pub struct SessionRecord {
    id: Uuid,
    created: bool,
    state: RwLock<BTreeMap<String, StateValue>>,
}

impl SessionRecord {
    pub(crate) fn new(id: Uuid) -> Self {
        Self {
            id,
            created: true,
            state: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether this record was materialized by the cache (always true for
    /// records the cache hands out; kept for snapshot parity).
    pub fn created(&self) -> bool {
        self.created
    }

    /// Read one state entry, cloned out of the lock.
    pub fn get(&self, key: &str) -> Option<StateValue> {
        self.state.read().get(key).cloned()
    }

    /// Read one state entry flattened to text.
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.state.read().get(key).map(StateValue::as_text)
    }

    /// Overwrite a state entry.
    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.state
            .write()
            .insert(key.to_owned(), StateValue::Single(value.into()));
    }

    /// Append to a state entry, promoting an existing single value to a
    /// list.
    pub fn append(&self, key: &str, value: impl Into<String>) {
        let mut state = self.state.write();
        match state.get_mut(key) {
            Some(StateValue::Many(items)) => items.push(value.into()),
            Some(StateValue::Single(existing)) => {
                let promoted = StateValue::Many(vec![existing.clone(), value.into()]);
                state.insert(key.to_owned(), promoted);
            }
            None => {
                state.insert(key.to_owned(), StateValue::Many(vec![value.into()]));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }

    /// Clone the full state map, e.g. for a persistence snapshot.
    pub fn snapshot(&self) -> BTreeMap<String, StateValue> {
        self.state.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_starts_empty_and_created() {
        let record = SessionRecord::new(Uuid::new_v4());
        assert!(record.is_empty());
        assert!(record.created());
    }

    #[test]
    fn set_overwrites() {
        let record = SessionRecord::new(Uuid::new_v4());
        record.set("plot_outline", "draft one");
        record.set("plot_outline", "draft two");
        assert_eq!(record.get_text("plot_outline").as_deref(), Some("draft two"));
    }

    #[test]
    fn append_accumulates_in_order() {
        let record = SessionRecord::new(Uuid::new_v4());
        record.append("notes", "born 1815");
        record.append("notes", "first program 1843");
        assert_eq!(
            record.get("notes"),
            Some(StateValue::Many(vec![
                "born 1815".into(),
                "first program 1843".into()
            ]))
        );
        assert_eq!(
            record.get_text("notes").unwrap(),
            "born 1815\n\nfirst program 1843"
        );
    }

    #[test]
    fn append_promotes_single_value() {
        let record = SessionRecord::new(Uuid::new_v4());
        record.set("notes", "one");
        record.append("notes", "two");
        assert_eq!(
            record.get("notes"),
            Some(StateValue::Many(vec!["one".into(), "two".into()]))
        );
    }

    #[test]
    fn snapshot_serializes_mixed_values() {
        let record = SessionRecord::new(Uuid::new_v4());
        record.set("plot_outline", "outline");
        record.append("notes", "a");
        record.append("notes", "b");

        let json = serde_json::to_value(record.snapshot()).unwrap();
        assert_eq!(json["plot_outline"], "outline");
        assert_eq!(json["notes"], serde_json::json!(["a", "b"]));
    }
}
