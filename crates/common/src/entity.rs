use std::collections::HashSet;

use serde_json::Value;

use crate::change::{ChangePath, ChangeRecord};

/// Entities of a JSON list keyed by identity, in list order.
///
/// The id is the first of `id_fields` holding a non-empty string or a number.
/// Entities without any id are skipped; for duplicate ids the first
/// occurrence wins.
pub struct EntityIndex<'a> {
    entries: Vec<(String, &'a Value)>,
    ids: HashSet<String>,
}

impl<'a> EntityIndex<'a> {
    pub fn build(items: &'a [Value], id_fields: &[&str]) -> Self {
        let mut entries = Vec::new();
        let mut ids = HashSet::new();
        for item in items {
            let Some(id) = entity_id(item, id_fields) else {
                continue;
            };
            if ids.insert(id.clone()) {
                entries.push((id, item));
            }
        }
        Self { entries, ids }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Entities present here but not in `older`, in this index's order.
    pub fn added_since<'b>(
        &'b self,
        older: &'b EntityIndex<'b>,
    ) -> impl Iterator<Item = (&'b str, &'a Value)> + 'b {
        self.entries
            .iter()
            .filter(move |(id, _)| !older.contains(id))
            .map(|(id, value)| (id.as_str(), *value))
    }
}

fn entity_id(item: &Value, id_fields: &[&str]) -> Option<String> {
    id_fields.iter().find_map(|field| match item.get(*field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Which entity-level changes an extractor reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    Added,
    AddedAndRemoved,
}

/// Entity-keyed diff of one list section: additions in new order, then
/// removals (when tracked) in old order.
pub fn diff_section(
    section: &str,
    old: &[Value],
    new: &[Value],
    id_fields: &[&str],
    track: Track,
) -> Vec<ChangeRecord> {
    let old_index = EntityIndex::build(old, id_fields);
    let new_index = EntityIndex::build(new, id_fields);

    let mut changes: Vec<ChangeRecord> = new_index
        .added_since(&old_index)
        .map(|(id, value)| ChangeRecord::added(ChangePath::entity(section, id), value.clone()))
        .collect();

    if track == Track::AddedAndRemoved {
        changes.extend(
            old_index
                .added_since(&new_index)
                .map(|(id, value)| ChangeRecord::removed(ChangePath::entity(section, id), value.clone())),
        );
    }
    changes
}

/// The array at `pointer`, or an empty slice when absent or null.
/// Returns `None` when something other than an array lives there.
pub fn list_at<'a>(doc: &'a Value, pointer: &str) -> Option<&'a [Value]> {
    match doc.pointer(pointer) {
        None | Some(Value::Null) => Some(&[] as &[Value]),
        Some(Value::Array(items)) => Some(items.as_slice()),
        Some(_) => None,
    }
}
