// crates/serve/src/content/relations.rs

//! Reference-field expansion.
//!
//! A relation is named `<Component>.<field>`. The content API returns the
//! referenced stories once in a top-level `rels` array; every occurrence of a
//! referenced UUID in a named field is replaced with the full story here.

use serde_json::{Map, Value as Json};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationResolver {
    fields: Vec<String>,
}

impl RelationResolver {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Parse the comma-joined request parameter form.
    pub fn parse(param: &str) -> Self {
        Self::new(
            param
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Value of the `resolve_relations` parameter, `None` when nothing is configured.
    pub fn param(&self) -> Option<String> {
        (!self.fields.is_empty()).then(|| self.fields.join(","))
    }

    /// Replace referenced UUIDs under `content` with stories from `rels`.
    ///
    /// UUIDs with no matching story are left untouched.
    pub fn inline(&self, content: &mut Json, rels: &[Json]) {
        if self.fields.is_empty() || rels.is_empty() {
            return;
        }

        let by_uuid: HashMap<&str, &Json> = rels
            .iter()
            .filter_map(|rel| Some((rel.get("uuid")?.as_str()?, rel)))
            .collect();

        let wanted: HashSet<(&str, &str)> = self
            .fields
            .iter()
            .filter_map(|f| f.split_once('.'))
            .collect();

        walk(content, &wanted, &by_uuid);
    }
}

fn walk(value: &mut Json, wanted: &HashSet<(&str, &str)>, rels: &HashMap<&str, &Json>) {
    match value {
        Json::Object(map) => {
            // Children first: inlined stories are not walked again.
            for child in map.values_mut() {
                walk(child, wanted, rels);
            }
            expand_fields(map, wanted, rels);
        }
        Json::Array(items) => {
            for item in items {
                walk(item, wanted, rels);
            }
        }
        _ => {}
    }
}

fn expand_fields(map: &mut Map<String, Json>, wanted: &HashSet<(&str, &str)>, rels: &HashMap<&str, &Json>) {
    let Some(component) = map.get("component").and_then(Json::as_str).map(str::to_string) else {
        return;
    };

    for (key, field) in map.iter_mut() {
        if !wanted.contains(&(component.as_str(), key.as_str())) {
            continue;
        }
        match field {
            Json::String(uuid) => {
                if let Some(story) = rels.get(uuid.as_str()) {
                    *field = (*story).clone();
                }
            }
            Json::Array(items) => {
                for item in items.iter_mut() {
                    let found = item.as_str().and_then(|uuid| rels.get(uuid));
                    if let Some(story) = found {
                        *item = (*story).clone();
                    }
                }
            }
            _ => {}
        }
    }
}
