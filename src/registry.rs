use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// How items are bucketed into groups.
#[derive(Clone)]
pub enum GroupBy {
    /// Group name is the value of this field on each item.
    Field(String),
    /// Group name is computed by a closure.
    Func(Arc<dyn Fn(&Value) -> String + Send + Sync>),
}

impl fmt::Debug for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::Field(name) => f.debug_tuple("Field").field(name).finish(),
            GroupBy::Func(_) => f.write_str("Func(..)"),
        }
    }
}

impl GroupBy {
    pub fn func(f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        GroupBy::Func(Arc::new(f))
    }

    pub fn group_name(&self, item: &Value) -> String {
        match self {
            GroupBy::Field(field) => match item.get(field.as_str()) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            },
            GroupBy::Func(f) => f(item),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub items: Vec<Value>,
}

/// Candidate items and their optional grouping. Rebuilt wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    items: Vec<Value>,
    groups: Option<Vec<Group>>,
}

/// Turn an evaluated source into a list: absent is empty, non-arrays are rejected.
pub fn resolve_source(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items),
        other => Err(Error::invalid_source(&other)),
    }
}

impl Registry {
    /// Rebuild from `raw`, dropping anything `same` matches in `excluded` and
    /// grouping by first-seen group name when `group_by` is set.
    pub fn rebuild<F>(raw: &[Value], excluded: &[Value], same: F, group_by: Option<&GroupBy>) -> Registry
    where
        F: Fn(&Value, &Value) -> bool,
    {
        let candidates = raw
            .iter()
            .filter(|it| !excluded.iter().any(|sel| same(*it, sel)))
            .cloned();

        let Some(group_by) = group_by else {
            return Registry {
                items: candidates.collect(),
                groups: None,
            };
        };

        let mut groups: Vec<Group> = Vec::new();
        for item in candidates {
            let name = group_by.group_name(&item);
            match groups.iter_mut().find(|g| g.name == name) {
                Some(group) => group.items.push(item),
                None => groups.push(Group {
                    name,
                    items: vec![item],
                }),
            }
        }
        let items = groups.iter().flat_map(|g| g.items.iter().cloned()).collect();
        Registry {
            items,
            groups: Some(groups),
        }
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn groups(&self) -> Option<&[Group]> {
        self.groups.as_deref()
    }

    pub fn is_grouped(&self) -> bool {
        self.groups.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find_group(&self, name: &str) -> Option<&Group> {
        self.groups.as_ref()?.iter().find(|g| g.name == name)
    }

    pub fn position<F>(&self, item: &Value, same: F) -> Option<usize>
    where
        F: Fn(&Value, &Value) -> bool,
    {
        self.items.iter().position(|it| same(it, item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eq(a: &Value, b: &Value) -> bool {
        a == b
    }

    fn people() -> Vec<Value> {
        vec![
            json!({"name": "Adam", "country": "US"}),
            json!({"name": "Amalie", "country": "AR"}),
            json!({"name": "Estefania", "country": "AR"}),
            json!({"name": "Adrian", "country": "US"}),
            json!({"name": "Wladimir", "country": "RU"}),
        ]
    }

    #[test]
    fn plain_rebuild_keeps_source_order() {
        let r = Registry::rebuild(&people(), &[], eq, None);
        assert_eq!(r.items(), people().as_slice());
        assert!(r.groups().is_none());
        assert!(!r.is_grouped());
    }

    #[test]
    fn excluded_items_are_removed_preserving_order() {
        let all = people();
        let r = Registry::rebuild(&all, &[all[1].clone(), all[3].clone()], eq, None);
        let names: Vec<&str> = r.items().iter().filter_map(|p| p["name"].as_str()).collect();
        assert_eq!(names, ["Adam", "Estefania", "Wladimir"]);
        for sel in [&all[1], &all[3]] {
            assert!(!r.items().contains(sel));
        }
    }

    #[test]
    fn groups_follow_first_seen_order_and_flatten_to_items() {
        let r = Registry::rebuild(&people(), &[], eq, Some(&GroupBy::Field("country".into())));
        let groups = r.groups().unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["US", "AR", "RU"]);
        let flat: Vec<Value> = groups.iter().flat_map(|g| g.items.clone()).collect();
        assert_eq!(flat, r.items());
        let order: Vec<&str> = r.items().iter().filter_map(|p| p["name"].as_str()).collect();
        assert_eq!(order, ["Adam", "Adrian", "Amalie", "Estefania", "Wladimir"]);
        assert_eq!(r.find_group("AR").map(|g| g.items.len()), Some(2));
        assert!(r.find_group("FR").is_none());
    }

    #[test]
    fn group_function_and_missing_fields() {
        let by_initial = GroupBy::func(|v| {
            v["name"].as_str().and_then(|s| s.chars().next()).map(String::from).unwrap_or_default()
        });
        let r = Registry::rebuild(&people(), &[], eq, Some(&by_initial));
        let names: Vec<&str> = r.groups().unwrap().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["A", "E", "W"]);

        let r = Registry::rebuild(&[json!({"x": 1}), json!({"g": 2})], &[], eq, Some(&GroupBy::Field("g".into())));
        let names: Vec<&str> = r.groups().unwrap().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["", "2"]);
    }

    #[test]
    fn source_resolution() {
        assert!(resolve_source(Value::Null).unwrap().is_empty());
        assert_eq!(resolve_source(json!([1, 2])).unwrap(), vec![json!(1), json!(2)]);
        assert!(matches!(resolve_source(json!("nope")), Err(Error::InvalidSource { .. })));
        assert!(matches!(resolve_source(json!({"a": 1})), Err(Error::InvalidSource { .. })));
    }

    #[test]
    fn empty_source_yields_empty_groups() {
        let r = Registry::rebuild(&[], &[], eq, Some(&GroupBy::Field("country".into())));
        assert!(r.is_empty());
        assert_eq!(r.groups().map(<[Group]>::len), Some(0));
    }
}
