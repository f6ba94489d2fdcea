//! Repeat expression parsing and compiled accessors.
//!
//! A repeat expression looks like `[label as] item in collection [track by key]`:
//!
//! ```text
//! expression = "address.id as address in addresses | filter: $select.search track by address.id"
//! item_alias = "address"
//! source     = "addresses | filter: $select.search"
//! track_by   = "address.id"
//! mapper     = "address.id"
//! ```
//!
//! Every sub-expression is compiled once into an [`Accessor`] so evaluation never
//! re-parses strings.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

static REPEAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:([\s\S]+?)\s+as\s+)?([\S]+?)\s+in\s+([\s\S]+?)(?:\s+track\s+by\s+([\s\S]+?))?\s*$",
    )
    .expect("repeat grammar is a valid regex")
});

/// Name under which the controller exposes itself to source expressions.
pub const SELECT_LOCAL: &str = "$select";

pub const GROUP_REPEAT_EXPRESSION: &str = "$group in $select.groups";

/// Named values visible to an accessor ahead of the scope.
pub type Locals<'a> = [(&'a str, &'a Value)];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Field(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Path {
    root: String,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Stage {
    Filter(Path),
}

/// A compiled getter: a path into the locals/scope followed by pipe stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    text: String,
    path: Path,
    stages: Vec<Stage>,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_char)
}

// split on `sep` outside of quoted bracket keys
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == sep => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            None => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn parse_path(text: &str, whole: &str) -> Result<Path> {
    let text = text.trim();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0usize;
    let read_ident = |i: &mut usize| -> Option<String> {
        if *i < chars.len() && is_ident_start(chars[*i]) {
            let start = *i;
            while *i < chars.len() && is_ident_char(chars[*i]) {
                *i += 1;
            }
            Some(chars[start..*i].iter().collect())
        } else {
            None
        }
    };

    let root = read_ident(&mut i)
        .ok_or_else(|| Error::syntax(whole, format!("expected identifier in '{text}'")))?;
    let mut steps = Vec::new();
    while i < chars.len() {
        match chars[i] {
            '.' => {
                i += 1;
                let field = read_ident(&mut i).ok_or_else(|| {
                    Error::syntax(whole, format!("expected field name after '.' in '{text}'"))
                })?;
                steps.push(Step::Field(field));
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|p| p + i)
                    .ok_or_else(|| Error::syntax(whole, format!("unclosed '[' in '{text}'")))?;
                let inner: String = chars[i + 1..close].iter().collect();
                let inner = inner.trim();
                let quoted = inner.len() >= 2
                    && ((inner.starts_with('"') && inner.ends_with('"'))
                        || (inner.starts_with('\'') && inner.ends_with('\'')));
                if quoted {
                    steps.push(Step::Field(inner[1..inner.len() - 1].to_string()));
                } else {
                    let n = inner.parse::<usize>().map_err(|_| {
                        Error::syntax(whole, format!("invalid index '[{inner}]' in '{text}'"))
                    })?;
                    steps.push(Step::Index(n));
                }
                i = close + 1;
            }
            c => {
                return Err(Error::syntax(
                    whole,
                    format!("unexpected '{c}' in '{text}'"),
                ))
            }
        }
    }
    Ok(Path { root, steps })
}

impl Path {
    fn eval(&self, scope: &Value, locals: &Locals) -> Value {
        let base = locals
            .iter()
            .find(|(name, _)| *name == self.root)
            .map(|(_, v)| *v)
            .or_else(|| scope.get(&self.root));
        let Some(mut cur) = base else {
            return Value::Null;
        };
        for step in &self.steps {
            let next = match step {
                Step::Field(f) => cur.get(f.as_str()),
                Step::Index(n) => cur.get(*n),
            };
            match next {
                Some(v) => cur = v,
                None => return Value::Null,
            }
        }
        cur.clone()
    }
}

fn needle_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn contains_text(v: &Value, needle_lower: &str) -> bool {
    match v {
        Value::String(s) => s.to_lowercase().contains(needle_lower),
        Value::Number(n) => n.to_string().contains(needle_lower),
        Value::Bool(b) => b.to_string().contains(needle_lower),
        Value::Array(a) => a.iter().any(|x| contains_text(x, needle_lower)),
        Value::Object(o) => o.values().any(|x| contains_text(x, needle_lower)),
        Value::Null => false,
    }
}

impl Accessor {
    /// Compile `path [| filter: path]*`.
    pub fn compile(text: &str) -> Result<Accessor> {
        let parts = split_top_level(text, '|');
        let path = parse_path(parts[0], text)?;
        let mut stages = Vec::new();
        for stage in &parts[1..] {
            let stage = stage.trim();
            let arg = stage
                .strip_prefix("filter")
                .map(str::trim_start)
                .and_then(|s| s.strip_prefix(':'))
                .ok_or_else(|| Error::syntax(text, format!("unknown pipe stage '{stage}'")))?;
            stages.push(Stage::Filter(parse_path(arg, text)?));
        }
        Ok(Accessor {
            text: text.trim().to_string(),
            path,
            stages,
        })
    }

    /// Accessor for a bare identifier known to be valid.
    pub(crate) fn identifier(name: &str) -> Accessor {
        Accessor {
            text: name.to_string(),
            path: Path {
                root: name.to_string(),
                steps: vec![],
            },
            stages: vec![],
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Name the path starts from.
    pub fn root(&self) -> &str {
        &self.path.root
    }

    /// Evaluate against `locals` first and `scope` second; missing paths are null.
    pub fn eval(&self, scope: &Value, locals: &Locals) -> Value {
        let mut value = self.path.eval(scope, locals);
        for stage in &self.stages {
            match stage {
                Stage::Filter(arg) => {
                    let needle = needle_text(&arg.eval(scope, locals)).to_lowercase();
                    if needle.is_empty() {
                        continue;
                    }
                    value = match value {
                        Value::Array(items) => Value::Array(
                            items
                                .into_iter()
                                .filter(|it| contains_text(it, &needle))
                                .collect(),
                        ),
                        other => other,
                    };
                }
            }
        }
        value
    }
}

/// Loose truthiness used for disable expressions.
pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parsed repeat expression. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatExpr {
    pub item_alias: String,
    pub source: Accessor,
    pub track_by: Option<Accessor>,
    pub model_mapper: Accessor,
}

impl RepeatExpr {
    pub fn parse(expression: &str) -> Result<RepeatExpr> {
        let caps = REPEAT_RE
            .captures(expression)
            .ok_or_else(|| Error::syntax(expression, "no match"))?;
        let item_alias = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        if !is_identifier(item_alias) {
            return Err(Error::syntax(
                expression,
                format!("item alias '{item_alias}' is not an identifier"),
            ));
        }
        let source = Accessor::compile(caps.get(3).map(|m| m.as_str()).unwrap_or_default())?;
        let track_by = caps
            .get(4)
            .map(|m| Accessor::compile(m.as_str()))
            .transpose()?;
        let model_mapper = match caps.get(1) {
            Some(label) => Accessor::compile(label.as_str())?,
            None => Accessor::identifier(item_alias),
        };
        Ok(RepeatExpr {
            item_alias: item_alias.to_string(),
            source,
            track_by,
            model_mapper,
        })
    }

    /// `item in items`, the expression used when nothing else is given.
    pub fn plain(item_alias: &str, source: &str) -> RepeatExpr {
        RepeatExpr {
            item_alias: item_alias.to_string(),
            source: Accessor::identifier(source),
            track_by: None,
            model_mapper: Accessor::identifier(item_alias),
        }
    }

    /// Row repeat expression for a templating collaborator.
    pub fn repeat_expression(&self, grouped: bool) -> String {
        let mut expression = format!(
            "{} in {}",
            self.item_alias,
            if grouped { "$group.items" } else { "$select.items" }
        );
        if let Some(track) = &self.track_by {
            expression.push_str(" track by ");
            expression.push_str(track.text());
        }
        expression
    }

    /// Evaluate the source collection with `$select.search` bound to `search`.
    pub fn source_value(&self, scope: &Value, search: &str) -> Value {
        let select = json!({ "search": search });
        self.source.eval(scope, &[(SELECT_LOCAL, &select)])
    }

    /// External model value for one item.
    pub fn map(&self, scope: &Value, item: &Value) -> Value {
        self.model_mapper.eval(scope, &[(self.item_alias.as_str(), item)])
    }

    pub fn track_key(&self, scope: &Value, item: &Value) -> Option<Value> {
        let track = self.track_by.as_ref()?;
        let key = track.eval(scope, &[(self.item_alias.as_str(), item)]);
        if key.is_null() {
            None
        } else {
            Some(key)
        }
    }

    /// Item identity: tracking key when both sides have one, else value equality.
    pub fn same_item(&self, scope: &Value, a: &Value, b: &Value) -> bool {
        match (self.track_key(scope, a), self.track_key(scope, b)) {
            (Some(ka), Some(kb)) => ka == kb,
            _ => a == b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_alias_source_and_optional_clauses() {
        let r = RepeatExpr::parse("address in addresses track by address.id").unwrap();
        assert_eq!(r.item_alias, "address");
        assert_eq!(r.source.text(), "addresses");
        assert_eq!(r.track_by.as_ref().map(Accessor::text), Some("address.id"));
        assert_eq!(r.model_mapper.text(), "address");

        let r = RepeatExpr::parse("  person.email as person in people  ").unwrap();
        assert_eq!(r.item_alias, "person");
        assert_eq!(r.model_mapper.text(), "person.email");
        assert!(r.track_by.is_none());
    }

    #[test]
    fn label_scenario_from_colors() {
        let r = RepeatExpr::parse("c as p in colors").unwrap();
        assert_eq!(r.item_alias, "p");
        assert_eq!(r.model_mapper.text(), "c");
        assert_eq!(r.source.root(), "colors");
    }

    #[test]
    fn rejects_malformed_expressions() {
        for bad in ["", "items", "in items", "item of items", "a b in items", "x in items.", "x in items | sort"] {
            let err = RepeatExpr::parse(bad).unwrap_err();
            assert!(matches!(err, Error::ExpressionSyntax { .. }), "{bad}");
        }
    }

    #[test]
    fn derived_repeat_expression_round_trips() {
        for src in [
            "item in items",
            "p.name as p in people track by p.id",
            "c as color in palette.colors",
        ] {
            let r = RepeatExpr::parse(src).unwrap();
            for grouped in [false, true] {
                let again = RepeatExpr::parse(&r.repeat_expression(grouped)).unwrap();
                assert_eq!(again.item_alias, r.item_alias);
                assert_eq!(
                    again.track_by.as_ref().map(Accessor::text),
                    r.track_by.as_ref().map(Accessor::text)
                );
            }
            let mapper = Accessor::compile(r.model_mapper.text()).unwrap();
            assert_eq!(mapper, r.model_mapper);
        }
        let r = RepeatExpr::parse("p in people track by p.id").unwrap();
        assert_eq!(r.repeat_expression(true), "p in $group.items track by p.id");
        assert_eq!(r.repeat_expression(false), "p in $select.items track by p.id");
        assert_eq!(GROUP_REPEAT_EXPRESSION, "$group in $select.groups");
    }

    #[test]
    fn accessor_paths_resolve_locals_then_scope() {
        let scope = json!({"p": {"name": "scope"}, "list": [{"k": "a"}, {"k": "b"}]});
        let local = json!({"name": "local"});
        let a = Accessor::compile("p.name").unwrap();
        assert_eq!(a.eval(&scope, &[("p", &local)]), json!("local"));
        assert_eq!(a.eval(&scope, &[]), json!("scope"));
        assert_eq!(Accessor::compile("list[1].k").unwrap().eval(&scope, &[]), json!("b"));
        assert_eq!(Accessor::compile("list[7].k").unwrap().eval(&scope, &[]), Value::Null);
        assert_eq!(
            Accessor::compile("p['name']").unwrap().eval(&scope, &[]),
            json!("scope")
        );
    }

    #[test]
    fn filter_stage_uses_search_text() {
        let scope = json!({"colors": [{"name": "Red"}, {"name": "Green"}, {"name": "Grey"}]});
        let r = RepeatExpr::parse("c in colors | filter: $select.search").unwrap();
        assert_eq!(r.source_value(&scope, "gr"), json!([{"name": "Green"}, {"name": "Grey"}]));
        assert_eq!(r.source_value(&scope, ""), scope["colors"]);
    }

    #[test]
    fn identity_prefers_tracking_key() {
        let r = RepeatExpr::parse("p in people track by p.id").unwrap();
        let scope = json!({});
        assert!(r.same_item(&scope, &json!({"id": 1, "v": "a"}), &json!({"id": 1, "v": "b"})));
        assert!(!r.same_item(&scope, &json!({"id": 1}), &json!({"id": 2})));
        // no key on either side: plain equality
        assert!(r.same_item(&scope, &json!("x"), &json!("x")));
    }

    #[test]
    fn truthiness() {
        assert!(!truthy(&Value::Null));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!("x")));
        assert!(truthy(&json!({})));
    }
}
