//! Query-by-Example: build a filter from a partially populated probe entity.
//!
//! # Responsibility
//! - Let entities describe which of their fields take part in matching.
//! - Compile a probe plus matcher rules into a SQL predicate with binds.
//!
//! # Invariants
//! - Only columns declared by the entity's `Probe` impl reach SQL; probe
//!   values are always bound, never interpolated.
//! - Absent optional fields do not constrain the result.
//! - A probe with no remaining fields matches every row.

use rusqlite::types::Value;
use std::collections::BTreeSet;

/// How text fields are compared against the probe value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StringMatcher {
    #[default]
    Exact,
    StartsWith,
    EndsWith,
    Contains,
}

/// Whether all or any probe fields must match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    #[default]
    All,
    Any,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExampleMatcher {
    mode: MatchMode,
    ignored_paths: BTreeSet<String>,
    string_matcher: StringMatcher,
    ignore_case: bool,
}

impl ExampleMatcher {
    pub fn matching() -> Self {
        Self::default()
    }

    pub fn matching_any() -> Self {
        Self {
            mode: MatchMode::Any,
            ..Self::default()
        }
    }

    pub fn with_ignore_paths(mut self, paths: &[&str]) -> Self {
        self.ignored_paths
            .extend(paths.iter().map(|path| (*path).to_string()));
        self
    }

    pub fn with_string_matcher(mut self, string_matcher: StringMatcher) -> Self {
        self.string_matcher = string_matcher;
        self
    }

    pub fn with_ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.ignored_paths.contains(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeValue {
    Text(String),
    Integer(i64),
}

/// One matchable field of a probe: property path, SQL column and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeField {
    pub path: &'static str,
    pub column: &'static str,
    pub value: ProbeValue,
}

impl ProbeField {
    pub fn text(path: &'static str, column: &'static str, value: impl Into<String>) -> Self {
        Self {
            path,
            column,
            value: ProbeValue::Text(value.into()),
        }
    }

    pub fn integer(path: &'static str, column: &'static str, value: i64) -> Self {
        Self {
            path,
            column,
            value: ProbeValue::Integer(value),
        }
    }
}

/// Implemented by entities that can act as an example probe.
pub trait Probe {
    /// Lists populated fields. Optional fields that are `None` are left out.
    fn probe_fields(&self) -> Vec<ProbeField>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example<T> {
    probe: T,
    matcher: ExampleMatcher,
}

/// SQL predicate compiled from an example.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleClause {
    pub sql: String,
    pub bind_values: Vec<Value>,
    /// Property paths that produced a predicate, in probe order.
    pub paths: Vec<&'static str>,
}

impl ExampleClause {
    /// Whether any predicate constrains a property under `association`,
    /// e.g. `team` for `team.name`.
    pub fn constrains_association(&self, association: &str) -> bool {
        self.paths.iter().any(|path| {
            path.strip_prefix(association)
                .is_some_and(|rest| rest.starts_with('.'))
        })
    }
}

impl<T> Example<T> {
    pub fn new(probe: T) -> Self {
        Self::of(probe, ExampleMatcher::matching())
    }

    pub fn of(probe: T, matcher: ExampleMatcher) -> Self {
        Self { probe, matcher }
    }

    pub fn probe(&self) -> &T {
        &self.probe
    }

    pub fn matcher(&self) -> &ExampleMatcher {
        &self.matcher
    }
}

impl<T: Probe> Example<T> {
    pub fn to_clause(&self) -> ExampleClause {
        let mut predicates = Vec::new();
        let mut bind_values = Vec::new();
        let mut paths = Vec::new();

        for field in self.probe.probe_fields() {
            if self.matcher.is_ignored(field.path) {
                continue;
            }
            match field.value {
                ProbeValue::Integer(value) => {
                    predicates.push(format!("{} = ?", field.column));
                    bind_values.push(Value::Integer(value));
                    paths.push(field.path);
                }
                ProbeValue::Text(value) => {
                    // An empty partial-match value would match everything.
                    if value.is_empty() && self.matcher.string_matcher != StringMatcher::Exact {
                        continue;
                    }
                    predicates.push(self.text_predicate(field.column));
                    if self.matcher.string_matcher == StringMatcher::EndsWith {
                        bind_values.push(Value::Text(value.clone()));
                    }
                    bind_values.push(Value::Text(value));
                    paths.push(field.path);
                }
            }
        }

        let sql = if predicates.is_empty() {
            "1 = 1".to_string()
        } else {
            let joiner = match self.matcher.mode {
                MatchMode::All => " AND ",
                MatchMode::Any => " OR ",
            };
            format!("({})", predicates.join(joiner))
        };

        ExampleClause {
            sql,
            bind_values,
            paths,
        }
    }

    fn text_predicate(&self, column: &str) -> String {
        let (column, param) = if self.matcher.ignore_case {
            (format!("LOWER({column})"), "LOWER(?)")
        } else {
            (column.to_string(), "?")
        };
        match self.matcher.string_matcher {
            StringMatcher::Exact => format!("{column} = {param}"),
            StringMatcher::StartsWith => format!("instr({column}, {param}) = 1"),
            StringMatcher::Contains => format!("instr({column}, {param}) > 0"),
            StringMatcher::EndsWith => {
                format!("substr({column}, -length({param})) = {param}")
            }
        }
    }
}
