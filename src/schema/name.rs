//! Qualified names for records, enums and fixed types.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A fully-qualified type name, split into namespace and simple name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    name: String,
    namespace: Option<String>,
}

impl Name {
    /// Qualify `name` against an explicit namespace attribute or the
    /// enclosing namespace.
    ///
    /// A dotted `name` is already fully qualified and ignores both. An empty
    /// namespace string means the null namespace.
    pub fn qualify(name: &str, explicit: Option<&str>, enclosing: Option<&str>) -> Self {
        if let Some((namespace, simple)) = name.rsplit_once('.') {
            return Self::with_namespace(simple, Some(namespace));
        }
        let namespace = match explicit {
            Some(ns) => Some(ns),
            None => enclosing,
        };
        Self::with_namespace(name, namespace)
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    pub fn with_namespace(name: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.filter(|ns| !ns.is_empty()).map(str::to_string),
        }
    }

    /// The simple (unqualified) name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// `namespace.name`, or just `name` in the null namespace
    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}.{}", ns, self.name),
            None => f.write_str(&self.name),
        }
    }
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"))
}

/// True for a simple name: field names, enum symbols, type names.
pub fn is_valid_identifier(s: &str) -> bool {
    identifier_re().is_match(s)
}

/// True for a dot-separated sequence of identifiers; empty is the null namespace.
pub fn is_valid_namespace(s: &str) -> bool {
    s.is_empty() || s.split('.').all(is_valid_identifier)
}
