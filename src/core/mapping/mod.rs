//! Path mapping from backend documents to attribute values
//!
//! Handlers describe what to extract with an ordered table of
//! `path expression → attribute uri`. Expressions are JMESPath, compiled
//! once with the `jmespath` crate when the binding index is built and
//! evaluated against every fetched document.
//!
//! A missing path or a type mismatch evaluates to null. Integer literals in
//! an expression (indexes, slice bounds and steps) are limited to nine
//! digits.
//!
//! # Example
//!
//! ```
//! use sensorsync::core::mapping::AttributeMapping;
//! use sensorsync::domain::MappedValue;
//! use indexmap::IndexMap;
//! use serde_json::json;
//!
//! let mut table = IndexMap::new();
//! table.insert("a.b".to_string(), "urn:attr:x".to_string());
//! let mapping = AttributeMapping::compile(&table).unwrap();
//!
//! let result = mapping.apply(&json!({"a": {"b": "v"}}));
//! assert_eq!(result["urn:attr:x"], MappedValue::Scalar("v".to_string()));
//! ```

use crate::domain::{MappedValue, MappingResult, Result, SyncError};
use indexmap::IndexMap;
use jmespath::Expression;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Longest digit run accepted outside quoted text
const MAX_NUMBER_DIGITS: usize = 9;

/// A compiled path expression
#[derive(Clone)]
pub struct PathExpr {
    source: String,
    compiled: Arc<Expression<'static>>,
}

impl PathExpr {
    /// Compiles an expression
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Parse`] naming the expression and the problem.
    pub fn parse(source: &str) -> Result<Self> {
        check_numbers(source).map_err(|e| invalid(source, &e))?;
        let compiled = jmespath::compile(source).map_err(|e| invalid(source, &e))?;
        Ok(Self {
            source: source.to_string(),
            compiled: Arc::new(compiled),
        })
    }

    /// Evaluates the expression; missing paths yield `Value::Null`
    pub fn search(&self, data: &Value) -> Value {
        let found = match self.compiled.search(data) {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!(path = %self.source, error = %e, "Path evaluation failed");
                return Value::Null;
            }
        };
        serde_json::to_value(&*found).unwrap_or_else(|e| {
            tracing::debug!(path = %self.source, error = %e, "Path result is not JSON");
            Value::Null
        })
    }

    /// Expression text as configured
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn invalid(source: &str, problem: &dyn fmt::Display) -> SyncError {
    SyncError::Parse(format!("invalid path expression '{source}': {problem}"))
}

/// Rejects integer literals the evaluator cannot index or step with safely
fn check_numbers(source: &str) -> std::result::Result<(), String> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut run = 0usize;
    for (offset, c) in source.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if c.is_ascii_digit() {
            run += 1;
            if run > MAX_NUMBER_DIGITS {
                return Err(format!(
                    "number at offset {} exceeds {MAX_NUMBER_DIGITS} digits",
                    offset + 1 - run
                ));
            }
            continue;
        }
        run = 0;
        if matches!(c, '\'' | '"' | '`') {
            quote = Some(c);
        }
    }
    Ok(())
}

impl fmt::Debug for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathExpr").field(&self.source).finish()
    }
}

impl PartialEq for PathExpr {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for PathExpr {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Ordered, compiled `path → attribute uri` table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMapping {
    entries: Vec<(PathExpr, String)>,
}

impl AttributeMapping {
    /// Compiles every path of a configured mapping table
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] naming the first path that does not
    /// compile or that targets an empty attribute uri.
    pub fn compile(table: &IndexMap<String, String>) -> Result<Self> {
        let mut entries = Vec::with_capacity(table.len());
        for (path, attribute_uri) in table {
            let expr = PathExpr::parse(path)
                .map_err(|e| SyncError::Configuration(format!("attribute_mapping: {e}")))?;
            if attribute_uri.trim().is_empty() {
                return Err(SyncError::Configuration(format!(
                    "attribute_mapping: path '{path}' has an empty attribute uri"
                )));
            }
            entries.push((expr, attribute_uri.clone()));
        }
        Ok(Self { entries })
    }

    /// Number of configured paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no paths are configured
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(path, attribute uri)` pairs in configuration order
    pub fn iter(&self) -> impl Iterator<Item = (&PathExpr, &str)> {
        self.entries.iter().map(|(path, uri)| (path, uri.as_str()))
    }

    /// Maps a composite document onto attribute uris
    ///
    /// Every configured target appears in the result. When two paths target
    /// the same attribute the later one wins.
    pub fn apply(&self, data: &Value) -> MappingResult {
        let mut result = MappingResult::with_capacity(self.entries.len());
        for (path, attribute_uri) in &self.entries {
            result.insert(
                attribute_uri.clone(),
                MappedValue::from_json(path.search(data)),
            );
        }
        tracing::debug!(
            targets = result.len(),
            non_null = result.values().filter(|v| !v.is_null()).count(),
            "Mapped document onto attributes"
        );
        result
    }
}

/// Maps `data` through a compiled mapping; see [`AttributeMapping::apply`]
pub fn map_attributes(mapping: &AttributeMapping, data: &Value) -> MappingResult {
    mapping.apply(data)
}
