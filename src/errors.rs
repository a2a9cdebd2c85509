//! Error taxonomy for inference, signature building and dispatch.
//!
//! Callers distinguish failure kinds by inspecting `TypeError::kind`; this is
//! the only externally visible protocol. All errors are raised synchronously
//! and nothing in the crate retries on failure.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Name absent from the inference environment.
    UndefinedSymbol { name: String },
    /// Two type terms cannot be made identical.
    TypeMismatch { left: String, right: String },
    /// Occurs-check failure: unifying a variable with a term containing it.
    RecursiveUnification { var: String, ty: String },
    /// Malformed declarative signature, detected at declaration time.
    SignatureError { detail: String },
    /// Instance registered before a required dependency instance exists.
    MissingDependency {
        class: String,
        dependency: String,
        ty: String,
    },
    /// Dispatch found no instance for a value's type.
    NoInstance { class: String, ty: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedSymbol { name } => {
                write!(f, "Undefined symbol: {}", name)
            }
            Self::TypeMismatch { left, right } => {
                write!(f, "Type '{}' mismatch with '{}'", left, right)
            }
            Self::RecursiveUnification { var, ty } => {
                write!(f, "Recursive unification: {} occurs in {}", var, ty)
            }
            Self::SignatureError { detail } => {
                write!(f, "Invalid type signature: {}", detail)
            }
            Self::MissingDependency {
                class,
                dependency,
                ty,
            } => {
                write!(
                    f,
                    "Missing dependency: {} requires an instance of {} for {}",
                    class, dependency, ty
                )
            }
            Self::NoInstance { class, ty } => {
                write!(f, "No instance for {} of {}", class, ty)
            }
        }
    }
}

/// A type error, optionally carrying "did you mean" suggestions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    pub kind: ErrorKind,
    pub suggestions: Vec<String>,
}

impl TypeError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }

    pub fn undefined_symbol(name: impl Into<String>, similar: Vec<String>) -> Self {
        let mut error = Self::new(ErrorKind::UndefinedSymbol { name: name.into() });
        for candidate in similar.into_iter().take(3) {
            error = error.with_suggestion(format!("Did you mean '{}'?", candidate));
        }
        error
    }

    pub fn mismatch(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            left: left.into(),
            right: right.into(),
        })
    }

    pub fn recursive(var: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(ErrorKind::RecursiveUnification {
            var: var.into(),
            ty: ty.into(),
        })
    }

    pub fn signature(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::SignatureError {
            detail: detail.into(),
        })
    }

    pub fn missing_dependency(
        class: impl Into<String>,
        dependency: impl Into<String>,
        ty: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::MissingDependency {
            class: class.into(),
            dependency: dependency.into(),
            ty: ty.into(),
        })
    }

    pub fn no_instance(class: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoInstance {
            class: class.into(),
            ty: ty.into(),
        })
    }

    /// Serialize the error kind for embedding hosts that want structured
    /// diagnostics rather than rendered strings.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.kind).unwrap_or_else(|_| format!("\"{}\"", self.kind))
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for suggestion in &self.suggestions {
            write!(f, "\n  hint: {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for TypeError {}

pub type Result<T> = std::result::Result<T, TypeError>;

/// Compute Levenshtein distance for "did you mean" suggestions.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut matrix = vec![vec![0; b_len + 1]; a_len + 1];

    for i in 0..=a_len {
        matrix[i][0] = i;
    }
    for j in 0..=b_len {
        matrix[0][j] = j;
    }

    for i in 1..=a_len {
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[a_len][b_len]
}

/// Find names within `max_distance` edits of `target`, nearest first.
pub fn find_similar_names(target: &str, candidates: &[String], max_distance: usize) -> Vec<String> {
    let mut results: Vec<(String, usize)> = candidates
        .iter()
        .map(|c| (c.clone(), levenshtein_distance(target, c)))
        .filter(|(_, dist)| *dist <= max_distance && *dist > 0)
        .collect();

    results.sort_by_key(|(_, dist)| *dist);
    results.into_iter().map(|(name, _)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_hints() {
        let err = TypeError::undefined_symbol("lenght", vec!["length".to_string()]);
        let rendered = err.to_string();
        assert!(rendered.contains("Undefined symbol: lenght"));
        assert!(rendered.contains("Did you mean 'length'?"));
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("same", "same"), 0);
    }

    #[test]
    fn test_find_similar_excludes_exact_and_far() {
        let candidates = vec![
            "pair".to_string(),
            "pear".to_string(),
            "unrelated".to_string(),
        ];
        let similar = find_similar_names("pair", &candidates, 2);
        assert_eq!(similar, vec!["pear".to_string()]);
    }

    #[test]
    fn test_kind_serializes_to_json() {
        let err = TypeError::mismatch("int", "bool");
        let json = err.to_json();
        assert!(json.contains("TypeMismatch"));
        assert!(json.contains("int"));
    }
}
