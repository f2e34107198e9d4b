//! Runtime patterns
//!
//! A runtime pattern recognizes an instance's live process in the process
//! table. It may differ from the startup command: a launcher script may exec
//! into an interpreter, in which case the pattern names the interpreter plus
//! a subset of the arguments.

use crate::error::PatternError;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;

/// One space-separated piece of a runtime pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Matched verbatim
    Literal(String),
    /// Matched as a regular expression
    Regex(String),
}

impl Fragment {
    pub fn literal(s: impl Into<String>) -> Self {
        Fragment::Literal(s.into())
    }

    pub fn regex(s: impl Into<String>) -> Self {
        Fragment::Regex(s.into())
    }

    fn to_regex_source(&self) -> String {
        match self {
            Fragment::Literal(s) => regex::escape(s),
            Fragment::Regex(s) => s.clone(),
        }
    }
}

/// Compiled runtime pattern
///
/// Fragments are joined with single spaces and matched as an unanchored
/// search against the space-joined command line of each process.
#[derive(Debug, Clone)]
pub struct RuntimePattern {
    fragments: Vec<Fragment>,
    regex: Regex,
}

impl RuntimePattern {
    pub fn new(fragments: Vec<Fragment>) -> Result<Self, PatternError> {
        if fragments.is_empty() {
            return Err(PatternError::Empty);
        }

        let source = fragments
            .iter()
            .map(Fragment::to_regex_source)
            .collect::<Vec<_>>()
            .join(" ");
        let regex = Regex::new(&source).map_err(|e| PatternError::Invalid {
            pattern: source.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self { fragments, regex })
    }

    /// Pattern matching an argument vector verbatim
    pub fn literal<I, S>(args: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(args.into_iter().map(|a| Fragment::Literal(a.into())).collect())
    }

    /// Test a full command line
    pub fn is_match(&self, cmdline: &str) -> bool {
        self.regex.is_match(cmdline)
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Compiled regular expression source
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl PartialEq for RuntimePattern {
    fn eq(&self, other: &Self) -> bool {
        self.fragments == other.fragments
    }
}

impl Eq for RuntimePattern {}

impl fmt::Display for RuntimePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RuntimePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
