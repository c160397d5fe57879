//! Section paths such as `tables.basicData` or `groups[1].rows`

use crate::error::SectionError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

// `name`, `name[0][2]` or `[0]`
static SEGMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^.\[\]]*)((?:\[\d+\])*)$").unwrap()
});

static INDEX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\d+)\]").unwrap()
});

/// One navigation step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    Property(String),
    Index(usize),
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathToken::Property(name) => f.write_str(name),
            PathToken::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// A parsed section path; the empty path designates the document root
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionPath {
    tokens: Vec<PathToken>,
}

impl SectionPath {
    pub fn new(tokens: Vec<PathToken>) -> Self {
        SectionPath { tokens }
    }

    pub fn tokens(&self) -> &[PathToken] {
        &self.tokens
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl FromStr for SectionPath {
    type Err = SectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim();
        let mut tokens = Vec::new();
        if path.is_empty() {
            return Ok(SectionPath { tokens });
        }

        let invalid = || SectionError::InvalidPath {
            path: s.to_string(),
        };

        for segment in path.split('.') {
            let caps = SEGMENT_REGEX.captures(segment).ok_or_else(invalid)?;
            let name = &caps[1];
            let indexes = &caps[2];

            if name.is_empty() && indexes.is_empty() {
                return Err(invalid());
            }
            if !name.is_empty() {
                tokens.push(PathToken::Property(name.to_string()));
            }
            for index in INDEX_REGEX.captures_iter(indexes) {
                let index = index[1].parse::<usize>().map_err(|_| invalid())?;
                tokens.push(PathToken::Index(index));
            }
        }

        Ok(SectionPath { tokens })
    }
}

impl From<Vec<PathToken>> for SectionPath {
    fn from(tokens: Vec<PathToken>) -> Self {
        SectionPath::new(tokens)
    }
}

impl fmt::Display for SectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 && matches!(token, PathToken::Property(_)) {
                f.write_str(".")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(name: &str) -> PathToken {
        PathToken::Property(name.to_string())
    }

    #[test]
    fn test_parse_paths() {
        let path: SectionPath = "basicData".parse().unwrap();
        assert_eq!(path.tokens(), &[prop("basicData")]);

        let path: SectionPath = "groups[1][0].rows".parse().unwrap();
        assert_eq!(
            path.tokens(),
            &[prop("groups"), PathToken::Index(1), PathToken::Index(0), prop("rows")]
        );
        assert_eq!(path.to_string(), "groups[1][0].rows");

        let path: SectionPath = "[2]".parse().unwrap();
        assert_eq!(path.tokens(), &[PathToken::Index(2)]);

        assert!("".parse::<SectionPath>().unwrap().is_root());
    }

    #[test]
    fn test_reject_malformed_paths() {
        for bad in ["a..b", "a[x]", "a[1", "a]", "."] {
            assert!(
                matches!(bad.parse::<SectionPath>(), Err(SectionError::InvalidPath { .. })),
                "accepted {bad:?}"
            );
        }
    }
}
