//! Path pattern matching.
//!
//! # Responsibilities
//! - Parse `/literal/:param` patterns at registration time
//! - Match request paths segment by segment, extracting named parameters
//! - Rank overlapping patterns deterministically
//!
//! # Design Decisions
//! - Matching is case-sensitive
//! - A parameter matches exactly one non-empty segment
//! - No regex, no wildcards

use std::cmp::Ordering;
use std::fmt;

use crate::actions::PathParams;
use crate::routing::RouteError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

impl Segment {
    /// Literal segments outrank parameters.
    fn rank(&self) -> u8 {
        match self {
            Segment::Literal(_) => 1,
            Segment::Param(_) => 0,
        }
    }
}

/// A compiled route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let rest = pattern
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;

        let mut segments = Vec::new();
        if !rest.is_empty() {
            for raw in rest.split('/') {
                if raw.is_empty() {
                    return Err(invalid("empty segment"));
                }
                let segment = match raw.strip_prefix(':') {
                    Some("") => return Err(invalid("parameter without a name")),
                    Some(name) => {
                        let taken = segments
                            .iter()
                            .any(|s| matches!(s, Segment::Param(existing) if existing == name));
                        if taken {
                            return Err(invalid("repeated parameter name"));
                        }
                        Segment::Param(name.to_string())
                    }
                    None => Segment::Literal(raw.to_string()),
                };
                segments.push(segment);
            }
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match `path`, returning the extracted parameters.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let rest = path.strip_prefix('/')?;
        let mut parts = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };
        // Tolerate one trailing slash.
        if parts.last() == Some(&"") {
            parts.pop();
        }
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Param(name) if !part.is_empty() => params.push(name.as_str(), part),
                _ => return None,
            }
        }
        Some(params)
    }

    /// Whether two patterns match exactly the same set of paths.
    pub fn same_shape(&self, other: &Pattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    (Segment::Param(_), Segment::Param(_)) => true,
                    _ => false,
                })
    }

    /// Order by specificity: compare segment kinds left to right.
    pub fn specificity(&self, other: &Pattern) -> Ordering {
        let ours = self.segments.iter().map(Segment::rank);
        let theirs = other.segments.iter().map(Segment::rank);
        ours.cmp(theirs)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
