//! Version-aware ordering for release tags.
//!
//! Release tags here (`v1.2`, `v6.10.1`, occasionally four components) are
//! not strict semver, so ordering follows `sort -V` semantics: a tag is
//! split into alternating numeric and non-numeric runs, numeric runs compare
//! as integers, and a tag that is a prefix of another sorts first.

use std::cmp::Ordering;

/// A tag name carrying its version-aware sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagVersion {
    raw: String,
    runs: Vec<Run>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Run {
    Number(u64),
    Text(String),
}

impl TagVersion {
    /// Parse never fails; an arbitrary string still gets a total order.
    pub fn parse(raw: &str) -> Self {
        let mut runs = Vec::new();
        let mut rest = raw;
        while !rest.is_empty() {
            let numeric = rest.starts_with(|c: char| c.is_ascii_digit());
            let split = rest
                .find(|c: char| c.is_ascii_digit() != numeric)
                .unwrap_or(rest.len());
            let (run, tail) = rest.split_at(split);
            if numeric {
                // Absurdly long digit runs fall back to text ordering.
                match run.parse::<u64>() {
                    Ok(value) => runs.push(Run::Number(value)),
                    Err(_) => runs.push(Run::Text(run.to_string())),
                }
            } else {
                runs.push(Run::Text(run.to_string()));
            }
            rest = tail;
        }
        Self {
            raw: raw.to_string(),
            runs,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Ord for TagVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut left = self.runs.iter();
        let mut right = other.runs.iter();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return self.raw.cmp(&other.raw),
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(a), Some(b)) => match a.cmp(b) {
                    Ordering::Equal => continue,
                    ordering => return ordering,
                },
            }
        }
    }
}

impl PartialOrd for TagVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Run {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Run::Number(a), Run::Number(b)) => a.cmp(b),
            (Run::Text(a), Run::Text(b)) => a.cmp(b),
            // Letters order before digits at the same position.
            (Run::Text(_), Run::Number(_)) => Ordering::Less,
            (Run::Number(_), Run::Text(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Run {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The maximum tag under version-aware ordering, if any.
pub fn latest_tag(tags: &[String]) -> Option<&str> {
    tags.iter()
        .max_by_key(|tag| TagVersion::parse(tag))
        .map(|tag| tag.as_str())
}
