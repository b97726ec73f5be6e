//! Route pattern compiler.
//!
//! Turns pattern text such as `/articles/{rid:^[0-9]{5,6}}/*` into a
//! [`CompiledPattern`]: an ordered list of [`Segment`]s the route table can
//! insert and match.
//!
//! # Syntax
//!
//! | segment | meaning |
//! |---|---|
//! | `users` | literal, compared byte for byte |
//! | `{id}` | parameter, matches any single segment |
//! | `{id:[0-9]+}` | parameter with a regex that must match the whole segment |
//! | `*` | wildcard, matches the rest of the path (possibly nothing), bound as `*` |
//!
//! Empty segments are insignificant, so `/a/b`, `/a/b/` and `/a//b` are the
//! same pattern. Regexes may contain `/` and braces; splitting only happens
//! outside of `{...}`.

use percent_encoding::percent_decode_str;
use regex::Regex;
use std::{fmt, str::FromStr};
use trellis_core::CompileError;

/// Name under which a wildcard binds the remaining path.
pub const WILDCARD_PARAM: &str = "*";

/// A regex constraint on a parameter segment.
///
/// Two constraints are equal when their source text is equal.
#[derive(Debug, Clone)]
pub struct Constraint {
    source: String,
    regex: Regex,
}

impl Constraint {
    fn new(source: &str) -> Result<Self, regex::Error> {
        let trimmed = source.strip_prefix('^').unwrap_or(source);
        let trimmed = trimmed.strip_suffix('$').unwrap_or(trimmed);
        let regex = Regex::new(&format!("^(?:{trimmed})$"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The regex text as written in the pattern.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True when `value` satisfies the constraint in full.
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Constraint {}

/// A named parameter segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSegment {
    name: String,
    constraint: Option<Constraint>,
}

impl ParamSegment {
    /// The parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The regex constraint, if any.
    pub fn constraint(&self) -> Option<&Constraint> {
        self.constraint.as_ref()
    }

    /// True when `value` may be bound to this parameter.
    pub fn accepts(&self, value: &str) -> bool {
        self.constraint.as_ref().is_none_or(|c| c.is_match(value))
    }
}

/// One `/`-delimited component of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches exactly this text.
    Literal(String),
    /// Binds one path segment to a name.
    Param(ParamSegment),
    /// Binds the rest of the path. Always last.
    Wildcard,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => f.write_str(text),
            Segment::Param(ParamSegment {
                name,
                constraint: None,
            }) => write!(f, "{{{name}}}"),
            Segment::Param(ParamSegment {
                name,
                constraint: Some(c),
            }) => write!(f, "{{{name}:{}}}", c.as_str()),
            Segment::Wildcard => f.write_str(WILDCARD_PARAM),
        }
    }
}

/// A parsed route pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledPattern {
    segments: Vec<Segment>,
}

impl CompiledPattern {
    /// The segments, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True for `/`.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when the pattern ends in `*`.
    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard))
    }

    /// Names this pattern binds, in declaration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(param) => Some(param.name()),
            Segment::Wildcard => Some(WILDCARD_PARAM),
            Segment::Literal(_) => None,
        })
    }

    /// True when the leading segments of `path` satisfy this pattern.
    ///
    /// Parameter constraints are checked against the percent-decoded
    /// segment, as in route lookup.
    pub fn matches_prefix(&self, path: &str) -> bool {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        for segment in &self.segments {
            let matched = match (segment, segments.next()) {
                (Segment::Wildcard, _) => return true,
                (_, None) => false,
                (Segment::Literal(text), Some(actual)) => text == actual,
                (Segment::Param(param), Some(actual)) => param.accepts(&decode(actual)),
            };
            if !matched {
                return false;
            }
        }
        true
    }

    /// Prefix `self` onto `pattern`, as a mount does.
    pub fn join(&self, pattern: &CompiledPattern) -> Result<CompiledPattern, CompileError> {
        let joined = CompiledPattern {
            segments: self
                .segments
                .iter()
                .chain(pattern.segments.iter())
                .cloned()
                .collect(),
        };
        joined.validate()?;
        Ok(joined)
    }

    fn validate(&self) -> Result<(), CompileError> {
        let pattern = self.to_string();

        let wildcards = self
            .segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Wildcard))
            .count();
        if wildcards > 1 {
            return Err(CompileError::MultipleWildcards { pattern });
        }
        if wildcards == 1 && !self.has_wildcard() {
            return Err(CompileError::WildcardNotLast { pattern });
        }

        let mut seen: Vec<&str> = Vec::new();
        for name in self.param_names() {
            if seen.contains(&name) {
                return Err(CompileError::DuplicateParamName {
                    pattern,
                    name: name.to_string(),
                });
            }
            seen.push(name);
        }

        Ok(())
    }
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for CompiledPattern {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        compile(s)
    }
}

/// Percent-decode one path segment, keeping it as is when the result is
/// not UTF-8.
pub(crate) fn decode(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Compile pattern text.
///
/// Pure: compiling the same text twice yields equal patterns.
pub fn compile(pattern: &str) -> Result<CompiledPattern, CompileError> {
    if !pattern.starts_with('/') {
        return Err(CompileError::MissingLeadingSlash {
            pattern: pattern.to_string(),
        });
    }

    let segments = split_segments(pattern)?
        .into_iter()
        .map(|raw| parse_segment(pattern, raw))
        .collect::<Result<Vec<_>, _>>()?;

    let compiled = CompiledPattern { segments };
    compiled.validate().map_err(|err| with_source_text(err, pattern))?;
    Ok(compiled)
}

/// Split on `/` outside of braces, dropping empty segments.
fn split_segments(pattern: &str) -> Result<Vec<&str>, CompileError> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, ch) in pattern.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1).ok_or_else(|| malformed(pattern, &pattern[start..]))?;
            }
            '/' if depth == 0 => {
                if i > start {
                    segments.push(&pattern[start..i]);
                }
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(malformed(pattern, &pattern[start..]));
    }
    if start < pattern.len() {
        segments.push(&pattern[start..]);
    }
    Ok(segments)
}

fn parse_segment(pattern: &str, raw: &str) -> Result<Segment, CompileError> {
    if raw == WILDCARD_PARAM {
        return Ok(Segment::Wildcard);
    }

    let Some(inner) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
        if raw.contains(['{', '}']) {
            return Err(malformed(pattern, raw));
        }
        return Ok(Segment::Literal(raw.to_string()));
    };

    let (name, regex) = match inner.split_once(':') {
        Some((name, regex)) => (name, Some(regex)),
        None => (inner, None),
    };
    if name.is_empty() {
        return Err(CompileError::EmptyParamName {
            pattern: pattern.to_string(),
        });
    }
    if name.contains(['{', '}']) {
        return Err(malformed(pattern, raw));
    }

    let constraint = match regex.filter(|r| !r.is_empty()) {
        Some(source) => Some(Constraint::new(source).map_err(|err| {
            CompileError::InvalidRegex {
                pattern: pattern.to_string(),
                name: name.to_string(),
                reason: err.to_string(),
            }
        })?),
        None => None,
    };

    Ok(Segment::Param(ParamSegment {
        name: name.to_string(),
        constraint,
    }))
}

fn malformed(pattern: &str, segment: &str) -> CompileError {
    CompileError::MalformedParam {
        pattern: pattern.to_string(),
        segment: segment.to_string(),
    }
}

// Report structural errors against the text the caller wrote, not the
// canonical rendering.
fn with_source_text(err: CompileError, source: &str) -> CompileError {
    let pattern = source.to_string();
    match err {
        CompileError::MultipleWildcards { .. } => CompileError::MultipleWildcards { pattern },
        CompileError::WildcardNotLast { .. } => CompileError::WildcardNotLast { pattern },
        CompileError::DuplicateParamName { name, .. } => {
            CompileError::DuplicateParamName { pattern, name }
        }
        other => other,
    }
}
