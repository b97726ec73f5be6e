//! Route table: one segment trie per HTTP method.
//!
//! # Overview
//!
//! Each node has up to three kinds of children, tried in specificity order
//! during lookup:
//!
//! 1. literal children, keyed by segment text,
//! 2. parameter children, regex-constrained ones before plain ones,
//! 3. at most one wildcard child.
//!
//! Lookup is a depth-first descent in that order with backtracking, driven by
//! an explicit stack so deep paths never grow the call stack. The first
//! complete match wins.
//!
//! # Conflicts
//!
//! Insertion rejects, at build time:
//!
//! - two parameters with different names at the same position
//!   ([`InsertError::ConflictingParamNames`]),
//! - a second registration of the same method and pattern
//!   ([`InsertError::DuplicateRoute`]).
//!
//! # Example
//!
//! ```rust
//! use trellis_std::{pattern::compile, tree::{Lookup, RouteTable}};
//! use http::Method;
//!
//! let mut table = RouteTable::new();
//! table.insert(Method::GET, compile("/user/{user_id}").unwrap(), "profile").unwrap();
//! table.insert(Method::GET, compile("/user/all-products").unwrap(), "products").unwrap();
//!
//! match table.lookup(&Method::GET, "/user/all-products") {
//!     Lookup::Found { value, params } => {
//!         assert_eq!(*value, "products");
//!         assert!(params.is_empty());
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

use crate::pattern::{
    CompiledPattern, Constraint, ParamSegment, Segment, WILDCARD_PARAM, decode,
};
use http::Method;
use std::collections::HashMap;
use trellis_core::{InsertError, Params};

/// Outcome of a route table lookup.
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<'a, V> {
    /// A route matched the method and path.
    Found {
        /// The registered value.
        value: &'a V,
        /// Bound parameters in declaration order.
        params: Params,
    },
    /// The path matches under other methods only.
    MethodNotAllowed {
        /// Methods that would have matched, sorted.
        allowed: Vec<Method>,
    },
    /// Nothing matches the path.
    NotFound,
}

impl<'a, V> Lookup<'a, V> {
    /// Returns true if a route was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found { .. })
    }

    /// Returns the matched value, if any.
    pub fn found(self) -> Option<&'a V> {
        match self {
            Lookup::Found { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Project the matched value, keeping the outcome.
    pub fn map<U>(self, f: impl FnOnce(&'a V) -> &'a U) -> Lookup<'a, U> {
        match self {
            Lookup::Found { value, params } => Lookup::Found {
                value: f(value),
                params,
            },
            Lookup::MethodNotAllowed { allowed } => Lookup::MethodNotAllowed { allowed },
            Lookup::NotFound => Lookup::NotFound,
        }
    }
}

/// A node in the segment trie.
#[derive(Debug)]
struct Node {
    literals: HashMap<String, Node>,
    /// Constrained parameters first, then at most one unconstrained.
    params: Vec<ParamChild>,
    wildcard: Option<Box<Node>>,
    /// Index into `RouteTable::entries`.
    entry: Option<usize>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            literals: HashMap::new(),
            params: Vec::new(),
            wildcard: None,
            entry: None,
        }
    }
}

#[derive(Debug)]
struct ParamChild {
    name: String,
    constraint: Option<Constraint>,
    node: Node,
}

impl Node {
    fn param_child(
        &mut self,
        param: &ParamSegment,
        pattern: &CompiledPattern,
    ) -> Result<&mut Node, InsertError> {
        if let Some(existing) = self.params.iter().find(|p| p.name != param.name()) {
            return Err(InsertError::ConflictingParamNames {
                pattern: pattern.to_string(),
                existing: existing.name.clone(),
                conflicting: param.name().to_string(),
            });
        }

        let constraint = param.constraint();
        let index = match self
            .params
            .iter()
            .position(|p| p.constraint.as_ref() == constraint)
        {
            Some(index) => index,
            None => {
                let index = match constraint {
                    Some(_) => self
                        .params
                        .iter()
                        .position(|p| p.constraint.is_none())
                        .unwrap_or(self.params.len()),
                    None => self.params.len(),
                };
                self.params.insert(
                    index,
                    ParamChild {
                        name: param.name().to_string(),
                        constraint: constraint.cloned(),
                        node: Node::default(),
                    },
                );
                index
            }
        };

        Ok(&mut self.params[index].node)
    }
}

/// A registered route.
#[derive(Debug)]
pub struct Entry<V> {
    /// The HTTP method.
    pub method: Method,
    /// The compiled pattern.
    pub pattern: CompiledPattern,
    /// The value stored for this route.
    pub value: V,
    /// Whether values bound by this route are percent-decoded.
    pub decode_params: bool,
}

/// Per-method segment tries.
///
/// Built incrementally, then only read. No removal.
#[derive(Debug)]
pub struct RouteTable<V> {
    trees: HashMap<Method, Node>,
    entries: Vec<Entry<V>>,
    decode_params: bool,
}

impl<V> Default for RouteTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// One pending branch of the lookup descent.
struct Frame<'a> {
    node: &'a Node,
    depth: usize,
    /// Length of the binding list when this frame was pushed.
    base: usize,
    binding: Option<(&'a str, String)>,
}

impl<V> RouteTable<V> {
    /// Create an empty table. Parameter values are percent-decoded unless
    /// [`set_decode_params`](Self::set_decode_params) says otherwise.
    pub fn new() -> Self {
        Self {
            trees: HashMap::new(),
            entries: Vec::new(),
            decode_params: true,
        }
    }

    /// Choose whether routes inserted from now on percent-decode their
    /// bound parameter values.
    pub fn set_decode_params(&mut self, decode: bool) {
        self.decode_params = decode;
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered routes, in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &CompiledPattern)> {
        self.entries.iter().map(|e| (&e.method, &e.pattern))
    }

    /// Consume the table, yielding its routes in registration order.
    pub fn into_entries(self) -> Vec<Entry<V>> {
        self.entries
    }

    /// Insert a route.
    ///
    /// Nodes created before a conflict is detected stay in the trie but carry
    /// no route, so they never match.
    pub fn insert(
        &mut self,
        method: Method,
        pattern: CompiledPattern,
        value: V,
    ) -> Result<(), InsertError> {
        let decode_params = self.decode_params;
        self.insert_entry(Entry {
            method,
            pattern,
            value,
            decode_params,
        })
    }

    /// Insert a route carrying its own decoding choice, e.g. one taken out
    /// of another table with [`into_entries`](Self::into_entries).
    pub fn insert_entry(&mut self, entry: Entry<V>) -> Result<(), InsertError> {
        let Entry {
            method,
            pattern,
            value,
            decode_params,
        } = entry;
        let mut node = self.trees.entry(method.clone()).or_default();

        for segment in pattern.segments() {
            node = match segment {
                Segment::Literal(text) => node.literals.entry(text.clone()).or_default(),
                Segment::Param(param) => node.param_child(param, &pattern)?,
                Segment::Wildcard => &mut **node.wildcard.get_or_insert_with(Box::default),
            };
        }

        if node.entry.is_some() {
            return Err(InsertError::DuplicateRoute {
                method,
                pattern: pattern.to_string(),
            });
        }

        node.entry = Some(self.entries.len());
        self.entries.push(Entry {
            method,
            pattern,
            value,
            decode_params,
        });
        Ok(())
    }

    /// Resolve `method` and `path` to a route.
    ///
    /// `path` must not contain a query string.
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, V> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if let Some((index, bindings)) = self
            .trees
            .get(method)
            .and_then(|root| self.descend(root, &segments))
        {
            let entry = &self.entries[index];
            let params = bindings
                .into_iter()
                .map(|(name, raw)| {
                    let value = if entry.decode_params { decode(&raw) } else { raw };
                    (name, value)
                })
                .collect();
            return Lookup::Found {
                value: &entry.value,
                params,
            };
        }

        let mut allowed: Vec<Method> = self
            .trees
            .iter()
            .filter(|(m, _)| *m != method)
            .filter(|(_, root)| self.descend(root, &segments).is_some())
            .map(|(m, _)| m.clone())
            .collect();

        if allowed.is_empty() {
            Lookup::NotFound
        } else {
            allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            Lookup::MethodNotAllowed { allowed }
        }
    }

    /// Find the first matching entry; bindings hold raw segment text.
    fn descend<'a>(
        &self,
        root: &'a Node,
        segments: &[&str],
    ) -> Option<(usize, Vec<(&'a str, String)>)> {
        let mut bindings: Vec<(&'a str, String)> = Vec::new();
        let mut stack = vec![Frame {
            node: root,
            depth: 0,
            base: 0,
            binding: None,
        }];

        while let Some(frame) = stack.pop() {
            bindings.truncate(frame.base);
            if let Some(binding) = frame.binding {
                bindings.push(binding);
            }
            let node = frame.node;

            if frame.depth == segments.len() {
                if let Some(index) = node.entry {
                    return Some((index, bindings));
                }
                // A trailing wildcard also matches an empty remainder.
                if let Some(index) = node.wildcard.as_ref().and_then(|w| w.entry) {
                    bindings.push((WILDCARD_PARAM, String::new()));
                    return Some((index, bindings));
                }
                continue;
            }

            let segment = segments[frame.depth];
            let base = bindings.len();

            // Pushed in reverse so literals pop first.
            if let Some(wildcard) = &node.wildcard {
                let rest = segments[frame.depth..].join("/");
                stack.push(Frame {
                    node: wildcard,
                    depth: segments.len(),
                    base,
                    binding: Some((WILDCARD_PARAM, rest)),
                });
            }

            if !node.params.is_empty() {
                // Constraints see the decoded text whatever the route binds.
                let decoded = decode(segment);
                for param in node.params.iter().rev() {
                    if param.constraint.as_ref().is_none_or(|c| c.is_match(&decoded)) {
                        stack.push(Frame {
                            node: &param.node,
                            depth: frame.depth + 1,
                            base,
                            binding: Some((param.name.as_str(), segment.to_string())),
                        });
                    }
                }
            }

            if let Some(child) = node.literals.get(segment) {
                stack.push(Frame {
                    node: child,
                    depth: frame.depth + 1,
                    base,
                    binding: None,
                });
            }
        }

        None
    }
}
