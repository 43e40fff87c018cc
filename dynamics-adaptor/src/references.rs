//! Reference expansion against pipeline state
//!
//! Operation parameters are plain JSON. Any string that is exactly a state path
//! is replaced by the value found at that path before the request is built:
//!
//! - `$.data` / `$.data.accountid`
//! - `$.references[0]` / `$.references[1].contact.emailaddress1`
//! - `$.response.body.value[0].name`
//!
//! Everything else passes through unchanged.

use serde_json::Value;

use crate::error::{AdaptorError, Result};
use crate::state::State;

/// Capability that substitutes reference placeholders in operation parameters
pub trait ReferenceResolver: Send + Sync {
    fn expand(&self, params: &Value, state: &State) -> Result<Value>;
}

/// Default resolver for `$.data`, `$.references[i]` and `$.response` paths
#[derive(Debug, Default, Clone, Copy)]
pub struct PathResolver;

impl ReferenceResolver for PathResolver {
    fn expand(&self, params: &Value, state: &State) -> Result<Value> {
        match params {
            Value::String(text) => match parse_reference(text)? {
                Some(reference) => Ok(reference.resolve(state)),
                None => Ok(params.clone()),
            },
            Value::Array(items) => items
                .iter()
                .map(|item| self.expand(item, state))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(fields) => {
                let mut expanded = serde_json::Map::with_capacity(fields.len());
                for (key, value) in fields {
                    expanded.insert(key.clone(), self.expand(value, state)?);
                }
                Ok(Value::Object(expanded))
            }
            _ => Ok(params.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    Data,
    References,
    Response,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Reference {
    root: Root,
    segments: Vec<Segment>,
}

impl Reference {
    /// Value at the path, `null` when any segment is missing
    fn resolve(&self, state: &State) -> Value {
        if self.root == Root::References && self.segments.is_empty() {
            return Value::Array(state.references.clone());
        }
        self.lookup(state).cloned().unwrap_or(Value::Null)
    }

    fn lookup<'a>(&self, state: &'a State) -> Option<&'a Value> {
        let mut segments = self.segments.iter();

        let mut current = match self.root {
            Root::Data => &state.data,
            Root::Response => match segments.next() {
                Some(Segment::Key(key)) if key == "body" => state.response_body()?,
                _ => return None,
            },
            Root::References => match segments.next() {
                Some(Segment::Index(i)) => state.references.get(*i)?,
                _ => return None,
            },
        };

        for segment in segments {
            current = match segment {
                Segment::Key(key) => current.get(key.as_str())?,
                Segment::Index(i) => current.get(*i)?,
            };
        }

        Some(current)
    }
}

/// Parse a placeholder, returning `None` when the string is not a state path
fn parse_reference(text: &str) -> Result<Option<Reference>> {
    let Some(path) = text.strip_prefix("$.") else {
        return Ok(None);
    };

    let mut segments = parse_segments(path, text)?;
    let root = match segments.first() {
        Some(Segment::Key(key)) if key == "data" => Root::Data,
        Some(Segment::Key(key)) if key == "references" => Root::References,
        Some(Segment::Key(key)) if key == "response" => Root::Response,
        _ => return Ok(None),
    };
    segments.remove(0);

    Ok(Some(Reference { root, segments }))
}

fn parse_segments(path: &str, text: &str) -> Result<Vec<Segment>> {
    let malformed = |reason: &str| AdaptorError::Reference(format!("'{}': {}", text, reason));
    let mut segments = Vec::new();

    for part in path.split('.') {
        if part.is_empty() {
            return Err(malformed("empty path segment"));
        }

        let (name, mut rest) = match part.find('[') {
            Some(open) => (&part[..open], &part[open..]),
            None => (part, ""),
        };
        if !name.is_empty() {
            segments.push(Segment::Key(name.to_string()));
        }

        while !rest.is_empty() {
            if !rest.starts_with('[') {
                return Err(malformed("unexpected text after index"));
            }
            let close = rest.find(']').ok_or_else(|| malformed("unclosed index"))?;
            let index = rest[1..close]
                .trim()
                .parse::<usize>()
                .map_err(|_| malformed("index must be a non-negative integer"))?;
            segments.push(Segment::Index(index));
            rest = &rest[close + 1..];
        }
    }

    Ok(segments)
}
