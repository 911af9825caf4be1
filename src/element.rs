//! Graph elements and document states
//!
//! The versioned value: an ordered list of canvas elements, each carrying
//! an editor-assigned identity. Comparison and diffing are keyed by id;
//! element order is preserved verbatim but carries no meaning.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Editor-assigned element identity, unique within one state
pub type ElementId = u64;

/// One node placed on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphElement {
    /// Stable identity
    pub id: ElementId,
    /// Element type tag (e.g. "redis", "docker")
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    /// Canvas position
    pub x: f64,
    pub y: f64,
    /// Type-specific parameters, compared by deep value equality
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl GraphElement {
    pub fn new(id: ElementId, kind: &str, x: f64, y: f64) -> Self {
        Self {
            id,
            kind: String::from(kind),
            x,
            y,
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(String::from(key), value.into());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

/// True iff `id`, `kind`, `x`, `y` match and `fields` are deep-value-equal.
///
/// Field maps compare by content, so key insertion order is irrelevant.
#[inline]
pub fn elements_equal(a: &GraphElement, b: &GraphElement) -> bool {
    a.id == b.id && a.kind == b.kind && a.x == b.x && a.y == b.y && a.fields == b.fields
}

/// Positional equality: same length and pairwise-equal elements in order.
///
/// This is the cheap short-circuit used before computing a delta; two
/// states holding the same elements in a different order are *not* equal
/// here, but diff to an empty delta.
pub fn states_equal(a: &DocumentState, b: &DocumentState) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b.iter())
            .all(|(x, y)| elements_equal(x, y))
}

/// Ordered collection of graph elements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentState {
    elements: Vec<GraphElement>,
}

impl DocumentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of elements
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn elements(&self) -> &[GraphElement] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut Vec<GraphElement> {
        &mut self.elements
    }

    pub fn into_elements(self) -> Vec<GraphElement> {
        self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GraphElement> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn push(&mut self, element: GraphElement) {
        self.elements.push(element);
    }

    /// First element with the given id
    pub fn get(&self, id: ElementId) -> Option<&GraphElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut GraphElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Ids in sequence order
    pub fn ids(&self) -> Vec<ElementId> {
        self.elements.iter().map(|e| e.id).collect()
    }
}

impl From<Vec<GraphElement>> for DocumentState {
    fn from(elements: Vec<GraphElement>) -> Self {
        Self { elements }
    }
}

impl FromIterator<GraphElement> for DocumentState {
    fn from_iter<I: IntoIterator<Item = GraphElement>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DocumentState {
    type Item = &'a GraphElement;
    type IntoIter = std::slice::Iter<'a, GraphElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl IntoIterator for DocumentState {
    type Item = GraphElement;
    type IntoIter = std::vec::IntoIter<GraphElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}
