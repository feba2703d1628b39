//! Nested live-parameter store.
//!
//! Every tunable the control surface can bind to lives in one tree of typed
//! leaves grouped under dotted paths (`"kleinian.mengerScale"`). The tree is
//! built once at startup with fixed defaults and is then mutated in place by
//! the control surface (or programmatically, e.g. an animated power value)
//! and read once per frame by the uniform composer.
//!
//! The store itself never clamps or validates assigned values; ranges and
//! steps are presentation metadata for whatever widget binds the leaf.

use std::collections::BTreeMap;

use crate::error::UnknownParameterError;

/// Runtime value of a single leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f32),
    Toggle(bool),
    /// Color triple stored as 0-255 channels, the way color widgets emit it.
    Color([f32; 3]),
    /// Selection out of a fixed, ordered option set.
    Choice(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Value::Number(value) => Some(*value),
            _ => None,
        }
    }
}

/// Presentation metadata describing how a leaf should be exposed as a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Slider {
        min: f32,
        max: f32,
        step: Option<f32>,
    },
    Toggle,
    Color,
    Select {
        options: Vec<String>,
    },
}

#[derive(Debug, Clone)]
struct Parameter {
    value: Value,
    kind: ControlKind,
}

#[derive(Debug, Clone)]
enum Node {
    Group(BTreeMap<String, Node>),
    Leaf(Parameter),
}

/// The live, mutable tree of tunable values bound to interactive controls.
#[derive(Debug)]
pub struct ParameterStore {
    root: BTreeMap<String, Node>,
}

impl ParameterStore {
    /// Starts building a tree; finish with [`TreeBuilder::build`].
    pub fn builder() -> TreeBuilder {
        TreeBuilder::new()
    }

    fn leaf(&self, path: &str) -> Result<&Parameter, UnknownParameterError> {
        let mut nodes = &self.root;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            match nodes.get(segment) {
                Some(Node::Leaf(parameter)) if segments.peek().is_none() => {
                    return Ok(parameter);
                }
                Some(Node::Group(children)) if segments.peek().is_some() => {
                    nodes = children;
                }
                _ => break,
            }
        }
        Err(UnknownParameterError(path.to_string()))
    }

    fn leaf_mut(&mut self, path: &str) -> Result<&mut Parameter, UnknownParameterError> {
        let mut nodes = &mut self.root;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            match nodes.get_mut(segment) {
                Some(Node::Leaf(parameter)) if segments.peek().is_none() => {
                    return Ok(parameter);
                }
                Some(Node::Group(children)) if segments.peek().is_some() => {
                    nodes = children;
                }
                _ => break,
            }
        }
        Err(UnknownParameterError(path.to_string()))
    }

    /// Reads the value at a dotted path.
    pub fn get(&self, path: &str) -> Result<&Value, UnknownParameterError> {
        Ok(&self.leaf(path)?.value)
    }

    /// Replaces the value at a dotted path.
    ///
    /// The assignment is retained verbatim: no clamping, no type coercion, no
    /// derived recomputation. Unknown paths fail.
    pub fn set(&mut self, path: &str, value: Value) -> Result<(), UnknownParameterError> {
        self.leaf_mut(path)?.value = value;
        Ok(())
    }

    /// Option list of a `Select` leaf, in declared order.
    ///
    /// Non-select leaves report an empty slice so callers can treat "has no
    /// fixed option set" uniformly.
    pub fn options(&self, path: &str) -> Result<&[String], UnknownParameterError> {
        match &self.leaf(path)?.kind {
            ControlKind::Select { options } => Ok(options),
            _ => Ok(&[]),
        }
    }

    /// Pure flattening of the full tree into path -> value.
    ///
    /// Calling this twice without an intervening [`set`](Self::set) yields
    /// identical mappings; nothing in the store is mutated.
    pub fn snapshot_flat(&self) -> BTreeMap<String, Value> {
        let mut flat = BTreeMap::new();
        flatten_into(&self.root, String::new(), &mut flat);
        flat
    }

    /// Enumerates every bindable leaf as `(path, widget kind, current value)`.
    pub fn controls(&self) -> Vec<(String, ControlKind, Value)> {
        let mut out = Vec::new();
        collect_controls(&self.root, String::new(), &mut out);
        out
    }
}

fn flatten_into(nodes: &BTreeMap<String, Node>, prefix: String, flat: &mut BTreeMap<String, Value>) {
    for (name, node) in nodes {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match node {
            Node::Leaf(parameter) => {
                flat.insert(path, parameter.value.clone());
            }
            Node::Group(children) => flatten_into(children, path, flat),
        }
    }
}

fn collect_controls(
    nodes: &BTreeMap<String, Node>,
    prefix: String,
    out: &mut Vec<(String, ControlKind, Value)>,
) {
    for (name, node) in nodes {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match node {
            Node::Leaf(parameter) => {
                out.push((path, parameter.kind.clone(), parameter.value.clone()));
            }
            Node::Group(children) => collect_controls(children, path, out),
        }
    }
}

/// Declarative construction of the parameter tree.
pub struct TreeBuilder {
    nodes: BTreeMap<String, Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    pub fn slider(mut self, name: &str, value: f32, min: f32, max: f32) -> Self {
        self.nodes.insert(
            name.to_string(),
            Node::Leaf(Parameter {
                value: Value::Number(value),
                kind: ControlKind::Slider {
                    min,
                    max,
                    step: None,
                },
            }),
        );
        self
    }

    pub fn slider_stepped(mut self, name: &str, value: f32, min: f32, max: f32, step: f32) -> Self {
        self.nodes.insert(
            name.to_string(),
            Node::Leaf(Parameter {
                value: Value::Number(value),
                kind: ControlKind::Slider {
                    min,
                    max,
                    step: Some(step),
                },
            }),
        );
        self
    }

    pub fn toggle(mut self, name: &str, value: bool) -> Self {
        self.nodes.insert(
            name.to_string(),
            Node::Leaf(Parameter {
                value: Value::Toggle(value),
                kind: ControlKind::Toggle,
            }),
        );
        self
    }

    pub fn color(mut self, name: &str, channels: [f32; 3]) -> Self {
        self.nodes.insert(
            name.to_string(),
            Node::Leaf(Parameter {
                value: Value::Color(channels),
                kind: ControlKind::Color,
            }),
        );
        self
    }

    pub fn select(mut self, name: &str, value: &str, options: &[&str]) -> Self {
        self.nodes.insert(
            name.to_string(),
            Node::Leaf(Parameter {
                value: Value::Choice(value.to_string()),
                kind: ControlKind::Select {
                    options: options.iter().map(|s| s.to_string()).collect(),
                },
            }),
        );
        self
    }

    pub fn group(mut self, name: &str, build: impl FnOnce(TreeBuilder) -> TreeBuilder) -> Self {
        let child = build(TreeBuilder::new());
        self.nodes.insert(name.to_string(), Node::Group(child.nodes));
        self
    }

    pub fn build(self) -> ParameterStore {
        ParameterStore { root: self.nodes }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
