use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One choice of a select, checkbox group or cascader level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OptionNode {
    pub value: Value,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OptionNode>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

impl OptionNode {
    pub fn leaf(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            children: Vec::new(),
            disabled: false,
        }
    }

    pub fn branch(
        value: impl Into<Value>,
        label: impl Into<String>,
        children: Vec<OptionNode>,
    ) -> Self {
        Self {
            children,
            ..Self::leaf(value, label)
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Ordered option nodes; flat lists are trees of depth one.
///
/// Nodes own their children, so a tree is always finite and acyclic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct OptionTree {
    nodes: Vec<OptionNode>,
}

/// Errors raised by option lookups.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionTreeError {
    #[error("no option {segment} at depth {depth}")]
    NotFound { depth: usize, segment: Value },
}

impl OptionTree {
    pub fn new(nodes: Vec<OptionNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[OptionNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first walk yielding `(depth, node)`, parents before children.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: self.nodes.iter().rev().map(|node| (0, node)).collect(),
        }
    }

    /// Longest root-to-leaf chain; 0 for an empty tree.
    pub fn depth(&self) -> usize {
        self.walk().map(|(depth, _)| depth + 1).max().unwrap_or(0)
    }

    /// Resolves a path of values, one per level, to the matching node chain.
    pub fn lookup_path(&self, path: &[Value]) -> Result<Vec<&OptionNode>, OptionTreeError> {
        let mut chain = Vec::with_capacity(path.len());
        let mut level = self.nodes.as_slice();
        for (depth, segment) in path.iter().enumerate() {
            let node = level
                .iter()
                .find(|node| &node.value == segment)
                .ok_or_else(|| OptionTreeError::NotFound {
                    depth,
                    segment: segment.clone(),
                })?;
            chain.push(node);
            level = node.children.as_slice();
        }
        Ok(chain)
    }

    /// Labels along a path, as shown by a cascading selector.
    pub fn label_chain(&self, path: &[Value]) -> Result<Vec<String>, OptionTreeError> {
        Ok(self
            .lookup_path(path)?
            .into_iter()
            .map(|node| node.label.clone())
            .collect())
    }

    /// Whether `value` is one of the top-level choices.
    pub fn contains_value(&self, value: &Value) -> bool {
        self.nodes.iter().any(|node| &node.value == value)
    }

    /// First value that repeats inside one sibling group, if any.
    pub fn duplicate_sibling(&self) -> Option<&Value> {
        first_duplicate(&self.nodes)
    }
}

fn first_duplicate(level: &[OptionNode]) -> Option<&Value> {
    for (idx, node) in level.iter().enumerate() {
        if level[..idx].iter().any(|earlier| earlier.value == node.value) {
            return Some(&node.value);
        }
    }
    level
        .iter()
        .find_map(|node| first_duplicate(&node.children))
}

impl From<Vec<OptionNode>> for OptionTree {
    fn from(nodes: Vec<OptionNode>) -> Self {
        Self::new(nodes)
    }
}

/// Iterator returned by [`OptionTree::walk`].
pub struct Walk<'a> {
    stack: Vec<(usize, &'a OptionNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a OptionNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}
