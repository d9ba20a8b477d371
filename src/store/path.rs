use std::fmt;

/// A slash-separated path into the document tree, e.g. `rooms/ab12cd/questions`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<String>);

impl NodePath {
    pub fn parse(raw: &str) -> NodePath {
        NodePath(
            raw.split('/')
                .filter(|seg| !seg.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    pub fn child(&self, segment: &str) -> NodePath {
        let mut segments = self.0.clone();
        segments.push(segment.to_owned());
        NodePath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn split_last(&self) -> Option<(NodePath, &str)> {
        let (last, parent) = self.0.split_last()?;
        Some((NodePath(parent.to_vec()), last))
    }

    /// The path truncated to its first `depth` segments.
    pub fn truncated(&self, depth: usize) -> NodePath {
        NodePath(self.0.iter().take(depth).cloned().collect())
    }

    pub fn starts_with(&self, other: &NodePath) -> bool {
        self.0.len() >= other.0.len() && self.0[..other.0.len()] == other.0[..]
    }

    /// Whether a change at one path is visible from the other, i.e. one is
    /// an ancestor of (or equal to) the other.
    pub fn related(&self, other: &NodePath) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}
