//! Structural memory estimation.
//!
//! An estimation is a tree of named components. Leaves scale with the graph
//! (per node, per relationship), with the worker count (per thread), or not at
//! all (fixed). Evaluating the tree against concrete dimensions produces a
//! [`MemoryTree`] whose ranges are the sums of their children.

use super::MemoryRange;

/// Sizes a memory estimation is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphDimensions {
    /// Number of nodes.
    pub node_count: usize,
    /// Number of relationships.
    pub relationship_count: usize,
}

impl GraphDimensions {
    /// Creates dimensions for a graph.
    pub fn new(node_count: usize, relationship_count: usize) -> Self {
        Self {
            node_count,
            relationship_count,
        }
    }
}

#[derive(Debug, Clone)]
enum Kind {
    Fixed(MemoryRange),
    PerNode(MemoryRange),
    PerNodeFn(fn(usize) -> usize),
    PerRelationship(MemoryRange),
    PerThread(MemoryRange),
    Composite(Vec<MemoryEstimation>),
}

/// A named memory-cost model.
#[derive(Debug, Clone)]
pub struct MemoryEstimation {
    description: String,
    kind: Kind,
}

impl MemoryEstimation {
    /// Starts a composite estimation.
    pub fn builder(description: impl Into<String>) -> MemoryEstimationBuilder {
        MemoryEstimationBuilder {
            description: description.into(),
            components: Vec::new(),
        }
    }

    /// A component of constant size.
    pub fn fixed(description: impl Into<String>, bytes: impl Into<MemoryRange>) -> Self {
        Self::leaf(description, Kind::Fixed(bytes.into()))
    }

    /// A component scaling with the node count.
    pub fn per_node(description: impl Into<String>, bytes: impl Into<MemoryRange>) -> Self {
        Self::leaf(description, Kind::PerNode(bytes.into()))
    }

    /// A component whose size is computed from the node count.
    pub fn per_node_fn(description: impl Into<String>, size_of: fn(usize) -> usize) -> Self {
        Self::leaf(description, Kind::PerNodeFn(size_of))
    }

    /// A component scaling with the relationship count.
    pub fn per_relationship(description: impl Into<String>, bytes: impl Into<MemoryRange>) -> Self {
        Self::leaf(description, Kind::PerRelationship(bytes.into()))
    }

    /// A component scaling with the worker count.
    pub fn per_thread(description: impl Into<String>, bytes: impl Into<MemoryRange>) -> Self {
        Self::leaf(description, Kind::PerThread(bytes.into()))
    }

    fn leaf(description: impl Into<String>, kind: Kind) -> Self {
        Self {
            description: description.into(),
            kind,
        }
    }

    /// Component name.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Direct children of a composite estimation.
    pub fn components(&self) -> &[MemoryEstimation] {
        match &self.kind {
            Kind::Composite(children) => children,
            _ => &[],
        }
    }

    /// Evaluates the estimation for a graph and worker count.
    pub fn estimate(&self, dimensions: GraphDimensions, concurrency: usize) -> MemoryTree {
        let (memory_usage, components) = match &self.kind {
            Kind::Fixed(r) => (*r, Vec::new()),
            Kind::PerNode(r) => (r.times(dimensions.node_count), Vec::new()),
            Kind::PerNodeFn(f) => (MemoryRange::of(f(dimensions.node_count)), Vec::new()),
            Kind::PerRelationship(r) => (r.times(dimensions.relationship_count), Vec::new()),
            Kind::PerThread(r) => (r.times(concurrency), Vec::new()),
            Kind::Composite(children) => {
                let trees: Vec<_> = children
                    .iter()
                    .map(|c| c.estimate(dimensions, concurrency))
                    .collect();
                (trees.iter().map(MemoryTree::memory_usage).sum(), trees)
            }
        };
        MemoryTree {
            description: self.description.clone(),
            memory_usage,
            components,
        }
    }
}

/// Builder for composite estimations.
#[derive(Debug)]
pub struct MemoryEstimationBuilder {
    description: String,
    components: Vec<MemoryEstimation>,
}

impl MemoryEstimationBuilder {
    /// Adds a sub-estimation.
    #[must_use]
    pub fn add(mut self, component: MemoryEstimation) -> Self {
        self.components.push(component);
        self
    }

    /// Adds a constant-size component.
    #[must_use]
    pub fn fixed(self, description: impl Into<String>, bytes: impl Into<MemoryRange>) -> Self {
        self.add(MemoryEstimation::fixed(description, bytes))
    }

    /// Adds a per-node component.
    #[must_use]
    pub fn per_node(self, description: impl Into<String>, bytes: impl Into<MemoryRange>) -> Self {
        self.add(MemoryEstimation::per_node(description, bytes))
    }

    /// Adds a component sized by a function of the node count.
    #[must_use]
    pub fn per_node_fn(self, description: impl Into<String>, size_of: fn(usize) -> usize) -> Self {
        self.add(MemoryEstimation::per_node_fn(description, size_of))
    }

    /// Adds a per-relationship component.
    #[must_use]
    pub fn per_relationship(
        self,
        description: impl Into<String>,
        bytes: impl Into<MemoryRange>,
    ) -> Self {
        self.add(MemoryEstimation::per_relationship(description, bytes))
    }

    /// Adds a per-thread component.
    #[must_use]
    pub fn per_thread(self, description: impl Into<String>, bytes: impl Into<MemoryRange>) -> Self {
        self.add(MemoryEstimation::per_thread(description, bytes))
    }

    /// Finishes the composite.
    pub fn build(self) -> MemoryEstimation {
        MemoryEstimation {
            description: self.description,
            kind: Kind::Composite(self.components),
        }
    }
}

/// An evaluated estimation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTree {
    description: String,
    memory_usage: MemoryRange,
    components: Vec<MemoryTree>,
}

impl MemoryTree {
    /// Component name.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Total bytes of this component and its children.
    pub fn memory_usage(&self) -> MemoryRange {
        self.memory_usage
    }

    /// Evaluated children.
    pub fn components(&self) -> &[MemoryTree] {
        &self.components
    }

    /// Finds a direct child by name.
    pub fn component(&self, description: &str) -> Option<&MemoryTree> {
        self.components.iter().find(|c| c.description == description)
    }

    /// Renders the tree as indented text, one component per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        out.push_str(&format!(
            "{:indent$}{}: {}\n",
            "",
            self.description,
            self.memory_usage,
            indent = depth * 4
        ));
        for c in &self.components {
            c.render_into(out, depth + 1);
        }
    }
}
