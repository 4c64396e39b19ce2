//! [`ExprNode`] and the small enums/flags that describe its shape, mirroring
//! the original's `LogExprNode` layout/content tagging without its explicit
//! reference count (the arena in [`crate::ConfigTree`] owns every node, so
//! Rust's ownership already gives us the "freed exactly once" guarantee a
//! manual `ref_cnt` existed to provide).

use cfg_error::Location;

/// Index into [`crate::ConfigTree`]'s node arena.
pub type NodeId = usize;

/// How a node's children combine at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Holds a single pipe, no children.
    Single,
    /// Names another object of matching content; resolved by lookup, not
    /// owned.
    Reference,
    /// Children run one after another.
    Sequence,
    /// Children run as parallel branches.
    Junction,
}

/// What kind of object a node originally was declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Source,
    Destination,
    Filter,
    Parser,
    Rewrite,
    /// A bare pipe with no named-object identity (an anonymous log
    /// statement, or a nested leaf within a sequence/junction).
    Pipe,
}

impl ContentKind {
    /// The kinds that can be registered in the object store; `Pipe` nodes
    /// have no name and never collide.
    pub const NAMEABLE: [ContentKind; 5] =
        [ContentKind::Source, ContentKind::Destination, ContentKind::Filter, ContentKind::Parser, ContentKind::Rewrite];
}

/// Subset of the original's `LC_*` flags, a plain bitset rather than a
/// dependency on an external bitflags crate since five bits don't warrant
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeFlags(u32);

impl NodeFlags {
    pub const CATCHALL: NodeFlags = NodeFlags(1);
    pub const FALLBACK: NodeFlags = NodeFlags(2);
    pub const FINAL: NodeFlags = NodeFlags(4);
    pub const FLOW_CONTROL: NodeFlags = NodeFlags(8);
    pub const DROP_UNMATCHED: NodeFlags = NodeFlags(16);

    pub const fn none() -> NodeFlags {
        NodeFlags(0)
    }

    pub const fn contains(self, other: NodeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: NodeFlags) -> NodeFlags {
        NodeFlags(self.0 | other.0)
    }
}

impl std::ops::BitOr for NodeFlags {
    type Output = NodeFlags;
    fn bitor(self, rhs: NodeFlags) -> NodeFlags {
        self.union(rhs)
    }
}

/// A pipeline stage: the thing a `Single` node's `init`/`deinit` drive.
///
/// Stands in for the original's `LogPipe` vtable slice relevant to
/// configuration start/stop; everything else a real pipe does (message
/// processing) lives with the driver modules this core merely dispatches
/// to.
pub trait Pipe {
    /// Called once during `ConfigTree::start`. `false` aborts the start
    /// and rolls back every pipe already initialized.
    fn init(&mut self) -> bool;

    /// Called once per successful `init`, either during rollback (reverse
    /// order) or during `ConfigTree::stop`.
    fn deinit(&mut self);
}

/// One node of the expression DAG. Owns its children through
/// `first_child`/`next_sibling`; a `Reference` node instead carries a name
/// resolved against the object store at `start` time.
pub struct ExprNode {
    pub layout: Layout,
    pub content: ContentKind,
    pub flags: NodeFlags,
    pub name: Option<String>,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub pipe: Option<Box<dyn Pipe>>,
    pub location: Location,
    pub child_id: Option<String>,
    /// For a `Reference` node, the object-store target it was resolved to
    /// during [`crate::ConfigTree::compile`]. `None` before compilation or
    /// for any other layout.
    pub resolved: Option<NodeId>,
}

impl ExprNode {
    pub fn new(layout: Layout, content: ContentKind, location: Location) -> Self {
        ExprNode {
            layout,
            content,
            flags: NodeFlags::none(),
            name: None,
            parent: None,
            first_child: None,
            next_sibling: None,
            pipe: None,
            location,
            child_id: None,
            resolved: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_pipe(mut self, pipe: Box<dyn Pipe>) -> Self {
        self.pipe = Some(pipe);
        self
    }
}
