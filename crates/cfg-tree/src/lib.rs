//! C9 `ConfigTree`: the object store, template store, and pipeline DAG that
//! a parsed configuration assembles into, plus the `start`/`stop` contract
//! that drives every reachable pipe's `init`/`deinit` transactionally.
//!
//! Nodes live in a flat arena (`Vec<ExprNode>`, addressed by [`NodeId`])
//! rather than as a pointer graph; a node's children are a singly-linked
//! `first_child`/`next_sibling` list, matching the original's layout one
//! level of indirection removed. `start` walks `rules` in pre-order,
//! following `Reference` nodes to their resolved object-store target, and
//! records every successfully initialized pipe so a failure partway
//! through can unwind it in reverse order; `stop` reuses that same record.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod node;

pub use node::{ContentKind, ExprNode, Layout, NodeFlags, NodeId, Pipe};

use cfg_error::{ConfigError, Location, StartError};
use rustc_hash::FxHashMap;

/// A bare `major.minor` pair, compared against [`DUP_GRANDFATHER_VERSION`]
/// to decide whether duplicate object names are tolerated. Kept as a small
/// local type rather than depending on `cfg-lexer`'s `Version`: this crate
/// sits beside the lexer, not above it, in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConfigVersion {
    pub major: u16,
    pub minor: u16,
}

impl ConfigVersion {
    pub fn new(major: u16, minor: u16) -> Self {
        ConfigVersion { major, minor }
    }
}

/// Configurations declaring a version older than this are grandfathered
/// into allowing duplicate object names even without `allow-config-dups`,
/// matching the version duplicate-object checking was introduced at.
pub const DUP_GRANDFATHER_VERSION: ConfigVersion = ConfigVersion { major: 3, minor: 3 };

/// A named template body. Rendering a template against a log message is
/// explicitly out of scope here; the tree only stores and looks them up by
/// name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTemplate {
    pub name: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ObjectKey {
    content: ContentKind,
    name: String,
}

pub struct ConfigTree {
    version: ConfigVersion,
    allow_config_dups: bool,
    nodes: Vec<ExprNode>,
    objects: FxHashMap<ObjectKey, NodeId>,
    rules: Vec<NodeId>,
    templates: FxHashMap<String, ConfigTemplate>,
    anon_counters: FxHashMap<ContentKind, u32>,
    initialized: Vec<NodeId>,
    compiled: bool,
}

impl ConfigTree {
    pub fn new(version: ConfigVersion) -> Self {
        ConfigTree {
            version,
            allow_config_dups: false,
            nodes: Vec::new(),
            objects: FxHashMap::default(),
            rules: Vec::new(),
            templates: FxHashMap::default(),
            anon_counters: FxHashMap::default(),
            initialized: Vec::new(),
            compiled: false,
        }
    }

    pub fn allow_config_dups(&self) -> bool {
        self.allow_config_dups
    }

    pub fn set_allow_config_dups(&mut self, value: bool) {
        self.allow_config_dups = value;
    }

    fn dups_allowed(&self) -> bool {
        self.allow_config_dups || self.version < DUP_GRANDFATHER_VERSION
    }

    /// Allocate a node in the arena and return its id. Does not link it
    /// into any parent's children or the rule list.
    pub fn alloc(&mut self, node: ExprNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &ExprNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut ExprNode {
        &mut self.nodes[id]
    }

    /// Append `child` to the end of `parent`'s sibling list and set its
    /// `parent` back-pointer, mirroring `log_expr_node_append_tail`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(parent);
        match self.nodes[parent].first_child {
            None => self.nodes[parent].first_child = Some(child),
            Some(first) => {
                let mut last = first;
                while let Some(next) = self.nodes[last].next_sibling {
                    last = next;
                }
                self.nodes[last].next_sibling = Some(child);
            }
        }
    }

    /// Generate the next anonymous name for an inline object of this
    /// content kind (e.g. a `destination { ... };` with no explicit name).
    pub fn next_anon_name(&mut self, content: ContentKind) -> String {
        let counter = self.anon_counters.entry(content).or_insert(0);
        let n = *counter;
        *counter += 1;
        format!("#anon-{content:?}-{n}").to_lowercase()
    }

    /// Register a named, nameable-content node in the object store.
    /// Fails on a name+content collision unless duplicates are allowed for
    /// this configuration (`allow-config-dups`, or a grandfathered old
    /// `@version`).
    pub fn add_object(&mut self, id: NodeId) -> Result<(), ConfigError> {
        let content = self.nodes[id].content;
        if !ContentKind::NAMEABLE.contains(&content) {
            return Err(ConfigError::Other(format!("{content:?} nodes cannot be registered as named objects")));
        }
        let name = self.nodes[id]
            .name
            .clone()
            .ok_or_else(|| ConfigError::Other("object node has no name".to_string()))?;
        let key = ObjectKey { content, name: name.clone() };
        if self.objects.contains_key(&key) {
            if !self.dups_allowed() {
                tracing::warn!(name = %name, kind = ?content, "duplicate configuration object rejected, add allow-config-dups to re-enable");
                return Err(ConfigError::DuplicateObject { name, kind: format!("{content:?}") });
            }
            tracing::debug!(name = %name, kind = ?content, "duplicate configuration object allowed");
        }
        self.objects.insert(key, id);
        Ok(())
    }

    pub fn get_object(&self, content: ContentKind, name: &str) -> Option<NodeId> {
        self.objects.get(&ObjectKey { content, name: name.to_string() }).copied()
    }

    pub fn objects(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.objects.values().copied()
    }

    /// Register a node as a top-level rule, walked by `start`.
    pub fn add_rule(&mut self, id: NodeId) {
        self.rules.push(id);
    }

    pub fn rules(&self) -> &[NodeId] {
        &self.rules
    }

    pub fn add_template(&mut self, template: ConfigTemplate) {
        self.templates.insert(template.name.clone(), template);
    }

    pub fn lookup_template(&self, name: &str) -> Option<&ConfigTemplate> {
        self.templates.get(name)
    }

    /// Resolve every `Reference` node reachable from a rule against the
    /// object store. A name that fails to resolve, or resolves to an
    /// object of a different content kind, is a dangling reference.
    pub fn compile(&mut self) -> Result<(), ConfigError> {
        let rules = self.rules.clone();
        for rule in rules {
            self.resolve_references(rule)?;
        }
        self.compiled = true;
        Ok(())
    }

    fn resolve_references(&mut self, id: NodeId) -> Result<(), ConfigError> {
        if self.nodes[id].layout == Layout::Reference {
            let content = self.nodes[id].content;
            let name = self.nodes[id]
                .name
                .clone()
                .ok_or_else(|| ConfigError::Other("reference node has no name".to_string()))?;
            let target = self.get_object(content, &name).ok_or(ConfigError::DanglingReference(name))?;
            self.nodes[id].resolved = Some(target);
        }
        let mut child = self.nodes[id].first_child;
        while let Some(cid) = child {
            self.resolve_references(cid)?;
            child = self.nodes[cid].next_sibling;
        }
        Ok(())
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    fn node_label(&self, id: NodeId) -> String {
        self.nodes[id].name.clone().unwrap_or_else(|| format!("#node{id}"))
    }

    /// Walk every rule in pre-order, calling `init` on each reachable
    /// pipe exactly once (a node reached twice through shared references
    /// is only initialized the first time). On the first `init` failure,
    /// every pipe already initialized is `deinit`ed in reverse order and
    /// the failure is returned; nodes not yet reached see no call at all.
    pub fn start(&mut self) -> Result<(), StartError> {
        self.initialized.clear();
        let rules = self.rules.clone();
        for rule in rules {
            if let Err(err) = self.init_subtree(rule) {
                tracing::error!(node = %err.node, "pipe initialization failed, rolling back config tree start");
                self.stop();
                return Err(err);
            }
        }
        Ok(())
    }

    fn init_subtree(&mut self, id: NodeId) -> Result<(), StartError> {
        if self.initialized.contains(&id) {
            return Ok(());
        }
        if self.nodes[id].layout == Layout::Reference {
            if let Some(target) = self.nodes[id].resolved {
                return self.init_subtree(target);
            }
            return Ok(());
        }
        if let Some(pipe) = self.nodes[id].pipe.as_mut() {
            if !pipe.init() {
                return Err(StartError { node: self.node_label(id) });
            }
            self.initialized.push(id);
        }
        let mut child = self.nodes[id].first_child;
        while let Some(cid) = child {
            self.init_subtree(cid)?;
            child = self.nodes[cid].next_sibling;
        }
        Ok(())
    }

    /// Deinitialize every pipe recorded by `start`, in reverse
    /// initialization order. A no-op if `start` never ran or already
    /// rolled everything back after a failure.
    pub fn stop(&mut self) {
        while let Some(id) = self.initialized.pop() {
            if let Some(pipe) = self.nodes[id].pipe.as_mut() {
                pipe.deinit();
            }
        }
    }

    /// A location-tagged, human name for a node, for persisted-state keys
    /// and diagnostics: the node's own name if it has one, else a
    /// generated anonymous label.
    pub fn rule_name(&self, id: NodeId) -> String {
        self.node_label(id)
    }

    /// A dotted path of sibling indices from the nearest named ancestor
    /// (or the root) to `id`, disambiguating otherwise-unnamed children of
    /// the same named rule for persisted-state keys.
    pub fn child_id(&self, id: NodeId) -> String {
        let mut components = Vec::new();
        let mut current = id;
        loop {
            let Some(parent) = self.nodes[current].parent else { break };
            if self.nodes[parent].name.is_some() {
                let index = self.sibling_index(parent, current);
                components.push(index);
                break;
            }
            let index = self.sibling_index(parent, current);
            components.push(index);
            current = parent;
        }
        components.reverse();
        components.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(".")
    }

    fn sibling_index(&self, parent: NodeId, child: NodeId) -> usize {
        let mut index = 0;
        let mut cursor = self.nodes[parent].first_child;
        while let Some(cid) = cursor {
            if cid == child {
                return index;
            }
            index += 1;
            cursor = self.nodes[cid].next_sibling;
        }
        index
    }

    pub fn location_of(&self, id: NodeId) -> &Location {
        &self.nodes[id].location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TrackedPipe {
        name: &'static str,
        ok: bool,
        log: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
    }

    impl Pipe for TrackedPipe {
        fn init(&mut self) -> bool {
            self.log.borrow_mut().push(format!("{}.init", self.name));
            self.ok
        }
        fn deinit(&mut self) {
            self.log.borrow_mut().push(format!("{}.deinit", self.name));
        }
    }

    fn leaf(tree: &mut ConfigTree, name: &'static str, ok: bool, log: &std::rc::Rc<std::cell::RefCell<Vec<String>>>) -> NodeId {
        let node = ExprNode::new(Layout::Single, ContentKind::Pipe, Location::buffer(1, 1))
            .with_pipe(Box::new(TrackedPipe { name, ok, log: log.clone() }));
        tree.alloc(node)
    }

    #[test]
    fn three_node_tree_all_succeed() {
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut tree = ConfigTree::new(ConfigVersion::new(4, 7));
        let a = leaf(&mut tree, "A", true, &log);
        let b = leaf(&mut tree, "B", true, &log);
        let c = leaf(&mut tree, "C", true, &log);
        tree.add_rule(a);
        tree.add_rule(b);
        tree.add_rule(c);

        assert!(tree.start().is_ok());
        assert_eq!(*log.borrow(), vec!["A.init", "B.init", "C.init"]);

        log.borrow_mut().clear();
        tree.stop();
        assert_eq!(*log.borrow(), vec!["C.deinit", "B.deinit", "A.deinit"]);
    }

    #[test]
    fn middle_init_failure_rolls_back_and_skips_later_nodes() {
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut tree = ConfigTree::new(ConfigVersion::new(4, 7));
        let a = leaf(&mut tree, "A", true, &log);
        let b = leaf(&mut tree, "B", false, &log);
        let c = leaf(&mut tree, "C", true, &log);
        tree.add_rule(a);
        tree.add_rule(b);
        tree.add_rule(c);

        let result = tree.start();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().node, "#node1");
        assert_eq!(*log.borrow(), vec!["A.init", "B.init", "A.deinit"]);

        log.borrow_mut().clear();
        tree.stop();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn duplicate_object_name_rejected_by_default() {
        let mut tree = ConfigTree::new(ConfigVersion::new(4, 7));
        let a = tree.alloc(ExprNode::new(Layout::Single, ContentKind::Source, Location::buffer(1, 1)).with_name("s1"));
        let b = tree.alloc(ExprNode::new(Layout::Single, ContentKind::Source, Location::buffer(2, 1)).with_name("s1"));
        assert!(tree.add_object(a).is_ok());
        assert_eq!(tree.add_object(b), Err(ConfigError::DuplicateObject { name: "s1".to_string(), kind: "Source".to_string() }));
    }

    #[test]
    fn duplicate_object_name_allowed_with_flag() {
        let mut tree = ConfigTree::new(ConfigVersion::new(4, 7));
        tree.set_allow_config_dups(true);
        let a = tree.alloc(ExprNode::new(Layout::Single, ContentKind::Source, Location::buffer(1, 1)).with_name("s1"));
        let b = tree.alloc(ExprNode::new(Layout::Single, ContentKind::Source, Location::buffer(2, 1)).with_name("s1"));
        assert!(tree.add_object(a).is_ok());
        assert!(tree.add_object(b).is_ok());
        assert_eq!(tree.get_object(ContentKind::Source, "s1"), Some(b));
    }

    #[test]
    fn duplicate_object_name_grandfathered_for_old_version() {
        let mut tree = ConfigTree::new(ConfigVersion::new(3, 0));
        let a = tree.alloc(ExprNode::new(Layout::Single, ContentKind::Source, Location::buffer(1, 1)).with_name("s1"));
        let b = tree.alloc(ExprNode::new(Layout::Single, ContentKind::Source, Location::buffer(2, 1)).with_name("s1"));
        assert!(tree.add_object(a).is_ok());
        assert!(tree.add_object(b).is_ok());
    }

    #[test]
    fn reference_resolves_and_shares_init_with_its_target() {
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut tree = ConfigTree::new(ConfigVersion::new(4, 7));
        let src = ExprNode::new(Layout::Single, ContentKind::Source, Location::buffer(1, 1))
            .with_name("s1")
            .with_pipe(Box::new(TrackedPipe { name: "s1", ok: true, log: log.clone() }));
        let src_id = tree.alloc(src);
        tree.add_object(src_id).unwrap();

        let reference = ExprNode::new(Layout::Reference, ContentKind::Source, Location::buffer(2, 1)).with_name("s1");
        let ref_id = tree.alloc(reference);

        let root = ExprNode::new(Layout::Sequence, ContentKind::Pipe, Location::buffer(2, 1));
        let root_id = tree.alloc(root);
        tree.append_child(root_id, ref_id);
        tree.add_rule(root_id);

        tree.compile().unwrap();
        assert!(tree.start().is_ok());
        assert_eq!(*log.borrow(), vec!["s1.init"]);
    }

    #[test]
    fn dangling_reference_fails_compile() {
        let mut tree = ConfigTree::new(ConfigVersion::new(4, 7));
        let reference = ExprNode::new(Layout::Reference, ContentKind::Source, Location::buffer(1, 1)).with_name("missing");
        let ref_id = tree.alloc(reference);
        tree.add_rule(ref_id);
        assert_eq!(tree.compile(), Err(ConfigError::DanglingReference("missing".to_string())));
    }

    #[test]
    fn anon_names_are_unique_per_content_kind() {
        let mut tree = ConfigTree::new(ConfigVersion::new(4, 7));
        assert_eq!(tree.next_anon_name(ContentKind::Destination), "#anon-destination-0");
        assert_eq!(tree.next_anon_name(ContentKind::Destination), "#anon-destination-1");
        assert_eq!(tree.next_anon_name(ContentKind::Source), "#anon-source-0");
    }
}
