//! Stable identity assignment for syntax nodes.
//!
//! Each semantically meaningful node receives a path
//! `parentPath/Kind:name#occurrence` rooted at `root`, where the occurrence
//! counts earlier siblings with the same kind and name. The id is the hash of
//! that path, so identical text always reproduces identical ids.

use crate::base::stable_id;
use crate::syntax::{ElementKind, NodeDetail, SourceFile, SyntaxNode};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// Path of the implicit root namespace
pub const ROOT_PATH: &str = "root";

/// An indexed syntax node
#[derive(Debug, Clone)]
pub struct IndexEntry<'a> {
    pub id: String,
    pub path: String,
    pub node: &'a SyntaxNode,
    pub kind: ElementKind,
    pub parent_id: Option<String>,
}

/// An anonymous relation statement (`connect a to b;`, `satisfy R;`) with
/// the indexed element that encloses it.
#[derive(Debug, Clone)]
pub struct RelationStatement<'a> {
    pub node: &'a SyntaxNode,
    pub owner_id: Option<String>,
}

/// Full indexing output
#[derive(Debug, Clone, Default)]
pub struct Index<'a> {
    /// Indexed nodes, sorted by path
    pub entries: Vec<IndexEntry<'a>>,
    /// Anonymous relation statements, in document order
    pub statements: Vec<RelationStatement<'a>>,
}

/// Index every semantic node of a file, sorted by path.
pub fn index(file: &SourceFile) -> Vec<IndexEntry<'_>> {
    index_file(file).entries
}

/// Index nodes and collect anonymous relation statements.
pub fn index_file(file: &SourceFile) -> Index<'_> {
    let mut index = Index::default();
    walk(&file.members, ROOT_PATH, None, &mut index);
    index.entries.sort_by(|a, b| a.path.cmp(&b.path));
    index
}

/// Id of the node at `path`.
pub fn node_id(path: &str) -> String {
    stable_id("n", [path])
}

/// Whether a node is a relation statement without its own identity.
pub fn is_anonymous_relation(node: &SyntaxNode) -> bool {
    node.is_anonymous()
        && matches!(
            node.detail,
            NodeDetail::Relation(_) | NodeDetail::Transition(_)
        )
}

fn walk<'a>(
    nodes: &'a [SyntaxNode],
    parent_path: &str,
    parent_id: Option<&str>,
    index: &mut Index<'a>,
) {
    let mut occurrences: FxHashMap<(ElementKind, SmolStr), usize> = FxHashMap::default();

    for node in nodes {
        if !node.kind.is_semantic() {
            walk(&node.children, parent_path, parent_id, index);
            continue;
        }
        if is_anonymous_relation(node) {
            index.statements.push(RelationStatement {
                node,
                owner_id: parent_id.map(str::to_string),
            });
            walk(&node.children, parent_path, parent_id, index);
            continue;
        }

        let occurrence = occurrences.entry((node.kind, node.name.clone())).or_default();
        let path = format!("{parent_path}/{}:{}#{occurrence}", node.kind, node.name);
        *occurrence += 1;

        let id = node_id(&path);
        index.entries.push(IndexEntry {
            id: id.clone(),
            path: path.clone(),
            node,
            kind: node.kind,
            parent_id: parent_id.map(str::to_string),
        });
        walk(&node.children, &path, Some(&id), index);
    }
}
