//! Name lookup over the nodes of a semantic model.
//!
//! References in source text (`Engine`, `Vehicle::Engine`, `engine.fuelIn`)
//! are resolved against three keys, tried in order:
//! - the qualified name (`::`-joined ancestor names), exact or as a suffix
//! - a feature chain walked through children and declared types
//! - the normalized name / last path segment
//!
//! All keys are case-insensitive. When several nodes match, the caller's
//! preferred-kind ordering wins, then proximity to the referencing element,
//! then document order. This is a best-effort heuristic: duplicate names in
//! different containers have no single correct answer.

use super::model::SemanticModel;
use crate::syntax::ElementKind;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

/// A node that references can resolve to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub kind: ElementKind,
    pub name: String,
    /// `::`-joined names from the outermost ancestor
    pub qualified_name: String,
    pub parent_id: Option<String>,
    pub type_name: Option<String>,
}

/// Lookup tables keyed by normalized names
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    candidates: Vec<Candidate>,
    /// Normalized qualified name → candidates
    by_qualified: FxHashMap<String, Vec<usize>>,
    /// Normalized simple name → candidates
    by_name: FxHashMap<String, Vec<usize>>,
    /// Parent id → child candidates
    children: FxHashMap<String, Vec<usize>>,
    by_id: FxHashMap<String, usize>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every named node of a model.
    pub fn from_model(model: &SemanticModel) -> Self {
        let mut index = Self::new();
        for node in model.nodes.values() {
            let mut segments = vec![node.name.as_str()];
            let mut parent = node.parent_id.as_deref();
            // Bounded by the node count so a malformed parent cycle terminates.
            let mut hops = 0;
            while let Some(parent_node) = parent.and_then(|id| model.node(id)) {
                hops += 1;
                if hops > model.nodes.len() {
                    break;
                }
                segments.push(parent_node.name.as_str());
                parent = parent_node.parent_id.as_deref();
            }
            segments.reverse();
            index.insert(Candidate {
                id: node.id.clone(),
                kind: node.kind,
                name: node.name.clone(),
                qualified_name: segments.join("::"),
                parent_id: node.parent_id.clone(),
                type_name: node.type_name.clone(),
            });
        }
        index
    }

    pub fn insert(&mut self, candidate: Candidate) {
        let idx = self.candidates.len();
        if !candidate.name.is_empty() {
            self.by_name
                .entry(normalize(&candidate.name))
                .or_default()
                .push(idx);
            self.by_qualified
                .entry(normalize_path(&candidate.qualified_name))
                .or_default()
                .push(idx);
        }
        if let Some(parent) = &candidate.parent_id {
            self.children.entry(parent.clone()).or_default().push(idx);
        }
        self.by_id.insert(candidate.id.clone(), idx);
        self.candidates.push(candidate);
    }

    pub fn get(&self, id: &str) -> Option<&Candidate> {
        self.by_id.get(id).map(|&idx| &self.candidates[idx])
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Resolve a textual reference.
    ///
    /// * `preferred` - kinds in order of preference; other kinds rank last
    /// * `context` - id of the referencing element, used for proximity
    /// * `exclude` - id that must not be returned (the referencing node)
    pub fn resolve(
        &self,
        reference: &str,
        preferred: &[ElementKind],
        context: Option<&str>,
        exclude: Option<&str>,
    ) -> Option<&Candidate> {
        let found = self.resolve_index(
            reference,
            preferred,
            context,
            exclude,
            &mut FxHashSet::default(),
        );
        match found {
            Some(idx) => trace!(reference, target = %self.candidates[idx].id, "resolved"),
            None => trace!(reference, "unresolved"),
        }
        found.map(|idx| &self.candidates[idx])
    }

    fn resolve_index(
        &self,
        reference: &str,
        preferred: &[ElementKind],
        context: Option<&str>,
        exclude: Option<&str>,
        visited: &mut FxHashSet<(usize, String)>,
    ) -> Option<usize> {
        let segments: Vec<String> = split_reference(reference).map(normalize).collect();
        let (last, _) = segments.split_last()?;

        if segments.len() > 1 {
            let qualified = segments.join("::");
            if let Some(hit) = self
                .by_qualified
                .get(&qualified)
                .and_then(|c| self.pick(c, preferred, context, exclude))
            {
                return Some(hit);
            }

            let suffix = format!("::{qualified}");
            let suffixed: Vec<usize> = self
                .by_qualified
                .iter()
                .filter(|(key, _)| key.ends_with(&suffix))
                .flat_map(|(_, c)| c.iter().copied())
                .collect();
            if let Some(hit) = self.pick(&suffixed, preferred, context, exclude) {
                return Some(hit);
            }

            if let Some(hit) = self.resolve_chain(&segments, context, exclude, visited) {
                return Some(hit);
            }
        }

        self.by_name
            .get(last)
            .and_then(|c| self.pick(c, preferred, context, exclude))
    }

    /// Walk `a.b.c` through children, falling back to each step's type.
    ///
    /// `visited` holds the `(owner, member)` steps already taken on this
    /// lookup; a type that leads back to one of them ends the walk.
    fn resolve_chain(
        &self,
        segments: &[String],
        context: Option<&str>,
        exclude: Option<&str>,
        visited: &mut FxHashSet<(usize, String)>,
    ) -> Option<usize> {
        let (first, rest) = segments.split_first()?;
        let mut current = self
            .by_name
            .get(first)
            .and_then(|c| self.pick(c, USAGES_FIRST, context, exclude))?;
        for segment in rest {
            current = self.member(current, segment, exclude, visited)?;
        }
        Some(current)
    }

    fn member(
        &self,
        owner: usize,
        name: &str,
        exclude: Option<&str>,
        visited: &mut FxHashSet<(usize, String)>,
    ) -> Option<usize> {
        if !visited.insert((owner, name.to_string())) {
            trace!(owner = %self.candidates[owner].id, name, "cyclic feature chain");
            return None;
        }
        let owner = &self.candidates[owner];
        if let Some(child) = self.child_named(&owner.id, name) {
            return Some(child);
        }
        let type_name = owner.type_name.as_deref()?;
        let definition =
            self.resolve_index(type_name, DEFINITIONS_FIRST, None, exclude, visited)?;
        self.child_named(&self.candidates[definition].id, name)
    }

    fn child_named(&self, parent_id: &str, name: &str) -> Option<usize> {
        self.children
            .get(parent_id)?
            .iter()
            .copied()
            .find(|&idx| normalize(&self.candidates[idx].name) == name)
    }

    /// Best candidate: preferred kind, then proximity, then document order.
    fn pick(
        &self,
        candidates: &[usize],
        preferred: &[ElementKind],
        context: Option<&str>,
        exclude: Option<&str>,
    ) -> Option<usize> {
        let context_path = context
            .and_then(|id| self.get(id))
            .map(|c| normalize_path(&c.qualified_name));

        candidates
            .iter()
            .copied()
            .filter(|&idx| Some(self.candidates[idx].id.as_str()) != exclude)
            .min_by_key(|&idx| {
                let candidate = &self.candidates[idx];
                let rank = preferred
                    .iter()
                    .position(|k| *k == candidate.kind)
                    .unwrap_or(preferred.len());
                let shared = context_path.as_deref().map_or(0, |ctx| {
                    shared_prefix(ctx, &normalize_path(&candidate.qualified_name))
                });
                (rank, std::cmp::Reverse(shared), idx)
            })
    }
}

/// Usage kinds before definitions, for feature-chain heads.
pub const USAGES_FIRST: &[ElementKind] = &[
    ElementKind::PartUsage,
    ElementKind::PortUsage,
    ElementKind::ItemUsage,
    ElementKind::AttributeUsage,
    ElementKind::ActionUsage,
    ElementKind::StateUsage,
    ElementKind::RequirementUsage,
    ElementKind::ConnectionUsage,
    ElementKind::InterfaceUsage,
];

/// Definition kinds, for typing references.
pub const DEFINITIONS_FIRST: &[ElementKind] = &[
    ElementKind::PartDef,
    ElementKind::PortDef,
    ElementKind::ItemDef,
    ElementKind::AttributeDef,
    ElementKind::EnumDef,
    ElementKind::ConnectionDef,
    ElementKind::InterfaceDef,
    ElementKind::AllocationDef,
    ElementKind::RequirementDef,
    ElementKind::ConstraintDef,
    ElementKind::VerificationDef,
    ElementKind::UseCaseDef,
    ElementKind::ActionDef,
    ElementKind::StateDef,
    ElementKind::CalcDef,
    ElementKind::ViewDef,
];

/// Lowercase, unquoted, whitespace-free form of a name.
pub fn normalize(name: impl AsRef<str>) -> String {
    name.as_ref()
        .chars()
        .filter(|c| *c != '\'' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn normalize_path(path: &str) -> String {
    split_reference(path).map(normalize).collect::<Vec<_>>().join("::")
}

/// Split `A::B.c` into `["A", "B", "c"]`.
fn split_reference(reference: &str) -> impl Iterator<Item = &str> {
    reference
        .split("::")
        .flat_map(|segment| segment.split('.'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Number of leading `::` segments two normalized paths share.
fn shared_prefix(a: &str, b: &str) -> usize {
    a.split("::")
        .zip(b.split("::"))
        .take_while(|(x, y)| x == y)
        .count()
}
