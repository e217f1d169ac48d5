//! Local stand-in for the text generator.
//!
//! Nouns of the prompt become part definitions, `X has a Y` phrases become
//! typed part usages inside `X`, and sentences with `must`/`shall`/`should`
//! become documented requirement definitions.

use crate::base::is_plain_identifier;
use crate::syntax::{
    DefinitionDetail, DocDetail, ElementKind, NodeDetail, PrintOptions, SourceFile, SyntaxNode,
    UsageDetail, print,
};
use indexmap::IndexMap;

const PACKAGE: &str = "Generated";
const MAX_CONCEPTS: usize = 8;

const STOPWORDS: &[&str] = &[
    "able", "about", "add", "all", "also", "and", "any", "are", "been", "being", "between", "but",
    "can", "create", "design", "diagram", "did", "does", "each", "for", "from", "give", "had",
    "has", "have", "how", "include", "includes", "into", "its", "just", "least", "less", "like",
    "make", "many", "model", "more", "most", "multiple", "must", "need", "needs", "not", "only",
    "other", "our", "over", "own", "per", "please", "several", "shall", "should", "show", "some",
    "such", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "those", "under", "use", "using", "very", "via", "was", "were", "what", "when", "where",
    "which", "while", "who", "will", "with", "within", "you", "your", "contain", "contains",
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "sysml",
];

const CONTAINS: &[&str] = &["has", "have", "contains", "contain", "includes", "include", "with"];

const FILLERS: &[&str] = &[
    "a", "an", "the", "and", "or", "one", "two", "three", "four", "five", "six", "seven",
    "eight", "nine", "ten", "some", "several", "multiple", "many",
];

const OBLIGATIONS: &[&str] = &["must", "shall", "should"];

/// Deterministic, never empty SysML source derived from `prompt`.
pub fn fallback_source(prompt: &str) -> String {
    let mut parts: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut requirements: Vec<String> = Vec::new();

    for sentence in sentences(prompt) {
        let words = words(sentence);
        if words
            .iter()
            .any(|w| OBLIGATIONS.contains(&w.to_lowercase().as_str()))
        {
            requirements.push(sentence.trim().to_string());
            continue;
        }
        collect_concepts(&words, &mut parts);
    }

    let mut members: Vec<SyntaxNode> = parts
        .iter()
        .map(|(name, owned)| part_def(name, owned))
        .collect();
    members.extend(
        requirements
            .iter()
            .enumerate()
            .map(|(i, text)| requirement_def(i + 1, text)),
    );
    if members.is_empty() {
        members.push(part_def("System", &[]));
    }

    let package = SyntaxNode::new(ElementKind::Package, PACKAGE).with_children(members);
    print(&SourceFile::new(vec![package]), &PrintOptions::default())
}

fn collect_concepts(words: &[&str], parts: &mut IndexMap<String, Vec<String>>) {
    let concept_at = |i: usize| words.get(i).and_then(|w| concept(w));

    for (i, word) in words.iter().enumerate() {
        if let Some(name) = concept(word) {
            if parts.len() < MAX_CONCEPTS || parts.contains_key(&name) {
                parts.entry(name).or_default();
            }
        }

        if !CONTAINS.contains(&word.to_lowercase().as_str()) {
            continue;
        }
        let Some(owner) = i.checked_sub(1).and_then(&concept_at) else {
            continue;
        };
        let mut next = i + 1;
        while let Some(word) = words.get(next) {
            let lower = word.to_lowercase();
            if FILLERS.contains(&lower.as_str()) || word.chars().all(|c| c.is_ascii_digit()) {
                next += 1;
                continue;
            }
            let Some(part) = concept_at(next) else {
                break;
            };
            if part != owner && parts.contains_key(&owner) {
                let owned = parts.entry(owner.clone()).or_default();
                if !owned.contains(&part) {
                    owned.push(part);
                }
            }
            next += 1;
        }
    }
}

/// Definition name for a prompt word, if it reads as a noun.
fn concept(word: &str) -> Option<String> {
    let lower = word.to_lowercase();
    if lower.len() < 3 || STOPWORDS.contains(&lower.as_str()) {
        return None;
    }
    let singular = if let Some(stem) = lower.strip_suffix("ies") {
        format!("{stem}y")
    } else if lower.len() > 3 && lower.ends_with('s') && !lower.ends_with("ss") {
        lower[..lower.len() - 1].to_string()
    } else {
        lower
    };
    let mut chars = singular.chars();
    let name: String = chars
        .next()
        .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
        .unwrap_or_default();
    is_plain_identifier(&name).then_some(name)
}

fn usage_name(definition: &str) -> String {
    let mut chars = definition.chars();
    chars
        .next()
        .map(|first| first.to_ascii_lowercase().to_string() + chars.as_str())
        .unwrap_or_default()
}

fn part_def(name: &str, owned: &[String]) -> SyntaxNode {
    let children = owned
        .iter()
        .map(|part| {
            SyntaxNode::new(ElementKind::PartUsage, usage_name(part)).with_detail(
                NodeDetail::Usage(UsageDetail {
                    type_name: Some(part.as_str().into()),
                    ..UsageDetail::default()
                }),
            )
        })
        .collect();
    SyntaxNode::new(ElementKind::PartDef, name)
        .with_detail(NodeDetail::Definition(DefinitionDetail::default()))
        .with_children(children)
}

fn requirement_def(number: usize, text: &str) -> SyntaxNode {
    let doc = SyntaxNode::new(ElementKind::Doc, "").with_detail(NodeDetail::Doc(DocDetail {
        text: text.replace("*/", "* /"),
        about: Vec::new(),
    }));
    SyntaxNode::new(ElementKind::RequirementDef, format!("Requirement{number}"))
        .with_detail(NodeDetail::Definition(DefinitionDetail::default()))
        .with_children(vec![doc])
}

fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(['.', '!', '?', '\n'])
        .filter(|s| s.chars().any(char::is_alphanumeric))
}

fn words(sentence: &str) -> Vec<&str> {
    sentence
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .collect()
}
