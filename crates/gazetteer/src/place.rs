use std::collections::HashSet;

use foundation::Coordinates;
use serde::{Deserialize, Serialize};

/// One entry of the gazetteer.
///
/// `names` holds the canonical name first followed by aliases; matching is
/// exact and case-sensitive. A node without coordinates has no point of its
/// own but its children may.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceNode {
    pub names: Vec<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default, alias = "regions", alias = "cities")]
    pub children: Vec<PlaceNode>,
}

impl PlaceNode {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            coordinates: None,
            children: Vec::new(),
        }
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinates = Some(Coordinates::new(latitude, longitude));
        self
    }

    pub fn with_child(mut self, child: PlaceNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn canonical_name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    pub fn answers_to(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Aliases that appear on more than one sibling, reported as dot-joined paths
/// (`"US.TX"` means alias `TX` is ambiguous among the children of `US`).
pub fn overlapping_aliases(nodes: &[PlaceNode]) -> Vec<String> {
    let mut out = Vec::new();
    collect_overlaps(nodes, "", &mut out);
    out
}

fn collect_overlaps(nodes: &[PlaceNode], prefix: &str, out: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for node in nodes {
        // Duplicates inside a single node's own alias list are harmless.
        let own: HashSet<&str> = node.names.iter().map(String::as_str).collect();
        for name in own {
            if !seen.insert(name) {
                out.push(join_path(prefix, name));
            }
        }
    }
    for node in nodes {
        if let Some(name) = node.canonical_name() {
            collect_overlaps(&node.children, &join_path(prefix, name), out);
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}
