//! Hierarchy trees for the tri-state filter UI
//!
//! Trees enumerate every distinct path in the full (unfiltered) collection,
//! so unchecked branches stay visible. Builders emit all nodes checked;
//! [`Hierarchy::annotate`] derives checked/indeterminate flags from an
//! override map at read time.

use serde::Serialize;
use std::collections::HashMap;

use crate::models::{level_label, lesson_key, player_key, SessionRecord};

/// Which dimension a tree describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyKind {
    /// category -> level -> lesson
    Lessons,
    /// org -> account -> group -> player
    Players,
}

/// Tri-state reading of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Checked,
    Unchecked,
    Indeterminate,
}

/// One node of a hierarchy tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    pub label: String,
    pub checked: bool,
    pub indeterminate: bool,
    /// Override-map key; set on leaves only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            checked: true,
            indeterminate: false,
            key: None,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn state(&self) -> CheckState {
        match (self.checked, self.indeterminate) {
            (_, true) => CheckState::Indeterminate,
            (true, false) => CheckState::Checked,
            (false, false) => CheckState::Unchecked,
        }
    }

    /// Keys of every leaf at or below this node
    pub fn leaf_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        self.collect_leaf_keys(&mut keys);
        keys
    }

    fn collect_leaf_keys(&self, keys: &mut Vec<String>) {
        if let Some(key) = &self.key {
            keys.push(key.clone());
        }
        for child in &self.children {
            child.collect_leaf_keys(keys);
        }
    }

    /// Recompute flags; returns (included leaves, total leaves)
    fn annotate_in_place(&mut self, overrides: &HashMap<String, bool>) -> (usize, usize) {
        if self.is_leaf() {
            let included = self
                .key
                .as_ref()
                .map_or(true, |key| overrides.get(key) != Some(&false));
            self.checked = included;
            self.indeterminate = false;
            return (usize::from(included), 1);
        }

        let (included, total) = self
            .children
            .iter_mut()
            .map(|child| child.annotate_in_place(overrides))
            .fold((0, 0), |(i, t), (ci, ct)| (i + ci, t + ct));

        self.checked = included == total;
        self.indeterminate = included > 0 && included < total;
        (included, total)
    }
}

/// A distinct-value tree over one hierarchy dimension
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hierarchy {
    pub kind: HierarchyKind,
    pub roots: Vec<HierarchyNode>,
}

impl Hierarchy {
    pub fn new(kind: HierarchyKind) -> Self {
        Self {
            kind,
            roots: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Ensure the path exists; the last label is a leaf carrying `key`
    ///
    /// Nodes keep first-encounter order. Inserting an existing path is a
    /// no-op.
    pub fn insert_path(&mut self, labels: &[&str], key: String) {
        let Some((leaf_label, branch_labels)) = labels.split_last() else {
            return;
        };

        let mut level = &mut self.roots;
        for label in branch_labels {
            let idx = child_index(level, label);
            level = &mut level[idx].children;
        }

        let idx = child_index(level, leaf_label);
        level[idx].key.get_or_insert(key);
    }

    /// Node reached by following `labels` from the roots
    pub fn find(&self, labels: &[&str]) -> Option<&HierarchyNode> {
        let (first, rest) = labels.split_first()?;
        let mut node = self.roots.iter().find(|n| n.label == *first)?;
        for label in rest {
            node = node.children.iter().find(|n| n.label == *label)?;
        }
        Some(node)
    }

    /// Every leaf key in tree order
    pub fn leaf_keys(&self) -> Vec<String> {
        self.roots.iter().flat_map(HierarchyNode::leaf_keys).collect()
    }

    /// Copy of this tree with flags derived from `overrides`
    ///
    /// Leaves overridden to `false` are unchecked; a branch is checked when
    /// every leaf under it is included, unchecked when none is, and
    /// indeterminate otherwise.
    pub fn annotate(&self, overrides: &HashMap<String, bool>) -> Hierarchy {
        let mut annotated = self.clone();
        for root in &mut annotated.roots {
            root.annotate_in_place(overrides);
        }
        annotated
    }
}

fn child_index(level: &mut Vec<HierarchyNode>, label: &str) -> usize {
    match level.iter().position(|n| n.label == label) {
        Some(idx) => idx,
        None => {
            level.push(HierarchyNode::new(label));
            level.len() - 1
        }
    }
}

/// category -> `Lv.{level}` -> lesson
pub fn build_lesson_hierarchy(records: &[SessionRecord]) -> Hierarchy {
    let mut tree = Hierarchy::new(HierarchyKind::Lessons);
    for record in records {
        let level = level_label(record.level);
        tree.insert_path(
            &[record.category.as_str(), level.as_str(), record.lesson.as_str()],
            lesson_key(&record.category, record.level, &record.lesson),
        );
    }
    tree
}

/// org -> account -> group -> player
pub fn build_player_hierarchy(records: &[SessionRecord]) -> Hierarchy {
    let mut tree = Hierarchy::new(HierarchyKind::Players);
    for record in records {
        tree.insert_path(
            &[
                record.org.as_str(),
                record.account.as_str(),
                record.group.as_str(),
                record.player.as_str(),
            ],
            player_key(&record.org, &record.account, &record.group, &record.player),
        );
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(org: &str, group: &str, player: &str, category: &str, level: i64, lesson: &str) -> SessionRecord {
        SessionRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            org: org.into(),
            account: "Main".into(),
            group: group.into(),
            player: player.into(),
            category: category.into(),
            level,
            lesson: lesson.into(),
            score: 50,
            speech_time: 0.0,
            play_time: 0.0,
        }
    }

    fn sample() -> Vec<SessionRecord> {
        vec![
            rec("Acme", "A", "Sato", "Sales", 1, "Greeting"),
            rec("Acme", "A", "Ito", "Sales", 2, "Closing"),
            rec("Acme", "B", "Kato", "Support", 1, "Refund"),
            rec("Acme", "A", "Sato", "Sales", 1, "Greeting"),
            rec("Beta", "C", "Mori", "Sales", 1, "Pricing"),
        ]
    }

    #[test]
    fn test_lesson_tree_shape() {
        let tree = build_lesson_hierarchy(&sample());
        assert_eq!(tree.kind, HierarchyKind::Lessons);
        let labels: Vec<_> = tree.roots.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Sales", "Support"]);

        let sales = &tree.roots[0];
        let levels: Vec<_> = sales.children.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(levels, vec!["Lv.1", "Lv.2"]);
        assert_eq!(sales.children[0].children.len(), 2);

        let leaf = tree.find(&["Sales", "Lv.1", "Greeting"]).unwrap();
        assert!(leaf.is_leaf());
        assert_eq!(leaf.key.as_deref(), Some("Sales|Lv.1|Greeting"));
        assert!(leaf.checked);
    }

    #[test]
    fn test_player_tree_shape() {
        let tree = build_player_hierarchy(&sample());
        assert_eq!(tree.roots.len(), 2);
        let group_a = tree.find(&["Acme", "Main", "A"]).unwrap();
        assert_eq!(group_a.children.len(), 2);
        assert_eq!(tree.leaf_keys().len(), 4);
        assert!(tree.leaf_keys().contains(&"Beta|Main|C|Mori".to_string()));
    }

    #[test]
    fn test_build_is_idempotent() {
        let records = sample();
        assert_eq!(build_lesson_hierarchy(&records), build_lesson_hierarchy(&records));
        assert_eq!(build_player_hierarchy(&records), build_player_hierarchy(&records));
    }

    #[test]
    fn test_empty_records() {
        assert!(build_lesson_hierarchy(&[]).is_empty());
        assert!(build_player_hierarchy(&[]).is_empty());
    }

    #[test]
    fn test_annotate_tri_state() {
        let tree = build_player_hierarchy(&sample());
        let mut overrides = HashMap::new();
        overrides.insert("Acme|Main|A|Sato".to_string(), false);

        let annotated = tree.annotate(&overrides);
        let acme = annotated.find(&["Acme"]).unwrap();
        assert_eq!(acme.state(), CheckState::Indeterminate);
        let group_a = annotated.find(&["Acme", "Main", "A"]).unwrap();
        assert_eq!(group_a.state(), CheckState::Indeterminate);
        let group_b = annotated.find(&["Acme", "Main", "B"]).unwrap();
        assert_eq!(group_b.state(), CheckState::Checked);
        let sato = annotated.find(&["Acme", "Main", "A", "Sato"]).unwrap();
        assert_eq!(sato.state(), CheckState::Unchecked);

        overrides.insert("Acme|Main|A|Ito".to_string(), false);
        let annotated = tree.annotate(&overrides);
        assert_eq!(
            annotated.find(&["Acme", "Main", "A"]).unwrap().state(),
            CheckState::Unchecked
        );
        assert_eq!(annotated.find(&["Acme"]).unwrap().state(), CheckState::Indeterminate);
    }

    #[test]
    fn test_rechecked_override_counts_as_included() {
        let tree = build_lesson_hierarchy(&sample());
        let mut overrides = HashMap::new();
        overrides.insert("Support|Lv.1|Refund".to_string(), false);
        assert_eq!(
            tree.annotate(&overrides).find(&["Support"]).unwrap().state(),
            CheckState::Unchecked
        );

        overrides.insert("Support|Lv.1|Refund".to_string(), true);
        assert_eq!(
            tree.annotate(&overrides).find(&["Support"]).unwrap().state(),
            CheckState::Checked
        );
    }

    #[test]
    fn test_annotate_does_not_touch_source() {
        let tree = build_lesson_hierarchy(&sample());
        let mut overrides = HashMap::new();
        overrides.insert("Sales|Lv.2|Closing".to_string(), false);
        let _ = tree.annotate(&overrides);
        assert!(tree.roots.iter().all(|n| n.checked && !n.indeterminate));
    }

    #[test]
    fn test_leaf_keys_under_branch() {
        let tree = build_lesson_hierarchy(&sample());
        let mut keys = tree.find(&["Sales"]).unwrap().leaf_keys();
        keys.sort();
        assert_eq!(
            keys,
            vec!["Sales|Lv.1|Greeting", "Sales|Lv.1|Pricing", "Sales|Lv.2|Closing"]
        );
    }
}
