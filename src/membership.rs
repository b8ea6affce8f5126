use std::collections::HashSet;

use derive_new::new;

use crate::errors::{ClusterMapError, Result};

/// A named set of locus tags
///
/// Members are not required to be present in the reference order.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Group {
    pub name: String,
    pub members: Vec<String>,
}

/// Groups in the order they were supplied
///
/// Group names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupMembership {
    groups: Vec<Group>,
    names: HashSet<String>,
}

impl GroupMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a group, failing if its name is already taken
    pub fn insert(&mut self, name: impl Into<String>, members: Vec<String>) -> Result<()> {
        let name = name.into();
        if !self.names.insert(name.clone()) {
            return Err(ClusterMapError::DuplicateGroup(name));
        }
        self.groups.push(Group::new(name, members));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut membership = GroupMembership::new();
        membership.insert("Motility", vec!["g2".into()]).unwrap();
        membership.insert("Secretion", vec![]).unwrap();
        membership.insert("Adhesion", vec!["g1".into()]).unwrap();
        let names = membership.names().collect::<Vec<_>>();
        assert_eq!(names, vec!["Motility", "Secretion", "Adhesion"]);
        assert_eq!(membership.len(), 3);
    }

    #[test]
    fn test_duplicate_group_rejected() {
        let mut membership = GroupMembership::new();
        membership.insert("LPS", vec![]).unwrap();
        let result = membership.insert("LPS", vec!["g1".into()]);
        assert!(matches!(result, Err(ClusterMapError::DuplicateGroup(name)) if name == "LPS"));
        assert_eq!(membership.len(), 1);
    }

    #[test]
    fn test_get() {
        let mut membership = GroupMembership::new();
        membership.insert("Phages", vec!["g7".into()]).unwrap();
        assert_eq!(membership.get("Phages").unwrap().members, vec!["g7"]);
        assert!(membership.get("Cytochrome").is_none());
    }
}
