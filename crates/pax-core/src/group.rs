//! # Entity Groups
//!
//! Named sets of entity type tags and prefab names. Group names are the
//! vocabulary permission rules are written in. The persisted form keeps
//! members and exclusions as comma-joined text, which is how operators
//! author them.

use serde::{Deserialize, Serialize};

use crate::entity::EntitySnapshot;

/// A named group of entity types and prefabs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityGroup {
    pub name: String,
    /// Type tags and prefab names belonging to the group.
    #[serde(default, with = "comma_list")]
    pub members: Vec<String>,
    /// Type tags and prefab names carved out of the group.
    #[serde(default, with = "comma_list")]
    pub exclusions: Vec<String>,
}

impl EntityGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            exclusions: Vec::new(),
        }
    }

    pub fn add_member(&mut self, tag: impl Into<String>) {
        self.members.push(tag.into());
    }

    pub fn add_exclusion(&mut self, tag: impl Into<String>) {
        self.exclusions.push(tag.into());
    }

    /// Membership test: the entity's type tag or prefab matches a member
    /// and matches no exclusion. Matching is exact.
    pub fn contains(&self, entity: &EntitySnapshot) -> bool {
        Self::matches(&self.members, entity) && !Self::matches(&self.exclusions, entity)
    }

    fn matches(list: &[String], entity: &EntitySnapshot) -> bool {
        list.iter()
            .any(|tag| tag == &entity.type_tag || tag == &entity.prefab)
    }

    /// Case-insensitive test against the exclusion list alone, used by the
    /// SAM targeting path to exempt attacker prefabs.
    pub fn excludes_prefab(&self, prefab: &str) -> bool {
        self.exclusions
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(prefab))
    }
}

/// Comma-joined text form for member and exclusion lists.
mod comma_list {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(list: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&list.join(", "))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;

    fn group(members: &[&str], exclusions: &[&str]) -> EntityGroup {
        EntityGroup {
            name: "test".into(),
            members: members.iter().map(|s| s.to_string()).collect(),
            exclusions: exclusions.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_matches_type_tag_or_prefab() {
        let g = group(&["player", "spikes.floor"], &[]);
        let by_tag = EntitySnapshot::new(1, "player", EntityKind::Player);
        let by_prefab =
            EntitySnapshot::new(2, "trap", EntityKind::Trap).with_prefab("spikes.floor");
        assert!(g.contains(&by_tag));
        assert!(g.contains(&by_prefab));
        assert!(!g.contains(&EntitySnapshot::new(3, "door", EntityKind::Door)));
    }

    #[test]
    fn test_exclusion_overrides_membership() {
        let g = group(&["storage_box"], &["box.wooden.large"]);
        let plain = EntitySnapshot::new(1, "storage_box", EntityKind::Storage);
        let excluded = EntitySnapshot::new(2, "storage_box", EntityKind::Storage)
            .with_prefab("box.wooden.large");
        assert!(g.contains(&plain));
        assert!(!g.contains(&excluded));
    }

    #[test]
    fn test_member_matching_is_case_sensitive() {
        let g = group(&["Player"], &[]);
        assert!(!g.contains(&EntitySnapshot::new(1, "player", EntityKind::Player)));
    }

    #[test]
    fn test_excludes_prefab_is_case_insensitive() {
        let g = group(&[], &["Minicopter.Entity"]);
        assert!(g.excludes_prefab("minicopter.entity"));
        assert!(!g.excludes_prefab("scrap_heli"));
    }

    #[test]
    fn test_comma_list_round_trip() {
        let g = group(&["corpse", "heli_debris"], &[]);
        let json = serde_json::to_string(&g).unwrap();
        assert!(json.contains("\"corpse, heli_debris\""));
        assert!(json.contains("\"exclusions\":\"\""));
        let back: EntityGroup = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn test_comma_list_trims_and_drops_empties() {
        let json = r#"{"name":"g","members":" a ,  b,, c ","exclusions":""}"#;
        let g: EntityGroup = serde_json::from_str(&json).unwrap();
        assert_eq!(g.members, vec!["a", "b", "c"]);
        assert!(g.exclusions.is_empty());
    }
}
