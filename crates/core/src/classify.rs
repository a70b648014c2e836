//! Read-only classification of built operations.

use crate::operation::{Construct, Operation, Slot};

impl Operation {
    /// The canonical `M`/`I`/`R`/`O` letter subsequence.
    pub fn construct_string(&self) -> &'static str {
        self.construct().as_str()
    }

    pub fn is_add(&self) -> bool {
        self.construct() == Construct::O
    }

    pub fn is_delete(&self) -> bool {
        self.construct() == Construct::M
    }

    /// A delete whose match asserts no properties removes the object itself
    /// rather than a subset of its properties.
    pub fn removes_whole_object(&self) -> bool {
        self.is_delete() && self.match_part().is_some_and(|m| m.is_identity_only())
    }

    /// An `MR` operation where both parts carry an identifier and nothing else.
    pub fn is_move(&self) -> bool {
        if self.construct() != Construct::MR {
            return false;
        }
        match (self.match_part(), self.replace_part()) {
            (Some(m), Some(r)) => {
                m.has_identity() && r.has_identity() && m.is_identity_only() && r.is_identity_only()
            }
            _ => false,
        }
    }

    /// Same test as [`Operation::is_move`].
    pub fn is_rename(&self) -> bool {
        self.is_move()
    }

    /// Non-empty identifiers this operation touches: match, then replace,
    /// then otherwiseInsert.
    pub fn affected_identities(&self) -> Vec<&str> {
        [Slot::Match, Slot::Replace, Slot::OtherwiseInsert]
            .into_iter()
            .filter_map(|slot| self.slot(slot))
            .map(|f| f.about())
            .filter(|about| !about.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::fragment::Fragment;
    use crate::operation::{Operation, OperationParts};

    fn person(about: &str) -> Fragment {
        Fragment::new("Person").with_about(about)
    }

    #[test]
    fn add_is_only_o() {
        let op = Operation::add(person("u1")).unwrap();
        assert!(op.is_add());
        assert!(!op.is_delete());
        assert_eq!(op.construct_string(), "O");
        assert_eq!(op.affected_identities(), vec!["u1"]);
    }

    #[test]
    fn identity_only_delete_removes_whole_object() {
        let op = Operation::delete(person("http://www.mlb.com/players#jeter_derek")).unwrap();
        assert!(op.is_delete());
        assert!(op.removes_whole_object());
    }

    #[test]
    fn property_delete_keeps_object() {
        let op = Operation::delete(person("u1").with_property("givenName", "Derek")).unwrap();
        assert!(op.is_delete());
        assert!(!op.removes_whole_object());
    }

    #[test]
    fn move_and_rename_agree() {
        let nyy = "http://www.mlb.com/nyy/player#jeter_derek";
        let oak = "http://www.mlb.com/oak/player#jeter_derek";
        let op = Operation::replace(person(nyy), person(oak)).unwrap();
        assert_eq!(op.construct_string(), "MR");
        assert!(op.is_move());
        assert!(op.is_rename());
        assert_eq!(op.affected_identities(), vec![nyy, oak]);

        let op = Operation::replace(person("A"), person("A")).unwrap();
        assert!(op.is_move());
        assert!(op.is_rename());

        let surname = Fragment::new("Person").with_property("surName", "Jeter");
        let op = Operation::replace(person(nyy), surname).unwrap();
        assert!(!op.is_move());
        assert!(!op.is_rename());
    }

    #[test]
    fn move_requires_both_identities() {
        let op = Operation::replace(person("A"), Fragment::new("Person")).unwrap();
        assert!(!op.is_move());

        let op = Operation::build(
            OperationParts::new()
                .with_match(person("A"))
                .with_replace(person("B"))
                .with_otherwise_insert(person("C")),
        )
        .unwrap();
        assert!(!op.is_move(), "MRO is not a move");
    }

    #[test]
    fn affected_identities_skips_empty() {
        let op = Operation::insert_or_add(
            person("u1"),
            Fragment::new("Person").with_property("nickname", "DJ"),
            person("u1").with_property("givenName", "Derek"),
        )
        .unwrap();
        // otherwiseInsert restated the match and was cleared
        assert_eq!(op.affected_identities(), vec!["u1"]);

        let op = Operation::add(Fragment::new("Person").with_property("givenName", "Derek")).unwrap();
        assert!(op.affected_identities().is_empty());
    }
}
