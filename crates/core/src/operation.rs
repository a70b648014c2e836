use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::fragment::Fragment;
use crate::schema::Restrictions;

/// One of the four named parts of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Match,
    Insert,
    Replace,
    OtherwiseInsert,
}

impl Slot {
    /// Canonical order; construct strings are always spelled in this order.
    pub const ALL: [Slot; 4] = [Slot::Match, Slot::Insert, Slot::Replace, Slot::OtherwiseInsert];

    pub fn letter(self) -> char {
        match self {
            Self::Match => 'M',
            Self::Insert => 'I',
            Self::Replace => 'R',
            Self::OtherwiseInsert => 'O',
        }
    }

    /// Name of the slot on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::Insert => "insert",
            Self::Replace => "replace",
            Self::OtherwiseInsert => "otherwiseInsert",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Slot {
    type Err = CoreError;

    /// Accepts either the single-letter alias or the full slot name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" | "match" => Ok(Self::Match),
            "I" | "insert" => Ok(Self::Insert),
            "R" | "replace" => Ok(Self::Replace),
            "O" | "otherwiseInsert" => Ok(Self::OtherwiseInsert),
            _ => Err(CoreError::UnknownSlot(s.to_string())),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The legal combinations of populated slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    M,
    MI,
    MR,
    MO,
    MIR,
    MIO,
    MRO,
    MIRO,
    O,
}

impl Construct {
    pub const ALL: [Construct; 9] = [
        Construct::M,
        Construct::MI,
        Construct::MR,
        Construct::MO,
        Construct::MIR,
        Construct::MIO,
        Construct::MRO,
        Construct::MIRO,
        Construct::O,
    ];

    /// Maps slot presence (in M, I, R, O order) to a legal shape.
    pub fn from_slots(present: [bool; 4]) -> Result<Self, CoreError> {
        let construct = match present {
            [true, false, false, false] => Self::M,
            [true, true, false, false] => Self::MI,
            [true, false, true, false] => Self::MR,
            [true, false, false, true] => Self::MO,
            [true, true, true, false] => Self::MIR,
            [true, true, false, true] => Self::MIO,
            [true, false, true, true] => Self::MRO,
            [true, true, true, true] => Self::MIRO,
            [false, false, false, true] => Self::O,
            _ => {
                return Err(CoreError::InvalidConstruct {
                    construct: letters(present),
                });
            }
        };
        Ok(construct)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::M => "M",
            Self::MI => "MI",
            Self::MR => "MR",
            Self::MO => "MO",
            Self::MIR => "MIR",
            Self::MIO => "MIO",
            Self::MRO => "MRO",
            Self::MIRO => "MIRO",
            Self::O => "O",
        }
    }

    pub fn has(self, slot: Slot) -> bool {
        self.as_str().contains(slot.letter())
    }
}

impl FromStr for Construct {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::InvalidConstruct {
                construct: s.to_string(),
            })
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn letters(present: [bool; 4]) -> String {
    Slot::ALL
        .iter()
        .zip(present)
        .filter(|(_, p)| *p)
        .map(|(s, _)| s.letter())
        .collect()
}

/// Fragments handed to [`Operation::build`], keyed by slot.
///
/// The builder takes ownership; normalization never reaches back into a
/// fragment the caller still holds.
#[derive(Debug, Clone, Default)]
pub struct OperationParts {
    slots: [Option<Fragment>; 4],
    derive_match: bool,
}

impl OperationParts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, slot: Slot, fragment: Fragment) -> Self {
        self.slots[slot.index()] = Some(fragment);
        self
    }

    pub fn with_match(self, fragment: Fragment) -> Self {
        self.with(Slot::Match, fragment)
    }

    pub fn with_insert(self, fragment: Fragment) -> Self {
        self.with(Slot::Insert, fragment)
    }

    pub fn with_replace(self, fragment: Fragment) -> Self {
        self.with(Slot::Replace, fragment)
    }

    pub fn with_otherwise_insert(self, fragment: Fragment) -> Self {
        self.with(Slot::OtherwiseInsert, fragment)
    }

    /// Declares the match slot without a fragment; the builder derives one
    /// from the first populated insert/replace/otherwiseInsert part.
    pub fn derive_match(mut self) -> Self {
        self.derive_match = true;
        self
    }

    /// Sets a slot by letter alias or full name.
    ///
    /// `None` under the match slot requests derivation; `None` under any other
    /// slot leaves it unpopulated.
    pub fn set_named(&mut self, name: &str, fragment: Option<Fragment>) -> Result<(), CoreError> {
        let slot: Slot = name.parse()?;
        match (slot, fragment) {
            (_, Some(f)) => self.slots[slot.index()] = Some(f),
            (Slot::Match, None) => self.derive_match = true,
            (_, None) => self.slots[slot.index()] = None,
        }
        Ok(())
    }

    pub fn from_named<'a, I>(entries: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (&'a str, Option<Fragment>)>,
    {
        let mut parts = Self::new();
        for (name, fragment) in entries {
            parts.set_named(name, fragment)?;
        }
        Ok(parts)
    }

    fn present(&self) -> [bool; 4] {
        [
            self.slots[0].is_some() || self.derive_match,
            self.slots[1].is_some(),
            self.slots[2].is_some(),
            self.slots[3].is_some(),
        ]
    }
}

/// A conditional mutation: match, insert, replace and otherwise-insert parts.
///
/// Identity lives on `match` once built; the other parts carry an about only
/// when it says something the match does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOperation")]
pub struct Operation {
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    matching: Option<Fragment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    insert: Option<Fragment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replace: Option<Fragment>,
    #[serde(rename = "otherwiseInsert", skip_serializing_if = "Option::is_none")]
    otherwise_insert: Option<Fragment>,
    /// Shape recorded when the slots were checked; implied by the slots on the wire.
    #[serde(skip)]
    construct: Construct,
}

impl Operation {
    /// Validates the slot combination and normalizes identities.
    pub fn build(parts: OperationParts) -> Result<Self, CoreError> {
        let construct = Construct::from_slots(parts.present())?;
        let OperationParts {
            slots: [mut matching, mut insert, mut replace, mut otherwise_insert],
            ..
        } = parts;

        for fragment in [&mut matching, &mut insert, &mut replace, &mut otherwise_insert]
            .into_iter()
            .flatten()
        {
            fragment.mark_about_checked();
        }

        if construct.has(Slot::Match) && matching.is_none() {
            let source = [insert.as_mut(), replace.as_mut(), otherwise_insert.as_mut()]
                .into_iter()
                .flatten()
                .next()
                .ok_or(CoreError::MissingMatchSpecification)?;
            let derived = source.same_type_identity();
            source.clear_about();
            matching = Some(derived);
        }

        if let Some(m) = &matching {
            if let Some(o) = otherwise_insert.as_mut() {
                if o.about() == m.about() {
                    o.clear_about();
                }
            }
            // A property-less replace names the new identity of the object.
            if let Some(r) = replace.as_mut() {
                if r.has_identity() && !r.is_identity_only() && r.about() == m.about() {
                    r.clear_about();
                }
            }
            if let Some(i) = insert.as_mut() {
                if i.has_identity() {
                    i.clear_about();
                }
            }
        }

        Ok(Self {
            matching,
            insert,
            replace,
            otherwise_insert,
            construct,
        })
    }

    /// Unconditional add (`O`).
    pub fn add(fragment: Fragment) -> Result<Self, CoreError> {
        Self::build(OperationParts::new().with_otherwise_insert(fragment))
    }

    /// Delete (`M`): the whole object if `fragment` asserts no properties,
    /// otherwise just the asserted ones.
    pub fn delete(fragment: Fragment) -> Result<Self, CoreError> {
        Self::build(OperationParts::new().with_match(fragment))
    }

    /// Match + insert (`MI`). Without an explicit match one is derived from
    /// the insert fragment's class and identifier.
    pub fn insert(insert: Fragment, matching: Option<Fragment>) -> Result<Self, CoreError> {
        let parts = OperationParts::new().with_insert(insert);
        let parts = match matching {
            Some(m) => parts.with_match(m),
            None => parts.derive_match(),
        };
        Self::build(parts)
    }

    /// Insert if `matching` resolves, otherwise add (`MIO`).
    pub fn insert_or_add(matching: Fragment, insert: Fragment, add: Fragment) -> Result<Self, CoreError> {
        Self::build(
            OperationParts::new()
                .with_match(matching)
                .with_insert(insert)
                .with_otherwise_insert(add),
        )
    }

    /// Match + replace (`MR`).
    pub fn replace(matching: Fragment, replace: Fragment) -> Result<Self, CoreError> {
        Self::build(OperationParts::new().with_match(matching).with_replace(replace))
    }

    /// Replace if `matching` resolves, otherwise add (`MRO`).
    pub fn replace_or_add(matching: Fragment, replace: Fragment, add: Fragment) -> Result<Self, CoreError> {
        Self::build(
            OperationParts::new()
                .with_match(matching)
                .with_replace(replace)
                .with_otherwise_insert(add),
        )
    }

    pub fn construct(&self) -> Construct {
        self.construct
    }

    pub fn slot(&self, slot: Slot) -> Option<&Fragment> {
        match slot {
            Slot::Match => self.matching.as_ref(),
            Slot::Insert => self.insert.as_ref(),
            Slot::Replace => self.replace.as_ref(),
            Slot::OtherwiseInsert => self.otherwise_insert.as_ref(),
        }
    }

    pub fn match_part(&self) -> Option<&Fragment> {
        self.matching.as_ref()
    }

    pub fn insert_part(&self) -> Option<&Fragment> {
        self.insert.as_ref()
    }

    pub fn replace_part(&self) -> Option<&Fragment> {
        self.replace.as_ref()
    }

    pub fn otherwise_insert_part(&self) -> Option<&Fragment> {
        self.otherwise_insert.as_ref()
    }

    /// Populated parts in canonical order.
    pub fn parts(&self) -> impl Iterator<Item = (Slot, &Fragment)> {
        Slot::ALL
            .into_iter()
            .filter_map(|slot| self.slot(slot).map(|f| (slot, f)))
    }

    pub(crate) fn present(&self) -> [bool; 4] {
        Slot::ALL.map(|slot| self.slot(slot).is_some())
    }

    /// Checks every part against `restrictions`, then re-checks the shape.
    pub fn verify(&self, restrictions: &dyn Restrictions) -> Result<(), CoreError> {
        for (_, fragment) in self.parts() {
            fragment.within_restrictions(restrictions)?;
        }
        Construct::from_slots(self.present())?;
        Ok(())
    }
}

/// Decoded form of an [`Operation`] before its shape has been checked.
#[derive(Deserialize)]
struct RawOperation {
    #[serde(rename = "match", default)]
    matching: Option<Fragment>,
    #[serde(default)]
    insert: Option<Fragment>,
    #[serde(default)]
    replace: Option<Fragment>,
    #[serde(rename = "otherwiseInsert", default)]
    otherwise_insert: Option<Fragment>,
}

impl TryFrom<RawOperation> for Operation {
    type Error = CoreError;

    fn try_from(raw: RawOperation) -> Result<Self, Self::Error> {
        let present = [
            raw.matching.is_some(),
            raw.insert.is_some(),
            raw.replace.is_some(),
            raw.otherwise_insert.is_some(),
        ];
        Ok(Self {
            construct: Construct::from_slots(present)?,
            matching: raw.matching,
            insert: raw.insert,
            replace: raw.replace,
            otherwise_insert: raw.otherwise_insert,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ClassDef, ClassSchema, Unrestricted};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn from_slots_accepts_exactly_the_nine_shapes(
            present in proptest::array::uniform4(any::<bool>())
        ) {
            let legal = present[0] || present == [false, false, false, true];
            match Construct::from_slots(present) {
                Ok(construct) => {
                    prop_assert!(legal);
                    let expected = letters(present);
                    prop_assert_eq!(construct.as_str(), expected.as_str());
                    for slot in Slot::ALL {
                        prop_assert_eq!(construct.has(slot), present[slot.index()]);
                    }
                    prop_assert_eq!(construct.as_str().parse::<Construct>().ok(), Some(construct));
                }
                Err(err) => {
                    prop_assert!(!legal);
                    let is_invalid_construct = matches!(err, CoreError::InvalidConstruct { .. });
                    prop_assert!(is_invalid_construct);
                }
            }
        }
    }

    fn person(about: &str) -> Fragment {
        Fragment::new("Person").with_about(about)
    }

    fn parts_for(present: [bool; 4]) -> OperationParts {
        let mut parts = OperationParts::new();
        for (slot, p) in Slot::ALL.into_iter().zip(present) {
            if p {
                parts = parts.with(slot, person("u1").with_property("givenName", "Derek"));
            }
        }
        parts
    }

    #[test]
    fn all_sixteen_subsets() {
        let mut legal = 0;
        for bits in 0u8..16 {
            let present = [bits & 8 != 0, bits & 4 != 0, bits & 2 != 0, bits & 1 != 0];
            let name = letters(present);
            match Operation::build(parts_for(present)) {
                Ok(op) => {
                    legal += 1;
                    assert_eq!(op.construct().as_str(), name);
                }
                Err(CoreError::InvalidConstruct { construct }) => {
                    assert_eq!(construct, name);
                    assert!(name.parse::<Construct>().is_err());
                }
                Err(other) => panic!("unexpected error for {name:?}: {other:?}"),
            }
        }
        assert_eq!(legal, 9);
    }

    #[test]
    fn slot_aliases() {
        for slot in Slot::ALL {
            assert_eq!(slot.name().parse::<Slot>().unwrap(), slot);
            assert_eq!(slot.letter().to_string().parse::<Slot>().unwrap(), slot);
        }
        assert!(matches!("Match".parse::<Slot>(), Err(CoreError::UnknownSlot(_))));
    }

    #[test]
    fn named_parts_use_canonical_order() {
        let parts = OperationParts::from_named([
            ("otherwiseInsert", Some(person("u2"))),
            ("R", Some(Fragment::new("Person").with_property("surName", "Jeter"))),
            ("match", Some(person("u1"))),
        ])
        .unwrap();
        let op = Operation::build(parts).unwrap();
        assert_eq!(op.construct_string(), "MRO");
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = OperationParts::from_named([("delete", Some(person("u1")))]).unwrap_err();
        assert!(matches!(err, CoreError::UnknownSlot(name) if name == "delete"));
    }

    #[test]
    fn unset_about_becomes_empty_marker() {
        let op = Operation::add(Fragment::new("Person").with_property("givenName", "Derek")).unwrap();
        let o = op.otherwise_insert_part().unwrap();
        assert!(o.about_is_set());
        assert_eq!(o.about(), "");
    }

    #[test]
    fn add_keeps_identity_on_otherwise_insert() {
        let op = Operation::add(person("u1")).unwrap();
        assert_eq!(op.construct(), Construct::O);
        assert!(op.match_part().is_none());
        assert_eq!(op.otherwise_insert_part().unwrap().about(), "u1");
    }

    #[test]
    fn derived_match_moves_identity() {
        let p = person("http://www.mlb.com/players/jeter_derek/").with_property("givenName", "Derek");
        let parts = OperationParts::from_named([("O", Some(p)), ("M", None)]).unwrap();
        let op = Operation::build(parts).unwrap();
        assert_eq!(op.construct_string(), "MO");
        let m = op.match_part().unwrap();
        assert_eq!(m.about(), "http://www.mlb.com/players/jeter_derek/");
        assert_eq!(m.object_type(), "Person");
        assert!(m.is_identity_only());
        let o = op.otherwise_insert_part().unwrap();
        assert_eq!(o.about(), "");
        assert_eq!(o.property_count(), 1);
    }

    #[test]
    fn derive_prefers_insert_then_replace() {
        let op = Operation::build(
            OperationParts::new()
                .derive_match()
                .with_replace(Fragment::new("Team").with_about("r1").with_property("name", "x"))
                .with_insert(Fragment::new("Person").with_about("i1").with_property("age", 3)),
        )
        .unwrap();
        let m = op.match_part().unwrap();
        assert_eq!(m.object_type(), "Person");
        assert_eq!(m.about(), "i1");
        assert_eq!(op.insert_part().unwrap().about(), "");
        assert_eq!(op.replace_part().unwrap().about(), "r1");
    }

    #[test]
    fn match_without_any_source_is_missing() {
        let err = Operation::build(OperationParts::new().derive_match()).unwrap_err();
        assert!(matches!(err, CoreError::MissingMatchSpecification));
    }

    #[test]
    fn otherwise_insert_restating_match_is_cleared() {
        let op = Operation::insert_or_add(
            person("u1"),
            Fragment::new("Person").with_property("nickname", "DJ"),
            person("u1").with_property("givenName", "Derek"),
        )
        .unwrap();
        assert_eq!(op.otherwise_insert_part().unwrap().about(), "");

        let op = Operation::build(
            OperationParts::new()
                .with_match(person("u1"))
                .with_otherwise_insert(person("u2")),
        )
        .unwrap();
        assert_eq!(op.otherwise_insert_part().unwrap().about(), "u2");
    }

    #[test]
    fn insert_about_always_cleared_under_match() {
        let op = Operation::insert(
            person("u9").with_property("nickname", "DJ"),
            Some(person("u1")),
        )
        .unwrap();
        assert_eq!(op.match_part().unwrap().about(), "u1");
        assert_eq!(op.insert_part().unwrap().about(), "");
    }

    #[test]
    fn replace_with_properties_restating_match_is_cleared() {
        let op = Operation::replace(
            person("u1"),
            person("u1").with_property("surName", "Jeter"),
        )
        .unwrap();
        assert_eq!(op.replace_part().unwrap().about(), "");
    }

    #[test]
    fn identity_only_replace_keeps_target() {
        let op = Operation::replace(person("A"), person("A")).unwrap();
        assert_eq!(op.replace_part().unwrap().about(), "A");
        let op = Operation::replace(person("A"), person("B")).unwrap();
        assert_eq!(op.replace_part().unwrap().about(), "B");
    }

    #[test]
    fn replace_with_other_identity_is_kept() {
        let op = Operation::replace(
            person("u1"),
            person("u2").with_property("surName", "Jeter"),
        )
        .unwrap();
        assert_eq!(op.replace_part().unwrap().about(), "u2");
    }

    #[test]
    fn verify_delegates_to_restrictions() {
        let schema = ClassSchema::new().class("Person", ClassDef::new().property_max("givenName", 1));
        let ok = Operation::add(person("u1").with_property("givenName", "Derek")).unwrap();
        assert!(ok.verify(&schema).is_ok());
        assert!(ok.verify(&Unrestricted).is_ok());

        let bad = Operation::add(person("u1").with_property("salary", 1)).unwrap();
        assert!(matches!(
            bad.verify(&schema),
            Err(CoreError::RestrictionViolation { .. })
        ));
    }
}
