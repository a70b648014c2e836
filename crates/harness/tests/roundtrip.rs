use proptest::prelude::*;

use miro_core::{
    fragment::Fragment,
    operation::{Construct, Operation, OperationParts, Slot},
};

fn fragment() -> impl Strategy<Value = Fragment> {
    (
        prop::sample::select(vec!["Person", "Team"]),
        prop::option::of(prop::sample::select(vec!["", "u1", "u2"])),
        prop::collection::btree_map("[a-z]{1,6}", "[a-zA-Z ]{0,8}", 0..3),
    )
        .prop_map(|(object_type, about, props)| {
            let mut f = Fragment::new(object_type);
            if let Some(about) = about {
                f.set_about(about);
            }
            for (name, value) in props {
                f.push_property(name, value);
            }
            f
        })
}

fn legal_parts() -> impl Strategy<Value = OperationParts> {
    (
        prop::sample::select(Construct::ALL.to_vec()),
        prop::collection::vec(fragment(), 4),
        any::<bool>(),
    )
        .prop_map(|(construct, fragments, derive)| {
            let mut parts = OperationParts::new();
            for (slot, f) in Slot::ALL.into_iter().zip(fragments) {
                if !construct.has(slot) {
                    continue;
                }
                if slot == Slot::Match && derive && construct != Construct::M {
                    parts = parts.derive_match();
                } else {
                    parts = parts.with(slot, f);
                }
            }
            parts
        })
}

proptest! {
    #[test]
    fn built_operations_survive_the_wire(parts in legal_parts()) {
        let op = Operation::build(parts).unwrap();
        let decoded = Operation::from_msgpack(&op.to_msgpack().unwrap()).unwrap();

        prop_assert_eq!(decoded.construct(), op.construct());
        for slot in Slot::ALL {
            let (a, b) = (op.slot(slot), decoded.slot(slot));
            prop_assert_eq!(a.map(Fragment::about), b.map(Fragment::about));
            prop_assert_eq!(a.map(Fragment::property_count), b.map(Fragment::property_count));
        }
        prop_assert_eq!(decoded, op);
    }

    #[test]
    fn identity_lives_on_match(parts in legal_parts()) {
        let op = Operation::build(parts).unwrap();
        if let (Some(m), Some(i)) = (op.match_part(), op.insert_part()) {
            prop_assert_eq!(i.about(), "");
            prop_assert!(m.about_is_set());
        }
        if let (Some(m), Some(o)) = (op.match_part(), op.otherwise_insert_part()) {
            prop_assert!(o.about().is_empty() || o.about() != m.about());
        }
    }
}
