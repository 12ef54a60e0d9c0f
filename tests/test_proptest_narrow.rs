//! Property-based laws of candidate narrowing.
//!
//! For any candidate list and any visibility assignment, `narrow` must agree
//! with a direct count of the visible candidates.
#![cfg(feature = "proptest")]

mod common;

use std::collections::HashSet;

use common::{World, requester};
use proptest::prelude::*;
use qualres::hir::{DeclId, NamespaceProvider, Narrowed, Requester, Target, VisibilityOracle, narrow};

struct AllowList(HashSet<DeclId>);

impl VisibilityOracle for AllowList {
    fn is_visible_from(&self, _ns: &dyn NamespaceProvider, decl: DeclId, _requester: &Requester) -> bool {
        self.0.contains(&decl)
    }
}

/// Visibility flags, one per candidate.
fn arb_flags() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 0..8)
}

proptest! {
    #[test]
    fn narrow_agrees_with_visible_count(flags in arb_flags()) {
        let mut world = World::new();
        let lib = world.package("lib");
        let ids: Vec<DeclId> = flags.iter().map(|_| world.ns.add_function(lib, "f")).collect();
        let visible: Vec<Target> = ids
            .iter()
            .zip(&flags)
            .filter(|(_, shown)| **shown)
            .map(|(&id, _)| Target::from(id))
            .collect();
        let oracle = AllowList(visible.iter().map(|t| t.decl()).collect());
        let candidates: Vec<Target> = ids.iter().copied().map(Target::from).collect();

        let narrowed = narrow(&oracle, &world.ns, &candidates, Some(&requester(lib)), false);

        match (candidates.first(), visible.len()) {
            (None, _) => prop_assert_eq!(narrowed, Narrowed::Unresolved),
            (Some(&first), 0) => prop_assert_eq!(narrowed, Narrowed::Invisible(first)),
            (Some(_), 1) => prop_assert_eq!(narrowed, Narrowed::Unique(visible[0])),
            (Some(_), _) => prop_assert_eq!(narrowed, Narrowed::Ambiguous(visible)),
        }
    }

    #[test]
    fn no_requester_keeps_everything(count in 1usize..6) {
        let mut world = World::new();
        let lib = world.package("lib");
        let candidates: Vec<Target> = (0..count).map(|_| Target::from(world.ns.add_function(lib, "f"))).collect();
        let oracle = AllowList(HashSet::new());

        let narrowed = narrow(&oracle, &world.ns, &candidates, None, false);
        if count == 1 {
            prop_assert_eq!(narrowed, Narrowed::Unique(candidates[0]));
        } else {
            prop_assert_eq!(narrowed, Narrowed::Ambiguous(candidates));
        }
    }
}
