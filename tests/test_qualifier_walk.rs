//! Namespace walks over qualifier paths in import, type and expression
//! position.

mod common;

use std::sync::Arc;

use common::{World, codes_of, requester, trace};
use qualres::hir::{
    ClassKind, DeclId, LexicalScope, PrefixResolution, Qualifier, QualifierPath, QualifierPosition,
    ResolutionOutcome, Visibility, codes, unroll_to_leftmost,
};
use qualres::syntax::CallOp;
use rstest::rstest;

// ============================================================================
// PREFIX DETERMINISM
// ============================================================================

#[rstest]
#[case::import(QualifierPosition::Import, 1)]
#[case::type_position(QualifierPosition::Type, 1)]
#[case::expression(QualifierPosition::Expression, 0)]
fn test_missing_segment_stops_at_package(#[case] position: QualifierPosition, #[case] expected_diagnostics: usize) {
    let mut world = World::new();
    let ab = world.package("a.b");
    let app = world.package("app");
    let mut tree = world.tree(0);
    let ty = tree.dotted_type("a.b.c");
    let (_, resolver) = world.resolver();

    let path = QualifierPath::from_user_type(&tree, ty);
    let scope = LexicalScope::file(requester(app), None);
    let mut trace = trace();
    let prefix = resolver.resolve_prefix(&path.segments, None, Some(&scope), position, &mut trace);

    assert_eq!(
        prefix,
        PrefixResolution {
            descriptor: Some(ab),
            stopped_at_index: 2,
        }
    );
    assert_eq!(trace.diagnostics().len(), expected_diagnostics);
    // The resolved prefix is bound even though the walk failed.
    assert_eq!(
        trace.bindings().get(path.segments[1].node),
        Some(&ResolutionOutcome::Package(ab))
    );
}

#[test]
fn test_unknown_first_segment_stops_at_root() {
    let world = World::new();
    let mut tree = world.tree(0);
    let ty = tree.dotted_type("nowhere.Thing");
    let (_, resolver) = world.resolver();

    let path = QualifierPath::from_user_type(&tree, ty);
    let mut trace = trace();
    let prefix = resolver.resolve_prefix(&path.segments, None, None, QualifierPosition::Import, &mut trace);

    assert_eq!(prefix.stopped_at_index, 0);
    assert_eq!(prefix.descriptor, Some(resolver.namespace().root_package()));
    assert_eq!(codes_of(&trace), vec![codes::UNRESOLVED_REFERENCE]);
}

// ============================================================================
// VALUES WIN IN EXPRESSION POSITION
// ============================================================================

struct ShadowFixture {
    app: DeclId,
    package_a: DeclId,
    local_a: DeclId,
}

fn make_shadowed(world: &mut World) -> ShadowFixture {
    let package_a = world.package("a");
    world.package("a.b");
    let app = world.package("app");
    let local_a = world.ns.add_property(app, "a");
    ShadowFixture {
        app,
        package_a,
        local_a,
    }
}

#[test]
fn test_local_value_shadows_package_in_expression() {
    let mut world = World::new();
    let fixture = make_shadowed(&mut world);
    let a = world.name("a");
    let mut tree = world.tree(0);
    let ty = tree.dotted_type("a.b");
    let (_, resolver) = world.resolver();

    let path = QualifierPath::from_user_type(&tree, ty);
    let scope = LexicalScope::file(requester(fixture.app), None).with_local(a, fixture.local_a);

    let mut trace = trace();
    let prefix = resolver.resolve_prefix(&path.segments, None, Some(&scope), QualifierPosition::Expression, &mut trace);
    assert_eq!(prefix, PrefixResolution::NONE);
    assert!(trace.bindings().is_empty());

    let mut trace = common::trace();
    let prefix = resolver.resolve_prefix(&path.segments, None, Some(&scope), QualifierPosition::Type, &mut trace);
    assert_eq!(prefix.stopped_at_index, 2);
    assert_eq!(
        trace.bindings().get(path.segments[0].node),
        Some(&ResolutionOutcome::Package(fixture.package_a))
    );
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

#[test]
fn test_expression_qualifier_and_remaining_calls() {
    let mut world = World::new();
    let ab = world.package("a.b");
    let class = world.class(ab, "C", ClassKind::Class);
    let app = world.package("app");
    let mut tree = world.tree(0);
    let abc = tree.dotted("a.b.C");
    let foo = tree.name_ref("foo");
    let call = tree.call(foo);
    let expr = tree.qualified(abc, Some(call), CallOp::Dot);
    let (_, resolver) = world.resolver();

    let scope = LexicalScope::file(requester(app), None);
    let mut trace = trace();
    let resolved = resolver.resolve_qualifier_in_expression(&tree, expr, None, &scope, &mut trace);

    assert_eq!(resolved.qualifier, Some(Qualifier::Class(class)));
    assert_eq!(resolved.remaining, vec![expr]);
    assert_eq!(trace.bindings().qualifier(abc), Some(Qualifier::Class(class)));
    assert!(trace.diagnostics().is_empty());
}

#[test]
fn test_expression_without_qualifier_keeps_chain() {
    let mut world = World::new();
    let app = world.package("app");
    let mut tree = world.tree(0);
    let expr = tree.dotted("value.field.other");
    let (_, resolver) = world.resolver();

    let scope = LexicalScope::file(requester(app), None);
    let mut trace = trace();
    let resolved = resolver.resolve_qualifier_in_expression(&tree, expr, None, &scope, &mut trace);

    assert_eq!(resolved.qualifier, None);
    assert_eq!(resolved.remaining.len(), 2);
    assert!(trace.diagnostics().is_empty());
}

#[test]
fn test_outermost_selector_left_for_value_resolution() {
    let mut world = World::new();
    let ab = world.package("a.b");
    world.ns.add_property(ab, "x");
    world.package("a.b.x");
    let app = world.package("app");
    let mut tree = world.tree(0);
    let expr = tree.dotted("a.b.x");
    let (_, resolver) = world.resolver();

    let scope = LexicalScope::file(requester(app), None);
    let mut trace = trace();
    let resolved = resolver.resolve_qualifier_in_expression(&tree, expr, None, &scope, &mut trace);

    let unrolled = unroll_to_leftmost(&tree, expr);
    assert_eq!(resolved.qualifier, Some(Qualifier::Package(ab)));
    assert_eq!(resolved.remaining, vec![expr]);
    assert_eq!(trace.bindings().qualifier(unrolled[0]), Some(Qualifier::Package(ab)));
    assert_eq!(trace.bindings().qualifier(expr), None);
    assert!(trace.diagnostics().is_empty());
}

// ============================================================================
// TYPES
// ============================================================================

#[test]
fn test_broken_type_binds_surviving_package() {
    let mut world = World::new();
    let ab = world.package("a.b");
    let app = world.package("app");
    let mut tree = world.tree(0);
    let qualifier = tree.dotted_type("a.b");
    let ty = tree.user_type(Some(qualifier), None, None);
    let (_, resolver) = world.resolver();

    let scope = LexicalScope::file(requester(app), None);
    let mut trace = trace();
    let resolved = resolver.resolve_qualifier_for_type(&tree, ty, None, &scope, &mut trace);

    assert!(resolved.path.has_error);
    assert_eq!(resolved.classifier, None);
    assert!(trace.diagnostics().is_empty());
    assert_eq!(
        trace.bindings().get(resolved.path.segments[1].node),
        Some(&ResolutionOutcome::Package(ab))
    );
}

#[test]
fn test_broken_type_keeps_class_result() {
    let mut world = World::new();
    let lib = world.package("lib");
    let node = world.class(lib, "Node", ClassKind::Class);
    let app = world.package("app");
    let mut tree = world.tree(0);
    let qualifier = tree.dotted_type("lib.Node");
    let ty = tree.user_type(Some(qualifier), None, None);
    let (_, resolver) = world.resolver();

    let scope = LexicalScope::file(requester(app), None);
    let mut trace = trace();
    let resolved = resolver.resolve_qualifier_for_type(&tree, ty, None, &scope, &mut trace);

    assert_eq!(resolved.classifier, Some(node));
    assert!(trace.diagnostics().is_empty());
}

#[test]
fn test_root_marked_type_ignores_local_classifier() {
    let mut world = World::new();
    let lib = world.package("lib");
    let real = world.class(lib, "Node", ClassKind::Class);
    let app = world.package("app");
    let decoy = world.class(app, "lib", ClassKind::Class);
    let lib_name = world.name("lib");
    let mut tree = world.tree(0);
    let ty = tree.dotted_type("lib.Node");
    tree.mark_root(ty);
    let (_, resolver) = world.resolver();

    let scope = Arc::new(LexicalScope::file(requester(app), None).with_local(lib_name, decoy));
    let mut trace = trace();
    let resolved = resolver.resolve_qualifier_for_type(&tree, ty, None, &scope, &mut trace);

    assert_eq!(resolved.classifier, Some(real));
    assert!(trace.diagnostics().is_empty());
}

#[test]
fn test_invisible_nested_class_is_reported() {
    let mut world = World::new();
    let lib = world.package("lib");
    let outer = world.class(lib, "Outer", ClassKind::Class);
    let inner = world.class(outer, "Inner", ClassKind::Class);
    world.ns.set_visibility(inner, Visibility::Private);
    let app = world.package("app");
    let mut tree = world.tree(0);
    let ty = tree.dotted_type("lib.Outer.Inner");
    let (_, resolver) = world.resolver();

    let scope = LexicalScope::file(requester(app), None);
    let mut trace = trace();
    let resolved = resolver.resolve_qualifier_for_type(&tree, ty, Some(&requester(app)), &scope, &mut trace);

    assert_eq!(resolved.classifier, Some(inner));
    assert_eq!(codes_of(&trace), vec![codes::INVISIBLE_REFERENCE]);
}
