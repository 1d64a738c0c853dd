use super::*;

#[test]
fn hoisting_boundaries() {
    assert!(!ScopeKind::Block.stops_hoisting());
    assert!(!ScopeKind::CatchBinding.stops_hoisting());
    assert!(!ScopeKind::ClassBody.stops_hoisting());
    assert!(ScopeKind::Entry.stops_hoisting());
    assert!(ScopeKind::FunctionArgs.stops_hoisting());
    assert!(ScopeKind::FunctionBody.stops_hoisting());
    assert!(ScopeKind::ClassStaticInit.stops_hoisting());
}
