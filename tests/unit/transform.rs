use super::*;

#[test]
fn pop_on_empty_stack_underflows() {
    let mut stack = AffineStack::new();
    assert!(matches!(stack.pop(), Err(RasterError::StackUnderflow)));
    assert!(stack.is_identity());
}

#[test]
fn push_pop_restores_saved_matrix() {
    let mut stack = AffineStack::new();
    stack.apply(translate(5.0, 0.0));
    stack.push();
    stack.apply(scale(2.0, 2.0));
    assert_eq!(stack.apply_to(Vec2f::new(1.0, 1.0)), Vec2f::new(7.0, 2.0));
    stack.pop().unwrap();
    assert_eq!(stack.apply_to(Vec2f::new(1.0, 1.0)), Vec2f::new(6.0, 1.0));
    assert_eq!(stack.depth(), 0);
}

#[test]
fn translation_detection() {
    let mut stack = AffineStack::new();
    stack.apply(translate(3.0, 4.0));
    assert!(stack.is_translation());
    assert!(!stack.is_identity());
    stack.apply(rotate(0.5));
    assert!(!stack.is_translation());
    stack.reset_top();
    assert!(stack.is_identity());
}

#[test]
fn reset_all_clears_saved_entries() {
    let mut stack = AffineStack::new();
    stack.push();
    stack.push();
    stack.reset_all();
    assert_eq!(stack.depth(), 0);
    assert!(stack.pop().is_err());
}
