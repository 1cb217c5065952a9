use curve_engine_core::curve::error::EngineError;
use curve_engine_core::curve::error_catalog::EngineErrorCode;

#[test]
fn no_newlines_or_tabs() {
    let err =
        EngineError::new(EngineErrorCode::ZeroReserve).with_context("origem", "linha1\nlinha2\ttab");
    let user = err.to_user_string();
    assert!(!user.contains('\n'));
    assert!(!user.contains('\t'));
}

#[test]
fn truncate_long_context_values() {
    let long_value = "a".repeat(1024);
    let err = EngineError::new(EngineErrorCode::Overflow).with_context("detalhe", long_value);
    let user = err.to_user_string();
    assert!(user.len() < 512);
}

#[test]
fn unknown_placeholder_is_left_as_is() {
    let err = EngineError::new(EngineErrorCode::ZeroAmount);
    let rendered = err.render_with_template("erro {desconhecido}");
    assert_eq!(rendered, "erro {desconhecido}");
}

#[test]
fn context_fills_placeholders() {
    let err = EngineError::new(EngineErrorCode::PoolNotFound).with_context("pool", 7u64);
    assert!(err.to_user_string().contains('7'));
}

#[test]
fn empty_context_key_is_ignored() {
    let err = EngineError::new(EngineErrorCode::ZeroAmount).with_context("", "x");
    assert!(err.context.is_empty());
}
