//! Script bridge.
//!
//! Each surface owns its own `boa_engine::Context`; evaluation is
//! synchronous on the calling thread. Both the completion value and a thrown
//! value are string-converted, but unlike the classic C surface the outcome
//! keeps them apart.

use boa_engine::{Context, Source};
use serde::Serialize;

/// Tagged result of one script evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalOutcome {
    pub ok: bool,
    pub text: String,
}

impl EvalOutcome {
    /// The classic surface returned one bare string for both paths; hosts
    /// that still want that shape use this accessor.
    pub fn text_compat(&self) -> &str {
        &self.text
    }
}

/// Compile and run `source` in `ctx`, string-converting whichever value
/// comes out.
pub fn evaluate(ctx: &mut Context, source: &str) -> EvalOutcome {
    match ctx.eval(Source::from_bytes(source)) {
        Ok(value) => {
            let text = value
                .to_string(ctx)
                .map(|s| s.to_std_string_escaped())
                .unwrap_or_else(|e| e.to_string());
            EvalOutcome { ok: true, text }
        }
        Err(err) => EvalOutcome {
            ok: false,
            text: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_evaluates_to_its_string_form() {
        let mut ctx = Context::default();
        let out = evaluate(&mut ctx, "1+1");
        assert!(out.ok);
        assert_eq!(out.text, "2");
        assert_eq!(out.text_compat(), "2");
    }

    #[test]
    fn thrown_values_are_flagged_and_stringified() {
        let mut ctx = Context::default();
        let out = evaluate(&mut ctx, "throw new Error('x')");
        assert!(!out.ok);
        assert!(out.text.contains('x'));
    }

    #[test]
    fn state_persists_within_one_context() {
        let mut ctx = Context::default();
        assert!(evaluate(&mut ctx, "var a = 40").ok);
        let out = evaluate(&mut ctx, "a + 2");
        assert!(out.ok);
        assert_eq!(out.text, "42");
    }

    #[test]
    fn contexts_are_isolated_from_each_other() {
        let mut a = Context::default();
        let mut b = Context::default();
        assert!(evaluate(&mut a, "var secret = 1").ok);
        let out = evaluate(&mut b, "secret");
        assert!(!out.ok);
    }

    #[test]
    fn outcome_serializes_for_the_json_surface() {
        let out = EvalOutcome {
            ok: true,
            text: "2".to_string(),
        };
        let json = serde_json::to_string(&out).unwrap();
        assert_eq!(json, r#"{"ok":true,"text":"2"}"#);
    }
}
