//! Strategy-based simplification
//!
//! `simplify` canonicalizes an expression and then tries a handful of
//! normalization strategies, keeping the smallest result. A strategy that
//! proves the expression is zero always wins. Strategies whose expansion
//! grows past a fixed number of terms are abandoned.

use crate::expr::{SymExpr, SymExprKind};
use crate::normalize::{canonical, together, try_expand, StagedNormalizer};

/// Simplify an expression.
pub fn simplify(expr: &SymExpr) -> SymExpr {
    let base = canonical(&simplify_args(expr));
    if base.is_num() || base.is_var() {
        return base;
    }

    let (trig, _) = StagedNormalizer::trig().normalize(base.clone());
    // strategies that outgrow the expansion bound drop out
    let candidates: Vec<SymExpr> = [try_expand(&base), together(&base), together(&trig)]
        .into_iter()
        .flatten()
        .chain([trig, base])
        .collect();

    if candidates.iter().any(SymExpr::is_zero) {
        log::trace!("simplify: proved zero");
        return SymExpr::int(0);
    }

    let best = candidates
        .into_iter()
        .min_by(|a, b| a.node_count().cmp(&b.node_count()).then_with(|| a.cmp(b)))
        .unwrap_or_default();
    log::trace!("simplify: {} nodes", best.node_count());
    best
}

/// Simplify the arguments of every function application first.
fn simplify_args(expr: &SymExpr) -> SymExpr {
    match expr.kind.as_ref() {
        SymExprKind::Func(f, arg) => SymExpr::func(*f, simplify(arg)),
        SymExprKind::Undef(name, args) => {
            SymExpr::undef(name.clone(), args.iter().map(simplify).collect())
        }
        _ => expr.map_children(simplify_args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_angle_is_zero() {
        let z = SymExpr::var("z");
        let expr = SymExpr::sin(2 * &z) - 2 * SymExpr::sin(z.clone()) * SymExpr::cos(z.clone());
        assert!(simplify(&expr).is_zero());
    }

    #[test]
    fn test_rational_identity_is_zero() {
        let a = SymExpr::var("a");
        let r = SymExpr::var("r");
        let expr = SymExpr::int(1) / (SymExpr::int(1) - &a / &r) - &r / (&r - &a);
        assert!(simplify(&expr).is_zero());
    }

    #[test]
    fn test_simplify_inside_function_arguments() {
        let x = SymExpr::var("x");
        let arg = SymExpr::add(vec![x.clone(), SymExpr::neg(x.clone()), SymExpr::var("y")]);
        let f = SymExpr::undef("f", vec![arg]);
        assert_eq!(simplify(&f), SymExpr::undef("f", vec![SymExpr::var("y")]));
    }

    #[test]
    fn test_prefers_smaller_form() {
        // (x + 1)^2 - x^2 - 1 = 2*x
        let x = SymExpr::var("x");
        let expr = (&x + 1i32).powi(2) - x.powi(2) - 1;
        assert_eq!(simplify(&expr), 2 * &x);
    }

    #[test]
    fn test_leaves_atoms_alone() {
        let theta = SymExpr::var("theta");
        assert_eq!(simplify(&theta), theta);
        assert_eq!(simplify(&SymExpr::rational(3, 6)), SymExpr::rational(1, 2));
    }
}
