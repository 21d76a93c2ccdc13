//! Human-readable infix printing
//!
//! Output follows the usual computer-algebra conventions: `**` for powers,
//! `sqrt(x)` for square roots, negative terms printed as subtraction, and
//! negative powers and rational coefficients collected into a denominator,
//! e.g. `-a/r + 1` or `2*x/(3*y**2)`.

use crate::coeff::Coefficient;
use crate::expr::{SymExpr, SymExprKind};
use std::fmt;

const PREC_ADD: u8 = 10;
const PREC_MUL: u8 = 20;
const PREC_POW: u8 = 30;
const PREC_ATOM: u8 = 40;

fn coeff_precedence(c: &Coefficient) -> u8 {
    if c.is_negative() {
        PREC_ADD
    } else if c.denom().is_some_and(|d| d != 1) {
        PREC_MUL
    } else {
        PREC_ATOM
    }
}

fn precedence(expr: &SymExpr) -> u8 {
    match expr.kind.as_ref() {
        SymExprKind::Num(c) => coeff_precedence(c),
        SymExprKind::Var(_) | SymExprKind::Func(..) | SymExprKind::Undef(..) => PREC_ATOM,
        SymExprKind::Add(_) => PREC_ADD,
        SymExprKind::Mul(_) | SymExprKind::Neg(_) => {
            if is_negative_term(expr) {
                PREC_ADD
            } else {
                PREC_MUL
            }
        }
        SymExprKind::Pow(_, exp) => {
            if exp.as_coeff().is_some_and(|c| c.is_negative()) {
                PREC_MUL
            } else if is_half(exp) {
                PREC_ATOM
            } else {
                PREC_POW
            }
        }
    }
}

fn is_half(expr: &SymExpr) -> bool {
    expr.as_coeff() == Some(&Coefficient::rational(1, 2))
}

fn is_negative_term(expr: &SymExpr) -> bool {
    match expr.kind.as_ref() {
        SymExprKind::Num(c) => c.is_negative(),
        SymExprKind::Mul(factors) => factors
            .first()
            .and_then(SymExpr::as_coeff)
            .is_some_and(Coefficient::is_negative),
        SymExprKind::Neg(_) => true,
        _ => false,
    }
}

/// The term with its leading sign flipped, for printing `a - b`.
fn negate_term(expr: &SymExpr) -> SymExpr {
    match expr.kind.as_ref() {
        SymExprKind::Num(c) => SymExpr::num(-*c),
        SymExprKind::Mul(factors) => match factors.split_first() {
            Some((first, rest)) => match first.as_coeff() {
                Some(c) if (-*c).is_one() => SymExpr::mul(rest.to_vec()),
                Some(c) => {
                    let mut out = vec![SymExpr::num(-*c)];
                    out.extend(rest.iter().cloned());
                    SymExpr::mul(out)
                }
                None => SymExpr::neg(expr.clone()),
            },
            None => SymExpr::int(-1),
        },
        SymExprKind::Neg(inner) => inner.clone(),
        _ => SymExpr::neg(expr.clone()),
    }
}

fn write_parens(out: &mut String, expr: &SymExpr, parens: bool) {
    if parens {
        out.push('(');
        write_expr(out, expr);
        out.push(')');
    } else {
        write_expr(out, expr);
    }
}

fn write_expr(out: &mut String, expr: &SymExpr) {
    match expr.kind.as_ref() {
        SymExprKind::Num(c) => out.push_str(&c.to_string()),
        SymExprKind::Var(s) => out.push_str(s.name()),
        SymExprKind::Add(terms) => write_add(out, terms),
        SymExprKind::Mul(factors) => write_mul(out, factors),
        SymExprKind::Pow(base, exp) => write_pow(out, base, exp),
        SymExprKind::Neg(inner) => {
            out.push('-');
            write_parens(out, inner, precedence(inner) <= PREC_ADD);
        }
        SymExprKind::Func(f, arg) => {
            out.push_str(f.name());
            write_parens(out, arg, true);
        }
        SymExprKind::Undef(name, args) => {
            out.push_str(name);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, arg);
            }
            out.push(')');
        }
    }
}

fn write_add(out: &mut String, terms: &[SymExpr]) {
    // constants go last: -a/r + 1
    let ordered = terms
        .iter()
        .filter(|t| !t.is_num())
        .chain(terms.iter().filter(|t| t.is_num()));
    for (i, term) in ordered.enumerate() {
        if i == 0 {
            write_expr(out, term);
        } else if is_negative_term(term) {
            out.push_str(" - ");
            let positive = negate_term(term);
            write_parens(out, &positive, precedence(&positive) <= PREC_ADD);
        } else {
            out.push_str(" + ");
            write_parens(out, term, precedence(term) <= PREC_ADD);
        }
    }
}

fn write_product(out: &mut String, factors: &[SymExpr]) {
    for (i, factor) in factors.iter().enumerate() {
        if i > 0 {
            out.push('*');
        }
        write_parens(out, factor, precedence(factor) < PREC_MUL || factor.is_mul());
    }
}

fn write_mul(out: &mut String, factors: &[SymExpr]) {
    let mut numer: Vec<SymExpr> = Vec::new();
    let mut denom: Vec<SymExpr> = Vec::new();
    let mut negative = false;

    for factor in factors {
        match factor.kind.as_ref() {
            SymExprKind::Num(c) => {
                negative ^= c.is_negative();
                let c = c.abs();
                match (c.numer(), c.denom()) {
                    (Some(n), Some(d)) => {
                        if n != 1 {
                            numer.push(SymExpr::int(n));
                        }
                        if d != 1 {
                            denom.push(SymExpr::int(d));
                        }
                    }
                    _ => numer.push(SymExpr::num(c)),
                }
            }
            SymExprKind::Pow(base, exp) if exp.as_coeff().is_some_and(|c| c.is_negative()) => {
                let flipped = exp.as_coeff().map(|c| -*c).unwrap_or_default();
                if flipped.is_one() {
                    denom.push(base.clone());
                } else {
                    denom.push(SymExpr::pow(base.clone(), SymExpr::num(flipped)));
                }
            }
            SymExprKind::Neg(inner) => {
                negative = !negative;
                numer.push(inner.clone());
            }
            _ => numer.push(factor.clone()),
        }
    }

    if negative {
        out.push('-');
    }
    if numer.is_empty() {
        out.push('1');
    } else {
        write_product(out, &numer);
    }
    match denom.as_slice() {
        [] => {}
        [single] => {
            out.push('/');
            write_parens(out, single, precedence(single) <= PREC_MUL);
        }
        _ => {
            out.push_str("/(");
            write_product(out, &denom);
            out.push(')');
        }
    }
}

fn write_pow(out: &mut String, base: &SymExpr, exp: &SymExpr) {
    if is_half(exp) {
        out.push_str("sqrt");
        write_parens(out, base, true);
        return;
    }
    if let Some(c) = exp.as_coeff().filter(|c| c.is_negative()) {
        write_mul(out, &[SymExpr::pow(base.clone(), SymExpr::num(*c))]);
        return;
    }
    write_parens(out, base, precedence(base) <= PREC_POW);
    out.push_str("**");
    write_parens(out, exp, precedence(exp) < PREC_ATOM);
}

impl fmt::Display for SymExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_expr(&mut out, self);
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> SymExpr {
        SymExpr::var(name)
    }

    #[test]
    fn test_sums_and_differences() {
        let a = var("a");
        let r = var("r");
        assert_eq!((SymExpr::int(1) - &a / &r).to_string(), "-a/r + 1");
        assert_eq!((var("x") - var("y")).to_string(), "x - y");
    }

    #[test]
    fn test_powers_and_roots() {
        let x = var("x");
        assert_eq!(x.powi(2).to_string(), "x**2");
        assert_eq!(x.powi(-1).to_string(), "1/x");
        assert_eq!(x.powi(-2).to_string(), "1/x**2");
        assert_eq!(SymExpr::sqrt(x.clone()).to_string(), "sqrt(x)");
        assert_eq!((&x + 1i32).powi(3).to_string(), "(x + 1)**3");
        assert_eq!(SymExpr::sin(var("theta")).powi(2).to_string(), "sin(theta)**2");
    }

    #[test]
    fn test_denominators() {
        let x = var("x");
        let y = var("y");
        let expr = 2i32 * &x / (3i32 * y.powi(2));
        assert_eq!(expr.to_string(), "2*x/(3*y**2)");
        assert_eq!((-1i32 / (&x * &y)).to_string(), "-1/(x*y)");
        assert_eq!(SymExpr::rational(-1, 2).to_string(), "-1/2");
    }

    #[test]
    fn test_functions() {
        let f3 = SymExpr::undef("f3", vec![]);
        assert_eq!(f3.to_string(), "f3()");
        let f1 = SymExpr::undef("f1", vec![var("a"), var("x2")]);
        assert_eq!(f1.to_string(), "f1(a, x2)");
        assert_eq!((&f1 * 2i32).to_string(), "2*f1(a, x2)");
    }

    #[test]
    fn test_raw_negation() {
        let raw = SymExpr::neg(SymExpr::add(vec![var("x"), var("y")]));
        assert_eq!(raw.to_string(), "-(x + y)");
        assert_eq!(format!("{:?}", var("x")), "SymExpr(x)");
    }
}
