//! Staged normalization pipeline for symbolic expressions
//!
//! Normalization transforms expressions into a canonical form for:
//! - Structural equality that matches algebraic equality of simple terms
//! - Better simplification opportunities
//! - Predictable output format
//!
//! The `Canonical` pass is the foundation. A canonical expression has no
//! nested sums or products, at most one leading numeric coefficient per
//! product, like terms and like bases merged, identities removed and all
//! operands in the total order of `SymExpr`.

use crate::coeff::Coefficient;
use crate::expr::{ElemFunc, SymExpr, SymExprKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Largest integer power of a sum that `Expand` multiplies out
const MAX_EXPAND_POWER: u64 = 16;

/// Largest sum a bounded expansion may build before giving up
const MAX_EXPAND_TERMS: usize = 4096;

/// Largest integer multiple `n` for which `sin(n*x)` is expanded
const MAX_TRIG_MULTIPLE: i64 = 8;

/// A normalization pass that can be applied to an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormPass {
    /// Flatten, merge constants, collect like terms and powers, sort
    Canonical,
    /// Expand products of sums and integer powers of sums; a result
    /// above `MAX_EXPAND_TERMS` terms leaves the expression unchanged
    Expand,
    /// Expand sin/cos of sums and integer multiples, rewrite tan as sin/cos
    ExpandTrig,
    /// Rewrite even powers of cos through 1 - sin^2
    Pythagorean,
    /// Combine over a common denominator, under the same size bound
    Together,
}

/// A proof record of normalization steps
#[derive(Debug, Clone, Default)]
pub struct NormProof {
    pub steps: Vec<NormStep>,
    pub initial_size: usize,
    pub final_size: usize,
}

/// A single step in the normalization proof
#[derive(Debug, Clone)]
pub struct NormStep {
    pub pass: NormPass,
    pub before_size: usize,
    pub after_size: usize,
    pub changed: bool,
}

/// Staged normalization engine
#[derive(Debug, Clone)]
pub struct StagedNormalizer {
    passes: Vec<NormPass>,
    record_proof: bool,
}

impl StagedNormalizer {
    pub fn new(passes: Vec<NormPass>) -> Self {
        StagedNormalizer {
            passes,
            record_proof: false,
        }
    }

    /// Canonical form only
    pub fn default_pipeline() -> Self {
        Self::new(vec![NormPass::Canonical])
    }

    /// Canonical form followed by full expansion
    pub fn aggressive() -> Self {
        Self::new(vec![NormPass::Canonical, NormPass::Expand])
    }

    /// Trigonometric expansion and Pythagorean reduction
    pub fn trig() -> Self {
        Self::new(vec![
            NormPass::Canonical,
            NormPass::ExpandTrig,
            NormPass::Expand,
            NormPass::Pythagorean,
            NormPass::Expand,
        ])
    }

    /// Single fraction over a common denominator
    pub fn rational() -> Self {
        Self::new(vec![NormPass::Canonical, NormPass::Together])
    }

    pub fn passes(&self) -> &[NormPass] {
        &self.passes
    }

    pub fn with_proof_recording(mut self) -> Self {
        self.record_proof = true;
        self
    }

    /// Normalize an expression using the configured passes
    pub fn normalize(&self, expr: SymExpr) -> (SymExpr, Option<NormProof>) {
        let mut current = expr;
        let mut proof = self.record_proof.then(|| NormProof {
            initial_size: current.node_count(),
            ..Default::default()
        });

        for pass in &self.passes {
            let before_size = current.node_count();
            let next = apply_pass(&current, *pass);
            let after_size = next.node_count();

            if let Some(p) = proof.as_mut() {
                p.steps.push(NormStep {
                    pass: *pass,
                    before_size,
                    after_size,
                    changed: current != next,
                });
            }
            current = next;
        }

        if let Some(p) = proof.as_mut() {
            p.final_size = current.node_count();
        }
        log::trace!(
            "normalized with {} passes to {} nodes",
            self.passes.len(),
            current.node_count()
        );

        (current, proof)
    }
}

impl Default for StagedNormalizer {
    fn default() -> Self {
        Self::default_pipeline()
    }
}

fn apply_pass(expr: &SymExpr, pass: NormPass) -> SymExpr {
    match pass {
        NormPass::Canonical => canonical(expr),
        NormPass::Expand => try_expand(expr).unwrap_or_else(|| expr.clone()),
        NormPass::ExpandTrig => expand_trig(expr),
        NormPass::Pythagorean => pythagorean(expr),
        NormPass::Together => together(expr).unwrap_or_else(|| expr.clone()),
    }
}

/// Bring an expression into canonical form, bottom-up.
pub fn canonical(expr: &SymExpr) -> SymExpr {
    recanon(expr.map_children(canonical))
}

/// Canonicalize the top node of an expression whose children are canonical.
fn recanon(expr: SymExpr) -> SymExpr {
    match expr.kind.as_ref() {
        SymExprKind::Add(terms) => canon_add(terms.clone()),
        SymExprKind::Mul(factors) => canon_mul(factors.clone()),
        SymExprKind::Pow(base, exp) => canon_pow(base.clone(), exp.clone()),
        SymExprKind::Neg(inner) => canon_mul(vec![SymExpr::int(-1), inner.clone()]),
        SymExprKind::Func(f, arg) => canon_func(*f, arg.clone()),
        SymExprKind::Num(_) | SymExprKind::Var(_) | SymExprKind::Undef(..) => expr,
    }
}

/// Split a term into its numeric coefficient and the remaining product
fn split_coeff(term: &SymExpr) -> (Coefficient, SymExpr) {
    if let SymExprKind::Mul(factors) = term.kind.as_ref() {
        if let Some(c) = factors.first().and_then(SymExpr::as_coeff) {
            return (*c, SymExpr::mul(factors[1..].to_vec()));
        }
    }
    (Coefficient::int(1), term.clone())
}

fn scale(c: Coefficient, rest: SymExpr) -> SymExpr {
    if c.is_one() {
        return rest;
    }
    let mut factors = vec![SymExpr::num(c)];
    match rest.kind.as_ref() {
        SymExprKind::Mul(inner) => factors.extend(inner.iter().cloned()),
        _ => factors.push(rest),
    }
    SymExpr::new(SymExprKind::Mul(factors))
}

fn has_negative_coeff(expr: &SymExpr) -> bool {
    match expr.kind.as_ref() {
        SymExprKind::Num(c) => c.is_negative(),
        SymExprKind::Mul(factors) => factors
            .first()
            .and_then(SymExpr::as_coeff)
            .is_some_and(Coefficient::is_negative),
        _ => false,
    }
}

/// Sum of canonical terms
pub(crate) fn canon_add(terms: Vec<SymExpr>) -> SymExpr {
    let mut constant = Coefficient::int(0);
    let mut order: Vec<SymExpr> = Vec::new();
    let mut groups: HashMap<SymExpr, Coefficient> = HashMap::new();

    let mut pending = terms;
    while let Some(term) = pending.pop() {
        match term.kind.as_ref() {
            SymExprKind::Add(inner) => pending.extend(inner.iter().cloned()),
            SymExprKind::Num(c) => constant = constant + *c,
            _ => {
                let (c, rest) = split_coeff(&term);
                match groups.get_mut(&rest) {
                    Some(acc) => *acc = *acc + c,
                    None => {
                        order.push(rest.clone());
                        groups.insert(rest, c);
                    }
                }
            }
        }
    }

    let mut out: Vec<SymExpr> = order
        .into_iter()
        .filter_map(|rest| {
            let c = groups.get(&rest).copied()?;
            (!c.is_zero()).then(|| scale(c, rest))
        })
        .collect();
    if !constant.is_zero() {
        out.push(SymExpr::num(constant));
    }
    out.sort();
    SymExpr::add(out)
}

/// Product of canonical factors
pub(crate) fn canon_mul(factors: Vec<SymExpr>) -> SymExpr {
    let mut coeff = Coefficient::int(1);
    let mut order: Vec<SymExpr> = Vec::new();
    let mut exponents: HashMap<SymExpr, Vec<SymExpr>> = HashMap::new();
    let mut push_power = |base: SymExpr, exp: SymExpr| match exponents.get_mut(&base) {
        Some(exps) => exps.push(exp),
        None => {
            order.push(base.clone());
            exponents.insert(base, vec![exp]);
        }
    };

    let mut pending = factors;
    while let Some(factor) = pending.pop() {
        match factor.kind.as_ref() {
            SymExprKind::Mul(inner) => pending.extend(inner.iter().cloned()),
            SymExprKind::Num(c) => coeff = coeff * *c,
            SymExprKind::Pow(base, exp) => push_power(base.clone(), exp.clone()),
            _ => push_power(factor.clone(), SymExpr::int(1)),
        }
    }
    // zero absorbs every factor except a power of zero itself, so 0/0 stays
    let zero_base = exponents.keys().any(SymExpr::is_zero);
    if coeff.is_zero() && !zero_base {
        return SymExpr::int(0);
    }

    let mut out = Vec::with_capacity(order.len());
    let mut regroup = false;
    for base in order {
        let exp = canon_add(exponents.remove(&base).unwrap_or_default());
        let power = canon_pow(base, exp);
        match power.kind.as_ref() {
            SymExprKind::Num(c) => coeff = coeff * *c,
            SymExprKind::Mul(_) => {
                regroup = true;
                out.push(power);
            }
            _ => out.push(power),
        }
    }
    if regroup {
        out.push(SymExpr::num(coeff));
        return canon_mul(out);
    }
    if coeff.is_zero() && !zero_base {
        return SymExpr::int(0);
    }

    out.sort();
    if !coeff.is_one() {
        // A number times a single sum distributes: 2*(x + y) = 2*x + 2*y
        if let [single] = out.as_slice() {
            if let SymExprKind::Add(terms) = single.kind.as_ref() {
                return canon_add(
                    terms
                        .iter()
                        .map(|t| canon_mul(vec![SymExpr::num(coeff), t.clone()]))
                        .collect(),
                );
            }
        }
        out.insert(0, SymExpr::num(coeff));
    }
    SymExpr::mul(out)
}

/// Power of a canonical base and exponent
pub(crate) fn canon_pow(base: SymExpr, exp: SymExpr) -> SymExpr {
    if exp.is_zero() || base.is_one() {
        return SymExpr::int(1);
    }
    if exp.is_one() {
        return base;
    }
    if let (Some(b), Some(e)) = (base.as_coeff(), exp.as_coeff()) {
        return match b.pow(e) {
            Some(value) => SymExpr::num(value),
            None => SymExpr::pow(base, exp),
        };
    }
    if base.is_zero() && exp.as_coeff().is_some_and(|e| !e.is_negative()) {
        return SymExpr::int(0);
    }
    if exp.as_coeff().is_some_and(Coefficient::is_integer) {
        match base.kind.as_ref() {
            // (x^a)^n = x^(a*n) for integer n
            SymExprKind::Pow(inner, inner_exp) => {
                return canon_pow(inner.clone(), canon_mul(vec![inner_exp.clone(), exp]));
            }
            // (x*y)^n = x^n * y^n for integer n
            SymExprKind::Mul(factors) => {
                return canon_mul(
                    factors
                        .iter()
                        .map(|f| canon_pow(f.clone(), exp.clone()))
                        .collect(),
                );
            }
            _ => {}
        }
    }
    SymExpr::pow(base, exp)
}

/// Elementary function of a canonical argument
pub(crate) fn canon_func(f: ElemFunc, arg: SymExpr) -> SymExpr {
    if let Some(c) = arg.as_coeff() {
        if c.is_float() {
            return SymExpr::num(Coefficient::float(f.eval_f64(c.to_f64())));
        }
        if c.is_zero() {
            match f {
                ElemFunc::Sin
                | ElemFunc::Tan
                | ElemFunc::Sinh
                | ElemFunc::Tanh
                | ElemFunc::Asin
                | ElemFunc::Atan => return SymExpr::int(0),
                ElemFunc::Cos | ElemFunc::Cosh | ElemFunc::Exp => return SymExpr::int(1),
                ElemFunc::Log | ElemFunc::Acos => {}
            }
        }
        if c.is_one() && matches!(f, ElemFunc::Log | ElemFunc::Acos) {
            return SymExpr::int(0);
        }
    }

    if f == ElemFunc::Exp {
        if let SymExprKind::Func(ElemFunc::Log, inner) = arg.kind.as_ref() {
            return inner.clone();
        }
    }

    if has_negative_coeff(&arg) {
        let positive = canon_mul(vec![SymExpr::int(-1), arg.clone()]);
        match f {
            ElemFunc::Sin
            | ElemFunc::Tan
            | ElemFunc::Sinh
            | ElemFunc::Tanh
            | ElemFunc::Asin
            | ElemFunc::Atan => {
                return canon_mul(vec![SymExpr::int(-1), SymExpr::func(f, positive)]);
            }
            ElemFunc::Cos | ElemFunc::Cosh => return SymExpr::func(f, positive),
            ElemFunc::Exp | ElemFunc::Log | ElemFunc::Acos => {}
        }
    }

    SymExpr::func(f, arg)
}

/// Expand products and integer powers of sums.
pub fn expand(expr: &SymExpr) -> SymExpr {
    expand_within(expr, usize::MAX).unwrap_or_else(|| expr.clone())
}

/// Expand, giving up with `None` once a sum would exceed `MAX_EXPAND_TERMS`.
pub(crate) fn try_expand(expr: &SymExpr) -> Option<SymExpr> {
    expand_within(expr, MAX_EXPAND_TERMS)
}

fn expand_within(expr: &SymExpr, limit: usize) -> Option<SymExpr> {
    let sub = |e: &SymExpr| expand_within(e, limit);
    Some(match expr.kind.as_ref() {
        SymExprKind::Num(_) | SymExprKind::Var(_) => expr.clone(),
        SymExprKind::Add(terms) => {
            let expanded = terms.iter().map(sub).collect::<Option<Vec<_>>>()?;
            if expanded.iter().map(term_count).sum::<usize>() > limit {
                return None;
            }
            canon_add(expanded)
        }
        SymExprKind::Mul(factors) => {
            distribute(factors.iter().map(sub).collect::<Option<Vec<_>>>()?, limit)?
        }
        SymExprKind::Neg(inner) => distribute(vec![SymExpr::int(-1), sub(inner)?], limit)?,
        SymExprKind::Pow(base, exp) => {
            let base = sub(base)?;
            let exp = sub(exp)?;
            match exp.as_coeff().and_then(Coefficient::as_integer) {
                Some(n) if base.is_add() && n.unsigned_abs() <= MAX_EXPAND_POWER => {
                    let expanded = distribute(vec![base; n.unsigned_abs() as usize], limit)?;
                    if n > 0 {
                        expanded
                    } else {
                        canon_pow(expanded, SymExpr::int(-1))
                    }
                }
                _ => canon_pow(base, exp),
            }
        }
        SymExprKind::Func(f, arg) => canon_func(*f, sub(arg)?),
        SymExprKind::Undef(name, args) => {
            SymExpr::undef(name.clone(), args.iter().map(sub).collect::<Option<Vec<_>>>()?)
        }
    })
}

fn term_count(expr: &SymExpr) -> usize {
    expr.as_add().map_or(1, <[SymExpr]>::len)
}

/// Multiply out canonical, already expanded factors. Like terms are
/// collected after every factor.
fn distribute(factors: Vec<SymExpr>, limit: usize) -> Option<SymExpr> {
    let mut acc = vec![SymExpr::int(1)];
    for factor in factors {
        let terms = match factor.as_add() {
            Some(terms) => terms.to_vec(),
            None => vec![factor],
        };
        let products = acc.len().saturating_mul(terms.len());
        if products > limit {
            log::debug!("expand: gave up at {products} terms");
            return None;
        }
        let mut next = Vec::with_capacity(products);
        for a in &acc {
            for t in &terms {
                let product = canon_mul(vec![a.clone(), t.clone()]);
                // merging powers can surface a sum, e.g. sqrt(x + 1)^2
                let surfaced = product
                    .as_mul()
                    .is_some_and(|fs| fs.iter().any(SymExpr::is_add));
                next.push(match product.as_mul() {
                    Some(fs) if surfaced => distribute(fs.to_vec(), limit)?,
                    _ => product,
                });
            }
        }
        let sum = canon_add(next);
        if sum.is_zero() {
            return Some(sum);
        }
        let collected = sum.as_add().map(<[SymExpr]>::to_vec);
        acc = collected.unwrap_or_else(|| vec![sum]);
    }
    let sum = canon_add(acc);
    (term_count(&sum) <= limit).then_some(sum)
}

/// Split a trig argument into `u + v` for the addition formulas.
fn split_trig_arg(arg: &SymExpr) -> Option<(SymExpr, SymExpr)> {
    match arg.kind.as_ref() {
        SymExprKind::Add(terms) => Some((terms[0].clone(), canon_add(terms[1..].to_vec()))),
        SymExprKind::Mul(factors) => {
            let n = factors.first()?.as_coeff()?.as_integer()?;
            if !(2..=MAX_TRIG_MULTIPLE).contains(&n) {
                return None;
            }
            let rest = SymExpr::mul(factors[1..].to_vec());
            let remaining = canon_mul(vec![SymExpr::int(n - 1), rest.clone()]);
            Some((rest, remaining))
        }
        _ => None,
    }
}

fn trig_sin(arg: SymExpr) -> SymExpr {
    match split_trig_arg(&arg) {
        Some((u, v)) => canon_add(vec![
            canon_mul(vec![trig_sin(u.clone()), trig_cos(v.clone())]),
            canon_mul(vec![trig_cos(u), trig_sin(v)]),
        ]),
        None => canon_func(ElemFunc::Sin, arg),
    }
}

fn trig_cos(arg: SymExpr) -> SymExpr {
    match split_trig_arg(&arg) {
        Some((u, v)) => canon_add(vec![
            canon_mul(vec![trig_cos(u.clone()), trig_cos(v.clone())]),
            canon_mul(vec![
                SymExpr::int(-1),
                trig_sin(u),
                trig_sin(v),
            ]),
        ]),
        None => canon_func(ElemFunc::Cos, arg),
    }
}

/// Expand sin/cos of sums and integer multiples; tan becomes sin/cos.
pub(crate) fn expand_trig(expr: &SymExpr) -> SymExpr {
    let node = recanon(expr.map_children(expand_trig));
    match node.kind.as_ref() {
        SymExprKind::Func(ElemFunc::Sin, arg) => trig_sin(arg.clone()),
        SymExprKind::Func(ElemFunc::Cos, arg) => trig_cos(arg.clone()),
        SymExprKind::Func(ElemFunc::Tan, arg) => canon_mul(vec![
            trig_sin(arg.clone()),
            canon_pow(trig_cos(arg.clone()), SymExpr::int(-1)),
        ]),
        _ => node,
    }
}

/// cos(u)^n = cos(u)^(n mod 2) * (1 - sin(u)^2)^(n div 2) for n >= 2
pub(crate) fn pythagorean(expr: &SymExpr) -> SymExpr {
    let node = recanon(expr.map_children(pythagorean));
    if let SymExprKind::Pow(base, exp) = node.kind.as_ref() {
        if let SymExprKind::Func(ElemFunc::Cos, u) = base.kind.as_ref() {
            if let Some(n) = exp.as_coeff().and_then(Coefficient::as_integer) {
                if n >= 2 {
                    let sin_sq = canon_pow(canon_func(ElemFunc::Sin, u.clone()), SymExpr::int(2));
                    let one_minus = canon_add(vec![
                        SymExpr::int(1),
                        canon_mul(vec![SymExpr::int(-1), sin_sq]),
                    ]);
                    let mut factors = vec![canon_pow(one_minus, SymExpr::int(n / 2))];
                    if n % 2 == 1 {
                        factors.push(base.clone());
                    }
                    return canon_mul(factors);
                }
            }
        }
    }
    node
}

/// Combine an expression into a single fraction with an expanded numerator.
/// `None` when the numerator is too large to expand.
pub(crate) fn together(expr: &SymExpr) -> Option<SymExpr> {
    let (num, den) = fraction(&canonical(expr));
    let num = try_expand(&num)?;
    if num.is_zero() {
        return Some(SymExpr::int(0));
    }
    if den.is_one() {
        return Some(num);
    }
    Some(canon_mul(vec![num, canon_pow(den, SymExpr::int(-1))]))
}

fn together_or_keep(expr: &SymExpr) -> SymExpr {
    together(expr).unwrap_or_else(|| expr.clone())
}

/// Numerator and denominator of a canonical expression
fn fraction(expr: &SymExpr) -> (SymExpr, SymExpr) {
    let one = SymExpr::int(1);
    match expr.kind.as_ref() {
        SymExprKind::Num(c) => match (c.numer(), c.denom()) {
            (Some(n), Some(d)) if d != 1 => (SymExpr::int(n), SymExpr::int(d)),
            _ => (expr.clone(), one),
        },
        SymExprKind::Add(terms) => terms.iter().map(fraction).fold(
            (SymExpr::int(0), one),
            |(n1, d1), (n2, d2)| {
                if d1 == d2 {
                    (canon_add(vec![n1, n2]), d1)
                } else {
                    (
                        canon_add(vec![
                            canon_mul(vec![n1, d2.clone()]),
                            canon_mul(vec![n2, d1.clone()]),
                        ]),
                        canon_mul(vec![d1, d2]),
                    )
                }
            },
        ),
        SymExprKind::Mul(factors) => factors
            .iter()
            .map(fraction)
            .fold((one.clone(), one), |(n1, d1), (n2, d2)| {
                (canon_mul(vec![n1, n2]), canon_mul(vec![d1, d2]))
            }),
        SymExprKind::Pow(base, exp) => match exp.as_coeff() {
            Some(c) if c.is_integer() => {
                let (n, d) = fraction(base);
                if c.is_negative() {
                    let k = SymExpr::num(-*c);
                    (canon_pow(d, k.clone()), canon_pow(n, k))
                } else {
                    (canon_pow(n, exp.clone()), canon_pow(d, exp.clone()))
                }
            }
            Some(c) if c.is_negative() => (one, canon_pow(base.clone(), SymExpr::num(-*c))),
            None if has_negative_coeff(exp) => (
                one,
                canon_pow(base.clone(), canon_mul(vec![SymExpr::int(-1), exp.clone()])),
            ),
            _ => (expr.clone(), one),
        },
        SymExprKind::Neg(inner) => {
            let (n, d) = fraction(inner);
            (canon_mul(vec![SymExpr::int(-1), n]), d)
        }
        SymExprKind::Func(f, arg) => (canon_func(*f, together_or_keep(arg)), one),
        SymExprKind::Undef(name, args) => (
            SymExpr::undef(name.clone(), args.iter().map(together_or_keep).collect()),
            one,
        ),
        SymExprKind::Var(_) => (expr.clone(), one),
    }
}
