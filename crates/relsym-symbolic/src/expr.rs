//! Symbolic expression trees
//!
//! `SymExpr` is an immutable, reference-counted expression node. Cloning is
//! cheap and expressions can be shared freely between arrays and threads.
//!
//! There are two ways to build expressions:
//! - the associated constructors (`SymExpr::add`, `SymExpr::mul`, ...) build
//!   raw nodes exactly as given;
//! - the arithmetic operators (`+ - * /`, unary `-`) and `powi` evaluate
//!   eagerly into canonical form, so `x - x` is `0` and `x * x` is `x**2`.

use crate::coeff::Coefficient;
use crate::normalize::{self, canon_add, canon_mul, canon_pow, canonical};
use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

/// Elementary functions with known algebraic and numeric behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElemFunc {
    Sin,
    Cos,
    Tan,
    Exp,
    Log,
    Sinh,
    Cosh,
    Tanh,
    Asin,
    Acos,
    Atan,
}

impl ElemFunc {
    pub fn from_name(name: &str) -> Option<Self> {
        let f = match name {
            "sin" => ElemFunc::Sin,
            "cos" => ElemFunc::Cos,
            "tan" => ElemFunc::Tan,
            "exp" => ElemFunc::Exp,
            "log" | "ln" => ElemFunc::Log,
            "sinh" => ElemFunc::Sinh,
            "cosh" => ElemFunc::Cosh,
            "tanh" => ElemFunc::Tanh,
            "asin" => ElemFunc::Asin,
            "acos" => ElemFunc::Acos,
            "atan" => ElemFunc::Atan,
            _ => return None,
        };
        Some(f)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ElemFunc::Sin => "sin",
            ElemFunc::Cos => "cos",
            ElemFunc::Tan => "tan",
            ElemFunc::Exp => "exp",
            ElemFunc::Log => "log",
            ElemFunc::Sinh => "sinh",
            ElemFunc::Cosh => "cosh",
            ElemFunc::Tanh => "tanh",
            ElemFunc::Asin => "asin",
            ElemFunc::Acos => "acos",
            ElemFunc::Atan => "atan",
        }
    }

    pub fn eval_f64(&self, x: f64) -> f64 {
        match self {
            ElemFunc::Sin => x.sin(),
            ElemFunc::Cos => x.cos(),
            ElemFunc::Tan => x.tan(),
            ElemFunc::Exp => x.exp(),
            ElemFunc::Log => x.ln(),
            ElemFunc::Sinh => x.sinh(),
            ElemFunc::Cosh => x.cosh(),
            ElemFunc::Tanh => x.tanh(),
            ElemFunc::Asin => x.asin(),
            ElemFunc::Acos => x.acos(),
            ElemFunc::Atan => x.atan(),
        }
    }
}

/// The node kinds of a symbolic expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymExprKind {
    Num(Coefficient),
    Var(Symbol),
    Add(Vec<SymExpr>),
    Mul(Vec<SymExpr>),
    Pow(SymExpr, SymExpr),
    Neg(SymExpr),
    Func(ElemFunc, SymExpr),
    /// Application of an undefined function, e.g. `f(x, y)`.
    /// A bare undefined function such as `f` has no arguments.
    Undef(String, Vec<SymExpr>),
}

/// A symbolic expression
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymExpr {
    pub kind: Arc<SymExprKind>,
}

impl SymExpr {
    pub fn new(kind: SymExprKind) -> Self {
        SymExpr {
            kind: Arc::new(kind),
        }
    }

    pub fn num(c: Coefficient) -> Self {
        Self::new(SymExprKind::Num(c))
    }

    pub fn int(n: i64) -> Self {
        Self::num(Coefficient::int(n))
    }

    pub fn rational(num: i64, den: i64) -> Self {
        Self::num(Coefficient::rational(num, den))
    }

    /// Integral values become exact integers, as `From<f64>` for `Coefficient`.
    pub fn float(f: f64) -> Self {
        Self::num(Coefficient::from_f64_exact(f))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::symbol(Symbol::new(name))
    }

    pub fn symbol(symbol: Symbol) -> Self {
        Self::new(SymExprKind::Var(symbol))
    }

    /// Raw sum; an empty sum is `0` and a single term is returned as is.
    pub fn add(mut terms: Vec<SymExpr>) -> Self {
        match terms.len() {
            0 => Self::int(0),
            1 => terms.remove(0),
            _ => Self::new(SymExprKind::Add(terms)),
        }
    }

    /// Raw product; an empty product is `1` and a single factor is returned as is.
    pub fn mul(mut factors: Vec<SymExpr>) -> Self {
        match factors.len() {
            0 => Self::int(1),
            1 => factors.remove(0),
            _ => Self::new(SymExprKind::Mul(factors)),
        }
    }

    pub fn pow(base: SymExpr, exp: SymExpr) -> Self {
        Self::new(SymExprKind::Pow(base, exp))
    }

    pub fn neg(inner: SymExpr) -> Self {
        Self::new(SymExprKind::Neg(inner))
    }

    pub fn func(f: ElemFunc, arg: SymExpr) -> Self {
        Self::new(SymExprKind::Func(f, arg))
    }

    /// Undefined function application `name(args...)`.
    pub fn undef(name: impl Into<String>, args: Vec<SymExpr>) -> Self {
        Self::new(SymExprKind::Undef(name.into(), args))
    }

    pub fn sin(arg: SymExpr) -> Self {
        Self::func(ElemFunc::Sin, arg)
    }

    pub fn cos(arg: SymExpr) -> Self {
        Self::func(ElemFunc::Cos, arg)
    }

    pub fn tan(arg: SymExpr) -> Self {
        Self::func(ElemFunc::Tan, arg)
    }

    pub fn exp(arg: SymExpr) -> Self {
        Self::func(ElemFunc::Exp, arg)
    }

    pub fn log(arg: SymExpr) -> Self {
        Self::func(ElemFunc::Log, arg)
    }

    pub fn sqrt(arg: SymExpr) -> Self {
        Self::pow(arg, Self::rational(1, 2))
    }

    // Queries

    pub fn as_coeff(&self) -> Option<&Coefficient> {
        match self.kind.as_ref() {
            SymExprKind::Num(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<&Symbol> {
        match self.kind.as_ref() {
            SymExprKind::Var(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_add(&self) -> Option<&[SymExpr]> {
        match self.kind.as_ref() {
            SymExprKind::Add(terms) => Some(terms),
            _ => None,
        }
    }

    pub fn as_mul(&self) -> Option<&[SymExpr]> {
        match self.kind.as_ref() {
            SymExprKind::Mul(factors) => Some(factors),
            _ => None,
        }
    }

    pub fn is_num(&self) -> bool {
        self.as_coeff().is_some()
    }

    pub fn is_var(&self) -> bool {
        self.as_var().is_some()
    }

    pub fn is_add(&self) -> bool {
        self.as_add().is_some()
    }

    pub fn is_mul(&self) -> bool {
        self.as_mul().is_some()
    }

    pub fn is_zero(&self) -> bool {
        self.as_coeff().is_some_and(Coefficient::is_zero)
    }

    pub fn is_one(&self) -> bool {
        self.as_coeff().is_some_and(Coefficient::is_one)
    }

    pub fn is_neg_one(&self) -> bool {
        self.as_coeff().is_some_and(Coefficient::is_neg_one)
    }

    pub fn is_undefined_function(&self) -> bool {
        matches!(self.kind.as_ref(), SymExprKind::Undef(..))
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Direct sub-expressions, in order
    pub fn children(&self) -> Vec<&SymExpr> {
        match self.kind.as_ref() {
            SymExprKind::Num(_) | SymExprKind::Var(_) => Vec::new(),
            SymExprKind::Add(items) | SymExprKind::Mul(items) | SymExprKind::Undef(_, items) => {
                items.iter().collect()
            }
            SymExprKind::Pow(base, exp) => vec![base, exp],
            SymExprKind::Neg(inner) | SymExprKind::Func(_, inner) => vec![inner],
        }
    }

    /// Rebuild this node with every direct child mapped through `f`.
    /// The result is a raw node of the same kind.
    pub fn map_children(&self, mut f: impl FnMut(&SymExpr) -> SymExpr) -> SymExpr {
        match self.kind.as_ref() {
            SymExprKind::Num(_) | SymExprKind::Var(_) => self.clone(),
            SymExprKind::Add(terms) => {
                SymExpr::new(SymExprKind::Add(terms.iter().map(f).collect()))
            }
            SymExprKind::Mul(factors) => {
                SymExpr::new(SymExprKind::Mul(factors.iter().map(f).collect()))
            }
            SymExprKind::Pow(base, exp) => SymExpr::pow(f(base), f(exp)),
            SymExprKind::Neg(inner) => SymExpr::neg(f(inner)),
            SymExprKind::Func(func, arg) => SymExpr::func(*func, f(arg)),
            SymExprKind::Undef(name, args) => {
                SymExpr::undef(name.clone(), args.iter().map(f).collect())
            }
        }
    }

    /// Pre-order traversal
    pub fn walk(&self, visit: &mut impl FnMut(&SymExpr)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Free symbols, including those appearing inside undefined function arguments.
    pub fn free_vars(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.walk(&mut |e| {
            if let SymExprKind::Var(s) = e.kind.as_ref() {
                out.insert(s.clone());
            }
        });
        out
    }

    pub fn has_symbol(&self, symbol: &Symbol) -> bool {
        self.free_vars().contains(symbol)
    }

    /// Every distinct undefined function application, nested ones included.
    pub fn undefined_functions(&self) -> BTreeSet<SymExpr> {
        let mut out = BTreeSet::new();
        self.walk(&mut |e| {
            if e.is_undefined_function() {
                out.insert(e.clone());
            }
        });
        out
    }

    /// Structural replacement of every occurrence of `target`, without evaluation.
    pub fn replace(&self, target: &SymExpr, value: &SymExpr) -> SymExpr {
        if self == target {
            return value.clone();
        }
        self.map_children(|c| c.replace(target, value))
    }

    /// Replace `target` (usually a symbol) by `value` and re-evaluate.
    pub fn substitute(&self, target: &SymExpr, value: &SymExpr) -> SymExpr {
        canonical(&canonical(self).replace(&canonical(target), &canonical(value)))
    }

    /// Apply several substitutions one after another.
    pub fn subs(&self, pairs: &[(SymExpr, SymExpr)]) -> SymExpr {
        pairs
            .iter()
            .fold(canonical(self), |acc, (target, value)| acc.substitute(target, value))
    }

    pub fn simplify(&self) -> SymExpr {
        crate::simplify::simplify(self)
    }

    pub fn expand(&self) -> SymExpr {
        normalize::expand(&canonical(self))
    }

    /// Canonical integer power
    pub fn powi(&self, n: i64) -> SymExpr {
        canon_pow(canonical(self), SymExpr::int(n))
    }

    /// Canonical power with a symbolic exponent
    pub fn pow_expr(&self, exp: &SymExpr) -> SymExpr {
        canon_pow(canonical(self), canonical(exp))
    }

    fn kind_rank(&self) -> u8 {
        match self.kind.as_ref() {
            SymExprKind::Num(_) => 0,
            SymExprKind::Var(_) => 1,
            SymExprKind::Undef(..) => 2,
            SymExprKind::Func(..) => 3,
            SymExprKind::Pow(..) => 4,
            SymExprKind::Mul(_) => 5,
            SymExprKind::Add(_) => 6,
            SymExprKind::Neg(_) => 7,
        }
    }
}

fn cmp_slices(a: &[SymExpr], b: &[SymExpr]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Canonical total order: numbers, symbols, undefined functions, elementary
/// functions, powers, products, sums. Equal only for structurally equal trees.
impl Ord for SymExpr {
    fn cmp(&self, other: &Self) -> Ordering {
        if Arc::ptr_eq(&self.kind, &other.kind) {
            return Ordering::Equal;
        }
        let by_rank = self.kind_rank().cmp(&other.kind_rank());
        if by_rank != Ordering::Equal {
            return by_rank;
        }
        match (self.kind.as_ref(), other.kind.as_ref()) {
            (SymExprKind::Num(a), SymExprKind::Num(b)) => a.cmp(b),
            (SymExprKind::Var(a), SymExprKind::Var(b)) => a.cmp(b),
            (SymExprKind::Undef(na, aa), SymExprKind::Undef(nb, ab)) => {
                na.cmp(nb).then_with(|| cmp_slices(aa, ab))
            }
            (SymExprKind::Func(fa, aa), SymExprKind::Func(fb, ab)) => {
                fa.cmp(fb).then_with(|| aa.cmp(ab))
            }
            (SymExprKind::Pow(ba, ea), SymExprKind::Pow(bb, eb)) => {
                ba.cmp(bb).then_with(|| ea.cmp(eb))
            }
            (SymExprKind::Mul(a), SymExprKind::Mul(b))
            | (SymExprKind::Add(a), SymExprKind::Add(b)) => cmp_slices(a, b),
            (SymExprKind::Neg(a), SymExprKind::Neg(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl PartialOrd for SymExpr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for SymExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymExpr({})", self)
    }
}

impl Default for SymExpr {
    fn default() -> Self {
        SymExpr::int(0)
    }
}

impl From<i64> for SymExpr {
    fn from(n: i64) -> Self {
        SymExpr::int(n)
    }
}

impl From<i32> for SymExpr {
    fn from(n: i32) -> Self {
        SymExpr::int(n as i64)
    }
}

impl From<f64> for SymExpr {
    fn from(f: f64) -> Self {
        SymExpr::float(f)
    }
}

impl From<Coefficient> for SymExpr {
    fn from(c: Coefficient) -> Self {
        SymExpr::num(c)
    }
}

impl From<Symbol> for SymExpr {
    fn from(s: Symbol) -> Self {
        SymExpr::symbol(s)
    }
}

impl From<&Symbol> for SymExpr {
    fn from(s: &Symbol) -> Self {
        SymExpr::symbol(s.clone())
    }
}

impl From<&SymExpr> for SymExpr {
    fn from(e: &SymExpr) -> Self {
        e.clone()
    }
}

fn add_exprs(a: &SymExpr, b: &SymExpr) -> SymExpr {
    canon_add(vec![canonical(a), canonical(b)])
}

fn sub_exprs(a: &SymExpr, b: &SymExpr) -> SymExpr {
    canon_add(vec![canonical(a), canon_mul(vec![SymExpr::int(-1), canonical(b)])])
}

fn mul_exprs(a: &SymExpr, b: &SymExpr) -> SymExpr {
    canon_mul(vec![canonical(a), canonical(b)])
}

fn div_exprs(a: &SymExpr, b: &SymExpr) -> SymExpr {
    canon_mul(vec![canonical(a), canon_pow(canonical(b), SymExpr::int(-1))])
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $build:ident) => {
        impl $trait<SymExpr> for SymExpr {
            type Output = SymExpr;
            fn $method(self, rhs: SymExpr) -> SymExpr {
                $build(&self, &rhs)
            }
        }

        impl $trait<&SymExpr> for SymExpr {
            type Output = SymExpr;
            fn $method(self, rhs: &SymExpr) -> SymExpr {
                $build(&self, rhs)
            }
        }

        impl $trait<SymExpr> for &SymExpr {
            type Output = SymExpr;
            fn $method(self, rhs: SymExpr) -> SymExpr {
                $build(self, &rhs)
            }
        }

        impl $trait<&SymExpr> for &SymExpr {
            type Output = SymExpr;
            fn $method(self, rhs: &SymExpr) -> SymExpr {
                $build(self, rhs)
            }
        }

        impl_binop!(@scalar $trait, $method, $build, i32);
        impl_binop!(@scalar $trait, $method, $build, i64);
        impl_binop!(@scalar $trait, $method, $build, f64);
    };
    (@scalar $trait:ident, $method:ident, $build:ident, $t:ty) => {
        impl $trait<$t> for SymExpr {
            type Output = SymExpr;
            fn $method(self, rhs: $t) -> SymExpr {
                $build(&self, &SymExpr::from(rhs))
            }
        }

        impl $trait<$t> for &SymExpr {
            type Output = SymExpr;
            fn $method(self, rhs: $t) -> SymExpr {
                $build(self, &SymExpr::from(rhs))
            }
        }

        impl $trait<SymExpr> for $t {
            type Output = SymExpr;
            fn $method(self, rhs: SymExpr) -> SymExpr {
                $build(&SymExpr::from(self), &rhs)
            }
        }

        impl $trait<&SymExpr> for $t {
            type Output = SymExpr;
            fn $method(self, rhs: &SymExpr) -> SymExpr {
                $build(&SymExpr::from(self), rhs)
            }
        }
    };
}

impl_binop!(Add, add, add_exprs);
impl_binop!(Sub, sub, sub_exprs);
impl_binop!(Mul, mul, mul_exprs);
impl_binop!(Div, div, div_exprs);

impl Neg for SymExpr {
    type Output = SymExpr;

    fn neg(self) -> SymExpr {
        -&self
    }
}

impl Neg for &SymExpr {
    type Output = SymExpr;

    fn neg(self) -> SymExpr {
        canon_mul(vec![SymExpr::int(-1), canonical(self)])
    }
}
