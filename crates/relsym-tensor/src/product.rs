//! Tensor products and contraction

use crate::error::{Result, TensorError};
use crate::relativity::BaseRelativityTensor;
use crate::tensor::Tensor;
use relsym_symbolic::{SymArray, SymExpr};

/// Outer product of `a` and `b`, optionally contracting index `i` of `a`
/// with index `j` of `b`.
///
/// The result's indices are those of `a` followed by those of `b`, minus the
/// contracted pair. A contracted pair must have opposite variance and equal
/// dimension.
pub fn tensor_product(a: &Tensor, b: &Tensor, contract: Option<(usize, usize)>) -> Result<Tensor> {
    let Some((i, j)) = contract else {
        return outer(a, b);
    };
    let (va, vb) = match (a.config().get(i), b.config().get(j)) {
        (Some(va), Some(vb)) => (va, vb),
        (None, _) => {
            return Err(TensorError::ContractionIndex {
                index: i,
                order: a.order(),
            })
        }
        (_, None) => {
            return Err(TensorError::ContractionIndex {
                index: j,
                order: b.order(),
            })
        }
    };
    if vb != va.flip() {
        return Err(TensorError::ContractionVariance(va));
    }
    let (dim_a, dim_b) = (a.shape()[i], b.shape()[j]);
    if dim_a != dim_b {
        return Err(TensorError::ContractionDimension {
            left: dim_a,
            right: dim_b,
        });
    }
    log::debug!("contracting index {i} (order {}) with index {j} (order {})", a.order(), b.order());

    let shape_a = without(a.shape(), i);
    let shape_b = without(b.shape(), j);
    let split = shape_a.len();
    let shape: Vec<usize> = shape_a.iter().chain(&shape_b).copied().collect();

    let arr = SymArray::from_fn(shape, |idx| {
        let (left, right) = idx.split_at(split);
        (0..dim_a).fold(SymExpr::int(0), |acc, k| {
            let ia = with_inserted(left, i, k);
            let ib = with_inserted(right, j, k);
            acc + &a.tensor()[&ia[..]] * &b.tensor()[&ib[..]]
        })
    });
    let config = a.config().without(i).concat(&b.config().without(j));
    Tensor::with_index_config(arr, config)
}

fn outer(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    let split = a.order();
    let shape: Vec<usize> = a.shape().iter().chain(b.shape()).copied().collect();
    let arr = SymArray::from_fn(shape, |idx| {
        let (left, right) = idx.split_at(split);
        &a.tensor()[left] * &b.tensor()[right]
    });
    Tensor::with_index_config(arr, a.config().concat(b.config()))
}

fn without(shape: &[usize], position: usize) -> Vec<usize> {
    shape
        .iter()
        .enumerate()
        .filter(|(p, _)| *p != position)
        .map(|(_, d)| *d)
        .collect()
}

fn with_inserted(index: &[usize], position: usize, value: usize) -> Vec<usize> {
    let mut out = index.to_vec();
    out.insert(position, value);
    out
}

impl BaseRelativityTensor {
    /// Product with another tensor over the same coordinates.
    pub fn product(
        &self,
        other: &BaseRelativityTensor,
        contract: Option<(usize, usize)>,
    ) -> Result<BaseRelativityTensor> {
        if self.symbols() != other.symbols() {
            return Err(TensorError::CoordinateMismatch {
                left: self.symbols().iter().map(|s| s.name.clone()).collect(),
                right: other.symbols().iter().map(|s| s.name.clone()).collect(),
            });
        }
        let tensor = tensor_product(self.as_tensor(), other.as_tensor(), contract)?;
        Ok(self.rewrap(tensor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relsym_symbolic::parse;

    fn p(s: &str) -> SymExpr {
        parse(s).unwrap()
    }

    #[test]
    fn test_outer_product_shape_and_config() {
        let u = Tensor::with_config(vec![p("a"), p("b")], "u").unwrap();
        let w = Tensor::with_config(vec![p("x"), p("y"), p("z")], "l").unwrap();
        let t = tensor_product(&u, &w, None).unwrap();
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.config().to_string(), "ul");
        assert_eq!(t[[1, 2]], p("b*z"));
    }

    #[test]
    fn test_contraction_sums_paired_components() {
        let g = Tensor::with_config(
            vec![vec![p("1"), p("0")], vec![p("0"), p("r**2")]],
            "ll",
        )
        .unwrap();
        let v = Tensor::with_config(vec![p("vr"), p("vt")], "u").unwrap();
        // lowering an index: v_i = g_ij v^j
        let lowered = tensor_product(&g, &v, Some((1, 0))).unwrap();
        assert_eq!(lowered.order(), 1);
        assert_eq!(lowered.config().to_string(), "l");
        assert_eq!(lowered[[0]], p("vr"));
        assert_eq!(lowered[[1]], p("r**2*vt"));
    }

    #[test]
    fn test_contraction_errors() {
        let a = Tensor::with_config(vec![p("x"), p("y")], "l").unwrap();
        let b = Tensor::with_config(vec![p("x"), p("y")], "l").unwrap();
        let c = Tensor::with_config(vec![p("x"), p("y"), p("z")], "u").unwrap();
        assert!(matches!(
            tensor_product(&a, &b, Some((0, 0))),
            Err(TensorError::ContractionVariance(_))
        ));
        assert!(matches!(
            tensor_product(&a, &c, Some((0, 0))),
            Err(TensorError::ContractionDimension { left: 2, right: 3 })
        ));
        assert!(matches!(
            tensor_product(&a, &c, Some((1, 0))),
            Err(TensorError::ContractionIndex { index: 1, order: 1 })
        ));
    }
}
