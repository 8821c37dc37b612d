//! Core tensor data structures.
//!
//! # Core Tensor Utilities
//!
//! Tensors here are deliberately plain: a shape and a flat row-major buffer.
//! Numerical work lives in [`crate::ops`]; this module only owns the layout.
//!
//! ## Design Highlights
//! - Tensors are strongly typed: `Tensor<T>` for any element type (usually `f64`)
//! - Shape is stored as a `Vec<usize>` and enforced at construction
//! - `WithGrad<T>` pairs any value with its gradient for autograd
//! - The `tensor!` macro supports ergonomic tensor creation from nested arrays
//!
//! ## Limitations
//! - Row-major only
//! - No broadcasting or slicing
//!
//! ## Example
//!
//! ```rust
//! use descent::tensors::Tensor;
//! let t = Tensor::new(vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! assert_eq!(t.shape, vec![2, 3]);
//! ```

/// Represents an N-dimensional tensor with a shape and flat row-major data.
///
/// - `shape` defines the structure, e.g., `[2, 3]` for a 2×3 matrix.
/// - `data` holds the flattened content in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    pub shape: Vec<usize>,
    pub data: Vec<T>,
}

/// The element type every training operation works in.
pub type Ten64 = Tensor<f64>;

impl<T> Tensor<T> {
    /// Creates a new tensor with the given shape and flat data.
    ///
    /// # Panics
    /// Panics if the number of elements in `data` does not match the shape product.
    pub fn new(shape: impl Into<Vec<usize>>, data: Vec<T>) -> Self {
        let shape = shape.into();
        assert_eq!(
            shape.iter().product::<usize>(),
            data.len(),
            "shape {:?} is incompatible with {} data elements",
            shape,
            data.len()
        );
        Self { shape, data }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T: Clone + Default> Tensor<T> {
    /// A tensor of the given shape filled with `T::default()`.
    pub fn zeros(shape: impl Into<Vec<usize>>) -> Self {
        let shape = shape.into();
        let len = shape.iter().product();
        Self { shape, data: vec![T::default(); len] }
    }
}

impl Ten64 {
    /// A one-element tensor of shape `[1]`.
    pub fn scalar(value: f64) -> Self {
        Self { shape: vec![1], data: vec![value] }
    }
}

/// A container for tracking gradients of values (used in autograd).
///
/// Typically used as `WithGrad<Ten64>`. The operations in [`crate::backprop`]
/// only read `value` and hand gradients back through their closures; `grad`
/// is where a caller accumulates them by hand. Forward-only code such as
/// [`crate::model::Model::apply`] should use the plain-tensor ops instead.
#[derive(Debug, Clone)]
pub struct WithGrad<T> {
    pub value: T,
    pub grad: T,
}

impl WithGrad<Ten64> {
    /// Wraps `value` with a zeroed gradient of the same shape.
    pub fn new(value: Ten64) -> Self {
        let grad = Tensor::zeros(value.shape.clone());
        Self { value, grad }
    }
}

/// Defines a tensor from nested literal arrays.
///
/// Supports arbitrary dimensionality as long as sublists are uniform in shape.
///
/// # Example
/// ```
/// use descent::tensor;
/// let t = tensor!([[1.0, 2.0], [3.0, 4.0]]);
/// assert_eq!(t.shape, vec![2, 2]);
/// ```
///
/// Elements may be any expression, including negative literals:
/// ```
/// use descent::tensor;
/// let t = tensor!([[0.5, -1.0], [-2.0, 3.0]]);
/// assert_eq!(t.data, vec![0.5, -1.0, -2.0, 3.0]);
/// ```
#[macro_export]
macro_rules! tensor {
    ([ $( [ $($row:tt)* ] ),+ $(,)? ]) => {{
        let children = vec![ $( $crate::tensor!([ $($row)* ]) ),+ ];
        let first_shape = &children[0].shape;
        assert!(children.iter().all(|c| c.shape == *first_shape),
            "ragged tensor literal (rows have mismatched shapes)");
        let mut shape = vec![children.len()];
        shape.extend_from_slice(first_shape);
        let mut data = Vec::with_capacity(children.len() * children[0].data.len());
        for c in children { data.extend(c.data); }
        $crate::tensors::Tensor::new(shape, data)
    }};

    ([ $( $x:expr ),+ $(,)? ]) => {{
        let data = vec![ $( $x ),+ ];
        $crate::tensors::Tensor::new(vec![data.len()], data)
    }};

    ($x:expr) => {
        $crate::tensors::Tensor::new(Vec::<usize>::new(), vec![$x])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_matches_shape() {
        let t: Ten64 = Tensor::zeros(vec![2, 3]);
        assert_eq!(t.len(), 6);
        assert!(t.data.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn with_grad_starts_zeroed() {
        let w = WithGrad::new(crate::tensor!([1.0, 2.0]));
        assert_eq!(w.grad.shape, vec![2]);
        assert_eq!(w.grad.data, vec![0.0, 0.0]);
    }

    #[test]
    fn nested_macro_flattens_row_major() {
        let t = crate::tensor!([[1.0], [2.0], [3.0]]);
        assert_eq!(t.shape, vec![3, 1]);
        assert_eq!(t.data, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn macro_accepts_signed_elements() {
        let t = crate::tensor!([[0.3, -0.2], [-1.5, 2.0], [0.0, -0.0]]);
        assert_eq!(t.shape, vec![3, 2]);
        assert_eq!(t.data, vec![0.3, -0.2, -1.5, 2.0, 0.0, -0.0]);

        let row = crate::tensor!([-1.0, 1.0, -2.0,]);
        assert_eq!(row.shape, vec![3]);
        assert_eq!(row.data, vec![-1.0, 1.0, -2.0]);

        let scalar = crate::tensor!(-4.0);
        assert!(scalar.shape.is_empty());
        assert_eq!(scalar.data, vec![-4.0]);
    }

    #[test]
    fn macro_builds_three_dimensions() {
        let t = crate::tensor!([[[1.0, -2.0]], [[-3.0, 4.0]]]);
        assert_eq!(t.shape, vec![2, 1, 2]);
        assert_eq!(t.data, vec![1.0, -2.0, -3.0, 4.0]);
    }
}
