use descent::backprop::*;
use descent::tensors::*;
use descent::{TrainError, tensor};

#[test]
fn test_tensor_shape_mismatch_panics() {
    let result = std::panic::catch_unwind(|| {
        Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0]);
    });
    assert!(result.is_err());
}

#[test]
fn test_tensor_macro() {
    let t = tensor!([[1.0, 2.0], [3.0, 4.0]]);
    assert_eq!(t.shape, vec![2, 2]);
    assert_eq!(t.data, vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_matmul_backprop() {
    let a = WithGrad::new(Tensor::new(vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
    let b = WithGrad::new(Tensor::new(vec![3, 2], vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0]));

    let (output, backward) = matmul(&a, &b).unwrap();
    assert_eq!(output.shape, vec![2, 2]);
    assert_eq!(output.data, vec![58.0, 64.0, 139.0, 154.0]);

    let (grad_a, grad_b) = backward(&Tensor::new(vec![2, 2], vec![1.0; 4]));
    assert_eq!(grad_a.shape, vec![2, 3]);
    assert_eq!(grad_a.data, vec![15.0, 19.0, 23.0, 15.0, 19.0, 23.0]);
    assert_eq!(grad_b.shape, vec![3, 2]);
    assert_eq!(grad_b.data, vec![5.0, 5.0, 7.0, 7.0, 9.0, 9.0]);
}

#[test]
fn test_matmul_inner_dimension_mismatch() {
    let a = WithGrad::new(Tensor::zeros(vec![2, 3]));
    let b = WithGrad::new(Tensor::zeros(vec![2, 2]));
    assert!(matches!(matmul(&a, &b), Err(TrainError::ShapeMismatch { .. })));
}

#[test]
fn test_matmul_forward_matches_autograd_product() {
    let a = tensor!([[1.0, -2.0, 3.0], [-4.0, 5.0, -6.0]]);
    let b = tensor!([[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]]);
    let (with_back, _) = matmul(&WithGrad::new(a.clone()), &WithGrad::new(b.clone())).unwrap();
    assert_eq!(matmul_forward(&a, &b).unwrap(), with_back);

    let err = matmul_forward(&a, &Tensor::zeros(vec![2, 2])).unwrap_err();
    assert!(matches!(err, TrainError::ShapeMismatch { .. }));
}

#[test]
fn test_mse_loss() {
    let pred = WithGrad::new(Tensor::new(vec![2], vec![1.0, 2.0]));
    let target = Tensor::new(vec![2], vec![1.5, 2.5]);
    let (loss, backward) = mse_loss(&pred, &target).unwrap();
    let grad = backward(1.0);
    assert_eq!(loss, 0.25);
    assert_eq!(grad.data, vec![-0.5, -0.5]);
    assert_eq!(mse(&pred.value, &target).unwrap(), loss);
}

#[test]
fn test_mse_shape_mismatch() {
    let err = mse(&tensor!([1.0, 2.0]), &tensor!([[1.0, 2.0]])).unwrap_err();
    assert!(matches!(err, TrainError::ShapeMismatch { .. }));
}

#[test]
fn test_sgd() {
    let mut params = vec![Tensor::new(vec![2], vec![1.0, 2.0])];
    sgd(&mut params, &[Tensor::new(vec![2], vec![0.1, 0.2])], 0.5).unwrap();
    assert_eq!(params[0].data, vec![0.95, 1.9]);
}

#[test]
fn test_sgd_single_scalar_step() {
    let mut params = vec![Tensor::scalar(1.0)];
    sgd(&mut params, &[Tensor::scalar(2.0)], 0.01).unwrap();
    assert!((params[0].data[0] - 0.98).abs() < 1e-15);
}

#[test]
fn test_sgd_misaligned_gradients_leave_params_alone() {
    let mut params = vec![Tensor::scalar(1.0), Tensor::zeros(vec![2])];

    let err = sgd(&mut params, &[Tensor::scalar(1.0)], 0.1).unwrap_err();
    assert!(matches!(err, TrainError::GradientCount { expected: 2, found: 1 }));

    let err = sgd(&mut params, &[Tensor::scalar(1.0), Tensor::zeros(vec![3])], 0.1).unwrap_err();
    assert!(matches!(err, TrainError::ShapeMismatch { .. }));

    assert_eq!(params[0].data, vec![1.0]);
}
