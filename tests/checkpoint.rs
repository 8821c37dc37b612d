use descent::config::TrainConfig;
use descent::model::{self, Linear, Model};
use descent::modelio::{load_parameters, save_parameters};
use descent::tensors::Tensor;
use descent::train::train;
use descent::{TrainError, tensor};

#[test]
fn trained_parameters_survive_a_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("linear.bpat");

    // y = 2x + 1
    let x = tensor!([[1.0], [2.0], [3.0], [4.0]]);
    let y = tensor!([[3.0], [5.0], [7.0], [9.0]]);
    let mut trained = Linear::zeros(1, 1);
    let config = TrainConfig::default().with_learning_rate(0.05).with_max_epochs(5000).with_verbose(0);
    train(&x, &y, &mut trained, &config).unwrap();

    save_parameters(&path, trained.parameters()).unwrap();

    let mut restored = Linear::zeros(1, 1);
    model::assign(&mut restored, load_parameters(&path).unwrap()).unwrap();

    assert_eq!(restored, trained);
    assert_eq!(restored.apply(&x).unwrap(), trained.apply(&x).unwrap());
}

#[test]
fn checkpoint_for_a_different_model_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.bpat");
    save_parameters(&path, Linear::zeros(3, 2).parameters()).unwrap();

    let mut narrow = Linear::zeros(1, 1);
    let err = model::assign(&mut narrow, load_parameters(&path).unwrap()).unwrap_err();
    assert!(matches!(err, TrainError::ShapeMismatch { .. }));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(load_parameters(dir.path().join("absent.bpat")), Err(TrainError::Io(_))));
}

#[test]
fn scalar_and_empty_shapes_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixed.bpat");
    let tensors = vec![Tensor::scalar(-0.25), Tensor::new(vec![0, 3], vec![]), tensor!(7.0)];

    save_parameters(&path, &tensors).unwrap();
    assert_eq!(load_parameters(&path).unwrap(), tensors);
}
