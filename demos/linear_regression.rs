use descent::{
    config::TrainConfig,
    model::{self, Linear, Model},
    modelio::{load_parameters, save_parameters},
    tensors::Tensor,
    train::train,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("descent=info".parse()?),
        )
        .init();

    // prepare training data: y = 2x + 1
    let x = Tensor::new(vec![4, 1], vec![1.0, 2.0, 3.0, 4.0]);
    let y = Tensor::new(vec![4, 1], vec![3.0, 5.0, 7.0, 9.0]);

    let mut linear = Linear::zeros(1, 1);
    let config = TrainConfig::default()
        .with_learning_rate(0.05)
        .with_max_epochs(5000)
        .with_min_tol(1e-8)
        .with_verbose(250);

    let report = train(&x, &y, &mut linear, &config)?;
    println!(
        "{:?} after {} iterations, best loss {:.3e}",
        report.outcome,
        report.state.iterations,
        report.best_loss().unwrap_or(f64::NAN)
    );
    println!("w = {:.4}, b = {:.4}", linear.weights().data[0], linear.bias().data[0]);

    let path = std::env::temp_dir().join("descent_linear.bpat");
    save_parameters(&path, linear.parameters())?;

    let mut restored = Linear::zeros(1, 1);
    model::assign(&mut restored, load_parameters(&path)?)?;
    println!("restored prediction for x = 5: {:.4}", restored.apply(&Tensor::new(vec![1, 1], vec![5.0]))?.data[0]);

    Ok(())
}
