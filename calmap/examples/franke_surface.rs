use calmap::{
    create_evaluation_grid, generate_random_points, SurfaceInterpolator, SurfaceTable,
    TestSurfaces, ValueSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Scatter some table points in the unit square
    let num_points = 200usize;
    let points = generate_random_points(num_points, Some(42));

    // Define some values at the table points using Franke's function
    let point_values = TestSurfaces::franke_2d(&points);

    // Build the table and the interpolator
    let table = SurfaceTable::from_point_arrays(&points, &point_values)?;
    let model = SurfaceInterpolator::build(table)?;

    // Build a 2D grid of target points covering [0, 1]^2
    let n = 50;
    let axis: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
    let targets = create_evaluation_grid(&axis, &axis);

    // Evaluate, keeping track of which samples needed the nearest-neighbour fallback
    let evaluation = model.evaluate_detailed(&targets);

    let mut max_err = 0.0_f64;
    for ((x, y), (value, source)) in targets
        .iter()
        .zip(evaluation.values.iter().zip(&evaluation.sources))
    {
        if *source == ValueSource::Linear {
            let exact = TestSurfaces::franke_2d(&faer::Mat::from_fn(1, 2, |_, j| {
                if j == 0 { x } else { y }
            }));
            max_err = max_err.max((value - exact[(0, 0)]).abs());
        }
    }

    println!(
        "{} targets: {} linear, {} nearest; max linear error {:.4}",
        targets.len(),
        evaluation.count(ValueSource::Linear),
        evaluation.count(ValueSource::Nearest),
        max_err
    );

    Ok(())
}
