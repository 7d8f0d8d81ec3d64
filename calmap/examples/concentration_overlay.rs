use calmap::{
    common_time_base, progress::closure_sink, recompute, resample_linear, ColorRamp,
    ConcentrationAggregator, Extrapolation, Grid, OverlayMode, OverlaySettings, RangeCondition,
    RangeFilter, SampleSeries, SurfaceInterpolator, SurfaceTable, TestSurfaces,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A coarse fuel-consumption table over RPM x ETASP
    let rpm_axis = [800.0, 1200.0, 1600.0, 2000.0, 2400.0, 2800.0, 3200.0, 3600.0, 4000.0];
    let etasp_axis = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0];
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut zs = Vec::new();
    for &etasp in &etasp_axis {
        for &rpm in &rpm_axis {
            xs.push(rpm);
            ys.push(etasp);
            zs.push(TestSurfaces::consumption_bowl(rpm, etasp));
        }
    }
    let table = SurfaceTable::from_columns(&xs, &ys, &zs)?;

    // Print progress messages as they arrive
    let (sink, listener) = closure_sink(64, |msg| println!("{msg:?}"));
    let model = SurfaceInterpolator::builder(table.clone())
        .progress_callback(sink.clone())
        .build()?;

    // Two channels recorded at different rates, synchronised onto a 20 ms raster
    let rpm_t: Vec<f64> = (0..6000).map(|i| i as f64 * 0.01).collect();
    let rpm_v: Vec<f64> = rpm_t.iter().map(|t| 2200.0 + 1500.0 * (t / 7.0).sin()).collect();
    let load_t: Vec<f64> = (0..1200).map(|i| 0.005 + i as f64 * 0.05).collect();
    let load_v: Vec<f64> = load_t.iter().map(|t| 0.55 + 0.4 * (t / 3.0).cos()).collect();

    let times = common_time_base(load_t[0], rpm_t[rpm_t.len() - 1], 0.02)?;
    let rpm = resample_linear(&rpm_t, &rpm_v, &times, Extrapolation::Clamp)?;
    let load = resample_linear(&load_t, &load_v, &times, Extrapolation::Clamp)?;

    // Keep only samples above idle
    let keep = RangeFilter::new(900.0, f64::INFINITY, RangeCondition::Within)?.mask(&rpm);
    let log = SampleSeries::new(rpm, load)?.select(&keep)?;

    // Derived channel for every log sample
    let consumption = model.evaluate(&log);
    let mean = consumption.iter().sum::<f64>() / consumption.len().max(1) as f64;
    println!("mean consumption over {} samples: {mean:.1}", consumption.len());

    // Operating-point concentration over the table's own cells
    let grid = Grid::from_table(&table)?;
    let concentration = ConcentrationAggregator::new()
        .progress_callback(sink)
        .compute(&log, &grid);
    let duration_hours = log.len() as f64 * 0.02 / 3600.0;
    let metrics = concentration.metrics();
    if let Some((row, col)) = metrics.max_cell {
        println!(
            "busiest cell: rpm {} etasp {} with {:.2}% (~{:.3} h)",
            rpm_axis[col],
            etasp_axis[row],
            metrics.max_percentage,
            concentration.estimated_hours(row, col, duration_hours)
        );
    }
    println!(
        "coverage {:.1}% of cells, average {:.3}% per cell",
        metrics.coverage, metrics.average_percentage
    );

    // Overlay for display
    let settings = OverlaySettings::builder(OverlayMode::Scatter)
        .gamma(0.7)
        .scatter_density(0.5)
        .build()?;
    let overlay = recompute(&concentration, &settings)?;
    let ramp = ColorRamp::default();
    let peak = ramp.color(overlay.max_value, overlay.max_value);
    println!(
        "overlay {}x{} samples, {} scatter points, peak colour {:?}",
        overlay.y_axis.len(),
        overlay.x_axis.len(),
        overlay.scatter.len(),
        peak
    );

    drop(model);
    listener.join().map_err(|_| "progress listener panicked")?;
    Ok(())
}
