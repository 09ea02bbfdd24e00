use std::fmt::Write as _;
use std::fs;

use tempfile::TempDir;
use u_probability::approximation::{compare_interval, DiscretizationReport};
use u_probability::histogram::sturges_bins;
use u_probability::{
    ContinuousDistribution, ExperimentConfig, Heights, Histogram, MonteCarlo, Normal, ProbError,
};

fn male_heights() -> Vec<f64> {
    let mut v = Vec::new();
    for (value, count) in [
        (64.0, 2),
        (66.0, 4),
        (67.0, 6),
        (68.0, 9),
        (69.0, 10),
        (70.0, 11),
        (71.0, 8),
        (72.0, 7),
        (74.0, 3),
    ] {
        v.extend(std::iter::repeat(value).take(count));
    }
    v.extend([68.897638, 70.47244, 69.29134]);
    v
}

fn write_csv(dir: &TempDir) -> std::path::PathBuf {
    let mut csv = String::from("sex,height\n");
    for h in male_heights() {
        writeln!(csv, "Male,{h}").unwrap();
    }
    for h in [62.0, 63.0, 64.0, 64.0, 65.0, 66.5] {
        writeln!(csv, "Female,{h}").unwrap();
    }
    csv.push_str("Female,\nMale,5'11\n");
    let path = dir.path().join("heights.csv");
    fs::write(&path, csv).unwrap();
    path
}

#[test]
fn test_load_and_describe() {
    let dir = TempDir::new().unwrap();
    let heights = Heights::from_csv_path(write_csv(&dir)).unwrap();
    assert_eq!(heights.len(), 69);

    let male = heights.summary(Some("male")).unwrap();
    assert_eq!(male.n, 63);
    assert!((male.mean - 69.343832).abs() < 1e-5);
    assert!((male.sd - 2.180617).abs() < 1e-5);
    assert_eq!(male.median, 69.0);

    let female = heights.summary(Some("Female")).unwrap();
    assert_eq!((female.n, female.min, female.max), (6, 62.0, 66.5));
}

#[test]
fn test_ecdf_and_normal_fit() {
    let dir = TempDir::new().unwrap();
    let heights = Heights::from_csv_path(write_csv(&dir)).unwrap();
    let ecdf = heights.ecdf(Some("Male")).unwrap();
    assert!((ecdf.evaluate(70.0) - 44.0 / 63.0).abs() < 1e-15);
    assert!((ecdf.prob_above(70.0) - 19.0 / 63.0).abs() < 1e-15);

    let model = heights.fit_normal(Some("Male")).unwrap();
    let wide = compare_interval(&ecdf, &model, 65.5, 72.5);
    assert!(wide.abs_error() < 0.05, "{wide}");

    let centered = compare_interval(&ecdf, &model, 69.5, 70.5);
    assert!((centered.empirical - 12.0 / 63.0).abs() < 1e-15);
    let off_grid = compare_interval(&ecdf, &model, 70.5, 70.9);
    assert_eq!(off_grid.empirical, 0.0);
    assert!(off_grid.theoretical > 0.05);
}

#[test]
fn test_reported_values_are_rounded() {
    let dir = TempDir::new().unwrap();
    let heights = Heights::from_csv_path(write_csv(&dir)).unwrap();
    let report = DiscretizationReport::analyze(&heights.values(Some("male")), 1e-9).unwrap();
    assert_eq!(report.distinct, 12);
    assert!(report.is_discretized(0.9));
    assert_eq!(report.top_values[0], (70.0, 11));
}

#[test]
fn test_histogram_from_config() {
    let dir = TempDir::new().unwrap();
    let heights = Heights::from_csv_path(write_csv(&dir)).unwrap();
    let values = heights.values(Some("male"));

    let default = Histogram::sturges(&values).unwrap();
    assert_eq!(default.num_bins(), sturges_bins(63));
    assert_eq!(default.num_bins(), 7);
    assert_eq!(default.total(), 63);

    let config_path = dir.path().join("experiment.toml");
    fs::write(&config_path, "[histogram]\nbins = 5\n").unwrap();
    let config = ExperimentConfig::from_file(&config_path).unwrap();
    let hist = Histogram::with_bins(&values, config.histogram.bins.unwrap()).unwrap();
    assert_eq!(hist.num_bins(), 5);
    assert_eq!(hist.total(), 63);
    assert_eq!(hist.breaks()[0], 64.0);
    assert_eq!(hist.breaks()[5], 74.0);
}

#[test]
fn test_tallest_in_group_simulation() {
    let dir = TempDir::new().unwrap();
    let heights = Heights::from_csv_path(write_csv(&dir)).unwrap();
    let model = heights.fit_normal(Some("male")).unwrap();

    let config_path = dir.path().join("experiment.toml");
    fs::write(
        &config_path,
        "[simulation]\nseed = 42\ntrials = 2000\nsample_size = 800\nthreshold = 76.0\n",
    )
    .unwrap();
    let sim = ExperimentConfig::from_file(&config_path).unwrap().simulation;

    let mc = MonteCarlo::new(sim.trials).unwrap().with_seed(sim.seed);
    let est = mc
        .prob_max_at_least(&model, sim.sample_size, sim.threshold)
        .unwrap();
    let exact = 1.0 - model.cdf(sim.threshold).powf(sim.sample_size as f64);
    assert!((est.p - exact).abs() < 0.05, "{est} vs {exact}");

    let (lo, hi) = est.confidence_interval(0.95).unwrap();
    assert!(lo < est.p && est.p < hi);

    // Seven feet is out of reach for this group.
    let seven_feet = mc.prob_max_at_least(&model, 800, 84.0).unwrap();
    assert!(seven_feet.p < 0.01);
}

#[test]
fn test_invalid_inputs() {
    let dir = TempDir::new().unwrap();
    let empty = dir.path().join("empty.csv");
    fs::write(&empty, "sex,height\nMale,NA\n").unwrap();
    assert!(matches!(
        Heights::from_csv_path(&empty),
        Err(ProbError::EmptySample)
    ));
    assert!(matches!(
        Heights::from_csv_path(dir.path().join("missing.csv")),
        Err(ProbError::Io(_))
    ));
    assert!(Normal::new(69.0, 0.0).is_err());
}
