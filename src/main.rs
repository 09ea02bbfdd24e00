use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use u_probability::approximation::{compare_intervals, DiscretizationReport};
use u_probability::distributions::{ContinuousDistribution, Normal};
use u_probability::histogram::{FrequencyTable, Histogram};
use u_probability::logger;
use u_probability::monte_carlo::MonteCarlo;
use u_probability::config::Overrides;
use u_probability::{ExperimentConfig, Heights, ProbError};

#[derive(Parser)]
#[command(name = "u-probability")]
#[command(version, about = "Empirical and normal probabilities for continuous samples")]
struct Cli {
    /// Path to TOML experiment configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// n, mean, SD, min, median and max of the heights
    Summary(SampleArgs),
    /// Empirical CDF F(a) at each threshold
    Ecdf {
        #[command(flatten)]
        sample: SampleArgs,
        #[arg(long, required = true, num_args = 1.., allow_negative_numbers = true)]
        at: Vec<f64>,
    },
    /// Normal density, CDF, quantile or interval probability
    Normal {
        #[command(flatten)]
        params: NormalArgs,
        #[command(flatten)]
        query: NormalQuery,
    },
    /// Empirical vs normal probability of intervals (a, b]
    Compare {
        #[command(flatten)]
        sample: SampleArgs,
        #[command(flatten)]
        params: NormalArgs,
        #[arg(
            long,
            required = true,
            num_args = 2,
            value_names = ["A", "B"],
            action = clap::ArgAction::Append,
            allow_negative_numbers = true
        )]
        interval: Vec<f64>,
    },
    /// Binned counts
    Histogram {
        #[command(flatten)]
        sample: SampleArgs,
        /// Number of equal-width bins (default: Sturges)
        #[arg(long)]
        bins: Option<usize>,
    },
    /// Distinct-value frequencies and rounding report
    Table {
        #[command(flatten)]
        sample: SampleArgs,
        /// Show only the most frequent values
        #[arg(long)]
        top: Option<usize>,
    },
    /// Chance that the tallest of a group reaches a threshold
    Simulate {
        #[command(flatten)]
        params: NormalArgs,
        /// Fit missing normal parameters from this CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        sex: Option<String>,
        #[arg(long)]
        sample_size: Option<usize>,
        /// Height in inches
        #[arg(long, allow_negative_numbers = true)]
        threshold: Option<f64>,
        #[arg(long)]
        trials: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Args)]
struct SampleArgs {
    /// CSV with a `height` column and optional `sex` column
    csv: PathBuf,
    /// Keep only rows of this sex (case-insensitive)
    #[arg(long)]
    sex: Option<String>,
}

#[derive(Args)]
struct NormalArgs {
    #[arg(long, allow_negative_numbers = true)]
    mean: Option<f64>,
    #[arg(long)]
    sd: Option<f64>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct NormalQuery {
    #[arg(long, allow_negative_numbers = true)]
    pdf: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    cdf: Option<f64>,
    #[arg(long)]
    quantile: Option<f64>,
    #[arg(long, num_args = 2, value_names = ["A", "B"], allow_negative_numbers = true)]
    between: Option<Vec<f64>>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init_cli_logger(cli.verbose);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            ExperimentConfig::from_file(path)
                .with_context(|| format!("failed to load config '{}'", path.display()))?
        }
        None => ExperimentConfig::default(),
    };

    match cli.command {
        Command::Summary(sample) => {
            let heights = load(&sample.csv)?;
            let summary = heights
                .summary(sample.sex.as_deref())
                .context("no heights for the requested group")?;
            println!("{summary}");
        }
        Command::Ecdf { sample, at } => {
            let ecdf = load(&sample.csv)?.ecdf(sample.sex.as_deref())?;
            for a in at {
                println!("F({a}) = {:.6}", ecdf.evaluate(a));
            }
        }
        Command::Normal { params, query } => {
            let config = config.with_overrides(&params.overrides())?;
            let model = Normal::new(
                config.normal.mean.unwrap_or(0.0),
                config.normal.sd.unwrap_or(1.0),
            )?;
            run_normal_query(&model, &query)?;
        }
        Command::Compare {
            sample,
            params,
            interval,
        } => {
            let config = config.with_overrides(&params.overrides())?;
            let heights = load(&sample.csv)?;
            let sex = sample.sex.as_deref();
            let ecdf = heights.ecdf(sex)?;
            let model = config.resolve_normal(Some(heights.values(sex).as_slice()))?;
            let intervals: Vec<(f64, f64)> =
                interval.chunks_exact(2).map(|ab| (ab[0], ab[1])).collect();
            println!("model: N({:.4}, {:.4})", model.mu(), model.sigma());
            println!(
                "{:>20} {:>10} {:>10} {:>8}",
                "interval", "empirical", "normal", "ratio"
            );
            for c in compare_intervals(&ecdf, &model, &intervals) {
                let ratio = c
                    .ratio()
                    .map_or_else(|| "-".to_string(), |r| format!("{r:.3}"));
                println!(
                    "{:>20} {:>10.6} {:>10.6} {:>8}",
                    format!("({}, {}]", c.lower, c.upper),
                    c.empirical,
                    c.theoretical,
                    ratio
                );
            }
        }
        Command::Histogram { sample, bins } => {
            let config = config.with_overrides(&Overrides {
                bins,
                ..Overrides::default()
            })?;
            let values = load(&sample.csv)?.values(sample.sex.as_deref());
            let hist = match config.histogram.bins {
                Some(k) => Histogram::with_bins(&values, k)?,
                None => Histogram::sturges(&values)?,
            };
            print_histogram(&hist);
        }
        Command::Table { sample, top } => {
            let values = load(&sample.csv)?.values(sample.sex.as_deref());
            let table = FrequencyTable::from_data(&values)?;
            let rows = match top {
                Some(k) => table.most_common(k),
                None => table.entries().to_vec(),
            };
            println!("{:>12} {:>8} {:>10}", "value", "count", "share");
            for (value, count) in rows {
                println!(
                    "{value:>12} {count:>8} {:>10.4}",
                    table.proportion(value)
                );
            }
            let report = DiscretizationReport::analyze(&values, 1e-9)?;
            println!(
                "{} values, {} distinct, {:.1}% on whole numbers",
                report.n,
                report.distinct,
                100.0 * report.integer_share
            );
        }
        Command::Simulate {
            params,
            csv,
            sex,
            sample_size,
            threshold,
            trials,
            seed,
        } => {
            let config = config.with_overrides(&Overrides {
                seed,
                trials,
                sample_size,
                threshold,
                ..params.overrides()
            })?;

            let data = match &csv {
                Some(path) => Some(load(path)?.values(sex.as_deref())),
                None => None,
            };
            let model = config.resolve_normal(data.as_deref())?;
            run_simulation(&model, &config)?;
        }
    }

    Ok(())
}

impl NormalArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            mean: self.mean,
            sd: self.sd,
            ..Overrides::default()
        }
    }
}

fn load(path: &Path) -> anyhow::Result<Heights> {
    Heights::from_csv_path(path).with_context(|| format!("failed to read '{}'", path.display()))
}

fn run_normal_query(model: &Normal, query: &NormalQuery) -> anyhow::Result<()> {
    if let Some(x) = query.pdf {
        println!("f({x}) = {:.6}", model.pdf(x));
    } else if let Some(x) = query.cdf {
        println!("F({x}) = {:.6}", model.cdf(x));
    } else if let Some(p) = query.quantile {
        let q = model.quantile(p).ok_or(ProbError::InvalidProbability(p))?;
        println!("Q({p}) = {q:.6}");
    } else if let Some([a, b]) = query.between.as_deref() {
        println!("P({a} < X <= {b}) = {:.6}", model.prob_between(*a, *b));
    }
    Ok(())
}

fn run_simulation(model: &Normal, config: &ExperimentConfig) -> anyhow::Result<()> {
    let sim = &config.simulation;
    tracing::info!(
        trials = sim.trials,
        sample_size = sim.sample_size,
        seed = sim.seed,
        "running simulation"
    );
    let mc = MonteCarlo::new(sim.trials)?.with_seed(sim.seed);
    let est = mc.prob_max_at_least(model, sim.sample_size, sim.threshold)?;
    let exact = 1.0 - model.cdf(sim.threshold).powf(sim.sample_size as f64);

    println!(
        "P(max of {} draws from N({:.4}, {:.4}) >= {}):",
        sim.sample_size,
        model.mu(),
        model.sigma(),
        sim.threshold
    );
    println!("  simulated {est}");
    if let Some((lo, hi)) = est.confidence_interval(0.95) {
        println!("  95% interval [{lo:.6}, {hi:.6}]");
    }
    println!("  exact     p={exact:.6}");
    Ok(())
}

fn print_histogram(hist: &Histogram) {
    const WIDTH: usize = 50;
    let peak = hist.counts().iter().copied().max().unwrap_or(0).max(1);
    for (i, (edges, &count)) in hist.breaks().windows(2).zip(hist.counts()).enumerate() {
        let bar = "#".repeat(count * WIDTH / peak);
        println!("{} {count:>6} {bar}", bin_label(i, edges[0], edges[1]));
    }
    if hist.outside() > 0 {
        println!("{} values outside the breaks", hist.outside());
    }
}

/// The first bin is closed on both sides, the rest only on the right.
fn bin_label(index: usize, lower: f64, upper: f64) -> String {
    let open = if index == 0 { '[' } else { '(' };
    format!("{open}{lower:>8.2}, {upper:>8.2}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_labels_follow_closure() {
        let hist = Histogram::with_bins(&[64.0, 66.0, 70.0, 74.0], 2).unwrap();
        let labels: Vec<String> = hist
            .breaks()
            .windows(2)
            .enumerate()
            .map(|(i, w)| bin_label(i, w[0], w[1]))
            .collect();
        assert_eq!(labels, vec!["[   64.00,    69.00]", "(   69.00,    74.00]"]);
    }
}
