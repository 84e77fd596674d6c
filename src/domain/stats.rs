//! Descriptive statistics over price slices.
//!
//! MEAN(x)        = sum(x) / n
//! POP_STDDEV(x)  = sqrt(sum((x - MEAN)^2) / n)
//! SAMP_STDDEV(x) = sqrt(sum((x - MEAN)^2) / (n - 1))
//!
//! Empty input yields 0.0 for every statistic; the sample estimator also
//! yields 0.0 for a single value.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sum_sq_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    values
        .iter()
        .map(|v| {
            let diff = v - m;
            diff * diff
        })
        .sum()
}

pub fn population_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    (sum_sq_dev(values) / values.len() as f64).sqrt()
}

pub fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    (sum_sq_dev(values) / (values.len() - 1) as f64).sqrt()
}

/// sqrt(periods_per_year / n), scaling an n-sample dispersion to a year.
pub fn annualization_factor(periods_per_year: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    (periods_per_year / n as f64).sqrt()
}
