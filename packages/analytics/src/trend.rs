//! Ordinary least squares trend fitting.
//!
//! One fitter serves every regression in the report: a series against time
//! ([`fit_against_time`]) and one scope's series against another's
//! ([`fit_paired`]). Undefined percent-change values are removed before
//! fitting; degenerate inputs are rejected with an [`AnalyticsError`]
//! instead of producing NaN coefficients.

use std::collections::BTreeMap;

use shooting_trends_analytics_models::{
    FittedPoint, PercentChangePoint, Period, TrendModel, TrendOutcome,
};

use crate::AnalyticsError;

/// Minimum number of points that determine a line.
pub const MIN_POINTS: usize = 2;

/// Fits `y = slope * x + intercept` to aligned sequences.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the lengths differ, fewer than
/// [`MIN_POINTS`] pairs are given, any value is non-finite, or every x is
/// identical.
pub fn fit_linear(xs: &[f64], ys: &[f64]) -> Result<TrendModel, AnalyticsError> {
    if xs.len() != ys.len() {
        return Err(AnalyticsError::LengthMismatch {
            x_len: xs.len(),
            y_len: ys.len(),
        });
    }
    let points: Vec<(Option<Period>, f64, f64)> =
        xs.iter().zip(ys).map(|(&x, &y)| (None, x, y)).collect();
    fit_points(&points)
}

/// Fits a series against time, using [`Period::x_value`] as x.
///
/// Points with an undefined percent change are skipped.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if fewer than [`MIN_POINTS`] defined points
/// remain.
pub fn fit_against_time(series: &[PercentChangePoint]) -> Result<TrendModel, AnalyticsError> {
    let points: Vec<(Option<Period>, f64, f64)> = series
        .iter()
        .filter_map(|p| {
            p.percent_change
                .map(|y| (Some(p.period), p.period.x_value(), y))
        })
        .collect();
    fit_points(&points)
}

/// Fits `y_series` against `x_series`, joining the two on period.
///
/// Periods present in only one series, or undefined in either, are
/// skipped.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if fewer than [`MIN_POINTS`] shared defined
/// periods remain, or the joined x values have zero variance.
pub fn fit_paired(
    x_series: &[PercentChangePoint],
    y_series: &[PercentChangePoint],
) -> Result<TrendModel, AnalyticsError> {
    let x_by_period: BTreeMap<Period, f64> = x_series
        .iter()
        .filter_map(|p| p.percent_change.map(|x| (p.period, x)))
        .collect();

    let points: Vec<(Option<Period>, f64, f64)> = y_series
        .iter()
        .filter_map(|p| {
            let y = p.percent_change?;
            let x = x_by_period.get(&p.period)?;
            Some((Some(p.period), *x, y))
        })
        .collect();

    fit_points(&points)
}

/// Converts a fit result into a report outcome, logging undefined fits.
#[must_use]
pub fn into_outcome(label: &str, result: Result<TrendModel, AnalyticsError>) -> TrendOutcome {
    match result {
        Ok(model) => TrendOutcome::Fitted(model),
        Err(e) => {
            log::warn!("{label}: trend undefined ({e})");
            TrendOutcome::Undefined {
                reason: e.to_string(),
            }
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn fit_points(points: &[(Option<Period>, f64, f64)]) -> Result<TrendModel, AnalyticsError> {
    if points.len() < MIN_POINTS {
        return Err(AnalyticsError::InsufficientData {
            needed: MIN_POINTS,
            found: points.len(),
        });
    }
    if let Some(index) = points
        .iter()
        .position(|(_, x, y)| !x.is_finite() || !y.is_finite())
    {
        return Err(AnalyticsError::NonFinite { index });
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(_, x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, _, y)| y).sum::<f64>() / n;

    let (sxx, sxy, syy) = points
        .iter()
        .fold((0.0, 0.0, 0.0), |(sxx, sxy, syy), (_, x, y)| {
            let dx = x - mean_x;
            let dy = y - mean_y;
            (dx.mul_add(dx, sxx), dx.mul_add(dy, sxy), dy.mul_add(dy, syy))
        });

    if sxx == 0.0 {
        return Err(AnalyticsError::ZeroVariance {
            value: points[0].1.to_string(),
        });
    }

    let slope = sxy / sxx;
    let intercept = slope.mul_add(-mean_x, mean_y);

    let fitted: Vec<FittedPoint> = points
        .iter()
        .map(|&(period, x, observed)| {
            let predicted = slope.mul_add(x, intercept);
            FittedPoint {
                period,
                x,
                observed,
                predicted,
                residual: observed - predicted,
            }
        })
        .collect();

    // A constant response is reproduced exactly by a flat line.
    let r_squared = if syy == 0.0 {
        1.0
    } else {
        let ss_res: f64 = fitted.iter().map(|p| p.residual * p.residual).sum();
        1.0 - ss_res / syy
    };

    Ok(TrendModel {
        slope,
        intercept,
        r_squared,
        points: fitted,
    })
}
