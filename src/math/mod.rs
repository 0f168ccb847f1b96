// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.
//!
//! The statistics here mirror what the usual array-programming reductions do:
//! the median of an even-length slice is the average of the two middle
//! values, and the standard deviation is the population (not sample) standard
//! deviation.


use ndarray::prelude::*;
use thiserror::Error;

/// The median of the supplied values. NaN is returned if there are no values.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// The arithmetic mean. NaN is returned if there are no values.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// The population standard deviation (i.e. normalised by N, not N - 1). NaN
/// is returned if there are no values.
pub fn std_dev(values: &[f64]) -> f64 {
    let mean = mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Fit a polynomial of the given degree to `(x, y)` with linear least
/// squares. The coefficients are returned in *ascending* order, i.e. `c[0]` is
/// the constant term and `c[degree]` multiplies `x^degree`.
///
/// The Vandermonde system is solved with Householder QR rather than the normal
/// equations, which would square the condition number.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>, FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    let num_coeffs = degree + 1;
    if x.len() < num_coeffs {
        return Err(FitError::TooFewPoints {
            num_points: x.len(),
            degree,
        });
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite);
    }

    let mut a = Array2::from_shape_fn((x.len(), num_coeffs), |(i, j)| x[i].powi(j as i32));
    let mut b = Array1::from(y.to_vec());
    householder_qr_in_place(&mut a, &mut b);

    // `a` now holds R in its upper triangle; back substitute.
    let r_max = (0..num_coeffs)
        .map(|k| a[(k, k)].abs())
        .fold(0.0, f64::max);
    let tolerance = r_max * f64::EPSILON * x.len() as f64;
    let mut coeffs = vec![0.0; num_coeffs];
    for k in (0..num_coeffs).rev() {
        let r_kk = a[(k, k)];
        if r_kk.abs() <= tolerance {
            return Err(FitError::Singular);
        }
        let dot: f64 = (k + 1..num_coeffs).map(|j| a[(k, j)] * coeffs[j]).sum();
        coeffs[k] = (b[k] - dot) / r_kk;
    }

    Ok(coeffs)
}

/// Apply Householder reflections to `a` (and the same reflections to `b`) so
/// that the top square of `a` becomes upper triangular.
fn householder_qr_in_place(a: &mut Array2<f64>, b: &mut Array1<f64>) {
    let (num_rows, num_cols) = a.dim();
    for k in 0..num_cols.min(num_rows) {
        let mut v = a.slice(s![k.., k]).to_owned();
        let norm = v.dot(&v).sqrt();
        if norm == 0.0 {
            continue;
        }
        let alpha = if v[0] > 0.0 { -norm } else { norm };
        v[0] -= alpha;
        let v_norm = v.dot(&v).sqrt();
        if v_norm == 0.0 {
            continue;
        }
        v /= v_norm;

        let mut sub = a.slice_mut(s![k.., k..]);
        let projection = v.dot(&sub);
        for (mut col, p) in sub.axis_iter_mut(Axis(1)).zip(projection.iter()) {
            col.scaled_add(-2.0 * p, &v);
        }

        let mut sub_b = b.slice_mut(s![k..]);
        let p = v.dot(&sub_b);
        sub_b.scaled_add(-2.0 * p, &v);
    }
}

/// Evaluate a polynomial with coefficients in ascending order (as returned by
/// [`polyfit`]) at `x`.
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Fit a straight line to `(x, y)`. Returns `(slope, intercept)`.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Result<(f64, f64), FitError> {
    let coeffs = polyfit(x, y, 1)?;
    Ok((coeffs[1], coeffs[0]))
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("Cannot fit: {x} x values but {y} y values")]
    LengthMismatch { x: usize, y: usize },

    #[error("Cannot fit a polynomial of degree {degree} with only {num_points} points; at least {} are needed", degree + 1)]
    TooFewPoints { num_points: usize, degree: usize },

    #[error("Cannot fit data containing NaN or infinite values")]
    NonFinite,

    #[error("The least-squares system is singular; the x values don't constrain all coefficients")]
    Singular,
}
