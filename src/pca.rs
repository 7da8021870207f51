//! Principal component analysis over reef-level covariates.
//!
//! Rows are observations (reefs), columns are variables. The decomposition
//! runs on the correlation matrix by default or on the covariance matrix
//! when asked, optionally after rescaling every column to zero mean and unit
//! sample standard deviation.
//!
//! ```rust
//! use nalgebra::DMatrix;
//! use reefmatch::pca::{PcaOptions, pca};
//!
//! let data = DMatrix::from_row_slice(4, 2, &[
//!     1.0, 2.0,
//!     2.0, 4.1,
//!     3.0, 5.9,
//!     4.0, 8.0,
//! ]);
//! let result = pca(&data, None, PcaOptions::default().with_sort(true)).unwrap();
//!
//! // Two nearly collinear variables: the first component carries almost
//! // all of the variance.
//! assert!(result.percent_variance[0] > 99.0);
//! ```

use crate::error::{Result, ReefError};
use nalgebra::{DMatrix, DVector, SymmetricEigen};

/// Switches for [`pca`]. Everything is off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PcaOptions {
    /// Rescale columns to zero mean and unit sample standard deviation first.
    pub standardize: bool,
    /// Decompose the covariance matrix instead of the correlation matrix.
    pub covariance: bool,
    /// Order components by decreasing eigenvalue.
    pub sort: bool,
}

impl PcaOptions {
    pub fn with_standardize(mut self, standardize: bool) -> Self {
        self.standardize = standardize;
        self
    }

    pub fn with_covariance(mut self, covariance: bool) -> Self {
        self.covariance = covariance;
        self
    }

    pub fn with_sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }
}

/// Eigen-decomposition of a fitted data matrix.
///
/// Component `k` is eigenvalue `k` together with column `k` of
/// `eigenvectors` and `loadings`.
#[derive(Debug, Clone, PartialEq)]
pub struct PcaResult {
    pub eigenvalues: DVector<f64>,
    /// Unit-length eigenvectors as columns.
    pub eigenvectors: DMatrix<f64>,
    /// Share of total variance per component, in percent.
    pub percent_variance: DVector<f64>,
    /// Eigenvectors scaled by the square root of their eigenvalues.
    pub loadings: DMatrix<f64>,
    /// Variable names, reordered alongside the components when sorted.
    pub names: Option<Vec<String>>,
    means: DVector<f64>,
    scales: Option<DVector<f64>>,
}

impl PcaResult {
    pub fn n_components(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Running total of `percent_variance`.
    pub fn cumulative_percent(&self) -> Vec<f64> {
        self.percent_variance
            .iter()
            .scan(0.0, |acc, &p| {
                *acc += p;
                Some(*acc)
            })
            .collect()
    }

    /// Scores of `data` on every component.
    ///
    /// Observations are centered on the fitted column means, and divided by
    /// the fitted standard deviations when the fit was standardized.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the column count differs from the fitted data or a
    /// value is not finite.
    pub fn project(&self, data: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if data.ncols() != self.means.len() {
            return Err(ReefError::InvalidInput(format!(
                "Expected {} columns, got {}",
                self.means.len(),
                data.ncols()
            )));
        }
        ensure_finite(data)?;

        let mut centered = data.clone();
        for (j, mut column) in centered.column_iter_mut().enumerate() {
            let scale = self.scales.as_ref().map_or(1.0, |s| s[j]);
            column.apply(|x| *x = (*x - self.means[j]) / scale);
        }
        Ok(centered * &self.eigenvectors)
    }
}

/// Principal components of `data` (observations × variables).
///
/// # Errors
///
/// - `InvalidInput` for fewer than two rows or columns, a non-finite value,
///   or a `names` slice whose length differs from the column count.
/// - `DegenerateInput` for a zero-variance column when standardizing or
///   decomposing the correlation matrix, or zero total variance.
pub fn pca(data: &DMatrix<f64>, names: Option<&[&str]>, options: PcaOptions) -> Result<PcaResult> {
    let (n, m) = data.shape();
    if n < 2 || m < 2 {
        return Err(ReefError::InvalidInput(format!(
            "PCA needs at least 2 observations and 2 variables, got {}x{}",
            n, m
        )));
    }
    ensure_finite(data)?;

    if let Some(names) = names
        && names.len() != m
    {
        return Err(ReefError::InvalidInput(format!(
            "Got {} names for {} variables",
            names.len(),
            m
        )));
    }

    let means = data.row_mean().transpose();
    let mut centered = data.clone();
    for (j, mut column) in centered.column_iter_mut().enumerate() {
        column.add_scalar_mut(-means[j]);
    }

    if options.standardize || !options.covariance {
        ensure_spread(data, &centered)?;
    }

    let scales = if options.standardize {
        let stds = column_stds(&centered)?;
        for (j, mut column) in centered.column_iter_mut().enumerate() {
            column /= stds[j];
        }
        Some(stds)
    } else {
        None
    };

    let mut matrix = (centered.transpose() * &centered) / (n - 1) as f64;
    if !options.covariance {
        matrix = correlation_from_covariance(&matrix)?;
    }

    let eigen = SymmetricEigen::new(matrix);
    let mut eigenvalues = eigen.eigenvalues;
    let mut eigenvectors = eigen.eigenvectors;
    let mut names: Option<Vec<String>> =
        names.map(|names| names.iter().map(|s| s.to_string()).collect());

    if options.sort {
        let mut order: Vec<usize> = (0..m).collect();
        order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]));

        eigenvalues = DVector::from_iterator(m, order.iter().map(|&k| eigenvalues[k]));
        eigenvectors = DMatrix::from_columns(
            &order
                .iter()
                .map(|&k| eigenvectors.column(k).into_owned())
                .collect::<Vec<_>>(),
        );
        names = names.map(|names| order.iter().map(|&k| names[k].clone()).collect());
    }

    let total: f64 = eigenvalues.sum();
    if total <= 0.0 {
        return Err(ReefError::DegenerateInput("Total variance is zero".to_string()));
    }
    let percent_variance = eigenvalues.map(|l| 100.0 * l / total);

    let mut loadings = eigenvectors.clone();
    for (k, mut column) in loadings.column_iter_mut().enumerate() {
        column *= eigenvalues[k].max(0.0).sqrt();
    }

    log::debug!(
        "PCA over {}x{} matrix, {} basis, largest eigenvalue {}",
        n,
        m,
        if options.covariance {
            "covariance"
        } else {
            "correlation"
        },
        eigenvalues.max()
    );

    Ok(PcaResult {
        eigenvalues,
        eigenvectors,
        percent_variance,
        loadings,
        names,
        means,
        scales,
    })
}

/// Build a data matrix from equal-length rows.
pub fn matrix_from_rows(rows: &[Vec<f64>]) -> Result<DMatrix<f64>> {
    let ncols = rows.first().map_or(0, |row| row.len());
    if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
        return Err(ReefError::InvalidInput(format!(
            "Row {} has {} values, expected {}",
            idx,
            row.len(),
            ncols
        )));
    }
    Ok(DMatrix::from_row_iterator(
        rows.len(),
        ncols,
        rows.iter().flatten().copied(),
    ))
}

fn ensure_finite(data: &DMatrix<f64>) -> Result<()> {
    if let Some(pos) = data.iter().position(|x| !x.is_finite()) {
        // nalgebra storage is column-major
        let (row, col) = (pos % data.nrows(), pos / data.nrows());
        return Err(ReefError::InvalidInput(format!(
            "Non-finite value at row {}, column {}",
            row, col
        )));
    }
    Ok(())
}

/// Rejects columns whose variance is lost in rounding.
///
/// Centering a constant column such as `0.1` leaves residue near 1e-17, so
/// the variance is compared against the column's mean square rather than 0.
fn ensure_spread(data: &DMatrix<f64>, centered: &DMatrix<f64>) -> Result<()> {
    let n = data.nrows() as f64;
    for (j, (raw, column)) in data.column_iter().zip(centered.column_iter()).enumerate() {
        let mean_sq = raw.norm_squared() / n;
        let var = column.norm_squared() / (n - 1.0);
        if var <= f64::EPSILON * mean_sq {
            return Err(ReefError::DegenerateInput(format!(
                "Column {} has zero variance",
                j
            )));
        }
    }
    Ok(())
}

/// Sample standard deviation (ddof = 1) of each already-centered column.
fn column_stds(centered: &DMatrix<f64>) -> Result<DVector<f64>> {
    let n = centered.nrows() as f64;
    let mut stds = DVector::zeros(centered.ncols());
    for (j, column) in centered.column_iter().enumerate() {
        let std = (column.norm_squared() / (n - 1.0)).sqrt();
        if std <= 0.0 {
            return Err(ReefError::DegenerateInput(format!(
                "Column {} has zero variance",
                j
            )));
        }
        stds[j] = std;
    }
    Ok(stds)
}

fn correlation_from_covariance(cov: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let m = cov.nrows();
    let mut inv_std = DVector::zeros(m);
    for j in 0..m {
        let var = cov[(j, j)];
        if var <= 0.0 {
            return Err(ReefError::DegenerateInput(format!(
                "Column {} has zero variance; correlation is undefined",
                j
            )));
        }
        inv_std[j] = 1.0 / var.sqrt();
    }

    let mut corr = DMatrix::zeros(m, m);
    for i in 0..m {
        for j in 0..m {
            corr[(i, j)] = cov[(i, j)] * inv_std[i] * inv_std[j];
        }
        corr[(i, i)] = 1.0;
    }
    Ok(corr)
}
