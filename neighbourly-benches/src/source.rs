//! Synthetic benchmark datasets.
//!
//! [`GaussianBlobs`] places isotropic Gaussian clusters on a circle and
//! exposes the points as a [`Dataset`] of `[f32]` rows. [`synthetic_words`]
//! mutates a few template words into a corpus for edit-distance benchmarks.
//! Every generator is seeded for reproducibility across runs.

use std::f32::consts::PI;

use neighbourly_core::{DataShape, DataSourceError, Dataset};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Errors that may occur while generating benchmark data.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum SyntheticError {
    /// The requested point count was zero.
    #[error("point count must be greater than zero")]
    ZeroPoints,
    /// The requested dimension count was zero.
    #[error("dimension count must be greater than zero")]
    ZeroDimensions,
    /// The requested cluster count was zero.
    #[error("cluster count must be greater than zero")]
    ZeroClusters,
    /// The requested `point_count * dimensions` overflowed `usize`.
    #[error("point_count * dimensions overflows usize")]
    Overflow,
    /// A floating-point generator parameter was invalid.
    #[error("invalid floating-point parameter `{parameter}`")]
    InvalidFloatParameter {
        /// Name of the invalid parameter.
        parameter: &'static str,
    },
}

/// Configuration for Gaussian blob synthetic data.
#[derive(Clone, Debug)]
pub struct GaussianBlobConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Dimensionality of each vector.
    pub dimensions: usize,
    /// Number of Gaussian clusters.
    pub cluster_count: usize,
    /// Radius of the circle the centroids sit on.
    pub separation: f32,
    /// Standard deviation of every axis.
    pub spread: f32,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

impl GaussianBlobConfig {
    /// Well-separated blobs suitable for most benchmarks.
    #[must_use]
    pub const fn new(point_count: usize, dimensions: usize, seed: u64) -> Self {
        Self {
            point_count,
            dimensions,
            cluster_count: 8,
            separation: 10.0,
            spread: 1.0,
            seed,
        }
    }
}

/// A [`Dataset`] of Gaussian blob vectors keyed by row index.
///
/// # Examples
///
/// ```
/// use neighbourly_benches::source::{GaussianBlobConfig, GaussianBlobs};
/// use neighbourly_core::Dataset;
///
/// let blobs = GaussianBlobs::generate(&GaussianBlobConfig::new(10, 4, 42))
///     .expect("valid config");
/// assert_eq!(blobs.len(), 10);
/// assert_eq!(blobs.item(&3).map(<[f32]>::len), Ok(4));
/// ```
#[derive(Clone, Debug)]
pub struct GaussianBlobs {
    data: Vec<f32>,
    point_count: usize,
    dimensions: usize,
}

impl GaussianBlobs {
    /// Generates points round-robin across the configured clusters.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when the configuration is invalid.
    #[expect(
        clippy::float_arithmetic,
        reason = "Gaussian data generation requires floating-point arithmetic"
    )]
    pub fn generate(config: &GaussianBlobConfig) -> Result<Self, SyntheticError> {
        validate(config)?;
        let total = config
            .point_count
            .checked_mul(config.dimensions)
            .ok_or(SyntheticError::Overflow)?;

        let mut rng = SmallRng::seed_from_u64(config.seed);
        let centroids = build_centroids(config, &mut rng);
        let mut data = Vec::with_capacity(total);
        for centroid in centroids.iter().cycle().take(config.point_count) {
            for value in centroid {
                data.push(*value + standard_normal_sample(&mut rng)? * config.spread);
            }
        }

        Ok(Self {
            data,
            point_count: config.point_count,
            dimensions: config.dimensions,
        })
    }

    /// Returns the dimensionality of each vector.
    #[must_use]
    pub const fn dimensions(&self) -> usize {
        self.dimensions
    }
}

impl Dataset for GaussianBlobs {
    type Id = usize;
    type Item = [f32];

    #[expect(
        clippy::unnecessary_literal_bound,
        reason = "Dataset trait constrains the return type to &str"
    )]
    fn name(&self) -> &str {
        "synthetic-gaussian-blobs"
    }

    fn len(&self) -> usize {
        self.point_count
    }

    fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        0..self.point_count
    }

    fn contains(&self, id: &usize) -> bool {
        *id < self.point_count
    }

    fn item(&self, id: &usize) -> Result<&[f32], DataSourceError> {
        let start = id
            .checked_mul(self.dimensions)
            .ok_or(DataSourceError::OutOfBounds { index: *id })?;
        let end = start
            .checked_add(self.dimensions)
            .ok_or(DataSourceError::OutOfBounds { index: *id })?;
        self.data
            .get(start..end)
            .ok_or(DataSourceError::OutOfBounds { index: *id })
    }

    fn shape(&self) -> DataShape {
        DataShape::vectors(self.dimensions)
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "parameter validation compares floating-point values"
)]
fn validate(config: &GaussianBlobConfig) -> Result<(), SyntheticError> {
    if config.point_count == 0 {
        return Err(SyntheticError::ZeroPoints);
    }
    if config.dimensions == 0 {
        return Err(SyntheticError::ZeroDimensions);
    }
    if config.cluster_count == 0 {
        return Err(SyntheticError::ZeroClusters);
    }
    if !config.separation.is_finite() || config.separation <= 0.0 {
        return Err(SyntheticError::InvalidFloatParameter {
            parameter: "separation",
        });
    }
    if !config.spread.is_finite() || config.spread <= 0.0 {
        return Err(SyntheticError::InvalidFloatParameter {
            parameter: "spread",
        });
    }
    Ok(())
}

#[expect(
    clippy::cast_precision_loss,
    reason = "centroid placement uses index-derived floating-point angles"
)]
#[expect(
    clippy::float_arithmetic,
    reason = "centroid placement uses trigonometric expressions"
)]
fn build_centroids(config: &GaussianBlobConfig, rng: &mut SmallRng) -> Vec<Vec<f32>> {
    (0..config.cluster_count)
        .map(|cluster_index| {
            let angle = (cluster_index as f32 / config.cluster_count as f32) * (2.0 * PI);
            let mut centroid = vec![0.0_f32; config.dimensions];
            if let Some(value) = centroid.get_mut(0) {
                *value = config.separation * angle.cos();
            }
            if let Some(value) = centroid.get_mut(1) {
                *value = config.separation * angle.sin();
            }
            for value in centroid.iter_mut().skip(2) {
                *value = rng.gen_range((-0.2 * config.separation)..(0.2 * config.separation));
            }
            centroid
        })
        .collect()
}

#[expect(
    clippy::float_arithmetic,
    reason = "Box-Muller transform requires floating-point arithmetic"
)]
fn standard_normal_sample(rng: &mut SmallRng) -> Result<f32, SyntheticError> {
    let u1 = rng.gen_range(0.0_f32..1.0_f32).max(f32::EPSILON);
    let u2 = rng.gen_range(0.0_f32..1.0_f32);
    let sample = (-2.0_f32 * u1.ln()).sqrt() * (2.0_f32 * PI * u2).cos();
    if sample.is_finite() {
        Ok(sample)
    } else {
        Err(SyntheticError::InvalidFloatParameter {
            parameter: "standard_normal_sample",
        })
    }
}

const TEMPLATE_WORDS: &[&str] = &[
    "neighbour",
    "distance",
    "cluster",
    "outlier",
    "density",
    "manifold",
];
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Generates `count` words, each a template word with up to `max_edits`
/// random substitutions, insertions or deletions.
///
/// # Examples
///
/// ```
/// use neighbourly_benches::source::synthetic_words;
///
/// let words = synthetic_words(20, 2, 7);
/// assert_eq!(words.len(), 20);
/// assert_eq!(words, synthetic_words(20, 2, 7));
/// ```
#[must_use]
pub fn synthetic_words(count: usize, max_edits: usize, seed: u64) -> Vec<String> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count)
        .map(|index| {
            let template = TEMPLATE_WORDS
                .get(index % TEMPLATE_WORDS.len())
                .copied()
                .unwrap_or_default();
            let mut word = template.as_bytes().to_vec();
            for _ in 0..rng.gen_range(0..=max_edits) {
                mutate(&mut word, &mut rng);
            }
            String::from_utf8_lossy(&word).into_owned()
        })
        .collect()
}

fn mutate(word: &mut Vec<u8>, rng: &mut SmallRng) {
    let letter = ALPHABET
        .get(rng.gen_range(0..ALPHABET.len()))
        .copied()
        .unwrap_or(b'a');
    let position = rng.gen_range(0..=word.len());
    match rng.gen_range(0..3_u8) {
        0 if position < word.len() => {
            if let Some(slot) = word.get_mut(position) {
                *slot = letter;
            }
        }
        1 if position < word.len() && word.len() > 1 => {
            word.remove(position);
        }
        _ => word.insert(position, letter),
    }
}
