//! Gaussian-weighted partial-match search over the candidate table
//!
//! Only filled positions of a neighborhood contribute to its distance from a
//! candidate. The kernel is renormalized per query so the contributing
//! weights always sum to one, making distances comparable between sparsely
//! and densely known neighborhoods.

use ndarray::{Array1, Array2, Zip};
use rand::Rng;

use crate::io::error::{Result, invariant_violation};
use crate::synthesis::neighborhood::Neighborhood;
use crate::synthesis::patches::PatchIndex;

/// Best candidate chosen for a neighborhood
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateMatch {
    /// Row of the candidate in the patch table
    pub candidate: usize,
    /// Sample coordinates of the candidate's center pixel
    pub source: [usize; 2],
    /// Weighted squared error against the neighborhood
    pub error: f64,
}

/// Result of matching one frontier pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchOutcome {
    /// The chosen candidate beat the acceptance threshold
    Accepted(CandidateMatch),
    /// The chosen candidate was too far off; the pixel stays unfilled this pass
    Rejected(CandidateMatch),
}

impl MatchOutcome {
    /// The candidate that was chosen, accepted or not
    pub const fn candidate(&self) -> &CandidateMatch {
        match self {
            Self::Accepted(m) | Self::Rejected(m) => m,
        }
    }

    /// Whether the candidate was accepted
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Normalized partial-match weights for a validity mask
///
/// The 2D mask is applied to every channel block of the channel-stacked
/// kernel without materializing a replicated mask. Valid entries of the
/// result sum to one and invalid entries are exactly zero.
///
/// # Errors
///
/// Returns an error if the kernel length does not match the mask, or if no
/// filled position carries weight
pub fn partial_match_weights(mask: &Array2<bool>, kernel: &Array1<f64>) -> Result<Array1<f64>> {
    let plane = mask.len();
    if plane == 0 || kernel.len() % plane != 0 {
        return Err(invariant_violation(
            "partial_match_weights",
            &format!(
                "kernel of length {} does not stack over a {plane}-cell mask",
                kernel.len()
            ),
        ));
    }

    let mask_flat: Vec<bool> = mask.iter().copied().collect();
    let mut weights: Array1<f64> = kernel
        .iter()
        .enumerate()
        .map(|(i, &g)| {
            if mask_flat.get(i % plane).copied().unwrap_or(false) {
                g
            } else {
                0.0
            }
        })
        .collect();

    let total = weights.sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(invariant_violation(
            "partial_match_weights",
            &"neighborhood has no filled positions to match against",
        ));
    }

    weights /= total;
    Ok(weights)
}

/// Weighted squared error between a neighborhood and every candidate
pub fn candidate_distances(
    index: &PatchIndex,
    neighborhood: &Neighborhood,
    weights: &Array1<f64>,
) -> Array1<f64> {
    index
        .candidates()
        .outer_iter()
        .map(|candidate| {
            Zip::from(&candidate)
                .and(&neighborhood.values)
                .and(weights)
                .fold(0.0, |acc, &c, &n, &w| {
                    let diff = c - n;
                    w.mul_add(diff * diff, acc)
                })
        })
        .collect()
}

/// Indices of every candidate within `tolerance` of the best distance
///
/// Candidates at `distance ≤ min × (1 + tolerance)` qualify, so an exact
/// best match only admits other exact matches.
pub fn near_optimal_candidates(distances: &Array1<f64>, tolerance: f64) -> Vec<usize> {
    let min_distance = distances.iter().copied().fold(f64::INFINITY, f64::min);
    if !min_distance.is_finite() {
        return Vec::new();
    }

    let cutoff = min_distance * (1.0 + tolerance);
    distances
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d <= cutoff)
        .map(|(i, _)| i)
        .collect()
}

/// Finds and vets the best sample match for output neighborhoods
#[derive(Debug, Clone, Copy)]
pub struct MatchSelector {
    error_tolerance: f64,
}

impl MatchSelector {
    /// Create a selector admitting candidates within `error_tolerance` of the best
    pub const fn new(error_tolerance: f64) -> Self {
        Self { error_tolerance }
    }

    /// Relative slack of the near-optimal set
    pub const fn error_tolerance(&self) -> f64 {
        self.error_tolerance
    }

    /// Choose a candidate for a neighborhood and vet it against the threshold
    ///
    /// The choice is uniform over the near-optimal set so that no direction
    /// of the sample is systematically preferred. The candidate is accepted
    /// when its error is strictly below `max_error_threshold`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The neighborhood has no filled positions
    /// - The neighborhood does not match the index layout
    /// - The candidate table is empty
    pub fn select<R: Rng + ?Sized>(
        &self,
        index: &PatchIndex,
        neighborhood: &Neighborhood,
        max_error_threshold: f64,
        rng: &mut R,
    ) -> Result<MatchOutcome> {
        if neighborhood.values.len() != index.patch_len() {
            return Err(invariant_violation(
                "MatchSelector::select",
                &format!(
                    "neighborhood length {} differs from patch length {}",
                    neighborhood.values.len(),
                    index.patch_len()
                ),
            ));
        }

        let weights = partial_match_weights(&neighborhood.mask, index.kernel())?;
        let distances = candidate_distances(index, neighborhood, &weights);
        let near_optimal = near_optimal_candidates(&distances, self.error_tolerance);

        if near_optimal.is_empty() {
            return Err(invariant_violation(
                "MatchSelector::select",
                &"no finite candidate distance",
            ));
        }

        let pick = rng.random_range(0..near_optimal.len());
        let candidate = near_optimal.get(pick).copied().ok_or_else(|| {
            invariant_violation("MatchSelector::select", &"pick outside near-optimal set")
        })?;
        let source = index.center(candidate).ok_or_else(|| {
            invariant_violation("MatchSelector::select", &"candidate without center")
        })?;
        let error = distances.get(candidate).copied().unwrap_or(f64::INFINITY);

        let chosen = CandidateMatch {
            candidate,
            source,
            error,
        };

        if error < max_error_threshold {
            Ok(MatchOutcome::Accepted(chosen))
        } else {
            Ok(MatchOutcome::Rejected(chosen))
        }
    }
}

impl Default for MatchSelector {
    fn default() -> Self {
        Self::new(crate::io::configuration::ERROR_TOLERANCE)
    }
}
