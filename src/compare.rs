// Pose Recorder 🚀 AGPL-3.0 License

//! Comparison of a captured sequence against a reference recording.
//!
//! The recorder does not define a scoring algorithm. [`Comparator`] is the seam a
//! scoring implementation plugs into; [`SummaryComparator`] only reports what the
//! two sequences contain.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::Result;
use crate::sequence::SkeletonSequence;

/// Compares a candidate sequence with a reference sequence.
pub trait Comparator {
    /// Comparison result.
    type Output;

    /// Compare `candidate` against `reference`.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn compare(
        &self,
        reference: &SkeletonSequence,
        candidate: &SkeletonSequence,
    ) -> Result<Self::Output>;
}

/// Frame counts and angle vocabularies of two sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonSummary {
    /// Skeletons in the reference recording.
    pub reference_frames: usize,
    /// Skeletons in the captured sequence.
    pub candidate_frames: usize,
    /// Angle identifiers present in both sequences.
    pub shared_angles: Vec<String>,
    /// Angle identifiers only in the reference.
    pub reference_only: Vec<String>,
    /// Angle identifiers only in the captured sequence.
    pub candidate_only: Vec<String>,
}

impl fmt::Display for ComparisonSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reference {} frames, captured {} frames, {} shared angles",
            self.reference_frames,
            self.candidate_frames,
            self.shared_angles.len()
        )?;
        if !self.reference_only.is_empty() {
            write!(f, ", reference only: {}", self.reference_only.join(", "))?;
        }
        if !self.candidate_only.is_empty() {
            write!(f, ", captured only: {}", self.candidate_only.join(", "))?;
        }
        Ok(())
    }
}

/// Observational comparator producing a [`ComparisonSummary`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryComparator;

impl Comparator for SummaryComparator {
    type Output = ComparisonSummary;

    fn compare(
        &self,
        reference: &SkeletonSequence,
        candidate: &SkeletonSequence,
    ) -> Result<ComparisonSummary> {
        let ref_names: BTreeSet<String> = reference.angle_names().into_iter().collect();
        let cand_names: BTreeSet<String> = candidate.angle_names().into_iter().collect();

        Ok(ComparisonSummary {
            reference_frames: reference.len(),
            candidate_frames: candidate.len(),
            shared_angles: ref_names.intersection(&cand_names).cloned().collect(),
            reference_only: ref_names.difference(&cand_names).cloned().collect(),
            candidate_only: cand_names.difference(&ref_names).cloned().collect(),
        })
    }
}
