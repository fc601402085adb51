//! Simulation Settings
//!
//! Tunable parameters of the step pipeline. The defaults follow the
//! usual game-oriented trade-off: one substep, eight velocity iterations,
//! Baumgarte position correction and sqrt coefficient mixing.

use crate::material::CoefficientMix;
use crate::math::Float;

/// Position correction method applied to contacts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContactPositionCorrection {
    /// Fold a position-error bias into the velocity constraint.
    #[default]
    Baumgarte,
    /// Non-linear Gauss-Seidel: correct positions directly with
    /// pseudo-velocities after integration.
    Ngs,
}

/// Tunable parameters of a [`Space`](crate::space::Space).
#[derive(Clone, Copy, Debug)]
pub struct SpaceSettings {
    /// Baumgarte stabilization factor used to bleed off constraint error.
    pub baumgarte: Float,
    /// Penetration depth tolerated before position correction kicks in.
    pub penetration_slop: Float,
    /// Largest positional correction applied in one NGS iteration.
    pub max_linear_correction: Float,
    /// Relative normal velocity below which restitution is ignored,
    /// preventing jitter at rest.
    pub restitution_threshold: Float,
    /// Position correction method for contacts.
    pub contact_position_correction: ContactPositionCorrection,
    /// Velocity constraint iterations per substep. 6-10 is plenty for
    /// games.
    pub velocity_iterations: u32,
    /// NGS iterations per substep (only used with
    /// [`ContactPositionCorrection::Ngs`]).
    pub position_iterations: u32,
    /// Substeps per [`step`](crate::space::Space::step) call. Raising this
    /// re-runs the entire pipeline per step; best left at 1 for games.
    pub substeps: u32,
    /// Linear velocity damping. Removes energy gained through numerical
    /// drift; scaled per body by its damping scale.
    pub linear_damping: Float,
    /// Angular counterpart of `linear_damping`.
    pub angular_damping: Float,
    /// Whether solvers are seeded with the previous step's accumulated
    /// impulses. No reason to turn this off outside of debugging.
    pub warmstarting: bool,
    /// Mixing function for the two bodies' restitution coefficients.
    pub restitution_mix: CoefficientMix,
    /// Mixing function for the two bodies' friction coefficients.
    pub friction_mix: CoefficientMix,
    /// Cell size of the spatial hash grid broad-phase.
    pub spatial_hash_cell_size: Float,
}

impl Default for SpaceSettings {
    fn default() -> Self {
        Self {
            baumgarte: 0.2,
            penetration_slop: 0.05,
            max_linear_correction: 0.2,
            restitution_threshold: 1.0,
            contact_position_correction: ContactPositionCorrection::Baumgarte,
            velocity_iterations: 8,
            position_iterations: 4,
            substeps: 1,
            linear_damping: 0.0005,
            angular_damping: 0.0005,
            warmstarting: true,
            restitution_mix: CoefficientMix::Sqrt,
            friction_mix: CoefficientMix::Sqrt,
            spatial_hash_cell_size: 3.5,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
