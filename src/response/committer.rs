//! Commit of buffered trial state into permanent element records
//!
//! Run once per converged step. Forces, displacements, the max moment and
//! the state flag are always copied. The rest depends on the state:
//!
//! | State     | Effective plastic strain | Stress    | Plastic strain | Hardening                       |
//! |-----------|--------------------------|-----------|----------------|---------------------------------|
//! | Elastic   | reset to 0               | overwrite | kept           | kept                            |
//! | Plastic   | += increment             | overwrite | += increment   | curve, R, H, back-stress copied |
//! | Undefined | kept                     | kept      | kept           | kept                            |

use rayon::prelude::*;

use super::buffer::{BufferSlot, ResponseBuffer};
use crate::elements::ElementState;
use crate::error::{ResponseError, ResponseResult};
use crate::math::{accumulate_column, copy_column, BACK_STRESS_COMPONENTS, TENSOR_COMPONENTS};
use crate::results::{CommitSummary, ElementResponse};
use crate::units::{UnitDescriptor, UnitsContext};

/// Values fixed for one commit pass
#[derive(Debug, Clone)]
pub struct CommitContext {
    /// Integration points per element, as allocated
    pub integration_points: usize,
    /// Unit to tag stress rows with, when units checking is on
    pub stress_unit: Option<UnitDescriptor>,
}

impl CommitContext {
    /// Context for committing from `buffer` under the given units settings
    pub fn new(buffer: &ResponseBuffer, units: &UnitsContext) -> Self {
        Self {
            integration_points: buffer.integration_points(),
            stress_unit: units.stress_unit(),
        }
    }
}

/// Merge one element's buffered trial state into its permanent record.
///
/// Returns the state the record was committed with. Fails without touching
/// the record if record, slot and context disagree on shape.
pub fn commit_one(
    record: &mut ElementResponse,
    slot: &BufferSlot,
    ctx: &CommitContext,
) -> ResponseResult<ElementState> {
    check_record(record, slot, ctx.integration_points)?;
    Ok(apply(record, slot, ctx))
}

fn apply(record: &mut ElementResponse, slot: &BufferSlot, ctx: &CommitContext) -> ElementState {
    record.forces.copy_from(&slot.forces);
    record.displacement.copy_from(&slot.displacement);
    record.max_moment = slot.max_moment;
    record.state = slot.state;

    match record.state {
        ElementState::Elastic => {
            for col in 0..ctx.integration_points {
                record.effective_plastic_strain[col] = 0.0;
                copy_column(&mut record.stress, &slot.stress, col);
            }
        }
        ElementState::Plastic => {
            record.hardening.curve = slot.load_curve.curve.clone();
            for col in 0..ctx.integration_points {
                record.effective_plastic_strain[col] += slot.effective_plastic_strain_increment[col];
                copy_column(&mut record.stress, &slot.stress, col);
                accumulate_column(&mut record.plastic_strain, &slot.plastic_strain_increment, col);

                record.hardening.r[col] = slot.load_curve.r[col];
                record.hardening.h[col] = slot.load_curve.h[col];
                for row in 0..BACK_STRESS_COMPONENTS {
                    record.hardening.back_stress[(row, col)] = slot.load_curve.back_stress[(row, col)];
                }
            }
        }
        // No merge policy for other flags; plastic history stays frozen.
        ElementState::Undefined(flag) => {
            log::trace!("state flag {flag} has no commit policy");
        }
    }

    if let Some(unit) = &ctx.stress_unit {
        record.stress_units = vec![Some(unit.clone()); TENSOR_COMPONENTS];
    }

    record.state
}

/// Commit every element, in index order.
///
/// Every record is checked against its slot before any is modified.
pub fn commit_all(
    records: &mut [ElementResponse],
    buffer: &ResponseBuffer,
    ctx: &CommitContext,
) -> ResponseResult<CommitSummary> {
    check_lengths(records, buffer, ctx)?;
    let mut summary = CommitSummary::default();
    for (record, slot) in records.iter_mut().zip(buffer.slots()) {
        summary.record(apply(record, slot, ctx));
    }
    Ok(summary)
}

/// Commit every element on the rayon pool; same result as [`commit_all`]
pub fn commit_all_par(
    records: &mut [ElementResponse],
    buffer: &ResponseBuffer,
    ctx: &CommitContext,
) -> ResponseResult<CommitSummary> {
    check_lengths(records, buffer, ctx)?;
    let summary = records
        .par_iter_mut()
        .zip(buffer.slots().par_iter())
        .map(|(record, slot)| {
            let mut summary = CommitSummary::default();
            summary.record(apply(record, slot, ctx));
            summary
        })
        .reduce(CommitSummary::default, CommitSummary::merge);
    Ok(summary)
}

fn check_lengths(
    records: &[ElementResponse],
    buffer: &ResponseBuffer,
    ctx: &CommitContext,
) -> ResponseResult<()> {
    if records.len() != buffer.len() {
        return Err(ResponseError::DimensionMismatch(format!(
            "{} element records for {} buffer slots",
            records.len(),
            buffer.len()
        )));
    }
    records
        .iter()
        .zip(buffer.slots())
        .try_for_each(|(record, slot)| check_record(record, slot, ctx.integration_points))
}

fn check_record(
    record: &ElementResponse,
    slot: &BufferSlot,
    integration_points: usize,
) -> ResponseResult<()> {
    if record.forces.shape() != slot.forces.shape()
        || record.displacement.shape() != slot.displacement.shape()
    {
        return Err(ResponseError::DimensionMismatch(format!(
            "record nodal blocks {:?}/{:?}, slot {:?}/{:?}",
            record.forces.shape(),
            record.displacement.shape(),
            slot.forces.shape(),
            slot.displacement.shape()
        )));
    }

    let per_point = [
        record.effective_plastic_strain.len(),
        record.stress.ncols(),
        record.plastic_strain.ncols(),
        record.hardening.r.len(),
        record.hardening.h.len(),
        record.hardening.back_stress.ncols(),
        slot.effective_plastic_strain_increment.len(),
        slot.stress.ncols(),
        slot.plastic_strain_increment.ncols(),
        slot.load_curve.r.len(),
        slot.load_curve.h.len(),
        slot.load_curve.back_stress.ncols(),
    ];
    let back_stress_rows = [
        record.hardening.back_stress.nrows(),
        slot.load_curve.back_stress.nrows(),
    ];
    if per_point.iter().any(|&n| n != integration_points)
        || back_stress_rows.iter().any(|&n| n != BACK_STRESS_COMPONENTS)
    {
        return Err(ResponseError::DimensionMismatch(format!(
            "record or slot not sized for {integration_points} integration points"
        )));
    }
    Ok(())
}
