//! Payment allocation waterfall.
//!
//! A payment is distributed over installments in a fixed order:
//! - oldest due date first (sequence number breaks ties), skipping settled installments
//! - within each installment, pending penalty first and then capital
//!
//! A payment targeted at one installment is never redirected to others; whatever
//! that installment cannot absorb is returned as unallocated.
//!
//! This is the only allocation policy. The older capital-only distribution
//! (no penalty phase) is superseded and intentionally not offered.

use chrono::NaiveDate;
use receivables_shared::types::{InstallmentId, has_money_precision};
use rust_decimal::Decimal;
use tracing::debug;

use super::error::ReceivableError;
use super::penalty::PenaltyCalculator;
use super::types::{Installment, InstallmentAllocation, InstallmentStatus, PaymentAllocation};

/// Stateless allocation engine.
pub struct AllocationEngine;

impl AllocationEngine {
    /// Applies `amount` to the installments, mutating their paid amounts.
    ///
    /// Statuses are not touched; callers re-derive them afterwards.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if the amount is not positive or has sub-cent precision
    /// - `InstallmentNotFound` if `target` is not one of `installments`
    pub fn apply(
        installments: &mut [Installment],
        amount: Decimal,
        target: Option<InstallmentId>,
        as_of: NaiveDate,
        calculator: &PenaltyCalculator,
    ) -> Result<PaymentAllocation, ReceivableError> {
        if amount <= Decimal::ZERO || !has_money_precision(amount) {
            return Err(ReceivableError::InvalidAmount(amount));
        }

        let order = Self::allocation_order(installments, target)?;

        let mut available = amount;
        let mut allocations = Vec::new();

        for index in order {
            if available <= Decimal::ZERO {
                break;
            }
            let installment = &mut installments[index];

            let penalty = calculator.pending(installment, as_of).min(available);
            installment.paid_penalty += penalty;
            available -= penalty;

            let capital = installment.pending_capital().min(available);
            installment.paid_amount += capital;
            available -= capital;

            if penalty > Decimal::ZERO || capital > Decimal::ZERO {
                debug!(
                    installment = installment.number,
                    %penalty,
                    %capital,
                    "Allocated payment to installment"
                );
                allocations.push(InstallmentAllocation {
                    installment_id: installment.id,
                    number: installment.number,
                    penalty,
                    capital,
                });
            }
        }

        Ok(PaymentAllocation {
            allocations,
            unallocated: available,
        })
    }

    /// Indices of the installments to visit, in waterfall order.
    fn allocation_order(
        installments: &[Installment],
        target: Option<InstallmentId>,
    ) -> Result<Vec<usize>, ReceivableError> {
        if let Some(id) = target {
            let index = installments
                .iter()
                .position(|i| i.id == id)
                .ok_or(ReceivableError::InstallmentNotFound(id))?;
            return Ok(vec![index]);
        }

        let mut order: Vec<usize> = installments
            .iter()
            .enumerate()
            .filter(|(_, i)| i.status != InstallmentStatus::Paid)
            .map(|(index, _)| index)
            .collect();
        order.sort_by_key(|&index| (installments[index].due_date, installments[index].number));
        Ok(order)
    }
}
