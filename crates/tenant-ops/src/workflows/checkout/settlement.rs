//! Deposit settlement arithmetic.
//!
//! Pure functions over the original deposit and the deduction lines. The checkout
//! service applies the result to the stored refund; nothing here touches storage.

use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{Deduction, DeductionType, InspectionSection};
use crate::workflows::money;

/// Outcome of settling a deposit against its deductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub total_deductions: Decimal,
    pub net_refund: Decimal,
    pub amount_owed_by_tenant: Option<Decimal>,
    pub requires_approval: bool,
}

/// Settle `original_deposit` against `deductions`.
///
/// `net_refund` never goes below zero; any shortfall is reported as the amount owed
/// by the tenant. Approval is needed only when the refund is strictly above the threshold.
pub fn settle(
    original_deposit: Decimal,
    deductions: &[Deduction],
    approval_threshold: Decimal,
) -> Settlement {
    let original_deposit = money::round(original_deposit);
    let total_deductions = money::sum(deductions.iter().map(|deduction| deduction.amount));
    let net_refund = money::subtract(original_deposit, total_deductions).max(Decimal::ZERO);
    let amount_owed_by_tenant = (total_deductions > original_deposit)
        .then(|| money::subtract(total_deductions, original_deposit));

    Settlement {
        total_deductions,
        net_refund,
        amount_owed_by_tenant,
        requires_approval: net_refund > money::round(approval_threshold),
    }
}

/// Sum of every repair cost recorded across the checklist.
pub fn repair_total(checklist: &[InspectionSection]) -> Decimal {
    money::sum(
        checklist
            .iter()
            .flat_map(|section| section.items.iter())
            .filter_map(|item| item.repair_cost),
    )
}

/// The synthetic deduction raised from inspection repair costs.
pub fn damage_deduction(repair_total: Decimal) -> Deduction {
    Deduction {
        deduction_type: DeductionType::DamageRepairs,
        description: "Damage repairs (from inspection)".to_string(),
        amount: money::round(repair_total),
        auto_calculated: true,
    }
}
