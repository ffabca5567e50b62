use crate::infra::{InMemoryDirectory, Workflows};
use crate::scheduler::run_daily;
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use tenant_ops::config::WorkflowConfig;
use tenant_ops::error::AppError;
use tenant_ops::workflows::checkout::{
    AttachmentKind, CheckoutReason, CheckoutRecord, CompleteCheckout, Deduction, DeductionType,
    DepositCalculation, FileUpload, InitiateCheckout, InspectionItem, InspectionSection,
    InspectionUpdate, ItemCondition, OverallCondition, ProcessRefund, RefundPayout,
};
use tenant_ops::workflows::money;
use tenant_ops::workflows::pdc::{BatchCheque, DepositRequest, NewPdcBatch, Pdc, ReplacementCheque};
use tenant_ops::workflows::{InvoiceId, TenantId};

const DEMO_ACTOR: &str = "demo-operator";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Skip the cheque book portion of the demo.
    #[arg(long)]
    pub(crate) skip_cheques: bool,
    /// Skip the move-out portion of the demo.
    #[arg(long)]
    pub(crate) skip_checkout: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        skip_cheques,
        skip_checkout,
    } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let workflows = Workflows::in_memory(
        &WorkflowConfig::default(),
        InMemoryDirectory::with_demo_tenants(),
    );

    println!("Tenant operations demo ({today})");
    if !skip_cheques {
        cheque_book_demo(&workflows, today)?;
    }
    if !skip_checkout {
        checkout_demo(&workflows, today)?;
    }

    let events = workflows.audit.events();
    println!("\nAudit trail ({} events)", events.len());
    for event in events {
        println!(
            "  - {} {} by {}",
            event.event_type, event.entity_id, event.actor
        );
    }

    let notifications = workflows.notifier.sent();
    if notifications.is_empty() {
        println!("Notifications: none dispatched");
    } else {
        println!("Notifications:");
        for notification in notifications {
            println!("  - template={}", notification.template());
        }
    }

    Ok(())
}

fn cheque_book_demo(workflows: &Workflows, today: NaiveDate) -> Result<(), AppError> {
    println!("\nCheque book for tnt-1001 (quarterly rent)");
    let cheques: Vec<BatchCheque> = (0..4)
        .map(|quarter| BatchCheque {
            cheque_number: format!("{}", 300_101 + quarter),
            bank_name: "Emirates NBD".to_string(),
            amount: Decimal::new(1_875_000, 2),
            cheque_date: today + Duration::days(3 + 91 * quarter),
        })
        .collect();
    let book = workflows.pdc.create_bulk(
        NewPdcBatch {
            tenant_id: TenantId("tnt-1001".to_string()),
            invoice_id: Some(InvoiceId("INV-2025-0410".to_string())),
            lease_id: Some("LSE-2025-118".to_string()),
            cheques,
        },
        DEMO_ACTOR,
    )?;
    for pdc in &book {
        print_cheque("registered", pdc);
    }

    let summary = run_daily(&workflows.pdc, today)?;
    println!(
        "- Daily job: {} marked due, {} reminder(s) sent",
        summary.marked_due, summary.reminders_sent
    );

    let first = &book[0];
    workflows.pdc.deposit(
        &first.id,
        DepositRequest {
            deposit_date: first.cheque_date,
            bank_account_id: "ENBD-OPS-01".to_string(),
        },
        DEMO_ACTOR,
    )?;
    let cleared = workflows
        .pdc
        .clear(&first.id, Some(first.cheque_date + Duration::days(2)), DEMO_ACTOR)?;
    print_cheque("cleared", &cleared);
    for payment in workflows.payments.payments() {
        println!(
            "  Invoice {} credited AED {} ({})",
            payment.invoice_id.0,
            money::display(payment.amount),
            payment.reference
        );
    }

    let second = &book[1];
    workflows.pdc.deposit(
        &second.id,
        DepositRequest {
            deposit_date: second.cheque_date,
            bank_account_id: "ENBD-OPS-01".to_string(),
        },
        DEMO_ACTOR,
    )?;
    let bounced = workflows.pdc.bounce(
        &second.id,
        "insufficient funds",
        Some(second.cheque_date + Duration::days(1)),
        DEMO_ACTOR,
    )?;
    print_cheque("bounced", &bounced);
    let replacement = workflows.pdc.replace(
        &second.id,
        ReplacementCheque {
            cheque_number: format!("{}-R", second.cheque_number),
            bank_name: Some("Mashreq".to_string()),
            amount: None,
            cheque_date: second.cheque_date + Duration::days(14),
        },
        DEMO_ACTOR,
    )?;
    print_cheque("replacement", &replacement);

    Ok(())
}

fn print_cheque(label: &str, pdc: &Pdc) {
    println!(
        "- {label}: #{} AED {} dated {} -> {}",
        pdc.cheque_number,
        money::display(pdc.amount),
        pdc.cheque_date,
        pdc.status.label()
    );
}

fn checkout_demo(workflows: &Workflows, today: NaiveDate) -> Result<(), AppError> {
    println!("\nMove-out for tnt-1002 (deposit above approval threshold)");
    let service = &workflows.checkout;

    let record = service.initiate_checkout(
        InitiateCheckout {
            tenant_id: TenantId("tnt-1002".to_string()),
            notice_date: today,
            expected_move_out_date: today + Duration::days(30),
            reason: CheckoutReason::Relocation,
            reason_notes: None,
        },
        DEMO_ACTOR,
    )?;
    let id = record.checkout.id.clone();
    print_checkout("initiated", &record);

    let record = service.save_inspection(
        &id,
        InspectionUpdate {
            inspection_date: Some(today + Duration::days(28)),
            time_slot: Some("10:00-12:00".to_string()),
            inspector_id: Some("insp-07".to_string()),
            checklist: Some(vec![
                InspectionSection {
                    name: "Kitchen".to_string(),
                    items: vec![
                        InspectionItem {
                            name: "Hob".to_string(),
                            condition: ItemCondition::Good,
                            repair_cost: None,
                            notes: None,
                        },
                        InspectionItem {
                            name: "Cabinet hinge".to_string(),
                            condition: ItemCondition::Damaged,
                            repair_cost: Some(Decimal::new(35_000, 2)),
                            notes: Some("two doors misaligned".to_string()),
                        },
                    ],
                },
                InspectionSection {
                    name: "Master bedroom".to_string(),
                    items: vec![InspectionItem {
                        name: "Wall paint".to_string(),
                        condition: ItemCondition::Damaged,
                        repair_cost: Some(Decimal::new(62_050, 2)),
                        notes: None,
                    }],
                },
            ]),
            overall_condition: Some(OverallCondition::Good),
            notes: None,
        },
        "insp-07",
    )?;
    print_checkout("inspected", &record);

    let photo_key = service.attach_file(
        &id,
        AttachmentKind::InspectionPhoto,
        FileUpload {
            file_name: "bedroom-wall.jpg".to_string(),
            content_type: String::new(),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        },
        "insp-07",
    )?;
    println!(
        "  Photo stored at {} ({})",
        service.attachment_url(&id, &photo_key)?,
        workflows
            .storage
            .content_type(&photo_key)
            .unwrap_or_else(|| "unknown".to_string())
    );

    let mut deductions = record.refund.deductions.clone();
    deductions.push(Deduction {
        deduction_type: DeductionType::Cleaning,
        description: "Deep clean".to_string(),
        amount: Decimal::new(45_000, 2),
        auto_calculated: false,
    });
    let record = service.save_deposit_calculation(
        &id,
        DepositCalculation {
            deductions,
            settlement_type: Some("STANDARD".to_string()),
            settlement_notes: None,
        },
        "accounts",
    )?;
    print_checkout("calculated", &record);

    let record = service.approve_refund(&id, "finance-manager")?;
    print_checkout("approved", &record);

    let record = service.process_refund(
        &id,
        ProcessRefund {
            payout: RefundPayout::BankTransfer {
                bank_name: "ADCB".to_string(),
                account_holder_name: "Omar Saleh".to_string(),
                iban: "AE07 0331 2345 6789 0123 456".to_string(),
            },
            refund_reference: Some(format!("RF-{}", record.checkout.checkout_number)),
            refund_date: Some(today + Duration::days(31)),
            transaction_id: None,
        },
        "accounts",
    )?;
    print_checkout("refund processing", &record);

    let record = service.complete_checkout(
        &id,
        CompleteCheckout {
            finalize_acknowledged: true,
            actual_move_out_date: Some(today + Duration::days(30)),
        },
        DEMO_ACTOR,
    )?;
    print_checkout("completed", &record);
    println!(
        "  Unit {} is now {:?}",
        record.checkout.unit_id.0,
        workflows.directory.unit_status(&record.checkout.unit_id)
    );
    println!(
        "  Portal access for {} active: {}",
        record.checkout.tenant_id.0,
        workflows
            .directory
            .user_active(&format!("user-{}", record.checkout.tenant_id.0))
    );

    Ok(())
}

fn print_checkout(label: &str, record: &CheckoutRecord) {
    let view = record.status_view();
    let owed = view
        .amount_owed_by_tenant
        .map(|amount| format!(" | tenant owes AED {}", money::display(amount)))
        .unwrap_or_default();
    println!(
        "- {label}: {} {} / refund {} | deductions AED {} | net AED {}{owed}",
        view.checkout_number,
        view.status,
        view.refund_status,
        money::display(view.total_deductions),
        money::display(view.net_refund),
    );
}
