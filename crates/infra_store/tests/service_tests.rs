//! Integration tests for the credit facade over the in-memory store

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{CompanyId, Currency, Money, OrderId, ProductId};
use domain_credit::{
    AccountStatus, CreditAccount, CreditError, CreditEvent, CreditEventListener, CreditHealth,
    CreditPolicy, CreditService, CreditStore, InvoiceStatus, OrderLine, OrderSnapshot,
    PaymentMethod, TimelineEntry,
};
use infra_store::MemoryCreditStore;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

fn usd(amount: Decimal) -> Money {
    Money::new(amount, Currency::USD)
}

/// Flat-tax-free policy so invoice totals equal order subtotals exactly
fn flat_policy() -> CreditPolicy {
    CreditPolicy {
        tax_rate_percent: dec!(0),
        ..CreditPolicy::default()
    }
}

fn order(company_id: CompanyId, amount: Decimal) -> OrderSnapshot {
    OrderSnapshot::new(
        OrderId::new(),
        company_id,
        Currency::USD,
        vec![OrderLine::new(
            ProductId::new(),
            "Wholesale order",
            1,
            usd(amount),
        )],
    )
}

#[derive(Default)]
struct RecordingListener {
    events: Mutex<Vec<CreditEvent>>,
}

impl RecordingListener {
    fn events(&self) -> Vec<CreditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl CreditEventListener for RecordingListener {
    fn handle(&self, event: &CreditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

struct Harness {
    store: Arc<MemoryCreditStore>,
    service: CreditService,
    listener: Arc<RecordingListener>,
    company_id: CompanyId,
}

async fn harness(limit: Decimal, policy: CreditPolicy) -> Harness {
    init_tracing();
    let store = Arc::new(MemoryCreditStore::new());
    let listener = Arc::new(RecordingListener::default());
    let company_id = CompanyId::new();

    let account = CreditAccount::open(company_id, usd(limit), 30, 720, now()).unwrap();
    store.save_account(&account).await.unwrap();

    let service = CreditService::new(store.clone(), policy)
        .with_listener(listener.clone() as Arc<dyn CreditEventListener>);

    Harness {
        store,
        service,
        listener,
        company_id,
    }
}

// ============================================================================
// Summary Tests
// ============================================================================

mod summary_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_company_is_a_branchable_outcome() {
        let h = harness(dec!(25000), flat_policy()).await;

        let result = h.service.summary_at(CompanyId::new(), now()).await;
        assert!(matches!(result, Err(CreditError::NoCreditAccount(_))));
    }

    #[tokio::test]
    async fn test_summary_reports_utilization_and_health() {
        let h = harness(dec!(25000), flat_policy()).await;
        h.service
            .issue_invoice_at(h.company_id, &order(h.company_id, dec!(8500)), now())
            .await
            .unwrap();

        let summary = h.service.summary_at(h.company_id, now()).await.unwrap();

        assert_eq!(summary.account.used_credit.amount(), dec!(8500));
        assert_eq!(summary.account.available_credit.amount(), dec!(16500));
        assert_eq!(summary.utilization, dec!(34.00));
        assert_eq!(summary.health, CreditHealth::Excellent);
        assert_eq!(summary.recent_invoices.len(), 1);
        assert!(summary.recent_payments.is_empty());
    }

    #[tokio::test]
    async fn test_summary_is_idempotent() {
        let h = harness(dec!(25000), flat_policy()).await;
        h.service
            .issue_invoice_at(h.company_id, &order(h.company_id, dec!(8500)), now())
            .await
            .unwrap();

        let first = h.service.summary_at(h.company_id, now()).await.unwrap();
        let second = h.service.summary_at(h.company_id, now()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_summary_next_payment_label() {
        let h = harness(dec!(25000), flat_policy()).await;

        let before = h.service.summary_at(h.company_id, now()).await.unwrap();
        assert_eq!(before.next_payment_due_label, "No payments due");

        let invoice = h
            .service
            .issue_invoice_at(h.company_id, &order(h.company_id, dec!(1000)), now())
            .await
            .unwrap();

        let after = h.service.summary_at(h.company_id, now()).await.unwrap();
        assert_eq!(after.next_payment_due_label, "Due Jul 15, 2025");

        h.service
            .pay_invoice_at(
                invoice.id,
                invoice.total,
                PaymentMethod::BankTransfer,
                None,
                now(),
            )
            .await
            .unwrap();

        let settled = h.service.summary_at(h.company_id, now()).await.unwrap();
        assert_eq!(settled.next_payment_due_label, "No payments due");
    }

    #[tokio::test]
    async fn test_summary_limits_recent_entries() {
        let h = harness(dec!(100000), flat_policy()).await;
        for day in 0..7 {
            h.service
                .issue_invoice_at(
                    h.company_id,
                    &order(h.company_id, dec!(100)),
                    now() + Duration::days(day),
                )
                .await
                .unwrap();
        }

        let summary = h.service.summary_at(h.company_id, now()).await.unwrap();
        assert_eq!(summary.recent_invoices.len(), 5);
        // Newest first
        let newest = summary.recent_invoices.first().unwrap();
        assert_eq!(newest.issue_date, now() + Duration::days(6));
    }
}

// ============================================================================
// Payment Flow Tests
// ============================================================================

mod payment_flow_tests {
    use super::*;

    #[tokio::test]
    async fn test_issue_then_full_payment_round_trip() {
        let h = harness(dec!(25000), flat_policy()).await;

        let invoice = h
            .service
            .issue_invoice_at(h.company_id, &order(h.company_id, dec!(5399.91)), now())
            .await
            .unwrap();

        let payment = h
            .service
            .pay_invoice_at(
                invoice.id,
                usd(dec!(5399.91)),
                PaymentMethod::BankTransfer,
                Some("SETTLE-77".to_string()),
                now() + Duration::days(3),
            )
            .await
            .unwrap();

        assert_eq!(payment.amount.amount(), dec!(5399.91));
        assert_eq!(h.store.payment_count().await, 1);

        let summary = h.service.summary_at(h.company_id, now()).await.unwrap();
        assert!(summary.account.used_credit.is_zero());
        assert_eq!(summary.account.available_credit, summary.account.credit_limit);
        assert_eq!(summary.recent_invoices[0].status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn test_pay_unknown_invoice() {
        let h = harness(dec!(25000), flat_policy()).await;

        let result = h
            .service
            .pay_invoice_at(
                core_kernel::InvoiceId::new(),
                usd(dec!(100)),
                PaymentMethod::BankTransfer,
                None,
                now(),
            )
            .await;
        assert!(matches!(result, Err(CreditError::InvoiceNotFound(_))));
    }

    #[tokio::test]
    async fn test_overpayment_leaves_ledger_unchanged() {
        let h = harness(dec!(25000), flat_policy()).await;
        let invoice = h
            .service
            .issue_invoice_at(h.company_id, &order(h.company_id, dec!(5399.91)), now())
            .await
            .unwrap();

        let before = h.service.summary_at(h.company_id, now()).await.unwrap();

        let result = h
            .service
            .pay_invoice_at(
                invoice.id,
                usd(dec!(6000.00)),
                PaymentMethod::BankTransfer,
                None,
                now(),
            )
            .await;

        assert!(matches!(result, Err(CreditError::Overpayment { .. })));
        let after = h.service.summary_at(h.company_id, now()).await.unwrap();
        assert_eq!(before, after);
        assert_eq!(h.store.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_events_fire_after_commit() {
        let h = harness(dec!(25000), flat_policy()).await;

        let invoice = h
            .service
            .issue_invoice_at(h.company_id, &order(h.company_id, dec!(2500)), now())
            .await
            .unwrap();
        h.service
            .pay_invoice_at(
                invoice.id,
                usd(dec!(2500)),
                PaymentMethod::CreditCard,
                None,
                now(),
            )
            .await
            .unwrap();

        let events = h.listener.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], CreditEvent::InvoiceIssued { .. }));
        match &events[1] {
            CreditEvent::PaymentCompleted {
                invoice_settled, ..
            } => assert!(*invoice_settled),
            other => panic!("expected PaymentCompleted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_operations_emit_no_events() {
        let h = harness(dec!(1000), flat_policy()).await;

        let result = h
            .service
            .issue_invoice_at(h.company_id, &order(h.company_id, dec!(5000)), now())
            .await;
        assert!(matches!(result, Err(CreditError::CreditLimitExceeded { .. })));
        assert!(h.listener.events().is_empty());
    }
}

// ============================================================================
// Concurrency Tests
// ============================================================================

mod concurrency_tests {
    use super::*;

    #[tokio::test]
    async fn test_concurrent_partial_payments_never_double_spend() {
        let h = harness(dec!(25000), flat_policy()).await;
        let invoice = h
            .service
            .issue_invoice_at(h.company_id, &order(h.company_id, dec!(5000)), now())
            .await
            .unwrap();

        let service = Arc::new(h.service);
        let amount = usd(dec!(3000));

        let first = {
            let service = service.clone();
            let id = invoice.id;
            tokio::spawn(async move {
                service
                    .pay_invoice_at(id, amount, PaymentMethod::BankTransfer, None, now())
                    .await
            })
        };
        let second = {
            let service = service.clone();
            let id = invoice.id;
            tokio::spawn(async move {
                service
                    .pay_invoice_at(id, amount, PaymentMethod::BankTransfer, None, now())
                    .await
            })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let ok_count = results.iter().filter(|r| r.is_ok()).count();
        let exceeds_count = results
            .iter()
            .filter(|r| matches!(r, Err(CreditError::PaymentExceedsBalance { .. })))
            .count();

        // Exactly one payment lands; the loser observes the updated balance
        assert_eq!(ok_count, 1);
        assert_eq!(exceeds_count, 1);

        let stored = h.store.load_invoice(invoice.id).await.unwrap().unwrap();
        assert_eq!(stored.outstanding_balance().amount(), dec!(2000));
        assert!(!stored.outstanding_balance().is_negative());

        let account = h
            .store
            .load_account(h.company_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.used_credit.amount(), dec!(2000));
        assert_eq!(
            account.available_credit,
            account.credit_limit - account.used_credit
        );
    }

    #[tokio::test]
    async fn test_distinct_accounts_do_not_contend() {
        init_tracing();
        let store = Arc::new(MemoryCreditStore::new());
        let policy = flat_policy();

        let company_a = CompanyId::new();
        let company_b = CompanyId::new();
        for company in [company_a, company_b] {
            let account = CreditAccount::open(company, usd(dec!(10000)), 30, 700, now()).unwrap();
            store.save_account(&account).await.unwrap();
        }

        let service = Arc::new(CreditService::new(store.clone(), policy));
        let issue_a = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .issue_invoice_at(company_a, &order(company_a, dec!(4000)), now())
                    .await
            })
        };
        let issue_b = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .issue_invoice_at(company_b, &order(company_b, dec!(7000)), now())
                    .await
            })
        };

        assert!(issue_a.await.unwrap().is_ok());
        assert!(issue_b.await.unwrap().is_ok());

        let a = store.load_account(company_a).await.unwrap().unwrap();
        let b = store.load_account(company_b).await.unwrap().unwrap();
        assert_eq!(a.used_credit.amount(), dec!(4000));
        assert_eq!(b.used_credit.amount(), dec!(7000));
    }
}

// ============================================================================
// Persistence Failure Tests
// ============================================================================

mod persistence_tests {
    use super::*;

    #[tokio::test]
    async fn test_outage_surfaces_as_retryable_error() {
        let h = harness(dec!(25000), flat_policy()).await;
        h.store.set_available(false);

        let result = h.service.summary_at(h.company_id, now()).await;
        match result {
            Err(err @ CreditError::PersistenceUnavailable(_)) => assert!(err.is_retryable()),
            other => panic!("expected PersistenceUnavailable, got {:?}", other),
        }

        h.store.set_available(true);
        assert!(h.service.summary_at(h.company_id, now()).await.is_ok());
    }

    #[tokio::test]
    async fn test_commit_failure_leaves_no_partial_write() {
        let h = harness(dec!(25000), flat_policy()).await;
        h.store.set_commit_failures(true);

        let result = h
            .service
            .issue_invoice_at(h.company_id, &order(h.company_id, dec!(5000)), now())
            .await;
        assert!(matches!(result, Err(CreditError::PersistenceUnavailable(_))));

        h.store.set_commit_failures(false);
        let summary = h.service.summary_at(h.company_id, now()).await.unwrap();

        // Neither side of the mutation is observable
        assert!(summary.account.used_credit.is_zero());
        assert!(summary.recent_invoices.is_empty());
        assert!(h.listener.events().is_empty());
    }
}

// ============================================================================
// Timeline Tests
// ============================================================================

mod timeline_tests {
    use super::*;

    #[tokio::test]
    async fn test_timeline_is_sorted_descending() {
        let h = harness(dec!(50000), flat_policy()).await;

        let first = h
            .service
            .issue_invoice_at(h.company_id, &order(h.company_id, dec!(1000)), now())
            .await
            .unwrap();
        h.service
            .issue_invoice_at(
                h.company_id,
                &order(h.company_id, dec!(2000)),
                now() + Duration::days(1),
            )
            .await
            .unwrap();
        h.service
            .pay_invoice_at(
                first.id,
                usd(dec!(1000)),
                PaymentMethod::BankTransfer,
                Some("SETTLE-9".to_string()),
                now() + Duration::days(2),
            )
            .await
            .unwrap();

        let timeline = h.service.build_timeline(h.company_id).await.unwrap();
        assert_eq!(timeline.len(), 3);
        assert!(matches!(
            timeline[0],
            TimelineEntry::Payment { ref reference, .. } if reference == "SETTLE-9"
        ));
        let dates: Vec<_> = timeline.iter().map(|e| e.date()).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
    }

    #[tokio::test]
    async fn test_timeline_equal_dates_are_deterministic() {
        let h = harness(dec!(50000), flat_policy()).await;
        for _ in 0..4 {
            h.service
                .issue_invoice_at(h.company_id, &order(h.company_id, dec!(500)), now())
                .await
                .unwrap();
        }

        let first = h.service.build_timeline(h.company_id).await.unwrap();
        let second = h.service.build_timeline(h.company_id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_timeline_requires_an_account() {
        let h = harness(dec!(50000), flat_policy()).await;
        let result = h.service.build_timeline(CompanyId::new()).await;
        assert!(matches!(result, Err(CreditError::NoCreditAccount(_))));
    }
}

// ============================================================================
// Account Status Tests
// ============================================================================

mod account_status_tests {
    use super::*;

    #[tokio::test]
    async fn test_suspend_blocks_invoicing() {
        let h = harness(dec!(25000), flat_policy()).await;

        let suspended = h.service.suspend_account(h.company_id).await.unwrap();
        assert_eq!(suspended.status, AccountStatus::Suspended);

        let result = h
            .service
            .issue_invoice_at(h.company_id, &order(h.company_id, dec!(100)), now())
            .await;
        assert!(matches!(result, Err(CreditError::AccountNotActive(_))));

        h.service.reinstate_account(h.company_id).await.unwrap();
        assert!(h
            .service
            .issue_invoice_at(h.company_id, &order(h.company_id, dec!(100)), now())
            .await
            .is_ok());

        let events = h.listener.events();
        assert!(events
            .iter()
            .any(|e| matches!(e, CreditEvent::AccountSuspended { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, CreditEvent::AccountReinstated { .. })));
    }

    #[tokio::test]
    async fn test_cancel_invoice_restores_credit() {
        let h = harness(dec!(25000), flat_policy()).await;
        let invoice = h
            .service
            .issue_invoice_at(h.company_id, &order(h.company_id, dec!(9000)), now())
            .await
            .unwrap();

        let cancelled = h.service.cancel_invoice_at(invoice.id, now()).await.unwrap();
        assert_eq!(cancelled.status, InvoiceStatus::Cancelled);

        let summary = h.service.summary_at(h.company_id, now()).await.unwrap();
        assert!(summary.account.used_credit.is_zero());
        assert_eq!(summary.next_payment_due_label, "No payments due");
        assert!(h
            .listener
            .events()
            .iter()
            .any(|e| matches!(e, CreditEvent::InvoiceCancelled { .. })));
    }
}
