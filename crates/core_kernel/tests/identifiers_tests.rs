//! Unit tests for the identifiers module

use core_kernel::{CompanyId, CreditAccountId, InvoiceId, OrderId, PaymentId, ProductId};
use std::collections::HashSet;
use uuid::Uuid;

#[test]
fn test_prefixes_are_distinct() {
    let prefixes = [
        CompanyId::prefix(),
        CreditAccountId::prefix(),
        InvoiceId::prefix(),
        PaymentId::prefix(),
        OrderId::prefix(),
        ProductId::prefix(),
    ];

    let unique: HashSet<_> = prefixes.iter().collect();
    assert_eq!(unique.len(), prefixes.len());
}

#[test]
fn test_display_includes_prefix() {
    assert!(CompanyId::new().to_string().starts_with("CMP-"));
    assert!(InvoiceId::new().to_string().starts_with("INV-"));
    assert!(PaymentId::new().to_string().starts_with("PAY-"));
}

#[test]
fn test_parse_with_and_without_prefix() {
    let id = OrderId::new();
    let uuid_only = id.as_uuid().to_string();

    let parsed_prefixed: OrderId = id.to_string().parse().unwrap();
    let parsed_bare: OrderId = uuid_only.parse().unwrap();

    assert_eq!(parsed_prefixed, id);
    assert_eq!(parsed_bare, id);
}

#[test]
fn test_parse_rejects_garbage() {
    let result: Result<InvoiceId, _> = "not-a-uuid".parse();
    assert!(result.is_err());
}

#[test]
fn test_random_ids_are_unique() {
    let a = PaymentId::new();
    let b = PaymentId::new();
    assert_ne!(a, b);
}

#[test]
fn test_from_uuid_round_trip() {
    let uuid = Uuid::new_v4();
    let id = CreditAccountId::from_uuid(uuid);
    assert_eq!(*id.as_uuid(), uuid);
}

#[test]
fn test_serde_is_transparent() {
    let id = CompanyId::new();
    let json = serde_json::to_string(&id).unwrap();

    // Serializes as the bare UUID, no prefix
    assert_eq!(json, format!("\"{}\"", id.as_uuid()));

    let back: CompanyId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}
