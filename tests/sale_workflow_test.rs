//! End-to-end workflow tests for customers, products and sales.
//!
//! Each test builds a fresh in-memory service and checks one stock or
//! soft-delete rule through the public API only.

use rust_decimal::Decimal;
use sales_kit::models::{CustomerFields, ProductFields};
use sales_kit::sales::{LineRequest, SaleRequest};
use sales_kit::{Error, InMemoryStore, RemoveOutcome, SalesService};
use std::str::FromStr;

type Service = SalesService<InMemoryStore>;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn add_customer(service: &Service, name: &str) -> i64 {
    service
        .customers()
        .create(CustomerFields {
            first_name: name.to_string(),
            last_name: "García".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: Some("555-0100".to_string()),
        })
        .await
        .expect("customer should be created")
        .id
}

async fn add_product(service: &Service, name: &str, price: &str, stock: u32) -> i64 {
    service
        .products()
        .create(ProductFields {
            name: name.to_string(),
            description: format!("{} de prueba", name),
            price: dec(price),
            stock,
        })
        .await
        .expect("product should be created")
        .id
}

async fn stock_of(service: &Service, product_id: i64) -> u32 {
    service.products().get(product_id).await.unwrap().stock
}

fn sale(customer_id: i64, lines: &[(i64, &str)]) -> SaleRequest {
    SaleRequest {
        customer_id,
        lines: lines
            .iter()
            .map(|(id, qty)| LineRequest::new(*id, *qty))
            .collect(),
    }
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_invalid_quantity_commits_nothing() {
    let service = SalesService::new(InMemoryStore::new());
    let ana = add_customer(&service, "Ana").await;
    let cafe = add_product(&service, "Café", "4.50", 5).await;
    let te = add_product(&service, "Té", "2.00", 5).await;

    for qty in ["abc", "0", "-1", "", "1.5"] {
        let err = service
            .sales()
            .create(sale(ana, &[(cafe, "1"), (te, qty)]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid quantity", "quantity {qty:?}");
    }

    assert_eq!(stock_of(&service, cafe).await, 5);
    assert_eq!(stock_of(&service, te).await, 5);
    assert!(service.sales().list_active().await.unwrap().is_empty());
    assert!(!service.customers().has_sales(ana).await.unwrap());
}

#[tokio::test]
async fn test_quantity_above_stock_commits_nothing() {
    let service = SalesService::new(InMemoryStore::new());
    let ana = add_customer(&service, "Ana").await;
    let cafe = add_product(&service, "Café", "4.50", 5).await;

    let err = service
        .sales()
        .create(sale(ana, &[(cafe, "6")]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(err.to_string(), "insufficient stock for Café");
    assert_eq!(stock_of(&service, cafe).await, 5);
}

#[tokio::test]
async fn test_selling_exact_stock_reaches_zero() {
    let service = SalesService::new(InMemoryStore::new());
    let ana = add_customer(&service, "Ana").await;
    let cafe = add_product(&service, "Café", "4.50", 5).await;

    service
        .sales()
        .create(sale(ana, &[(cafe, "5")]))
        .await
        .unwrap();
    assert_eq!(stock_of(&service, cafe).await, 0);

    let err = service
        .sales()
        .create(sale(ana, &[(cafe, "1")]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(stock_of(&service, cafe).await, 0);
}

#[tokio::test]
async fn test_inactive_customer_can_still_buy() {
    let service = SalesService::new(InMemoryStore::new());
    let ana = add_customer(&service, "Ana").await;
    let cafe = add_product(&service, "Café", "4.50", 5).await;

    service.sales().create(sale(ana, &[(cafe, "1")])).await.unwrap();
    assert_eq!(
        service.customers().remove(ana).await.unwrap(),
        RemoveOutcome::Deactivated
    );

    service.sales().create(sale(ana, &[(cafe, "1")])).await.unwrap();
    assert_eq!(service.sales().list_active().await.unwrap().len(), 2);
}

// ============================================================================
// Edit
// ============================================================================

#[tokio::test]
async fn test_edit_with_identical_lines_keeps_stock() {
    let service = SalesService::new(InMemoryStore::new());
    let ana = add_customer(&service, "Ana").await;
    let cafe = add_product(&service, "Café", "4.50", 5).await;
    let te = add_product(&service, "Té", "2.00", 4).await;

    let created = service
        .sales()
        .create(sale(ana, &[(cafe, "2"), (te, "1")]))
        .await
        .unwrap();
    let before = (stock_of(&service, cafe).await, stock_of(&service, te).await);

    let edited = service
        .sales()
        .edit(created.sale.id, sale(ana, &[(cafe, "2"), (te, "1")]))
        .await
        .unwrap();

    let after = (stock_of(&service, cafe).await, stock_of(&service, te).await);
    assert_eq!(before, after);
    assert_eq!(edited.total, created.total);
    assert_eq!(edited.lines.len(), 2);
}

#[tokio::test]
async fn test_edit_dropping_line_restores_stock() {
    let service = SalesService::new(InMemoryStore::new());
    let ana = add_customer(&service, "Ana").await;
    let p1 = add_product(&service, "Yerba", "3.00", 5).await;
    let p2 = add_product(&service, "Mate", "10.00", 3).await;

    let created = service
        .sales()
        .create(sale(ana, &[(p1, "3"), (p2, "1")]))
        .await
        .unwrap();
    assert_eq!(stock_of(&service, p1).await, 2);

    service
        .sales()
        .edit(created.sale.id, sale(ana, &[(p2, "1")]))
        .await
        .unwrap();

    assert_eq!(stock_of(&service, p1).await, 5);
    assert_eq!(stock_of(&service, p2).await, 2);
}

#[tokio::test]
async fn test_edit_changes_customer_and_quantities() {
    let service = SalesService::new(InMemoryStore::new());
    let ana = add_customer(&service, "Ana").await;
    let bruno = add_customer(&service, "Bruno").await;
    let cafe = add_product(&service, "Café", "4.50", 5).await;

    let created = service
        .sales()
        .create(sale(ana, &[(cafe, "2")]))
        .await
        .unwrap();
    assert_eq!(stock_of(&service, cafe).await, 3);

    // 3 on the shelf + 2 already on the sale
    let edited = service
        .sales()
        .edit(created.sale.id, sale(bruno, &[(cafe, "5")]))
        .await
        .unwrap();

    assert_eq!(edited.sale.customer_id, bruno);
    assert_eq!(edited.customer_name, "Bruno García");
    assert_eq!(edited.total, dec("22.50"));
    assert_eq!(stock_of(&service, cafe).await, 0);
    assert!(!service.customers().has_sales(ana).await.unwrap());
}

#[tokio::test]
async fn test_failed_edit_leaves_sale_untouched() {
    let service = SalesService::new(InMemoryStore::new());
    let ana = add_customer(&service, "Ana").await;
    let cafe = add_product(&service, "Café", "4.50", 5).await;
    let te = add_product(&service, "Té", "2.00", 1).await;

    let created = service
        .sales()
        .create(sale(ana, &[(cafe, "2")]))
        .await
        .unwrap();

    let err = service
        .sales()
        .edit(created.sale.id, sale(ana, &[(cafe, "1"), (te, "2")]))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "insufficient stock for Té");

    let current = service.sales().get(created.sale.id).await.unwrap();
    assert_eq!(current, created);
    assert_eq!(stock_of(&service, cafe).await, 3);
    assert_eq!(stock_of(&service, te).await, 1);
}

#[tokio::test]
async fn test_edit_missing_sale_is_not_found() {
    let service = SalesService::new(InMemoryStore::new());
    let ana = add_customer(&service, "Ana").await;

    let err = service.sales().edit(99, sale(ana, &[])).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "sale", id: 99 }));
}

#[tokio::test]
async fn test_edit_missing_customer_leaves_sale_untouched() {
    let service = SalesService::new(InMemoryStore::new());
    let ana = add_customer(&service, "Ana").await;
    let cafe = add_product(&service, "Café", "4.50", 5).await;

    let created = service
        .sales()
        .create(sale(ana, &[(cafe, "2")]))
        .await
        .unwrap();

    let err = service
        .sales()
        .edit(created.sale.id, sale(404, &[(cafe, "1")]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "customer", id: 404 }));

    let current = service.sales().get(created.sale.id).await.unwrap();
    assert_eq!(current, created);
    assert_eq!(stock_of(&service, cafe).await, 3);
}

#[tokio::test]
async fn test_edit_missing_product_leaves_sale_untouched() {
    let service = SalesService::new(InMemoryStore::new());
    let ana = add_customer(&service, "Ana").await;
    let cafe = add_product(&service, "Café", "4.50", 5).await;
    let te = add_product(&service, "Té", "2.00", 4).await;

    let created = service
        .sales()
        .create(sale(ana, &[(cafe, "2"), (te, "1")]))
        .await
        .unwrap();

    // The valid first line must not be applied either
    let err = service
        .sales()
        .edit(created.sale.id, sale(ana, &[(cafe, "5"), (77, "1")]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "product", id: 77 }));

    let current = service.sales().get(created.sale.id).await.unwrap();
    assert_eq!(current, created);
    assert_eq!(current.lines.len(), 2);
    assert_eq!(stock_of(&service, cafe).await, 3);
    assert_eq!(stock_of(&service, te).await, 3);
}

// ============================================================================
// Void, totals, soft delete
// ============================================================================

#[tokio::test]
async fn test_void_never_touches_stock_or_lines() {
    let service = SalesService::new(InMemoryStore::new());
    let ana = add_customer(&service, "Ana").await;
    let cafe = add_product(&service, "Café", "4.50", 5).await;

    let created = service
        .sales()
        .create(sale(ana, &[(cafe, "2")]))
        .await
        .unwrap();
    service.sales().void(created.sale.id).await.unwrap();
    service.sales().void(created.sale.id).await.unwrap();

    let voided = service.sales().get(created.sale.id).await.unwrap();
    assert!(voided.sale.voided);
    assert_eq!(voided.lines, created.lines);
    assert_eq!(stock_of(&service, cafe).await, 3);

    assert!(service.sales().list_active().await.unwrap().is_empty());
    assert_eq!(service.sales().list_voided().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_total_uses_captured_unit_price() {
    let service = SalesService::new(InMemoryStore::new());
    let ana = add_customer(&service, "Ana").await;
    let cafe = add_product(&service, "Café", "4.50", 10).await;
    let te = add_product(&service, "Té", "1.25", 10).await;

    let created = service
        .sales()
        .create(sale(ana, &[(cafe, "3"), (te, "2")]))
        .await
        .unwrap();
    assert_eq!(created.total, dec("16.00"));

    // Later price changes do not reach existing line items
    service
        .products()
        .update(
            cafe,
            ProductFields {
                name: "Café".to_string(),
                description: String::new(),
                price: dec("9.99"),
                stock: 7,
            },
        )
        .await
        .unwrap();

    let view = service.sales().get(created.sale.id).await.unwrap();
    let expected: Decimal = view
        .lines
        .iter()
        .map(|l| Decimal::from(l.item.quantity) * l.item.unit_price)
        .sum();
    assert_eq!(view.total, expected);
    assert_eq!(view.total, dec("16.00"));
}

#[tokio::test]
async fn test_customer_removal_policy() {
    let service = SalesService::new(InMemoryStore::new());
    let ana = add_customer(&service, "Ana").await;
    let bruno = add_customer(&service, "Bruno").await;
    let cafe = add_product(&service, "Café", "4.50", 5).await;

    let created = service
        .sales()
        .create(sale(bruno, &[(cafe, "1")]))
        .await
        .unwrap();
    service.sales().void(created.sale.id).await.unwrap();

    assert_eq!(
        service.customers().remove(ana).await.unwrap(),
        RemoveOutcome::Deleted
    );
    assert!(matches!(
        service.customers().get(ana).await,
        Err(Error::NotFound { .. })
    ));

    // A voided sale still counts as a sale
    assert_eq!(
        service.customers().remove(bruno).await.unwrap(),
        RemoveOutcome::Deactivated
    );
    assert!(!service.customers().get(bruno).await.unwrap().active);
    assert!(service.sales().get(created.sale.id).await.is_ok());
}

#[tokio::test]
async fn test_product_removal_policy() {
    let service = SalesService::new(InMemoryStore::new());
    let ana = add_customer(&service, "Ana").await;
    let cafe = add_product(&service, "Café", "4.50", 5).await;
    let te = add_product(&service, "Té", "2.00", 5).await;

    service.sales().create(sale(ana, &[(cafe, "1")])).await.unwrap();

    assert_eq!(
        service.products().remove(cafe).await.unwrap(),
        RemoveOutcome::Deactivated
    );
    assert_eq!(
        service.products().remove(te).await.unwrap(),
        RemoveOutcome::Deleted
    );

    let inactive = service.products().list_inactive().await.unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].id, cafe);
    assert!(service.products().list_active().await.unwrap().is_empty());
}
