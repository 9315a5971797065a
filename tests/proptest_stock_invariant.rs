//! Property-based tests for stock accounting.
//!
//! Random sequences of create, edit and void requests are replayed against
//! one store. Whatever gets accepted or rejected, the following must hold:
//!
//! 1. **Conservation**: for every product, stock + quantities on line items
//!    equals the initial stock
//! 2. **Atomicity**: a rejected request changes nothing
//! 3. **Totals**: a sale's total is the sum of its line subtotals

use proptest::prelude::*;
use rust_decimal::Decimal;
use sales_kit::models::{Customer, CustomerFields, Product, ProductFields};
use sales_kit::sales::{LineRequest, SaleRequest};
use sales_kit::{InMemoryStore, SalesService, Store, Tables};

const PRODUCTS: i64 = 3;
const INITIAL_STOCK: u32 = 10;

#[derive(Clone, Debug)]
enum Op {
    Create(Vec<(i64, String)>),
    Edit(i64, Vec<(i64, String)>),
    Void(i64),
}

fn arb_quantity() -> impl Strategy<Value = String> {
    prop_oneof![
        8 => (1u32..=8).prop_map(|q| q.to_string()),
        1 => Just("0".to_string()),
        1 => Just("-3".to_string()),
        1 => Just("x".to_string()),
    ]
}

fn arb_lines() -> impl Strategy<Value = Vec<(i64, String)>> {
    prop::collection::vec((1..=PRODUCTS, arb_quantity()), 0..4)
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => arb_lines().prop_map(Op::Create),
        3 => (1i64..=6, arb_lines()).prop_map(|(id, lines)| Op::Edit(id, lines)),
        1 => (1i64..=6).prop_map(Op::Void),
    ]
}

fn seed() -> Tables {
    let mut tables = Tables::default();
    tables.customers.insert(Customer::new(CustomerFields {
        first_name: "Ana".to_string(),
        last_name: "Pérez".to_string(),
        email: "ana@example.com".to_string(),
        phone: None,
    }));
    for i in 1..=PRODUCTS {
        tables.products.insert(Product::new(ProductFields {
            name: format!("Producto {}", i),
            description: String::new(),
            price: Decimal::new(100 * i + 25, 2),
            stock: INITIAL_STOCK,
        }));
    }
    tables
}

fn request(lines: &[(i64, String)]) -> SaleRequest {
    SaleRequest {
        customer_id: 1,
        lines: lines
            .iter()
            .map(|(id, qty)| LineRequest::new(*id, qty.clone()))
            .collect(),
    }
}

fn stock_and_lines(tables: &Tables) -> Vec<(u32, Vec<(i64, i64, u32)>)> {
    tables
        .products
        .iter()
        .map(|p| {
            let lines = tables
                .line_items
                .filter(|i| i.product_id == p.id)
                .into_iter()
                .map(|i| (i.sale_id, i.product_id, i.quantity))
                .collect();
            (p.stock, lines)
        })
        .collect()
}

fn check_invariants(tables: &Tables) -> Result<(), TestCaseError> {
    for product in tables.products.iter() {
        let sold: u64 = tables
            .line_items
            .iter()
            .filter(|i| i.product_id == product.id)
            .map(|i| u64::from(i.quantity))
            .sum();
        prop_assert_eq!(
            u64::from(product.stock) + sold,
            u64::from(INITIAL_STOCK),
            "stock of product {} not conserved",
            product.id
        );
    }

    for sale in tables.sales.iter() {
        let expected: Decimal = tables
            .line_items_of(sale.id)
            .iter()
            .map(|i| Decimal::from(i.quantity) * i.unit_price)
            .sum();
        prop_assert_eq!(tables.sale_total(sale.id), expected);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_stock_is_conserved(ops in prop::collection::vec(arb_op(), 1..20)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let store = InMemoryStore::with_tables(seed());
            let service = SalesService::new(store.clone());

            for op in &ops {
                let before = store.snapshot().await;

                let result = match op {
                    Op::Create(lines) => service.sales().create(request(lines)).await.map(|_| ()),
                    Op::Edit(id, lines) => service.sales().edit(*id, request(lines)).await.map(|_| ()),
                    Op::Void(id) => service.sales().void(*id).await.map(|_| ()),
                };

                let after = store.snapshot().await;
                if result.is_err() {
                    prop_assert_eq!(stock_and_lines(&before), stock_and_lines(&after));
                    prop_assert_eq!(before.sales.len(), after.sales.len());
                }
                check_invariants(&after)?;
            }

            let count = store.read(|tables| Ok(tables.products.len())).await.unwrap();
            prop_assert_eq!(count, PRODUCTS as usize);
            Ok::<(), TestCaseError>(())
        })?;
    }
}
