//! # Demo Dataset
//!
//! Sample records shown when no database is configured, also loaded into a
//! SQLite file by the `seed` binary.
//!
//! Records are inserted in dependency order into empty tables, so the
//! assigned ids start at 1 and the references below line up:
//!
//! ```text
//! caixa #1 (open, 2025-06-05 08:30, R$ 200,00)
//!   └── caixa_movimentacoes #1..#3
//! caixa_fechamentos #1 (2025-06-04), #2 (2025-06-03)
//! estoque #1 V123, #2 V456, #3 P789
//!   └── estoque_movimentacoes #1..#3
//! financas #1..#3
//! ```

use chrono::NaiveDate;
use tracing::info;

use crate::error::DbResult;
use crate::store::RecordStore;
use vidracaria_core::{
    CashClosingRecord, CashMovement, CashRegister, EntryKind, FinanceEntry, Money, MovementKind,
    NewCashClosingRecord, NewCashMovement, NewCashRegister, NewFinanceEntry, NewProduct,
    NewStockMovement, PaymentMethod, Product, RegisterStatus, StockMovement, StockReason,
};

/// Every demo record, grouped by table.
#[derive(Debug, Clone)]
pub struct DemoDataset {
    pub registers: Vec<NewCashRegister>,
    pub movements: Vec<NewCashMovement>,
    pub closings: Vec<NewCashClosingRecord>,
    pub products: Vec<NewProduct>,
    pub stock_movements: Vec<NewStockMovement>,
    pub finance: Vec<NewFinanceEntry>,
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn reais(amount: i64) -> Money {
    Money::from_major_minor(amount, 0)
}

pub fn dataset() -> DemoDataset {
    let today = date(2025, 6, 5);

    DemoDataset {
        registers: vec![NewCashRegister {
            date: today,
            open_time: "08:30".to_string(),
            opening_amount: reais(200),
            status: RegisterStatus::Open,
            opening_notes: Some("Início do expediente".to_string()),
        }],
        movements: vec![
            NewCashMovement {
                register_id: 1,
                date: today,
                time: "09:00".to_string(),
                kind: MovementKind::In,
                amount: reais(150),
                description: "Recebimento à vista".to_string(),
                payment_method: PaymentMethod::Cash,
                notes: None,
            },
            NewCashMovement {
                register_id: 1,
                date: today,
                time: "10:30".to_string(),
                kind: MovementKind::In,
                amount: reais(350),
                description: "Pagamento de orçamento #123".to_string(),
                payment_method: PaymentMethod::CreditCard,
                notes: Some("Parcelado em 3x".to_string()),
            },
            NewCashMovement {
                register_id: 1,
                date: today,
                time: "12:30".to_string(),
                kind: MovementKind::Out,
                amount: reais(50),
                description: "Compra de material de escritório".to_string(),
                payment_method: PaymentMethod::Cash,
                notes: None,
            },
        ],
        closings: vec![
            NewCashClosingRecord {
                date: date(2025, 6, 4),
                open_time: "08:00".to_string(),
                close_time: "18:00".to_string(),
                opening_amount: reais(150),
                closing_amount: reais(850),
                system_amount: reais(850),
                difference: Money::zero(),
                total_in: reais(800),
                total_out: reais(100),
                notes: None,
            },
            NewCashClosingRecord {
                date: date(2025, 6, 3),
                open_time: "08:15".to_string(),
                close_time: "18:30".to_string(),
                opening_amount: reais(200),
                closing_amount: reais(1200),
                system_amount: reais(1250),
                difference: reais(-50),
                total_in: reais(1200),
                total_out: reais(150),
                notes: Some("Diferença a verificar".to_string()),
            },
        ],
        products: vec![
            NewProduct {
                code: "V123".to_string(),
                name: "Vidro temperado 8mm".to_string(),
                description: Some("Vidro temperado incolor 8mm".to_string()),
                quantity: 10,
                minimum_quantity: 5,
                unit: "chapa".to_string(),
                unit_price: reais(250),
                supplier: Some("Vidros Brasil".to_string()),
                location: Some("Prateleira A1".to_string()),
                last_entry: Some(date(2025, 6, 1)),
            },
            NewProduct {
                code: "V456".to_string(),
                name: "Vidro comum 4mm".to_string(),
                description: Some("Vidro comum incolor 4mm".to_string()),
                quantity: 3,
                minimum_quantity: 5,
                unit: "chapa".to_string(),
                unit_price: reais(120),
                supplier: Some("Vidros Brasil".to_string()),
                location: Some("Prateleira A2".to_string()),
                last_entry: Some(date(2025, 5, 15)),
            },
            NewProduct {
                code: "P789".to_string(),
                name: "Perfil de alumínio".to_string(),
                description: Some("Perfil de alumínio para box de banheiro".to_string()),
                quantity: 5,
                minimum_quantity: 10,
                unit: "barra".to_string(),
                unit_price: reais(80),
                supplier: Some("Alumínios SA".to_string()),
                location: Some("Prateleira B1".to_string()),
                last_entry: Some(date(2025, 5, 20)),
            },
        ],
        stock_movements: vec![
            NewStockMovement {
                product_id: 1,
                product_name: "Vidro temperado 8mm".to_string(),
                kind: MovementKind::In,
                quantity: 5,
                date: date(2025, 6, 1),
                reason: StockReason::Purchase,
                notes: Some("Compra mensal".to_string()),
            },
            NewStockMovement {
                product_id: 1,
                product_name: "Vidro temperado 8mm".to_string(),
                kind: MovementKind::Out,
                quantity: 2,
                date: date(2025, 6, 2),
                reason: StockReason::Sale,
                notes: Some("Venda para cliente João".to_string()),
            },
            NewStockMovement {
                product_id: 2,
                product_name: "Vidro comum 4mm".to_string(),
                kind: MovementKind::In,
                quantity: 10,
                date: date(2025, 5, 15),
                reason: StockReason::Purchase,
                notes: None,
            },
        ],
        finance: vec![
            NewFinanceEntry {
                date: today,
                kind: EntryKind::Income,
                category: "Venda de produtos".to_string(),
                description: "Venda de vidro temperado".to_string(),
                amount: reais(1200),
                notes: None,
            },
            NewFinanceEntry {
                date: date(2025, 6, 4),
                kind: EntryKind::Expense,
                category: "Fornecedores".to_string(),
                description: "Compra de material".to_string(),
                amount: reais(500),
                notes: None,
            },
            NewFinanceEntry {
                date: date(2025, 6, 3),
                kind: EntryKind::Income,
                category: "Instalação".to_string(),
                description: "Instalação de box".to_string(),
                amount: reais(350),
                notes: None,
            },
        ],
    }
}

/// Inserts the demo dataset into a store.
pub async fn load<S: RecordStore>(store: &S) -> DbResult<()> {
    let data = dataset();

    for record in &data.registers {
        store.insert::<CashRegister>(record).await?;
    }
    for record in &data.movements {
        store.insert::<CashMovement>(record).await?;
    }
    for record in &data.closings {
        store.insert::<CashClosingRecord>(record).await?;
    }
    for record in &data.products {
        store.insert::<Product>(record).await?;
    }
    for record in &data.stock_movements {
        store.insert::<StockMovement>(record).await?;
    }
    for record in &data.finance {
        store.insert::<FinanceEntry>(record).await?;
    }

    info!(
        registers = data.registers.len(),
        movements = data.movements.len(),
        closings = data.closings.len(),
        products = data.products.len(),
        finance = data.finance.len(),
        "Demo dataset loaded"
    );
    Ok(())
}
