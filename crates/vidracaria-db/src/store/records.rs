//! Table bindings for the domain records.
//!
//! | Record              | Table                   | Updatable with       |
//! |---------------------|-------------------------|----------------------|
//! | `CashRegister`      | `caixa`                 | `RegisterSettlement` |
//! | `CashMovement`      | `caixa_movimentacoes`   | -                    |
//! | `CashClosingRecord` | `caixa_fechamentos`     | -                    |
//! | `Product`           | `estoque`               | `StockLevel`         |
//! | `StockMovement`     | `estoque_movimentacoes` | -                    |
//! | `FinanceEntry`      | `financas`              | -                    |

use vidracaria_core::{
    CashClosingRecord, CashMovement, CashRegister, FinanceEntry, NewCashClosingRecord,
    NewCashMovement, NewCashRegister, NewFinanceEntry, NewProduct, NewStockMovement, Product,
    RecordId, RegisterSettlement, StockLevel, StockMovement,
};

use super::{Record, Updatable};

impl Record for CashRegister {
    const TABLE: &'static str = "caixa";
    const COLUMNS: &'static [&'static str] = &[
        "date",
        "open_time",
        "close_time",
        "opening_amount",
        "status",
        "closing_amount",
        "system_amount",
        "difference",
        "opening_notes",
        "closing_notes",
    ];
    type New = NewCashRegister;

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Updatable for CashRegister {
    type Patch = RegisterSettlement;
}

impl Record for CashMovement {
    const TABLE: &'static str = "caixa_movimentacoes";
    const COLUMNS: &'static [&'static str] = &[
        "register_id",
        "date",
        "time",
        "kind",
        "amount",
        "description",
        "payment_method",
        "notes",
    ];
    type New = NewCashMovement;

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Record for CashClosingRecord {
    const TABLE: &'static str = "caixa_fechamentos";
    const COLUMNS: &'static [&'static str] = &[
        "date",
        "open_time",
        "close_time",
        "opening_amount",
        "closing_amount",
        "system_amount",
        "difference",
        "total_in",
        "total_out",
        "notes",
    ];
    type New = NewCashClosingRecord;

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Record for Product {
    const TABLE: &'static str = "estoque";
    const COLUMNS: &'static [&'static str] = &[
        "code",
        "name",
        "description",
        "quantity",
        "minimum_quantity",
        "unit",
        "unit_price",
        "supplier",
        "location",
        "last_entry",
    ];
    type New = NewProduct;

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Updatable for Product {
    type Patch = StockLevel;
}

impl Record for StockMovement {
    const TABLE: &'static str = "estoque_movimentacoes";
    const COLUMNS: &'static [&'static str] = &[
        "product_id",
        "product_name",
        "kind",
        "quantity",
        "date",
        "reason",
        "notes",
    ];
    type New = NewStockMovement;

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Record for FinanceEntry {
    const TABLE: &'static str = "financas";
    const COLUMNS: &'static [&'static str] =
        &["date", "kind", "category", "description", "amount", "notes"];
    type New = NewFinanceEntry;

    fn id(&self) -> RecordId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde::Serialize;
    use vidracaria_core::{
        EntryKind, Money, MovementKind, PaymentMethod, RegisterStatus, StockReason,
    };

    /// The serialized keys of a payload must be exactly the table's columns.
    fn assert_keys<T: Record>(payload: &impl Serialize) {
        let value = serde_json::to_value(payload).unwrap();
        let mut keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        let mut expected: Vec<&str> = T::COLUMNS.to_vec();
        expected.sort_unstable();
        assert_eq!(keys, expected, "columns of {}", T::TABLE);
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 5).unwrap()
    }

    #[test]
    fn test_register_columns_match_struct() {
        let register = CashRegister {
            id: 1,
            date: date(),
            open_time: "08:30".to_string(),
            close_time: None,
            opening_amount: Money::from_cents(20000),
            status: RegisterStatus::Open,
            closing_amount: None,
            system_amount: None,
            difference: None,
            opening_notes: None,
            closing_notes: None,
        };
        let mut value = serde_json::to_value(&register).unwrap();
        value.as_object_mut().unwrap().remove("id");
        assert_keys::<CashRegister>(&value);
        assert!(CashRegister::has_column("id"));
        assert!(!CashRegister::has_column("valor_inicial"));
    }

    #[test]
    fn test_movement_columns_match_new_record() {
        assert_keys::<CashMovement>(&NewCashMovement {
            register_id: 1,
            date: date(),
            time: "09:00".to_string(),
            kind: MovementKind::In,
            amount: Money::from_cents(15000),
            description: "Recebimento à vista".to_string(),
            payment_method: PaymentMethod::Cash,
            notes: None,
        });
    }

    #[test]
    fn test_closing_record_columns_match_new_record() {
        assert_keys::<CashClosingRecord>(&NewCashClosingRecord {
            date: date(),
            open_time: "08:00".to_string(),
            close_time: "18:00".to_string(),
            opening_amount: Money::zero(),
            closing_amount: Money::zero(),
            system_amount: Money::zero(),
            difference: Money::zero(),
            total_in: Money::zero(),
            total_out: Money::zero(),
            notes: None,
        });
    }

    #[test]
    fn test_inventory_and_finance_columns_match() {
        assert_keys::<Product>(&NewProduct {
            code: "V123".to_string(),
            name: "Vidro temperado 8mm".to_string(),
            description: None,
            quantity: 10,
            minimum_quantity: 5,
            unit: "chapa".to_string(),
            unit_price: Money::from_cents(25000),
            supplier: None,
            location: None,
            last_entry: None,
        });
        assert_keys::<StockMovement>(&NewStockMovement {
            product_id: 1,
            product_name: "Vidro temperado 8mm".to_string(),
            kind: MovementKind::In,
            quantity: 5,
            date: date(),
            reason: StockReason::Purchase,
            notes: None,
        });
        assert_keys::<FinanceEntry>(&NewFinanceEntry {
            date: date(),
            kind: EntryKind::Income,
            category: "vendas".to_string(),
            description: "Venda de vidro temperado".to_string(),
            amount: Money::from_cents(120000),
            notes: None,
        });
    }
}
