//! # Stock Commands
//!
//! Stock entries and exits, low-stock alerts and stock valuation.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use vidracaria_core::inventory::{apply_stock_movement, is_low_stock, low_stock, stock_value};
use vidracaria_core::validation::{validate_notes, validate_product_code};
use vidracaria_core::{Money, MovementKind, NewStockMovement, Product, StockMovement, StockReason};
use vidracaria_db::store::{FetchOptions, FilterOp, OrderDirection, RecordStore};

use super::bounded;
use crate::error::{CaixaError, CaixaResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovementRequest {
    /// Product code, e.g. `V123`.
    pub code: String,
    pub kind: MovementKind,
    pub quantity: i64,
    pub reason: StockReason,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockMovementOutcome {
    pub product: Product,
    pub movement: StockMovement,
    pub low_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockReport {
    pub product_count: usize,
    pub total_value: Money,
    /// Most urgent first.
    pub low_stock: Vec<Product>,
}

async fn product_by_code<S: RecordStore>(
    store: &S,
    code: &str,
    limit: Duration,
) -> CaixaResult<Product> {
    let found: Vec<Product> = bounded(
        limit,
        "fetch estoque",
        store.fetch_all(&FetchOptions::new().filter("code", FilterOp::Eq, code).limit(1)),
    )
    .await?;

    found
        .into_iter()
        .next()
        .ok_or_else(|| CaixaError::not_found("Product", code))
}

/// Records a stock movement and updates the product's quantity.
///
/// The movement row is written first; if the product update then fails the
/// movement is removed again.
pub async fn register_stock_movement<S: RecordStore>(
    store: &S,
    request: StockMovementRequest,
    limit: Duration,
) -> CaixaResult<StockMovementOutcome> {
    let code = validate_product_code(&request.code)?;
    let notes = validate_notes(request.notes.as_deref())?;

    let product = product_by_code(store, &code, limit).await?;
    let level = apply_stock_movement(
        &product,
        request.kind,
        request.quantity,
        request.reason,
        request.date,
    )?;

    let new = NewStockMovement {
        product_id: product.id,
        product_name: product.name.clone(),
        kind: request.kind,
        quantity: request.quantity,
        date: request.date,
        reason: request.reason,
        notes,
    };

    let movement = bounded(
        limit,
        "insert estoque_movimentacoes",
        store.insert::<StockMovement>(&new),
    )
    .await?
    .into_iter()
    .next()
    .ok_or_else(|| CaixaError::persistence("Store returned no record for stock movement"))?;

    let updated = bounded(limit, "update estoque", store.update::<Product>(product.id, &level))
        .await
        .and_then(|rows| {
            rows.into_iter()
                .next()
                .ok_or_else(|| CaixaError::persistence("Store returned no record for estoque"))
        });

    let product = match updated {
        Ok(product) => product,
        Err(err) => {
            match bounded(
                limit,
                "remove estoque_movimentacoes",
                store.remove::<StockMovement>(movement.id),
            )
            .await
            {
                Ok(_) => warn!(movement_id = movement.id, "Product not updated, movement removed"),
                Err(e) => error!(
                    movement_id = movement.id,
                    error = %e,
                    "Product not updated and movement could not be removed"
                ),
            }
            return Err(err);
        }
    };

    let low = is_low_stock(&product);
    info!(
        code = %product.code,
        kind = %movement.kind,
        quantity = movement.quantity,
        on_hand = product.quantity,
        low_stock = low,
        "Stock movement recorded"
    );

    Ok(StockMovementOutcome {
        product,
        movement,
        low_stock: low,
    })
}

/// Stock value and the products at or below their minimum.
pub async fn stock_report<S: RecordStore>(store: &S, limit: Duration) -> CaixaResult<StockReport> {
    let products: Vec<Product> =
        bounded(limit, "fetch estoque", store.fetch_all(&FetchOptions::new())).await?;

    Ok(StockReport {
        product_count: products.len(),
        total_value: stock_value(&products),
        low_stock: low_stock(&products).into_iter().cloned().collect(),
    })
}

/// Stock movements, most recent first, optionally for one product.
pub async fn stock_history<S: RecordStore>(
    store: &S,
    code: Option<&str>,
    max: Option<u32>,
    limit: Duration,
) -> CaixaResult<Vec<StockMovement>> {
    let mut options = FetchOptions::new().order_by("date", OrderDirection::Desc);
    if let Some(code) = code {
        let product = product_by_code(store, code.trim(), limit).await?;
        options = options.filter("product_id", FilterOp::Eq, product.id);
    }
    if let Some(max) = max {
        options = options.limit(max);
    }

    bounded(limit, "fetch estoque_movimentacoes", store.fetch_all(&options)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::FlakyStore;
    use crate::error::ErrorCode;
    use vidracaria_db::MemoryStore;

    const LIMIT: Duration = Duration::from_secs(5);

    fn day(month: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, d).unwrap()
    }

    fn request(code: &str, kind: MovementKind, quantity: i64, reason: StockReason) -> StockMovementRequest {
        StockMovementRequest {
            code: code.to_string(),
            kind,
            quantity,
            reason,
            date: day(6, 10),
            notes: None,
        }
    }

    async fn demo() -> MemoryStore {
        MemoryStore::with_demo_data().await.unwrap()
    }

    #[tokio::test]
    async fn test_entry_raises_quantity_and_last_entry() {
        let store = demo().await;
        let outcome = register_stock_movement(
            &store,
            request("V456", MovementKind::In, 4, StockReason::Purchase),
            LIMIT,
        )
        .await
        .unwrap();

        assert_eq!(outcome.product.quantity, 7);
        assert_eq!(outcome.product.last_entry, Some(day(6, 10)));
        assert_eq!(outcome.movement.product_name, "Vidro comum 4mm");
        assert!(!outcome.low_stock);
        assert_eq!(store.count::<StockMovement>().await, 4);
    }

    #[tokio::test]
    async fn test_exit_keeps_last_entry() {
        let store = demo().await;
        let outcome = register_stock_movement(
            &store,
            request("V123", MovementKind::Out, 2, StockReason::Sale),
            LIMIT,
        )
        .await
        .unwrap();

        assert_eq!(outcome.product.quantity, 8);
        assert_eq!(outcome.product.last_entry, Some(day(6, 1)));
    }

    #[tokio::test]
    async fn test_exit_beyond_stock_is_rejected() {
        let store = demo().await;
        let err = register_stock_movement(
            &store,
            request("V456", MovementKind::Out, 5, StockReason::Sale),
            LIMIT,
        )
        .await
        .unwrap_err();

        assert!(err.is(ErrorCode::InsufficientStock));
        assert_eq!(store.count::<StockMovement>().await, 3);
        let product: Product = store.fetch_by_id(2).await.unwrap();
        assert_eq!(product.quantity, 3);
    }

    #[tokio::test]
    async fn test_unknown_product_and_bad_reason() {
        let store = demo().await;
        let err = register_stock_movement(
            &store,
            request("X999", MovementKind::In, 1, StockReason::Purchase),
            LIMIT,
        )
        .await
        .unwrap_err();
        assert!(err.is(ErrorCode::NotFound));

        let err = register_stock_movement(
            &store,
            request("V123", MovementKind::In, 1, StockReason::Sale),
            LIMIT,
        )
        .await
        .unwrap_err();
        assert!(err.is(ErrorCode::ValidationError));

        let err = register_stock_movement(
            &store,
            request("V123", MovementKind::In, 0, StockReason::Purchase),
            LIMIT,
        )
        .await
        .unwrap_err();
        assert!(err.is(ErrorCode::ValidationError));
    }

    #[tokio::test]
    async fn test_failed_product_update_removes_movement() {
        let store = FlakyStore::new(demo().await);
        store.fail_updates(true);

        let err = register_stock_movement(
            &store,
            request("V123", MovementKind::In, 3, StockReason::Purchase),
            LIMIT,
        )
        .await
        .unwrap_err();

        assert!(err.is(ErrorCode::PersistenceFailure));
        assert_eq!(store.inner.count::<StockMovement>().await, 3);
        let product: Product = store.inner.fetch_by_id(1).await.unwrap();
        assert_eq!(product.quantity, 10);
    }

    #[tokio::test]
    async fn test_report_lists_low_stock_most_urgent_first() {
        let store = demo().await;
        let report = stock_report(&store, LIMIT).await.unwrap();

        assert_eq!(report.product_count, 3);
        assert_eq!(report.total_value, Money::from_major_minor(3260, 0));
        let codes: Vec<&str> = report.low_stock.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["P789", "V456"]);
    }

    #[tokio::test]
    async fn test_history_for_one_product() {
        let store = demo().await;
        let history = stock_history(&store, Some("V123"), None, LIMIT).await.unwrap();

        let dates: Vec<NaiveDate> = history.iter().map(|m| m.date).collect();
        assert_eq!(dates, vec![day(6, 2), day(6, 1)]);

        let all = stock_history(&store, None, Some(2), LIMIT).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].date, day(6, 2));
    }
}
