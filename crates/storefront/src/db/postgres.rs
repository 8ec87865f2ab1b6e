//! `PostgreSQL` document storage.
//!
//! # Table: `store.documents`
//!
//! One row per document, keyed by `(collection, id)`, with the document
//! itself in a JSONB `body` column. Whole-collection writes run in a single
//! transaction; cart item updates are single filtered `UPDATE` statements
//! so concurrent quantity changes on the same cart do not overwrite each other.

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{debug, instrument};

use emporium_core::{Cart, CartId, Document, ProductId};

use super::{CartStore, CollectionStore, StoreError};

/// Bounded retries for the increment/append race in `increment_item`.
const INCREMENT_ATTEMPTS: usize = 3;

/// A collection persisted as JSONB rows.
#[derive(Debug, Clone)]
pub struct PgDocumentStore<D> {
    pool: PgPool,
    _document: PhantomData<fn() -> D>,
}

impl<D: Document> PgDocumentStore<D> {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _document: PhantomData,
        }
    }
}

#[async_trait]
impl<D: Document> CollectionStore<D> for PgDocumentStore<D> {
    #[instrument(skip(self), fields(collection = D::COLLECTION))]
    async fn read(&self) -> Result<Vec<D>, StoreError> {
        let rows: Vec<Json<D>> = sqlx::query_scalar(
            r"
            SELECT body FROM store.documents
            WHERE collection = $1
            ORDER BY id
            ",
        )
        .bind(D::COLLECTION)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|Json(document)| document).collect())
    }

    #[instrument(skip(self, documents), fields(collection = D::COLLECTION, count = documents.len()))]
    async fn write(&self, documents: &[D]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM store.documents WHERE collection = $1")
            .bind(D::COLLECTION)
            .execute(&mut *tx)
            .await?;

        for document in documents {
            sqlx::query(
                r"
                INSERT INTO store.documents (collection, id, body)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(D::COLLECTION)
            .bind(document.key())
            .bind(Json(document))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Collection written");
        Ok(())
    }
}

#[async_trait]
impl CartStore for PgDocumentStore<Cart> {
    #[instrument(skip(self))]
    async fn increment_item(
        &self,
        cart: CartId,
        product: ProductId,
    ) -> Result<Option<Cart>, StoreError> {
        for _ in 0..INCREMENT_ATTEMPTS {
            let incremented: Option<Json<Cart>> = sqlx::query_scalar(
                r"
                UPDATE store.documents
                SET body = jsonb_set(body, '{items}', (
                    SELECT jsonb_agg(
                        CASE WHEN item -> 'productRef' = to_jsonb($3::bigint)
                             THEN jsonb_set(item, '{quantity}', to_jsonb((item ->> 'quantity')::bigint + 1))
                             ELSE item
                        END
                        ORDER BY position)
                    FROM jsonb_array_elements(body -> 'items') WITH ORDINALITY AS elements(item, position)
                ))
                WHERE collection = $1 AND id = $2
                  AND body -> 'items' @> jsonb_build_array(jsonb_build_object('productRef', $3::bigint))
                RETURNING body
                ",
            )
            .bind(Cart::COLLECTION)
            .bind(cart)
            .bind(product)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(Json(updated)) = incremented {
                return Ok(Some(updated));
            }

            // Only appends while the product is still absent, so two
            // concurrent first additions cannot produce duplicate items.
            let appended: Option<Json<Cart>> = sqlx::query_scalar(
                r"
                UPDATE store.documents
                SET body = jsonb_set(
                    body,
                    '{items}',
                    COALESCE(body -> 'items', '[]'::jsonb)
                        || jsonb_build_array(jsonb_build_object('productRef', $3::bigint, 'quantity', 1))
                )
                WHERE collection = $1 AND id = $2
                  AND NOT COALESCE(body -> 'items', '[]'::jsonb)
                      @> jsonb_build_array(jsonb_build_object('productRef', $3::bigint))
                RETURNING body
                ",
            )
            .bind(Cart::COLLECTION)
            .bind(cart)
            .bind(product)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(Json(updated)) = appended {
                return Ok(Some(updated));
            }

            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM store.documents WHERE collection = $1 AND id = $2)",
            )
            .bind(Cart::COLLECTION)
            .bind(cart)
            .fetch_one(&self.pool)
            .await?;

            if !exists {
                return Ok(None);
            }
            // Someone else added the product between our two statements.
        }

        Err(StoreError::Corrupt {
            collection: Cart::COLLECTION,
            reason: format!("cart {cart} kept changing while adding product {product}"),
        })
    }

    #[instrument(skip(self))]
    async fn set_item_quantity(
        &self,
        cart: CartId,
        product: ProductId,
        quantity: u32,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"
            UPDATE store.documents
            SET body = jsonb_set(body, '{items}', (
                SELECT jsonb_agg(
                    CASE WHEN item -> 'productRef' = to_jsonb($3::bigint)
                         THEN jsonb_set(item, '{quantity}', to_jsonb($4::bigint))
                         ELSE item
                    END
                    ORDER BY position)
                FROM jsonb_array_elements(body -> 'items') WITH ORDINALITY AS elements(item, position)
            ))
            WHERE collection = $1 AND id = $2
              AND body -> 'items' @> jsonb_build_array(jsonb_build_object('productRef', $3::bigint))
            ",
        )
        .bind(Cart::COLLECTION)
        .bind(cart)
        .bind(product)
        .bind(i64::from(quantity))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn clear_items(&self, cart: CartId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"
            UPDATE store.documents
            SET body = jsonb_set(body, '{items}', '[]'::jsonb)
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(Cart::COLLECTION)
        .bind(cart)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
