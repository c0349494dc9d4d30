use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;

use crate::db::DbPool;
use crate::domain::catalog::{ProductDetail, VariantDetail};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::schema::{products, size_variants};

use super::models::{ProductRow, SizeVariantRow};

pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogRepository for DieselCatalogRepository {
    fn find_product(&self, id: i32) -> Result<Option<ProductDetail>, DomainError> {
        let mut conn = self.pool.get()?;

        let product = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(product) = product else {
            return Ok(None);
        };

        let variants = size_variants::table
            .filter(size_variants::product_id.eq(product.id))
            .order(size_variants::label.asc())
            .select(SizeVariantRow::as_select())
            .load(&mut conn)?;

        Ok(Some(ProductDetail {
            id: product.id,
            name: product.name,
            price: product.price,
            sale_price: product.sale_price,
            available: product.available,
            stock: product.stock,
            variants: variants
                .into_iter()
                .map(|v| VariantDetail {
                    label: v.label,
                    stock: v.stock,
                })
                .collect(),
        }))
    }

    fn delete_product(&self, id: i32) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(products::table.filter(products::id.eq(id)))
            .execute(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    DatabaseErrorKind::ForeignKeyViolation,
                    _,
                ) => DomainError::Protected("product".to_string()),
                other => other.into(),
            })?;

        if deleted == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
