//! PostgreSQL catalog store

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use super::{CatalogRepository, ImageWrite, ProductQuery};
use crate::domain::{NewProduct, NewProductImage, Product, ProductError, ProductImage};
use crate::{CatalogError, Result};

const PRODUCT_COLUMNS: &str = "p.id, p.price, p.original_price, p.stock, p.view_count, p.date_created, p.name, p.detail, p.description, p.is_featured";
const IMAGE_COLUMNS: &str = "id, product_id, caption, image_path, file_size, is_default, sort_order, date_created";

/// SQLSTATE `numeric_value_out_of_range`.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

#[derive(Clone, Debug)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

async fn insert_image(conn: &mut PgConnection, product_id: i32, image: &NewProductImage) -> sqlx::Result<u64> {
    let done = sqlx::query("INSERT INTO product_images (product_id, caption, image_path, file_size, is_default, sort_order, date_created) VALUES ($1, $2, $3, $4, $5, $6, $7)")
        .bind(product_id).bind(&image.caption).bind(&image.image_path).bind(image.file_size)
        .bind(image.is_default).bind(image.sort_order).bind(image.date_created)
        .execute(&mut *conn).await?;
    Ok(done.rows_affected())
}

async fn update_image(conn: &mut PgConnection, image: &ProductImage) -> sqlx::Result<u64> {
    let mut rows = 0;
    if image.is_default {
        rows += sqlx::query("UPDATE product_images SET is_default = FALSE WHERE product_id = $1 AND id <> $2 AND is_default")
            .bind(image.product_id).bind(image.id)
            .execute(&mut *conn).await?.rows_affected();
    }
    rows += sqlx::query("UPDATE product_images SET caption = $2, image_path = $3, file_size = $4, is_default = $5, sort_order = $6 WHERE id = $1")
        .bind(image.id).bind(&image.caption).bind(&image.image_path).bind(image.file_size)
        .bind(image.is_default).bind(image.sort_order)
        .execute(&mut *conn).await?.rows_affected();
    Ok(rows)
}

const CATEGORY_EXISTS: &str = "EXISTS (SELECT 1 FROM product_in_categories pic JOIN categories c ON c.id = pic.category_id WHERE pic.product_id = p.id";
const CATEGORY_JOIN: &str = " JOIN product_in_categories pic ON pic.product_id = p.id JOIN categories c ON c.id = pic.category_id";
const CATEGORY_LEFT_JOIN: &str = " LEFT JOIN product_in_categories pic ON pic.product_id = p.id LEFT JOIN categories c ON c.id = pic.category_id";

/// `FROM` and `WHERE` shared by the count and the page query.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ProductQuery) {
    qb.push(" FROM products p");
    let filter_categories = !query.category_ids.is_empty();
    if !query.distinct {
        if filter_categories || !query.include_uncategorized {
            qb.push(CATEGORY_JOIN);
        } else {
            qb.push(CATEGORY_LEFT_JOIN);
        }
    }
    qb.push(" WHERE TRUE");
    if let Some(keyword) = query.keyword() {
        qb.push(" AND strpos(p.name, ").push_bind(keyword.to_string()).push(") > 0");
    }
    match (query.distinct, filter_categories) {
        (true, true) => {
            qb.push(" AND ").push(CATEGORY_EXISTS).push(" AND pic.category_id = ANY(").push_bind(query.category_ids.clone()).push("))");
        }
        (true, false) if !query.include_uncategorized => {
            qb.push(" AND ").push(CATEGORY_EXISTS).push(")");
        }
        (false, true) => {
            qb.push(" AND pic.category_id = ANY(").push_bind(query.category_ids.clone()).push(")");
        }
        _ => {}
    }
}

fn count_query(query: &ProductQuery) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*)");
    push_filters(&mut qb, query);
    qb
}

fn page_query(query: &ProductQuery) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS}"));
    push_filters(&mut qb, query);
    qb.push(" ORDER BY p.id LIMIT ").push_bind(i64::from(query.page.size()))
        .push(" OFFSET ").push_bind(query.page.offset() as i64);
    qb
}

fn stock_error(err: sqlx::Error) -> CatalogError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) => ProductError::StockOutOfRange.into(),
        _ => err.into(),
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn find_product(&self, id: i32) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1"))
            .bind(id).fetch_optional(&self.pool).await?;
        Ok(product)
    }

    async fn insert_product(&self, product: NewProduct, images: Vec<NewProductImage>) -> Result<(i32, u64)> {
        let mut tx = self.pool.begin().await?;
        let (id,): (i32,) = sqlx::query_as("INSERT INTO products (price, original_price, stock, view_count, date_created, name, detail, description) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id")
            .bind(product.price).bind(product.original_price).bind(product.stock).bind(product.view_count)
            .bind(product.date_created).bind(&product.name).bind(&product.detail).bind(&product.description)
            .fetch_one(&mut *tx).await?;
        let mut rows = 1;
        for image in &images {
            rows += insert_image(&mut tx, id, image).await?;
        }
        tx.commit().await?;
        Ok((id, rows))
    }

    async fn save_product(&self, product: &Product, image: Option<ImageWrite>) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut rows = sqlx::query("UPDATE products SET name = $2, detail = $3, description = $4 WHERE id = $1")
            .bind(product.id).bind(&product.name).bind(&product.detail).bind(&product.description)
            .execute(&mut *tx).await?.rows_affected();
        match &image {
            Some(ImageWrite::Replace(existing)) => rows += update_image(&mut tx, existing).await?,
            Some(ImageWrite::Append(new)) => rows += insert_image(&mut tx, product.id, new).await?,
            None => {}
        }
        tx.commit().await?;
        Ok(rows)
    }

    async fn update_price(&self, id: i32, price: Decimal) -> Result<u64> {
        let done = sqlx::query("UPDATE products SET price = $2 WHERE id = $1").bind(id).bind(price).execute(&self.pool).await?;
        Ok(done.rows_affected())
    }

    async fn adjust_stock(&self, id: i32, quantity: i32) -> Result<Option<i32>> {
        let stock: Option<(i32,)> = sqlx::query_as("UPDATE products SET stock = stock + $2 WHERE id = $1 RETURNING stock")
            .bind(id).bind(quantity)
            .fetch_optional(&self.pool).await.map_err(stock_error)?;
        Ok(stock.map(|(stock,)| stock))
    }

    async fn increment_view_count(&self, id: i32) -> Result<u64> {
        let done = sqlx::query("UPDATE products SET view_count = view_count + 1 WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(done.rows_affected())
    }

    async fn delete_product(&self, id: i32) -> Result<u64> {
        let done = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(done.rows_affected())
    }

    async fn search_products(&self, query: &ProductQuery) -> Result<(u64, Vec<Product>)> {
        let (total,): (i64,) = count_query(query).build_query_as().fetch_one(&self.pool).await?;
        let items = page_query(query).build_query_as::<Product>().fetch_all(&self.pool).await?;
        Ok((total as u64, items))
    }

    async fn find_default_image(&self, product_id: i32) -> Result<Option<ProductImage>> {
        let image = sqlx::query_as::<_, ProductImage>(&format!("SELECT {IMAGE_COLUMNS} FROM product_images WHERE product_id = $1 AND is_default ORDER BY sort_order, id LIMIT 1"))
            .bind(product_id).fetch_optional(&self.pool).await?;
        Ok(image)
    }

    async fn list_images(&self, product_id: i32) -> Result<Vec<ProductImage>> {
        let images = sqlx::query_as::<_, ProductImage>(&format!("SELECT {IMAGE_COLUMNS} FROM product_images WHERE product_id = $1 ORDER BY sort_order, id"))
            .bind(product_id).fetch_all(&self.pool).await?;
        Ok(images)
    }

    async fn find_image(&self, image_id: i32) -> Result<Option<ProductImage>> {
        let image = sqlx::query_as::<_, ProductImage>(&format!("SELECT {IMAGE_COLUMNS} FROM product_images WHERE id = $1"))
            .bind(image_id).fetch_optional(&self.pool).await?;
        Ok(image)
    }

    async fn insert_images(&self, product_id: i32, images: Vec<NewProductImage>) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut rows = 0;
        for image in &images {
            rows += insert_image(&mut tx, product_id, image).await?;
        }
        tx.commit().await?;
        Ok(rows)
    }

    async fn save_image(&self, image: &ProductImage) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let rows = update_image(&mut tx, image).await?;
        tx.commit().await?;
        Ok(rows)
    }

    async fn delete_image(&self, image_id: i32, promote: Option<i32>) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut rows = sqlx::query("DELETE FROM product_images WHERE id = $1").bind(image_id).execute(&mut *tx).await?.rows_affected();
        if let Some(next) = promote {
            rows += sqlx::query("UPDATE product_images SET is_default = TRUE WHERE id = $1").bind(next).execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;
        Ok(rows)
    }
}
