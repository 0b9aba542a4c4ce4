use std::sync::Arc;

use axum::{
    extract::{
        rejection::{FormRejection, PathRejection, QueryRejection},
        Extension, Form, Path, Query,
    },
    response::{Html, Redirect},
    routing::get,
    Router,
};
use minijinja::context;

use farmstand_core::ProductId;
use farmstand_products::Category;

use crate::app::dto::{ListFilter, ListQuery, ProductForm, ProductView};
use crate::app::errors::AppError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/new", get(new_product_form))
        .route(
            "/:id",
            get(show_product).put(update_product).delete(delete_product),
        )
        .route("/:id/edit", get(edit_product_form))
}

fn parse_id(path: Result<Path<String>, PathRejection>) -> Result<ProductId, AppError> {
    let Path(id) = path?;
    Ok(id.parse::<ProductId>()?)
}

fn product_url(id: ProductId) -> String {
    format!("/products/{id}")
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Html<String>, AppError> {
    let Query(query) = query?;
    let filter = query.filter();

    let products = match &filter {
        ListFilter::All => services.store().list(None).await?,
        ListFilter::Category(category) => services.store().list(Some(*category)).await?,
        ListFilter::Unmatched(raw) => {
            tracing::debug!(category = %raw, "unknown category filter");
            Vec::new()
        }
    };
    let products = products.iter().map(ProductView::from).collect::<Vec<_>>();
    let label = filter.label();

    services
        .views()
        .render("products/index.html", context! { products => products, category => label })
}

pub async fn new_product_form(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Html<String>, AppError> {
    services
        .views()
        .render("products/new.html", context! { categories => Category::ALL })
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    form: Result<Form<ProductForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let Form(form) = form?;
    let fields = form.into_new_product()?;

    let product = services.store().create(fields).await?;
    tracing::info!(product_id = %product.id(), "product created");

    Ok(Redirect::to(&product_url(product.id())))
}

pub async fn show_product(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Html<String>, AppError> {
    let id = parse_id(path)?;
    let product = services
        .store()
        .get_by_id(&id)
        .await?
        .ok_or_else(AppError::product_not_found)?;

    services.views().render(
        "products/show.html",
        context! { product => ProductView::from(&product) },
    )
}

pub async fn edit_product_form(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Html<String>, AppError> {
    let id = parse_id(path)?;
    let product = services
        .store()
        .get_by_id(&id)
        .await?
        .ok_or_else(AppError::product_not_found)?;

    services.views().render(
        "products/edit.html",
        context! { product => ProductView::from(&product), categories => Category::ALL },
    )
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
    form: Result<Form<ProductForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let id = parse_id(path)?;
    let Form(form) = form?;
    let patch = form.into_patch()?;

    let product = services
        .store()
        .update_by_id(&id, patch)
        .await?
        .ok_or_else(AppError::product_not_found)?;
    tracing::info!(product_id = %product.id(), "product updated");

    Ok(Redirect::to(&product_url(product.id())))
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Redirect, AppError> {
    let id = parse_id(path)?;
    let removed = services.store().delete_by_id(&id).await?;
    tracing::info!(product_id = %id, removed, "product deleted");

    Ok(Redirect::to("/products"))
}
