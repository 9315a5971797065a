//! HTTP routes.
//!
//! Every page of the sales app is a JSON endpoint:
//!
//! - `GET` on a form path returns what the form needs (blank form, current
//!   record, search results or a removal confirmation).
//! - `POST` on the same path commits. Success answers with the record and a
//!   notice. A rejected submission answers 422 with an error notice and the
//!   submitted form echoed back.
//! - Unknown ids answer 404 with an `application/problem+json` body.

use crate::api_error::{ApiError, ApiResult};
use crate::backend::InMemoryStore;
use crate::config::PageSizes;
use crate::error::Error;
use crate::forms::{CustomerForm, ProductForm, SaleForm};
use crate::notice::Notice;
use crate::pagination::Paginator;
use crate::service::SalesService;
use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub service: SalesService<InMemoryStore>,
    pub pages: PageSizes,
}

impl AppState {
    pub fn new(service: SalesService<InMemoryStore>, pages: PageSizes) -> Self {
        AppState { service, pages }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub buscar_cliente: String,
    pub buscar_producto: String,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/clientes/", get(list_customers))
        .route("/clientes/crear/", get(new_customer).post(create_customer))
        .route("/clientes/editar/{id}/", get(show_customer).post(update_customer))
        .route("/clientes/eliminar/{id}/", get(confirm_remove_customer).post(remove_customer))
        .route("/clientes/inactivos/", get(list_inactive_customers))
        .route("/productos/", get(list_products))
        .route("/productos/crear/", get(new_product).post(create_product))
        .route("/productos/editar/{id}/", get(show_product).post(update_product))
        .route("/productos/eliminar/{id}/", get(confirm_remove_product).post(remove_product))
        .route("/productos/inactivos/", get(list_inactive_products))
        .route("/ventas/", get(list_sales))
        .route("/ventas/crear/", get(new_sale).post(create_sale))
        .route("/ventas/editar/{id}/", get(edit_sale_form).post(edit_sale))
        .route("/ventas/eliminar/{id}/", get(confirm_void_sale).post(void_sale))
        .route("/ventas/anuladas/", get(list_voided_sales))
        .with_state(state)
}

// ============================================================================
// Shared responses
// ============================================================================

/// Success body: the committed record and a notice.
fn committed<T: Serialize>(status: StatusCode, notice: Notice, record: T) -> Response {
    (status, Json(json!({ "notice": notice, "record": record }))).into_response()
}

/// Turn a validation failure into a 422 that echoes the form; anything else
/// becomes an [`ApiError`].
fn rejected<F: Serialize>(err: Error, form: F) -> ApiResult<Response> {
    match err {
        Error::Validation(message) => {
            warn!("Submission rejected: {}", message);
            let body = json!({ "notice": Notice::error(message), "form": form });
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response())
        }
        other => Err(other.into()),
    }
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": crate::VERSION,
    }))
}

async fn health(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let healthy = state.service.health_check().await?;
    Ok(Json(json!({ "status": if healthy { "healthy" } else { "unhealthy" } })))
}

// ============================================================================
// Customers
// ============================================================================

async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Response> {
    let customers = state.service.customers().list_active().await?;
    let page = Paginator::new(state.pages.customers).page(customers, query.page.as_deref());
    Ok(Json(page).into_response())
}

async fn list_inactive_customers(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Response> {
    let customers = state.service.customers().list_inactive().await?;
    let page = Paginator::new(state.pages.customers).page(customers, query.page.as_deref());
    Ok(Json(page).into_response())
}

async fn new_customer() -> Json<serde_json::Value> {
    Json(json!({ "form": CustomerForm::default() }))
}

async fn create_customer(
    State(state): State<AppState>,
    Form(form): Form<CustomerForm>,
) -> ApiResult<Response> {
    match state.service.customers().create(form.clone().into_fields()).await {
        Ok(customer) => Ok(committed(
            StatusCode::CREATED,
            Notice::success("Customer created successfully."),
            customer,
        )),
        Err(err) => rejected(err, form),
    }
}

async fn show_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let customer = state.service.customers().get(id).await?;
    Ok(Json(json!({
        "form": CustomerForm::from(&customer),
        "record": customer,
    })))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<CustomerForm>,
) -> ApiResult<Response> {
    state.service.customers().get(id).await?;

    match state.service.customers().update(id, form.clone().into_fields()).await {
        Ok(customer) => Ok(committed(
            StatusCode::OK,
            Notice::success("Customer updated successfully."),
            customer,
        )),
        Err(err) => rejected(err, form),
    }
}

async fn confirm_remove_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let customers = state.service.customers();
    let customer = customers.get(id).await?;
    let has_sales = customers.has_sales(id).await?;
    Ok(Json(json!({ "record": customer, "has_sales": has_sales })))
}

async fn remove_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let outcome = state.service.customers().remove(id).await?;
    Ok(Json(json!({
        "notice": outcome.notice("Customer"),
        "outcome": outcome,
    })))
}

// ============================================================================
// Products
// ============================================================================

async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Response> {
    let products = state.service.products().list_active().await?;
    let page = Paginator::new(state.pages.products).page(products, query.page.as_deref());
    Ok(Json(page).into_response())
}

async fn list_inactive_products(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Response> {
    let products = state.service.products().list_inactive().await?;
    let page = Paginator::new(state.pages.products).page(products, query.page.as_deref());
    Ok(Json(page).into_response())
}

async fn new_product() -> Json<serde_json::Value> {
    Json(json!({ "form": ProductForm::default() }))
}

async fn create_product(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> ApiResult<Response> {
    let fields = match form.clone().into_fields() {
        Ok(fields) => fields,
        Err(err) => return rejected(err, form),
    };

    match state.service.products().create(fields).await {
        Ok(product) => Ok(committed(
            StatusCode::CREATED,
            Notice::success("Product created successfully."),
            product,
        )),
        Err(err) => rejected(err, form),
    }
}

async fn show_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let product = state.service.products().get(id).await?;
    Ok(Json(json!({
        "form": ProductForm::from(&product),
        "record": product,
    })))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ProductForm>,
) -> ApiResult<Response> {
    state.service.products().get(id).await?;

    let fields = match form.clone().into_fields() {
        Ok(fields) => fields,
        Err(err) => return rejected(err, form),
    };

    match state.service.products().update(id, fields).await {
        Ok(product) => Ok(committed(
            StatusCode::OK,
            Notice::success("Product updated successfully."),
            product,
        )),
        Err(err) => rejected(err, form),
    }
}

async fn confirm_remove_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let products = state.service.products();
    let product = products.get(id).await?;
    let was_sold = products.was_sold(id).await?;
    Ok(Json(json!({ "record": product, "was_sold": was_sold })))
}

async fn remove_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let outcome = state.service.products().remove(id).await?;
    Ok(Json(json!({
        "notice": outcome.notice("Product"),
        "outcome": outcome,
    })))
}

// ============================================================================
// Sales
// ============================================================================

async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Response> {
    let sales = state.service.sales().list_active().await?;
    let page = Paginator::new(state.pages.sales).page(sales, query.page.as_deref());
    Ok(Json(page).into_response())
}

async fn list_voided_sales(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Response> {
    let sales = state.service.sales().list_voided().await?;
    let page = Paginator::new(state.pages.sales).page(sales, query.page.as_deref());
    Ok(Json(page).into_response())
}

async fn new_sale(
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let results = state
        .service
        .sales()
        .search_form(&search.buscar_cliente, &search.buscar_producto)
        .await?;

    Ok(Json(json!({
        "customers": results.customers,
        "products": results.products,
        "form": SaleForm::default(),
    })))
}

async fn create_sale(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ApiResult<Response> {
    let form = SaleForm::from_pairs(pairs);
    let request = match form.to_request() {
        Ok(request) => request,
        Err(err) => return rejected(err, form),
    };

    match state.service.sales().create(request).await {
        Ok(sale) => Ok(committed(
            StatusCode::CREATED,
            Notice::success("Sale recorded successfully."),
            sale,
        )),
        Err(err) => rejected(err, form),
    }
}

async fn edit_sale_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(search): Query<SearchQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let edit = state
        .service
        .sales()
        .edit_form(id, &search.buscar_cliente, &search.buscar_producto)
        .await?;

    let form = SaleForm::prefill(edit.sale.sale.customer_id, &edit.previous_quantities);
    Ok(Json(json!({
        "sale": edit.sale,
        "customers": edit.customers,
        "products": edit.products,
        "previous_quantities": edit.previous_quantities,
        "form": form,
    })))
}

async fn edit_sale(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ApiResult<Response> {
    state.service.sales().get(id).await?;

    let form = SaleForm::from_pairs(pairs);
    let request = match form.to_request() {
        Ok(request) => request,
        Err(err) => return rejected(err, form),
    };

    match state.service.sales().edit(id, request).await {
        Ok(sale) => Ok(committed(
            StatusCode::OK,
            Notice::success("Sale updated successfully."),
            sale,
        )),
        Err(err) => rejected(err, form),
    }
}

async fn confirm_void_sale(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let sale = state.service.sales().get(id).await?;
    Ok(Json(json!({ "sale": sale })))
}

async fn void_sale(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let sale = state.service.sales().void(id).await?;
    Ok(committed(
        StatusCode::OK,
        Notice::success("Sale marked as voided."),
        sale,
    ))
}
