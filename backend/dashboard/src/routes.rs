use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use records::store::DocumentStore;
use tracing::info;

use crate::{
    cache::QueryKey,
    error::AppError,
    html,
    pages::{self, Page, View},
    state::AppState,
};

pub async fn index_handler() -> Redirect {
    Redirect::to("/about")
}

pub async fn page_handler<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(page): Path<String>,
) -> Result<Html<String>, AppError> {
    let page: Page = page.parse().map_err(AppError::PageNotFound)?;
    info!("Rendering {page}");

    Ok(Html(html::render(&build_view(&state, page).await)))
}

pub async fn build_view<S: DocumentStore>(state: &AppState<S>, page: Page) -> View {
    match page {
        Page::About => pages::about(),
        Page::Overview => pages::overview(
            &state.products().await,
            &state.customers().await,
            &state.orders().await,
            &state.reviews().await,
            &state.sales_by_state().await,
            &state.category_stats().await,
        ),
        Page::Products => pages::products(&state.products().await, &state.category_stats().await),
        Page::Customers => pages::customers(&state.customers().await),
        Page::Orders => pages::orders(&state.orders().await, &state.sales_by_state().await),
        Page::Reviews => pages::reviews(&state.reviews().await, &state.top_products().await),
    }
}

pub async fn refresh_all_handler<S: DocumentStore>(State(state): State<Arc<AppState<S>>>) -> impl IntoResponse {
    state.refresh(None).await;

    (StatusCode::OK, "Cleared all cached queries").into_response()
}

pub async fn refresh_query_handler<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(query): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key: QueryKey = query.parse().map_err(AppError::UnknownQuery)?;
    state.refresh(Some(key)).await;

    Ok((StatusCode::OK, format!("Cleared cached {key}")))
}
