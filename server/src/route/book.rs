use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::request::{
    BookRequest, BookTransformer, DeleteBookRequest, GetBookRequest, PatchBookRequest,
    PurchaseBookRequest, SearchBookRequest, StockRequest,
};
use crate::response::{BookPresenter, CreatedBookPresenter, DeletedBookResponse};
use application::service::{
    DeleteBookService, GetBookService, PurchaseBookService, SaveBookService, UpdateBookService,
};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use error_stack::Report;
use kernel::KernelError;

pub trait BookRouter {
    fn route_book(self) -> Self;
}

impl BookRouter for Router<AppModule> {
    fn route_book(self) -> Self {
        self.route(
            "/books",
            get(|State(module): State<AppModule>| async move {
                Controller::new((), BookPresenter)
                    .bypass(|| async move { module.database().get_all_books().await })
                    .await
                    .map_err(ErrorStatus::from)
            })
            .post(
                |State(module): State<AppModule>, Json(req): Json<BookRequest>| async move {
                    Controller::new(BookTransformer, CreatedBookPresenter)
                        .intake(req)
                        .handle(|dto| async move { module.database().create_book(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/books/search",
            get(
                |State(module): State<AppModule>, Query(req): Query<SearchBookRequest>| async move {
                    Controller::new(BookTransformer, BookPresenter)
                        .intake(req)
                        .handle(|dto| async move { module.database().search_books(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/books/:isbn",
            get(
                |State(module): State<AppModule>, Path(isbn): Path<i32>| async move {
                    Controller::new(BookTransformer, BookPresenter)
                        .intake(GetBookRequest::new(isbn))
                        .handle(|dto| async move { module.database().get_book(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                        .and_then(|res| {
                            res.ok_or_else(|| {
                                ErrorStatus::from(Report::new(KernelError::not_found(isbn)))
                            })
                        })
                },
            )
            .put(
                |State(module): State<AppModule>,
                 Path(isbn): Path<i32>,
                 Json(req): Json<BookRequest>| async move {
                    Controller::new(BookTransformer, BookPresenter)
                        .intake((isbn, req))
                        .handle(|dto| async move { module.database().update_book(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .patch(
                |State(module): State<AppModule>,
                 Path(isbn): Path<i32>,
                 Json(req): Json<PatchBookRequest>| async move {
                    Controller::new(BookTransformer, BookPresenter)
                        .intake((isbn, req))
                        .handle(|dto| async move { module.database().patch_book(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .delete(
                |State(module): State<AppModule>, Path(isbn): Path<i32>| async move {
                    Controller::new(BookTransformer, BookPresenter)
                        .intake(DeleteBookRequest::new(isbn))
                        .handle(|dto| async move { module.database().delete_book(dto).await })
                        .await
                        .map(|()| DeletedBookResponse::new(isbn))
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/books/:isbn/stock",
            get(
                |State(module): State<AppModule>, Path(isbn): Path<i32>| async move {
                    Controller::new(BookTransformer, BookPresenter)
                        .intake(StockRequest::new(isbn))
                        .handle(|dto| async move { module.database().check_stock(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/purchase/:isbn",
            post(
                |State(module): State<AppModule>,
                 Path(isbn): Path<i32>,
                 Query(req): Query<PurchaseBookRequest>| async move {
                    Controller::new(BookTransformer, BookPresenter)
                        .intake((isbn, req))
                        .handle(|dto| async move { module.database().purchase_book(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
