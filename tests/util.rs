#![allow(unused)]

use actix_http::{body::MessageBody, Method, Request};
use actix_web::{
    dev::{Service as WebService, ServiceResponse},
    test::{call_service, read_body_json, TestRequest},
};
use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use ticketbox::{setting::Setting, AppState};

static DB_SEQ: AtomicUsize = AtomicUsize::new(0);

pub async fn create_test_state() -> Result<AppState> {
    let mut setting = Setting::default();
    // named shared-cache memory db, private per test but shared by the pool
    setting.db_url = format!(
        "sqlite:file:testdb{}?mode=memory&cache=shared",
        DB_SEQ.fetch_add(1, Ordering::Relaxed)
    );
    setting.chain.enabled = false;
    let state = AppState::from_setting(setting).await?;
    Migrator::fresh(state.service.db()).await?;
    Ok(state)
}

pub fn get_req(path: &str) -> TestRequest {
    TestRequest::with_uri(path)
}

pub fn post_req(path: &str, data: Value) -> TestRequest {
    TestRequest::with_uri(path)
        .method(Method::POST)
        .set_json(data)
}

pub fn put_req(path: &str, data: Value) -> TestRequest {
    TestRequest::with_uri(path)
        .method(Method::PUT)
        .set_json(data)
}

pub fn delete_req(path: &str) -> TestRequest {
    TestRequest::with_uri(path).method(Method::DELETE)
}

pub async fn call<S, B>(req: TestRequest, app: &S) -> Result<(Value, u16)>
where
    S: WebService<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = call_service(app, req.to_request()).await;
    let status = res.status().as_u16();
    let val = read_body_json::<Value, _>(res).await;
    Ok((val, status))
}
