use crate::error::WorkflowError;
use crate::handlers::Workflow;
use crate::handlers::confirm::ConfirmReceipt;
use crate::models::credential::{CodeRequest, TokenQuery};
use crate::models::response::ApiResponse;
use actix_web::{HttpResponse, get, post, web};
use chrono::Local;

fn confirmed(receipt: ConfirmReceipt) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(format!(
        "Thank you, {}. Your cancellation was confirmed on {}.",
        receipt.submission.first_name,
        receipt.confirmed_at.with_timezone(&Local).format("%d.%m.%Y")
    )))
}

#[get("/verify")]
async fn verify_token(
    workflow: web::Data<Workflow>,
    query: web::Query<TokenQuery>,
) -> Result<HttpResponse, WorkflowError> {
    let receipt = workflow.confirm(query.into_inner().into()).await?;
    Ok(confirmed(receipt))
}

#[post("/verify-code")]
async fn verify_code(
    workflow: web::Data<Workflow>,
    body: web::Json<CodeRequest>,
) -> Result<HttpResponse, WorkflowError> {
    let receipt = workflow.confirm(body.into_inner().into()).await?;
    Ok(confirmed(receipt))
}

pub fn init(cfg: &mut web::ServiceConfig) {
    cfg.service(verify_token).service(verify_code);
}
