use crate::error::WorkflowError;
use crate::handlers::Workflow;
use crate::models::credential::CredentialKind;
use crate::models::response::ApiResponse;
use crate::models::submission::SubmissionForm;
use actix_web::{HttpResponse, post, web};
use chrono::Local;

#[post("/submit")]
async fn submit(
    workflow: web::Data<Workflow>,
    form: web::Json<SubmissionForm>,
) -> Result<HttpResponse, WorkflowError> {
    let receipt = workflow.intake(form.into_inner()).await?;

    let deadline = receipt.expires_at.with_timezone(&Local).format("%H:%M");
    let message = match receipt.kind {
        CredentialKind::Token => format!(
            "Confirmation email sent. Please open the link in the email before {}.",
            deadline
        ),
        CredentialKind::Code => format!(
            "Confirmation code sent. Please enter it before {}.",
            deadline
        ),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::ok(message)))
}

pub fn init(cfg: &mut web::ServiceConfig) {
    cfg.service(submit);
}
