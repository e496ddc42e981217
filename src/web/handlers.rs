use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use futures_util::{StreamExt, TryStreamExt};
use log::{error, info, warn};
use serde_json::json;
use tera::Context;

use crate::error::FormError;
use crate::triage::pipeline::run_scan;
use crate::triage::vocabulary::LOCATION_LABELS;
use crate::triage::{MAX_AGE, MIN_AGE};
use crate::web::models::ScanForm;
use crate::AppState;

fn render(data: &AppState, template: &str, context: &Context, status: StatusCode) -> HttpResponse {
    match data.tera.render(template, context) {
        Ok(html) => HttpResponse::build(status).content_type("text/html").body(html),
        Err(e) => {
            error!("Template error: {}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

fn form_context(error: Option<&str>) -> Context {
    let mut context = Context::new();
    context.insert("locations", &LOCATION_LABELS);
    context.insert("sexes", &["Male", "Female", "Other"]);
    context.insert("min_age", &MIN_AGE);
    context.insert("max_age", &MAX_AGE);
    context.insert("default_age", &30);
    context.insert("default_lifestyle", "Outdoors");
    if let Some(error) = error {
        context.insert("error", error);
    }
    context
}

/// Drain a multipart upload into a [`ScanForm`].
async fn read_form(mut payload: Multipart) -> Result<ScanForm, FormError> {
    let mut form = ScanForm::default();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| FormError::Multipart(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| FormError::Multipart(e.to_string()))?;
            data.extend_from_slice(&chunk);
        }

        if name == "file" {
            form.image = Some(data);
        } else {
            let value = String::from_utf8(data)
                .map_err(|_| FormError::Multipart(format!("field {} is not UTF-8", name)))?;
            form.set_text(&name, value);
        }
    }

    Ok(form)
}

// Index page handler
pub async fn index(data: web::Data<AppState>) -> impl Responder {
    render(&data, "index.html", &form_context(None), StatusCode::OK)
}

pub async fn about(data: web::Data<AppState>) -> impl Responder {
    render(&data, "about.html", &Context::new(), StatusCode::OK)
}

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Form submission from the index page
pub async fn scan_page(data: web::Data<AppState>, payload: Multipart) -> impl Responder {
    let input = match read_form(payload).await.and_then(ScanForm::into_input) {
        Ok(input) => input,
        Err(e) => {
            warn!("Rejected scan form: {}", e);
            let context = form_context(Some(&e.to_string()));
            return render(&data, "index.html", &context, StatusCode::BAD_REQUEST);
        }
    };

    let outcome = run_scan(&data.models, &input).await;
    info!("Scan {} rendered", outcome.scan_id);

    match Context::from_serialize(&outcome) {
        Ok(context) => render(&data, "result.html", &context, StatusCode::OK),
        Err(e) => {
            error!("Template context error: {}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

// Scan API endpoint
pub async fn scan_api(
    data: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, FormError> {
    let input = read_form(payload).await?.into_input()?;
    info!(
        "Scan request (age: {}, sex: {}, location: {:?})",
        input.age, input.sex, input.body_location
    );

    let outcome = run_scan(&data.models, &input).await;
    Ok(HttpResponse::Ok().json(outcome))
}
