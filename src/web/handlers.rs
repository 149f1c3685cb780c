use actix_web::{web, HttpResponse, Responder};
use log::info;

use crate::error::TalkError;
use crate::web::models::{StatusReply, TalkInput, TalkReply};
use crate::AppState;

pub const ENDPOINT: &str = "/api/talk";

/// Largest POST body accepted (4.5 MB).
pub const MAX_BODY_BYTES: usize = 4_500_000;

// CORS preflight
pub async fn preflight() -> impl Responder {
    HttpResponse::NoContent().finish()
}

pub async fn status() -> impl Responder {
    HttpResponse::Ok().json(StatusReply {
        ok: true,
        endpoint: ENDPOINT.to_string(),
        expect: "POST".to_string(),
    })
}

pub async fn method_not_allowed() -> Result<HttpResponse, TalkError> {
    Err(TalkError::MethodNotAllowed)
}

// Talk endpoint: normalise the body, forward it, relay the reply
pub async fn talk(
    data: web::Data<AppState>,
    payload: web::Payload,
) -> Result<HttpResponse, TalkError> {
    let api_key = data
        .config
        .api_key
        .as_deref()
        .ok_or(TalkError::MissingApiKey)?;

    let body = match payload.to_bytes_limited(MAX_BODY_BYTES).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => return Err(TalkError::Internal(e.to_string())),
        Err(_) => {
            return Err(TalkError::PayloadTooLarge {
                limit: MAX_BODY_BYTES,
            })
        }
    };

    let input = TalkInput::parse(&body);
    let request = match input.completion_request()? {
        Some(request) => request,
        None => return Err(TalkError::NoInput { received: input.body }),
    };

    info!(
        "Talk request (personality: {}, model: {}, {} messages)",
        input.personality.tag().unwrap_or("default"),
        request.model,
        request.messages.len()
    );

    let reply = data.client.complete(api_key, &request).await?;

    Ok(HttpResponse::Ok().json(TalkReply {
        reply,
        model: request.model,
    }))
}
