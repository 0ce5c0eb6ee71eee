use crate::{envelope::Envelope, handler::UserHandler};
use actix_web::{error, web, Error, HttpRequest, HttpResponse};

pub fn init(cfg: &mut web::ServiceConfig) {
	// every method lands here; the handler decides what OPTIONS and the rest mean
	cfg.service(web::resource(["/", "/auth"]).to(handle_envelope));
}

pub async fn handle_envelope(
	handler: web::Data<UserHandler>,
	req: HttpRequest,
	body: web::Bytes,
) -> Result<HttpResponse, Error> {
	let envelope = Envelope::from_http(&req, &body);
	let handler = handler.into_inner();
	let reply = web::block(move || handler.handle(envelope)).await.map_err(|e| {
		log::error!("Blocking handler task failed: {:?}", e);
		error::ErrorInternalServerError("internal server error")
	})?;
	Ok(reply.into_http_response())
}
