use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::mail::notification::NotificationProvider;
use crate::routes::email_subscribe::email_subscribe;
use crate::routes::health::health_check;

pub const EMAIL_SUBSCRIBE_PATH: &str = "/store/email-subscribe";

pub fn run(
    listener: TcpListener,
    notifications: NotificationProvider,
) -> Result<Server, std::io::Error> {
    let notifications = web::Data::new(notifications);
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health", web::get().to(health_check))
            .route(EMAIL_SUBSCRIBE_PATH, web::post().to(email_subscribe))
            .app_data(notifications.clone())
    })
    .listen(listener)?
    .run())
}
