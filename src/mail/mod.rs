pub mod notification;
pub mod send_email;
pub mod templates;
