pub mod email_subscribe;
pub mod health;
