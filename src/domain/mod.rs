pub mod subscriber_email;
pub mod subscription;
