pub mod mailer;

pub use mailer::{LogMailer, Mailer, MailerError};
