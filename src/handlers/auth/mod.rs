pub mod login;
pub mod register;
pub mod session;
pub mod utils;

pub use login::login;
pub use register::register;
pub use session::{logout, me};
