//! User accounts, sessions and the pages for logging in and out, registering
//! and resetting a forgotten password.

mod cookie;
mod email;
mod forgot_password;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod password_reset;
mod redirect;
mod register_user;
mod reset_password;
mod token;
mod user;

pub use cookie::{
    DEFAULT_COOKIE_DURATION, REMEMBER_ME_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie,
};
pub use email::Email;
pub use forgot_password::{get_forgot_password_page, post_forgot_password};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use password_reset::create_password_reset_table;
pub use redirect::normalize_redirect_url;
pub use register_user::{confirm_password_input, get_register_page, register_user};
pub use reset_password::{get_reset_password_page, post_reset_password};
pub(super) use token::Token;
pub use user::{
    User, UserID, create_user, create_user_table, get_user_by_email, get_user_by_id,
    update_password, update_user_profile,
};

pub(super) use password_reset::{
    create_reset_token, delete_reset_tokens, get_user_id_for_reset_token,
};

#[cfg(test)]
pub use cookie::COOKIE_TOKEN;
