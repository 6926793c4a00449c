//! The user's profile and preferences.

mod page;
mod preferences;

pub use page::{get_settings_page, update_preferences_endpoint, update_profile_endpoint};
pub use preferences::{
    Currency, UserPreferences, create_preferences_table, get_currency, get_preferences,
    save_preferences,
};
