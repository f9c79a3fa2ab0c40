// src/utils/notice.rs

use axum::response::Redirect;
use url::form_urlencoded;

/// Landing page for flows that end in a notice.
pub const HOME_PATH: &str = "/api/home";

/// Builds `/api/home?notice=...&level=danger`.
pub fn error_location(message: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("notice", message)
        .append_pair("level", "danger")
        .finish();
    format!("{}?{}", HOME_PATH, query)
}

/// `303 See Other` to the home feed carrying an error notice.
pub fn redirect_home_with_error(message: &str) -> Redirect {
    Redirect::to(&error_location(message))
}
