use tower_cookies::{Cookie, Cookies};

pub const WAREHOUSE_COOKIE: &str = "warehouse-id";
pub const DEFAULT_WAREHOUSE_ID: i32 = 1;

/// Warehouse the dashboard is currently looking at.
pub fn current_warehouse(cookies: &Cookies) -> i32 {
    cookies
        .get(WAREHOUSE_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
        .unwrap_or(DEFAULT_WAREHOUSE_ID)
}

pub fn select_warehouse(cookies: &Cookies, warehouse_id: i32) {
    let cookie = Cookie::build((WAREHOUSE_COOKIE, warehouse_id.to_string()))
        .path("/")
        .max_age(time::Duration::days(365))
        .build();

    cookies.add(cookie);
}
