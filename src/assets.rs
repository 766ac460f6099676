pub(crate) async fn stylesheet() -> axum::response::Response {
    const CSS_CONTENT: &str = include_str!("../static/style.css");
    axum::response::Response::builder()
        .status(200)
        .header("content-type", "text/css")
        .header("cache-control", "public, max-age=3600")
        .body(CSS_CONTENT.into())
        .unwrap()
}

pub(crate) async fn map_script() -> axum::response::Response {
    const MAP_JS_CONTENT: &str = include_str!("../static/map.js");
    axum::response::Response::builder()
        .status(200)
        .header("content-type", "application/javascript")
        .header("cache-control", "public, max-age=3600")
        .body(MAP_JS_CONTENT.into())
        .unwrap()
}

pub(crate) async fn app_script() -> axum::response::Response {
    const APP_JS_CONTENT: &str = include_str!("../static/app.js");
    axum::response::Response::builder()
        .status(200)
        .header("content-type", "application/javascript")
        .header("cache-control", "public, max-age=3600")
        .body(APP_JS_CONTENT.into())
        .unwrap()
}
