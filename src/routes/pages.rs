use axum::response::Html;

pub async fn register_page() -> Html<&'static str> {
    Html(include_str!("../../web/register.html"))
}
