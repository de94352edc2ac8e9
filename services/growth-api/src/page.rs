//! Form page embedded in the CRM.

use axum::response::Html;

/// Report submission form; posts to `/process`.
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Growth Charts</title>
    <style>
        body { font-family: sans-serif; margin: 2rem; color: #222; }
        form { display: grid; gap: 0.75rem; max-width: 28rem; }
        input { padding: 0.4rem; }
        button { padding: 0.5rem; width: 10rem; }
    </style>
</head>
<body>
    <h1>Growth Charts</h1>
    <form method="post" action="/process">
        <label for="link">Report link</label>
        <input id="link" name="link" type="url" required>
        <label for="rpa_id">RPA item ID</label>
        <input id="rpa_id" name="rpa_id" type="text" required>
        <button type="submit">Process</button>
    </form>
</body>
</html>"#;

/// GET|POST / - Serve the submission form
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
