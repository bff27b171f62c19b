use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chapel::{api, config::Settings, service::ServiceContext};
use tower::ServiceExt;

const PASSWORD: &str = "let-me-in";
const BOUNDARY: &str = "chapel-test-boundary";

fn app() -> anyhow::Result<Router> {
    let mut settings = Settings::default();
    settings.auth.admin_password = Some(PASSWORD.to_string());

    // No pool: every store runs on its fallback list.
    let ctx = ServiceContext::from_settings(None, &settings)?;
    Ok(api::create_app(Arc::new(ctx), Arc::new(settings)))
}

async fn body_text(response: axum::response::Response) -> anyhow::Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Logs in and returns the `session=...` cookie pair.
async fn login(app: &Router) -> anyhow::Result<String> {
    let response = app
        .clone()
        .oneshot(
            Request::post("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!("password={}", PASSWORD)))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .ok_or_else(|| anyhow::anyhow!("no session cookie"))?;
    Ok(cookie.to_string())
}

/// `file` is `(field, filename, content type, bytes)`.
fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((field, filename, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, field, filename, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Posts a multipart admin form and returns the redirect target.
async fn post_form(app: &Router, cookie: &str, path: &str, body: Vec<u8>) -> anyhow::Result<String> {
    let response = app
        .clone()
        .oneshot(
            Request::post(path)
                .header(header::COOKIE, cookie)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    Ok(location(&response))
}

async fn get_json(app: &Router, path: &str) -> anyhow::Result<serde_json::Value> {
    let response = app
        .clone()
        .oneshot(Request::get(path).body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(serde_json::from_str(&body_text(response).await?)?)
}

async fn get_status(app: &Router, path: &str) -> anyhow::Result<StatusCode> {
    let response = app
        .clone()
        .oneshot(Request::get(path).body(Body::empty())?)
        .await?;
    Ok(response.status())
}

#[tokio::test]
async fn test_health_reports_fallback() -> anyhow::Result<()> {
    let response = app()?
        .oneshot(Request::get("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await?)?;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["durable_store"], false);
    Ok(())
}

#[tokio::test]
async fn test_public_pages_render() -> anyhow::Result<()> {
    let app = app()?;
    for path in ["/", "/messages", "/events", "/announcements"] {
        let response = app
            .clone()
            .oneshot(Request::get(path).body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK, "{}", path);
    }

    let response = app
        .oneshot(Request::get("/").body(Body::empty())?)
        .await?;
    assert!(body_text(response).await?.contains("database is unavailable"));
    Ok(())
}

#[tokio::test]
async fn test_blank_search_redirects_to_list() -> anyhow::Result<()> {
    let response = app()?
        .oneshot(Request::get("/messages/search?q=%20%20").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/messages");
    Ok(())
}

#[tokio::test]
async fn test_admin_requires_login() -> anyhow::Result<()> {
    let response = app()?
        .oneshot(Request::get("/admin").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");
    Ok(())
}

#[tokio::test]
async fn test_wrong_password_rejected() -> anyhow::Result<()> {
    let response = app()?
        .oneshot(
            Request::post("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("password=nope"))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/admin/login?error="));
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    Ok(())
}

#[tokio::test]
async fn test_admin_creates_message_with_pdf() -> anyhow::Result<()> {
    let app = app()?;
    let cookie = login(&app).await?;

    let dashboard = app
        .clone()
        .oneshot(
            Request::get("/admin")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(dashboard.status(), StatusCode::OK);

    let body = multipart_body(
        &[
            ("title", "Living Water"),
            ("code", "SUN-0602"),
            ("date", "2024-06-02"),
            ("author", "Pastor Jo"),
            ("description", "John 4"),
        ],
        Some(("file", "notes.pdf", "application/pdf", b"%PDF-1.4 notes")),
    );
    let response = app
        .clone()
        .oneshot(
            Request::post("/admin/messages")
                .header(header::COOKIE, &cookie)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/admin?success="));

    let response = app
        .clone()
        .oneshot(Request::get("/messages-data").body(Body::empty())?)
        .await?;
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await?)?;
    assert_eq!(json[0]["title"], "Living Water");
    let id = json[0]["id"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("message id missing"))?
        .to_string();

    let response = app
        .oneshot(Request::get(format!("/messages/{}/file", id)).body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("application/pdf")
    );
    assert_eq!(body_text(response).await?, "%PDF-1.4 notes");
    Ok(())
}

#[tokio::test]
async fn test_rejects_non_pdf_message_file() -> anyhow::Result<()> {
    let app = app()?;
    let cookie = login(&app).await?;

    let body = multipart_body(
        &[
            ("title", "Wrong file"),
            ("code", "SUN-0609"),
            ("date", "2024-06-09"),
            ("author", "Pastor Jo"),
            ("description", "Oops"),
        ],
        Some(("file", "photo.png", "image/png", b"\x89PNG")),
    );
    let response = app
        .clone()
        .oneshot(
            Request::post("/admin/messages")
                .header(header::COOKIE, &cookie)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/admin/messages/new?error="));

    let response = app
        .oneshot(Request::get("/messages-data").body(Body::empty())?)
        .await?;
    assert_eq!(body_text(response).await?, "[]");
    Ok(())
}

#[tokio::test]
async fn test_missing_attachment_is_not_found() -> anyhow::Result<()> {
    let response = app()?
        .oneshot(
            Request::get(format!("/events/{}/image", uuid::Uuid::new_v4())).body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_admin_event_create_and_edit() -> anyhow::Result<()> {
    let app = app()?;
    let cookie = login(&app).await?;

    // "featured" is left out, so it reads as unchecked.
    let created = post_form(
        &app,
        &cookie,
        "/admin/events",
        multipart_body(
            &[
                ("title", "Picnic"),
                ("date", "2030-06-02T10:30"),
                ("end_date", ""),
                ("venue", "Riverside Park"),
                ("description", "Bring a blanket"),
                ("link", ""),
                ("category", ""),
                ("active", "on"),
            ],
            Some(("image", "picnic.png", "image/png", b"\x89PNG picnic")),
        ),
    )
    .await?;
    assert!(created.starts_with("/admin?success="), "{}", created);

    let json = get_json(&app, "/events-data").await?;
    let event = &json[0];
    assert_eq!(event["title"], "Picnic");
    assert_eq!(event["date"], "2030-06-02T10:30:00");
    assert_eq!(event["end_date"], serde_json::Value::Null);
    assert_eq!(event["category"], "general");
    assert_eq!(event["featured"], false);
    assert_eq!(event["active"], true);
    assert_eq!(event["status"], "upcoming");
    assert_eq!(event["image"]["filename"], "picnic.png");
    let id = event["id"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("event id missing"))?
        .to_string();
    assert_eq!(get_status(&app, &format!("/events/{}/image", id)).await?, StatusCode::OK);

    // "active" is left out this time, and the image is dropped.
    let updated = post_form(
        &app,
        &cookie,
        &format!("/admin/events/{}", id),
        multipart_body(
            &[
                ("title", "Picnic (moved)"),
                ("date", "2030-06-09T10:30"),
                ("end_date", "2030-06-09T15:00"),
                ("venue", "Church lawn"),
                ("description", "Bring a blanket"),
                ("link", "https://example.org/picnic"),
                ("category", "outreach"),
                ("featured", "on"),
                ("remove_image", "on"),
            ],
            None,
        ),
    )
    .await?;
    assert!(updated.starts_with("/admin?success="), "{}", updated);

    let json = get_json(&app, "/events-data").await?;
    let event = &json[0];
    assert_eq!(event["title"], "Picnic (moved)");
    assert_eq!(event["end_date"], "2030-06-09T15:00:00");
    assert_eq!(event["link"], "https://example.org/picnic");
    assert_eq!(event["category"], "outreach");
    assert_eq!(event["featured"], true);
    assert_eq!(event["active"], false);
    assert_eq!(event["image"], serde_json::Value::Null);
    assert_eq!(
        get_status(&app, &format!("/events/{}/image", id)).await?,
        StatusCode::NOT_FOUND
    );

    // Inactive events drop off the public page.
    let page = app
        .clone()
        .oneshot(Request::get("/events").body(Body::empty())?)
        .await?;
    assert!(!body_text(page).await?.contains("Picnic (moved)"));
    Ok(())
}

#[tokio::test]
async fn test_admin_announcement_create_and_edit() -> anyhow::Result<()> {
    let app = app()?;
    let cookie = login(&app).await?;

    let created = post_form(
        &app,
        &cookie,
        "/admin/announcements",
        multipart_body(
            &[
                ("title", "Potluck"),
                ("content", "Bring a dish to share"),
                ("type", "banner"),
                ("priority", "3"),
                ("display_order", "2"),
                ("background_color", "#ffeecc"),
                ("text_color", "#333"),
                ("expires_at", "2099-01-01T10:00"),
                ("featured", "on"),
                ("active", "on"),
            ],
            None,
        ),
    )
    .await?;
    assert!(created.starts_with("/admin?success="), "{}", created);

    let json = get_json(&app, "/announcements-data").await?;
    let announcement = &json[0];
    assert_eq!(announcement["type"], "banner");
    assert_eq!(announcement["priority"], 3);
    assert_eq!(announcement["display_order"], 2);
    assert_eq!(announcement["background_color"], "#ffeecc");
    assert_eq!(announcement["expires_at"], "2099-01-01T10:00:00Z");
    assert_eq!(announcement["featured"], true);
    assert_eq!(announcement["active"], true);
    let id = announcement["id"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("announcement id missing"))?
        .to_string();

    // An unreadable expiry goes back to the edit form.
    let rejected = post_form(
        &app,
        &cookie,
        &format!("/admin/announcements/{}", id),
        multipart_body(
            &[
                ("title", "Potluck"),
                ("content", "Bring a dish to share"),
                ("expires_at", "next sunday"),
                ("active", "on"),
            ],
            None,
        ),
    )
    .await?;
    assert!(
        rejected.starts_with(&format!("/admin/announcements/{}/edit?error=", id)),
        "{}",
        rejected
    );

    // Blank expiry clears it; missing checkboxes read as unchecked.
    let updated = post_form(
        &app,
        &cookie,
        &format!("/admin/announcements/{}", id),
        multipart_body(
            &[
                ("title", "Potluck Sunday"),
                ("content", "Bring a dish to share"),
                ("type", "sticker"),
                ("priority", "5"),
                ("expires_at", ""),
            ],
            None,
        ),
    )
    .await?;
    assert!(updated.starts_with("/admin?success="), "{}", updated);

    let json = get_json(&app, "/announcements-data").await?;
    let announcement = &json[0];
    assert_eq!(announcement["title"], "Potluck Sunday");
    assert_eq!(announcement["type"], "sticker");
    assert_eq!(announcement["priority"], 5);
    assert_eq!(announcement["expires_at"], serde_json::Value::Null);
    assert_eq!(announcement["featured"], false);
    assert_eq!(announcement["active"], false);
    Ok(())
}
