use axum::response::Html;

// --- Navigation ---

/// NavItem
///
/// One sidebar entry. The entry whose `href` equals the current path is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub href: &'static str,
    pub text: &'static str,
}

pub const NAV_ITEMS: &[NavItem] = &[
    NavItem { href: "/", text: "Cover Letter" },
    NavItem { href: "/skills", text: "Skills" },
    NavItem { href: "/experience", text: "Experience" },
    NavItem { href: "/upload-cv", text: "Upload CV" },
];

/// Index of the active sidebar entry for `path`, if any.
pub fn active_nav_item(path: &str) -> Option<usize> {
    NAV_ITEMS.iter().position(|item| item.href == path)
}

/// render_page
///
/// Wraps page content in the shared shell: sidebar navigation plus a `main`
/// element. Presentation is intentionally bare; the forms themselves are
/// driven client-side.
pub fn render_page(path: &str, title: &str, body: &str) -> Html<String> {
    let active = active_nav_item(path);
    let nav = NAV_ITEMS
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let class = if Some(index) == active { " class=\"active\"" } else { "" };
            format!("<a href=\"{}\"{}>{}</a>", item.href, class, item.text)
        })
        .collect::<Vec<_>>()
        .join("");

    Html(format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{title}</title>\
         <link rel=\"stylesheet\" href=\"/static/app.css\"></head>\
         <body><nav>{nav}</nav><main><h1>{title}</h1>{body}</main></body></html>"
    ))
}

// --- Handlers ---

/// [Neutral Route] Cover letter generator, the landing page.
pub async fn home_page() -> Html<String> {
    render_page("/", "Cover Letter", "<section id=\"cover-letter\"></section>")
}

/// [Neutral Route] CV upload.
pub async fn upload_cv_page() -> Html<String> {
    render_page("/upload-cv", "Upload CV", "<section id=\"upload-cv\"></section>")
}

/// [Public Route]
pub async fn login_page() -> Html<String> {
    render_page(
        "/login",
        "Sign in",
        "<form id=\"login\" data-mode=\"login\"></form>\
         <p>No account yet? <a href=\"/register\">Register</a></p>",
    )
}

/// [Public Route]
pub async fn register_page() -> Html<String> {
    render_page(
        "/register",
        "Create account",
        "<form id=\"register\" data-mode=\"register\"></form>\
         <p>Already registered? <a href=\"/login\">Sign in</a></p>",
    )
}

/// [Protected Route]
pub async fn experience_page() -> Html<String> {
    render_page("/experience", "Experience", "<section id=\"experience\" data-protected></section>")
}

/// [Protected Route]
pub async fn skills_page() -> Html<String> {
    render_page("/skills", "Skills", "<section id=\"skills\" data-protected></section>")
}

/// [Protected Route]
pub async fn cover_letters_page() -> Html<String> {
    render_page(
        "/cover-letters",
        "Cover Letters",
        "<section id=\"cover-letters\" data-protected></section>",
    )
}
