//! Server-rendered pages. Every piece of user-supplied text goes through
//! `escape` before it lands in markup.

use std::fmt::Write;

use axum::response::Html;

use crate::auth::dto::{RegisterForm, SessionUser};

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"
:root { --primary: #6366f1; --error: #ef4444; --success: #10b981; --text: #1f2937; --border: #e5e7eb; }
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: 'Inter', sans-serif; background: #f9fafb; color: var(--text); display: grid; place-items: center; min-height: 100vh; }
.card { background: #fff; border: 1px solid var(--border); border-radius: 12px; padding: 2rem; width: 100%; max-width: 420px; }
.logo { font-size: 1.75rem; font-weight: 700; color: var(--primary); text-align: center; margin-bottom: .5rem; }
.subtitle { text-align: center; margin-bottom: 1.5rem; color: #6b7280; }
.alert { padding: .75rem 1rem; border-radius: 8px; margin-bottom: 1rem; }
.alert-error { background: #fef2f2; color: var(--error); }
.alert-success { background: #ecfdf5; color: var(--success); }
.form-group { margin-bottom: 1rem; }
.form-input, .form-select, .form-textarea { width: 100%; padding: .6rem .75rem; border: 1px solid var(--border); border-radius: 8px; }
.btn { width: 100%; padding: .7rem; background: var(--primary); color: #fff; border: 0; border-radius: 8px; cursor: pointer; }
.footer { text-align: center; margin-top: 1.5rem; }
.footer a { color: var(--primary); text-decoration: none; }
"#;

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{} • ArtShare</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <div class=\"card\">\n<div class=\"logo\">ArtShare</div>\n{body}</div>\n</body>\n</html>\n",
        escape(title)
    ))
}

fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let mut out = String::from("<div class=\"alert alert-error\">");
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            out.push_str("<br>");
        }
        out.push_str(&escape(e));
    }
    out.push_str("</div>\n");
    out
}

pub fn login_page(email: &str, errors: &[String]) -> Html<String> {
    let body = format!(
        r#"<p class="subtitle">Sign in to your account</p>
{errors}<form class="form" method="POST" action="/login">
<div class="form-group"><label for="email">Email</label>
<input type="email" id="email" name="email" class="form-input" placeholder="you@example.com" value="{email}" required></div>
<div class="form-group"><label for="password">Password</label>
<input type="password" id="password" name="password" class="form-input" required></div>
<button type="submit" class="btn">Sign In</button>
</form>
<div class="footer">Don't have an account? <a href="/register">Sign up</a></div>
"#,
        errors = error_list(errors),
        email = escape(email),
    );
    layout("Login", &body)
}

fn text_input(out: &mut String, name: &str, kind: &str, placeholder: &str, value: &str) {
    let _ = writeln!(
        out,
        r#"<div class="form-group"><input type="{kind}" name="{name}" class="form-input" placeholder="{placeholder}" value="{value}"></div>"#,
        value = escape(value),
    );
}

fn textarea(out: &mut String, name: &str, placeholder: &str, value: &str) {
    let _ = writeln!(
        out,
        r#"<div class="form-group"><textarea name="{name}" class="form-textarea" placeholder="{placeholder}">{value}</textarea></div>"#,
        value = escape(value),
    );
}

/// Registration form. Passwords and the file input are never refilled.
pub fn register_page(form: &RegisterForm, errors: &[String]) -> Html<String> {
    let mut fields = String::new();
    text_input(&mut fields, "username", "text", "Choose a username", &form.username);
    text_input(&mut fields, "email", "email", "Your email address", &form.email);
    fields.push_str(
        "<div class=\"form-group\"><input type=\"password\" name=\"password\" class=\"form-input\" placeholder=\"Create a strong password\"></div>\n",
    );
    text_input(&mut fields, "first_name", "text", "First Name", &form.first_name);
    text_input(&mut fields, "last_name", "text", "Last Name", &form.last_name);
    textarea(&mut fields, "bio", "Tell us about your artistic journey...", &form.bio);
    fields.push_str(
        "<div class=\"form-group\"><input type=\"file\" name=\"profile_image_upload\" accept=\"image/*\"></div>\n",
    );
    text_input(&mut fields, "location", "text", "Your location", &form.location);
    text_input(&mut fields, "website", "url", "Your website URL", &form.website);
    text_input(&mut fields, "portfolio_url", "url", "Portfolio URL", &form.portfolio_url);
    textarea(&mut fields, "social_links", "Social links", &form.social_links);
    text_input(&mut fields, "date_of_birth", "date", "", &form.date_of_birth);

    fields.push_str("<div class=\"form-group\"><select name=\"gender\" class=\"form-select\">\n");
    for (value, label) in [
        ("", "Select Gender"),
        ("male", "Male"),
        ("female", "Female"),
        ("other", "Other"),
        ("prefer_not_to_say", "Prefer Not to Say"),
    ] {
        let selected = if form.gender.trim() == value { " selected" } else { "" };
        let _ = writeln!(fields, "<option value=\"{value}\"{selected}>{label}</option>");
    }
    fields.push_str("</select></div>\n");

    text_input(&mut fields, "art_styles", "text", "Art styles (painting, digital, sculpture)", &form.art_styles);
    let checked = if form.is_profile_private.is_empty() { "" } else { " checked" };
    let _ = writeln!(
        fields,
        "<div class=\"form-group\"><label><input type=\"checkbox\" name=\"is_profile_private\" value=\"1\"{checked}> Make my profile private</label></div>"
    );

    let body = format!(
        r#"<p class="subtitle">Welcome to ArtShare</p>
{errors}<form method="POST" action="/register" enctype="multipart/form-data">
{fields}<button type="submit" class="btn">Create Account</button>
</form>
<div class="footer">Already have an account? <a href="/login">Log in</a></div>
"#,
        errors = error_list(errors),
    );
    layout("Sign up", &body)
}

/// Confirmation that sends the browser on after `delay_secs`.
pub fn success_page(title: &str, message: &str, redirect_to: &str, delay_secs: u64) -> Html<String> {
    let body = format!(
        r#"<meta http-equiv="refresh" content="{delay_secs};url={target}">
<div class="alert alert-success">{message}</div>
<div class="footer"><a href="{target}">Continue</a></div>
"#,
        target = escape(redirect_to),
        message = escape(message),
    );
    layout(title, &body)
}

pub fn dashboard_page(user: &SessionUser) -> Html<String> {
    let image = match &user.profile_image {
        Some(key) => format!(
            "<p><img src=\"/uploads/{}\" alt=\"Profile image\" width=\"96\"></p>\n",
            escape(key)
        ),
        None => String::new(),
    };
    let body = format!(
        r#"<p class="subtitle">Welcome, {username}!</p>
{image}<p>Signed in as {email}</p>
<form method="POST" action="/logout"><button type="submit" class="btn">Log out</button></form>
"#,
        username = escape(&user.username),
        email = escape(&user.email),
    );
    layout("Dashboard", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape(r#"<script>alert("x&y")</script>'"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;&#039;"
        );
        assert_eq!(escape("plain text"), "plain text");
    }

    #[test]
    fn login_page_escapes_echoed_email_and_errors() {
        let page = login_page("\"><img src=x>", &["<b>bad</b>".to_string()]).0;
        assert!(page.contains("value=\"&quot;&gt;&lt;img src=x&gt;\""));
        assert!(page.contains("&lt;b&gt;bad&lt;/b&gt;"));
        assert!(!page.contains("<b>bad</b>"));
    }

    #[test]
    fn register_page_refills_fields_except_password() {
        let form = RegisterForm {
            username: "van_gogh".into(),
            password: "sunflowers".into(),
            gender: "other".into(),
            ..Default::default()
        };
        let page = register_page(&form, &["one".into(), "two".into()]).0;
        assert!(page.contains("value=\"van_gogh\""));
        assert!(!page.contains("sunflowers"));
        assert!(page.contains("<option value=\"other\" selected>"));
        assert!(page.contains("one<br>two"));
    }

    #[test]
    fn success_page_has_delayed_redirect() {
        let page = success_page("Login", "Login successful! Redirecting...", "/dashboard", 2).0;
        assert!(page.contains("content=\"2;url=/dashboard\""));
    }
}
