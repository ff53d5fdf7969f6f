//! Server-rendered HTML pages. Every piece of dynamic text goes through
//! [`escape_html`].

use crate::models::job::JobPosting;

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(brand: &str, title: &str, body: &str) -> String {
    let brand = escape_html(brand);
    let title = escape_html(title);
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title} | {brand}</title>
  <link rel="stylesheet" href="/static/css/site.css">
</head>
<body>
  <header class="site-header">
    <a class="brand" href="/">{brand}</a>
    <nav><a href="/">Home</a> <a href="/careers">Careers</a></nav>
  </header>
  <main>
{body}
  </main>
  <footer class="site-footer">&copy; {brand}</footer>
</body>
</html>
"#
    )
}

fn flash(message: Option<&str>) -> String {
    match message {
        Some(msg) => format!(
            "    <p class=\"flash\" role=\"status\">{}</p>\n",
            escape_html(msg)
        ),
        None => String::new(),
    }
}

pub fn home_page(brand: &str, message: Option<&str>) -> String {
    let body = format!(
        r#"{flash}    <section class="hero">
      <h1>{brand}</h1>
      <p>Software, data and infrastructure engineering.</p>
    </section>
    <section id="contact">
      <h2>Contact us</h2>
      <form method="post" action="/contact">
        <label>Name <input name="name" required></label>
        <label>Email <input name="email" type="email" required></label>
        <label>Message <textarea name="message" required></textarea></label>
        <button type="submit">Send</button>
      </form>
    </section>
"#,
        flash = flash(message),
        brand = escape_html(brand),
    );
    layout(brand, "Home", &body)
}

pub fn careers_page(brand: &str, jobs: &[JobPosting], message: Option<&str>) -> String {
    let rows: String = jobs
        .iter()
        .map(|job| {
            format!(
                "        <li class=\"job\"><h3>{}</h3><span>{}</span> <span>{}</span> <span>{}</span></li>\n",
                escape_html(&job.title),
                escape_html(&job.location),
                escape_html(&job.kind),
                escape_html(&job.level),
            )
        })
        .collect();

    let options: String = jobs
        .iter()
        .map(|job| {
            let title = escape_html(&job.title);
            format!("          <option value=\"{title}\">{title}</option>\n")
        })
        .collect();

    let body = format!(
        r#"{flash}    <section id="openings">
      <h1>Careers</h1>
      <ul class="jobs">
{rows}      </ul>
    </section>
    <section id="apply">
      <h2>Apply</h2>
      <form method="post" action="/apply" enctype="multipart/form-data">
        <label>Name <input name="name" required></label>
        <label>Email <input name="email" type="email" required></label>
        <label>Role
          <select name="role" required>
{options}          </select>
        </label>
        <label>Note <textarea name="note"></textarea></label>
        <label>Resume (PDF) <input name="resume" type="file" accept="application/pdf" required></label>
        <button type="submit">Apply</button>
      </form>
    </section>
"#,
        flash = flash(message),
    );
    layout(brand, "Careers", &body)
}

/// Bare page for failures that happen before site settings are at hand.
pub fn error_page(message: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Error</title></head>
<body>
  <h1>Something went wrong</h1>
  <p>{}</p>
  <p><a href="/">Back to the home page</a></p>
</body>
</html>
"#,
        escape_html(message)
    )
}
