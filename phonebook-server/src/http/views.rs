//! Server-rendered HTML pages
//!
//! Every page shares [`layout`], which also renders the drained flash queue.
//! All user-supplied text goes through [`escape`].

use std::fmt::Write;

use axum::response::Html;

use crate::models::PhoneBookEntry;
use crate::session::Flash;

/// Escape text for HTML element content and quoted attribute values
pub fn escape(raw: &str) -> String {
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

fn layout(title: &str, flashes: &[Flash], body: &str) -> Html<String> {
    let mut messages = String::new();
    for flash in flashes {
        let _ = write!(
            messages,
            r#"<li class="flash flash-{}">{}</li>"#,
            flash.level.as_str(),
            escape(&flash.message)
        );
    }
    let messages = if messages.is_empty() {
        messages
    } else {
        format!(r#"<ul class="flashes">{}</ul>"#, messages)
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<nav><a href="/">Phone Book</a> | <a href="/add/">Add</a></nav>
{messages}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
        messages = messages,
        body = body,
    ))
}

/// Listing page
pub fn index(entries: &[PhoneBookEntry], flashes: &[Flash]) -> Html<String> {
    let body = if entries.is_empty() {
        r#"<p class="empty">No phone numbers yet. <a href="/add/">Add one</a>.</p>"#.to_string()
    } else {
        let mut rows = String::new();
        for entry in entries {
            let _ = write!(
                rows,
                r#"<tr><td>{name}</td><td>{phone}</td><td>{address}</td><td><a href="/update/{id}/">Update</a> <a href="/delete/{id}/">Delete</a></td></tr>"#,
                id = entry.id,
                name = escape(&entry.name),
                phone = escape(&entry.phone),
                address = escape(&entry.address),
            );
        }
        format!(
            "<table>\n<thead><tr><th>Name</th><th>Phone</th><th>Address</th><th></th></tr></thead>\n<tbody>{}</tbody>\n</table>",
            rows
        )
    };

    layout("Phone Book", flashes, &body)
}

fn entry_inputs(name: &str, phone: &str, address: &str, readonly: bool) -> String {
    let readonly = if readonly { " readonly" } else { "" };
    format!(
        r#"<label>Name <input type="text" name="name" value="{}"{r}></label>
<label>Phone <input type="text" name="phone" value="{}"{r}></label>
<label>Address <textarea name="address"{r}>{}</textarea></label>"#,
        escape(name),
        escape(phone),
        escape(address),
        r = readonly,
    )
}

/// Empty creation form
pub fn add_form(flashes: &[Flash]) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/addphone">
{}
<button type="submit" name="save" value="save">Save</button>
</form>"#,
        entry_inputs("", "", "", false)
    );
    layout("Add Phone Number", flashes, &body)
}

/// Update confirmation, pre-filled with the current values
pub fn update_form(entry: &PhoneBookEntry, flashes: &[Flash]) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/updatephone">
{}
<button type="submit" name="update" value="update">Update</button>
<a href="/">Cancel</a>
</form>"#,
        entry_inputs(&entry.name, &entry.phone, &entry.address, false)
    );
    layout("Update Phone Number", flashes, &body)
}

/// Delete confirmation showing the entry read-only
pub fn delete_form(entry: &PhoneBookEntry, flashes: &[Flash]) -> Html<String> {
    let body = format!(
        r#"<p>Delete this phone number?</p>
<form method="post" action="/deletephone">
{}
<button type="submit" name="delete" value="delete">Delete</button>
<a href="/">Cancel</a>
</form>"#,
        entry_inputs(&entry.name, &entry.phone, &entry.address, true)
    );
    layout("Delete Phone Number", flashes, &body)
}

/// Generic error page
pub fn error_page(flashes: &[Flash]) -> Html<String> {
    layout(
        "Page Not Found",
        flashes,
        r#"<p>The page you requested does not exist. <a href="/">Back to the phone book</a>.</p>"#,
    )
}
