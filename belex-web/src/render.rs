//! Server-rendered HTML for the console pages.
//!
//! Pages are assembled as plain strings around one shared shell; the
//! stylesheet is compiled into the binary. Every interpolated value that
//! comes from a user or from the store API goes through [`escape`].

use crate::{
    state::Session,
    variant::{EXAMPLE_QUERIES, Variant},
};
use belex_gemini::StoreDocument;
use belex_search::{
    DocumentListing, SourceEntry, SourceMap, TitleResolver, extract_bsg_number, find_duplicates,
    group_by_book, is_webapp_upload, law_url, sort_by_create_time_desc,
};

const STYLE: &str = include_str!("assets/style.css");

/// Views of the document console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Catalog grouped into law books.
    Books,
    /// Full catalog, newest upload first.
    Recent,
    /// Duplicate display-name scan (public build).
    Duplicates,
    /// Documents uploaded through this console (Uni Bern build).
    Own,
}

impl View {
    /// Parses the `view` query parameter. Unknown values and views the
    /// variant does not offer fall back to the book catalog.
    pub fn from_query(raw: Option<&str>, variant: &Variant) -> Self {
        match raw {
            Some("recent") => View::Recent,
            Some("duplicates") if variant.duplicates_view => View::Duplicates,
            Some("own") if variant.own_uploads_view => View::Own,
            _ => View::Books,
        }
    }

    pub fn as_query(self) -> &'static str {
        match self {
            View::Books => "books",
            View::Recent => "recent",
            View::Duplicates => "duplicates",
            View::Own => "own",
        }
    }

    fn label(self) -> &'static str {
        match self {
            View::Books => "📋 Alle Dokumente",
            View::Recent => "📅 Nach Upload-Datum",
            View::Duplicates => "🔍 Duplikate prüfen",
            View::Own => "📤 Eigene Uploads",
        }
    }
}

/// Outcome message shown above the document console.
#[derive(Debug, Clone)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Minimal HTML escaping for text and attribute positions.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(character),
        }
    }
    escaped
}

/// `"12.34 MB"` from one mebibyte upward, grouped bytes below.
fn format_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB {
        format!("{:.2} MB", bytes as f64 / MIB as f64)
    } else {
        format!("{} Bytes", group_thousands(bytes))
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Date part of an RFC 3339 timestamp.
fn format_date(create_time: &str) -> &str {
    create_time.split('T').next().unwrap_or(create_time)
}

/// Date and wall-clock part of an RFC 3339 timestamp, fractional seconds
/// dropped.
fn format_date_time(create_time: &str) -> String {
    match create_time.split_once('T') {
        Some((date, time)) => {
            let time = time.split('.').next().unwrap_or(time);
            format!("{date} {time}")
        }
        None => create_time.to_string(),
    }
}

fn page(variant: &Variant, body: &str) -> String {
    let prompt_link = if variant.prompt_editor {
        r#"<a href="/prompt">🛠️ Promptengineering</a>"#
    } else {
        ""
    };
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            r#"<html lang="de"><head><meta charset="utf-8">"#,
            r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#,
            "<title>{title}</title><style>{style}</style></head><body>",
            r#"<header><h1>{heading}</h1><p class="tagline">{tagline}</p>{banner}</header>"#,
            r#"<nav><a href="/">🔍 Suche</a>{prompt_link}<a href="/documents">{documents_label}</a></nav>"#,
            r#"<div class="layout"><main>{body}</main><aside>{sidebar}</aside></div>"#,
            "</body></html>"
        ),
        title = variant.page_title,
        style = STYLE,
        heading = variant.heading,
        tagline = variant.tagline,
        banner = variant.banner_html,
        prompt_link = prompt_link,
        documents_label = variant.documents_label,
        body = body,
        sidebar = sidebar(variant),
    )
}

fn sidebar(variant: &Variant) -> String {
    let mut html = String::from(variant.about_html);
    html.push_str("<hr><h3>💡 Beispiel-Fragen</h3>");
    for query in EXAMPLE_QUERIES {
        html.push_str(&format!(
            r#"<form method="post" action="/search"><button name="query" value="{query}">{query}</button></form>"#,
        ));
    }
    html
}

/// The search page: query form, prompt-mode note, last answer and sources.
pub async fn search_page(variant: &Variant, titles: &TitleResolver, session: &Session) -> String {
    let mut body = String::from("<section>");
    body.push_str(&format!(
        concat!(
            r#"<form method="post" action="/search">"#,
            r#"<label for="query"><strong>🔍 Ihre Rechtsfrage:</strong></label>"#,
            r#"<textarea id="query" name="query" rows="4" "#,
            r#"placeholder="z.B. 'Welche Regelungen gelten für Baugesuche?' oder 'Was sagt das Gesetz über Steuererklärungsfristen?'">{query}</textarea>"#,
            r#"<button type="submit">🔎 Suchen</button></form>"#
        ),
        query = escape(&session.last_query),
    ));

    if variant.prompt_editor {
        let note = if session.custom_prompt.is_some() {
            "ℹ️ Es wird ein angepasster Systemprompt verwendet"
        } else {
            "ℹ️ Es wird der Standard-Systemprompt verwendet"
        };
        body.push_str(&format!(r#"<p class="note">{note}</p>"#));
    }

    if let Some(error) = &session.last_error {
        body.push_str(&format!(
            r#"<p class="error">❌ Fehler bei der Suche: {}</p>"#,
            escape(error)
        ));
    }

    if let Some(answer) = &session.last_answer {
        body.push_str("<hr><h2>📝 Antwort</h2>");
        if answer.text.is_empty() {
            body.push_str(r#"<p class="warning">⚠️ Keine Antwort generiert</p>"#);
        } else {
            body.push_str(&format!(r#"<div class="answer-box">{}</div>"#, escape(&answer.text)));
        }
        body.push_str(&source_cards(titles, &answer.sources).await);
    }

    body.push_str("</section>");
    page(variant, &body)
}

async fn source_cards(titles: &TitleResolver, sources: &SourceMap) -> String {
    if sources.is_empty() {
        return r#"<p class="note">ℹ️ Keine spezifischen Fundstellen verfügbar</p>"#.to_string();
    }

    // Cards are shown alphabetically; the map itself keeps encounter order.
    let mut entries: Vec<&SourceEntry> = sources.iter().collect();
    entries.sort_by(|a, b| a.title.cmp(&b.title));

    let mut html = String::from(concat!(
        "<h2>📚 Rechtsgrundlagen &amp; Fundstellen</h2>",
        "<p><em>Klicken Sie auf die Gesetze, um den vollständigen Text online zu öffnen</em></p>"
    ));
    for (position, entry) in entries.iter().enumerate() {
        let number = position + 1;
        html.push_str(r#"<div class="source-card">"#);
        match extract_bsg_number(&entry.title) {
            Some(bsg) => {
                let url = law_url(bsg);
                match titles.resolve(bsg).await {
                    Some(law_name) => html.push_str(&format!(
                        concat!(
                            r#"<div class="source-title">{number}. <a href="{url}" target="_blank">{name} 🔗</a></div>"#,
                            "<small>BSG-Nummer: {bsg} • Datei: {title}</small>"
                        ),
                        number = number,
                        url = url,
                        name = escape(&law_name),
                        bsg = escape(bsg),
                        title = escape(&entry.title),
                    )),
                    None => html.push_str(&format!(
                        concat!(
                            r#"<div class="source-title">{number}. <a href="{url}" target="_blank">{title} 🔗</a></div>"#,
                            "<small>BSG-Nummer: {bsg}</small>"
                        ),
                        number = number,
                        url = url,
                        title = escape(&entry.title),
                        bsg = escape(bsg),
                    )),
                }
            }
            None => html.push_str(&format!(
                r#"<div class="source-title">{number}. {title}</div>"#,
                number = number,
                title = escape(&entry.title),
            )),
        }

        if !entry.snippets.is_empty() {
            html.push_str("<p><strong>Relevante Textstellen:</strong></p>");
            for (snippet_position, snippet) in entry.snippets.iter().enumerate() {
                html.push_str(&format!(
                    concat!(
                        r#"<div class="source-snippet"><span class="snippet-number">Chunk {number}</span>"#,
                        r#"<div>"{text}"</div></div>"#
                    ),
                    number = snippet_position + 1,
                    text = escape(snippet),
                ));
            }
        }
        html.push_str("</div>");
    }
    html
}

/// The document console: notices, view switcher, the selected view over
/// the given listing (absent after write actions), upload form and delete
/// picker.
pub async fn documents_page(
    variant: &Variant,
    titles: &TitleResolver,
    session: &Session,
    view: View,
    listing: Option<&DocumentListing>,
    notice: Option<&Notice>,
) -> String {
    let mut body = format!(
        "<h2>{}</h2><p>{}</p>",
        variant.documents_heading, variant.documents_intro
    );
    if let Some(notice) = notice {
        body.push_str(&notice_html(notice));
    }
    body.push_str(&view_nav(variant, view));

    if let Some(listing) = listing {
        if let Some(error) = &listing.error {
            body.push_str(&format!(
                r#"<p class="error">Fehler beim Auflisten der Dokumente: {}</p>"#,
                escape(error)
            ));
        }
        let content = match view {
            View::Books => books_view(titles, &listing.documents).await,
            View::Recent => recent_view(titles, &listing.documents).await,
            View::Duplicates => duplicates_view(&listing.documents),
            View::Own => own_view(titles, &listing.documents).await,
        };
        body.push_str(&content);
    }

    body.push_str(UPLOAD_SECTION);
    body.push_str(&delete_section(titles, session, view).await);
    page(variant, &body)
}

fn notice_html(notice: &Notice) -> String {
    match notice {
        Notice::Success(text) => format!(r#"<p class="success">{}</p>"#, escape(text)),
        Notice::Error(text) => format!(r#"<p class="error">{}</p>"#, escape(text)),
    }
}

fn view_nav(variant: &Variant, active: View) -> String {
    let mut views = vec![View::Books, View::Recent];
    if variant.duplicates_view {
        views.push(View::Duplicates);
    }
    if variant.own_uploads_view {
        views.push(View::Own);
    }

    let mut html = String::from(r#"<div class="view-nav">"#);
    for view in views {
        let class = if view == active { r#" class="active""# } else { "" };
        html.push_str(&format!(
            r#"<a href="/documents?view={}"{}>{}</a>"#,
            view.as_query(),
            class,
            view.label()
        ));
    }
    html.push_str("</div>");
    html
}

/// One catalog line with its date column and delete button.
fn doc_row(line: &str, date: Option<String>, document_name: &str, view: View) -> String {
    format!(
        concat!(
            r#"<div class="doc-row"><span class="doc-label">{line}</span>"#,
            r#"<span class="doc-date">{date}</span>"#,
            r#"<form method="post" action="/documents/delete">"#,
            r#"<input type="hidden" name="name" value="{name}">"#,
            r#"<input type="hidden" name="view" value="{view}">"#,
            r#"<button class="danger" title="Dokument löschen">🗑️</button></form></div>"#
        ),
        line = line,
        date = escape(&date.unwrap_or_default()),
        name = escape(document_name),
        view = view.as_query(),
    )
}

async fn law_line(titles: &TitleResolver, bsg: &str, label: &str) -> String {
    let url = law_url(bsg);
    let shown = titles.resolve(bsg).await.unwrap_or_else(|| label.to_string());
    format!(
        r#"⚖️ <a href="{url}" target="_blank">{}</a> · <code>{}</code>"#,
        escape(&shown),
        escape(bsg)
    )
}

async fn books_view(titles: &TitleResolver, documents: &[StoreDocument]) -> String {
    if documents.is_empty() {
        return r#"<p class="note">ℹ️ Keine Dokumente gefunden</p>"#.to_string();
    }

    let catalog = group_by_book(documents);
    let mut html = format!(
        r#"<p class="success">✅ {} Dokument(e) gefunden</p>"#,
        documents.len()
    );
    for group in &catalog.books {
        html.push_str(&format!(
            "<h3>📂 Rechtsbuch {} — Anzahl Gesetze: {}</h3>",
            escape(group.key.as_str()),
            group.entries.len()
        ));
        for entry in &group.entries {
            let line = law_line(titles, &entry.bsg, entry.document.label()).await;
            let date = entry.document.create_time.as_deref().map(|t| format_date(t).to_string());
            html.push_str(&doc_row(&line, date, &entry.document.name, View::Books));
        }
    }
    if !catalog.ungrouped.is_empty() {
        html.push_str(&format!(
            "<h3>📄 Dokumente ohne Rechtsbuchnummer — Anzahl: {}</h3>",
            catalog.ungrouped.len()
        ));
        for document in &catalog.ungrouped {
            let line = format!("📄 {}", escape(document.label()));
            let date = document.create_time.as_deref().map(|t| format_date(t).to_string());
            html.push_str(&doc_row(&line, date, &document.name, View::Books));
        }
    }
    html
}

async fn dated_rows(titles: &TitleResolver, documents: &[StoreDocument], view: View) -> String {
    let mut html = String::new();
    for (position, document) in documents.iter().enumerate() {
        let label = document.label();
        let line = match extract_bsg_number(label) {
            Some(bsg) => format!("{}. {}", position + 1, law_line(titles, bsg, label).await),
            None => format!("{}. 📄 {}", position + 1, escape(label)),
        };
        let date = document.create_time.as_deref().map(format_date_time);
        html.push_str(&doc_row(&line, date, &document.name, view));
    }
    html
}

async fn recent_view(titles: &TitleResolver, documents: &[StoreDocument]) -> String {
    if documents.is_empty() {
        return r#"<p class="note">ℹ️ Keine Dokumente gefunden</p>"#.to_string();
    }

    let sorted = sort_by_create_time_desc(documents);
    let mut html = String::from("<h3>📅 Alle Dokumente nach Upload-Datum</h3>");
    html.push_str(&dated_rows(titles, &sorted, View::Recent).await);
    html
}

async fn own_view(titles: &TitleResolver, documents: &[StoreDocument]) -> String {
    if documents.is_empty() {
        return r#"<p class="note">ℹ️ Keine Dokumente gefunden</p>"#.to_string();
    }

    let own: Vec<StoreDocument> =
        documents.iter().filter(|document| is_webapp_upload(document)).cloned().collect();
    if own.is_empty() {
        return concat!(
            r#"<p class="note">ℹ️ Keine eigenen Uploads gefunden. "#,
            "Nur Dokumente, die über diese Web-App hochgeladen wurden, werden hier angezeigt.</p>"
        )
        .to_string();
    }

    let sorted = sort_by_create_time_desc(&own);
    let mut html = format!(
        r#"<p class="success">✅ {} eigene(s) Dokument(e) gefunden (neueste zuerst)</p>"#,
        sorted.len()
    );
    html.push_str(&dated_rows(titles, &sorted, View::Own).await);
    html
}

fn duplicates_view(documents: &[StoreDocument]) -> String {
    if documents.is_empty() {
        return r#"<p class="note">ℹ️ Keine Dokumente gefunden</p>"#.to_string();
    }

    let report = find_duplicates(documents);
    if report.is_empty() {
        return r#"<p class="success">✅ Keine Duplikate gefunden!</p>"#.to_string();
    }

    let mut html = format!(
        r#"<p class="warning">⚠️ {} Duplikat(e) gefunden in {} Gruppe(n)!</p><h3>Duplikate:</h3>"#,
        report.total,
        report.groups.len()
    );
    for group in &report.groups {
        html.push_str(&format!(
            r#"<div class="duplicate-group"><h4>📄 {} ({}× vorhanden)</h4><p><strong>Anzahl:</strong> {} Kopien</p>"#,
            escape(&group.label),
            group.documents.len(),
            group.documents.len()
        ));
        for (position, document) in group.documents.iter().enumerate() {
            html.push_str(&format!("<p><strong>Kopie {}:</strong></p><ul>", position + 1));
            html.push_str(&format!("<li>ID: <code>{}</code></li>", escape(&document.name)));
            if let Some(create_time) = &document.create_time {
                html.push_str(&format!("<li>Hochgeladen: {}</li>", escape(create_time)));
            }
            if let Some(size) = document.size() {
                html.push_str(&format!("<li>Größe: {}</li>", format_size(size)));
            }
            html.push_str("</ul>");
        }
        html.push_str("</div>");
    }
    html
}

const UPLOAD_SECTION: &str = concat!(
    "<hr><h3>⬆️ Datei hochladen</h3>",
    r#"<form method="post" action="/documents/upload" enctype="multipart/form-data">"#,
    r#"<input type="file" name="file" required>"#,
    r#"<p class="note">Unterstützte Dateitypen: PDF, TXT, MD, DOC, DOCX, HTML, CSV, JSON (max. 100 MB)</p>"#,
    r#"<label for="display_name">Anzeigename (optional)</label>"#,
    r#"<input type="text" id="display_name" name="display_name" placeholder="Wenn leer, wird der Dateiname verwendet">"#,
    r#"<button type="submit">📤 Hochladen</button></form>"#,
);

async fn delete_section(titles: &TitleResolver, session: &Session, view: View) -> String {
    let mut html = String::from(concat!(
        "<hr><h3>🗑️ Dokument löschen</h3>",
        r#"<p class="warning">⚠️ Das Löschen eines Dokuments kann nicht rückgängig gemacht werden!</p>"#
    ));

    match &session.docs_for_delete {
        None => html.push_str(&format!(
            r#"<a class="button" href="/documents?view={}&amp;load_delete=1">📋 Dokumente für Löschung laden</a>"#,
            view.as_query()
        )),
        Some(documents) if documents.is_empty() => {
            html.push_str(r#"<p class="note">ℹ️ Keine Dokumente gefunden</p>"#);
        }
        Some(documents) => {
            html.push_str(r#"<form method="post" action="/documents/delete"><select name="name">"#);
            for document in documents {
                let label = document.label();
                let shown = match extract_bsg_number(label) {
                    Some(bsg) => titles.resolve(bsg).await.unwrap_or_else(|| label.to_string()),
                    None => label.to_string(),
                };
                html.push_str(&format!(
                    r#"<option value="{}">{} ({} Bytes)</option>"#,
                    escape(&document.name),
                    escape(&shown),
                    group_thousands(document.size().unwrap_or(0))
                ));
            }
            html.push_str(&format!(
                concat!(
                    r#"</select><input type="hidden" name="view" value="{view}">"#,
                    r#"<button class="danger">🗑️ Endgültig löschen</button></form>"#
                ),
                view = view.as_query()
            ));
        }
    }
    html
}

/// The prompt editor page (Uni Bern build).
pub fn prompt_page(variant: &Variant, session: &Session) -> String {
    let current = session
        .custom_prompt
        .as_deref()
        .or(variant.default_system_prompt)
        .unwrap_or_default();

    let mut body = String::from("<h2>🛠️ Promptengineering</h2>");
    body.push_str(&format!(
        concat!(
            r#"<form method="post" action="/prompt">"#,
            r#"<label for="prompt"><strong>Aktueller Systemprompt:</strong></label>"#,
            r#"<textarea id="prompt" name="prompt" rows="24">{prompt}</textarea>"#,
            r#"<button type="submit" name="action" value="apply">✅ Anwenden</button> "#,
            r#"<button type="submit" name="action" value="reset">🔄 Standard wiederherstellen</button>"#,
            "</form>"
        ),
        prompt = escape(current),
    ));
    page(variant, &body)
}
