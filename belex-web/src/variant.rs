//! The two builds of the web console.
//!
//! Both variants share every route and template; they differ in branding,
//! answering model, and which console features are switched on. The public
//! test build has the duplicate scan, the Uni Bern build has the prompt
//! editor and the own-uploads filter.

use belex_gemini::Model;
use std::time::Duration;

/// System prompt of the Uni Bern build, shown in its prompt editor.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"Du bist ein Rechtsassistent für die Berner Gesetzessammlung (BELEX).

Deine Aufgabe ist es, Rechtsfragen präzise und vollständig zu beantworten. Beachte dabei:

1. **Rechtsvorschriften genau bezeichnen**: Nenne immer die einschlägigen Rechtsvorschriften mit ihrer genauen Bezeichnung (z.B. "Art. 5 Abs. 2 des Personalgesetzes (PG, BSG 153.01)").

2. **BSG-Nummern verwenden**: Gib die BSG-Nummer (Berner Systematische Gesetzessammlung) an, wenn du eine Rechtsquelle zitierst.

3. **Struktur der Antwort**:
   - Beginne mit einer klaren, direkten Antwort auf die Frage
   - Nenne die relevanten Rechtsvorschriften mit genauer Artikelbezeichnung
   - Erkläre die rechtlichen Folgen oder Pflichten
   - Verweise auf einschlägige Ausnahmen oder Sonderregelungen

4. **Präzision**: Verwende juristische Fachsprache korrekt, aber bleibe verständlich.

5. **Quellenangabe**: Beziehe dich ausschließlich auf die Dokumente in der Datenbank."#;

/// Example questions offered in the sidebar of both builds.
pub const EXAMPLE_QUERIES: [&str; 4] = [
    "Welche Fristen gelten für Baugesuche?",
    "Was regelt das Personalgesetz?",
    "Welche Pflichten haben Arbeitgeber im Kanton Bern?",
    "Wie funktioniert die Steuererklärung?",
];

/// The store needs a few seconds after a delete before listings stop
/// returning the removed document. The wait is a heuristic, not a
/// confirmation.
const POST_DELETE_WAIT: Duration = Duration::from_secs(5);

/// Branding and feature switches of one console build.
#[derive(Debug, Clone)]
pub struct Variant {
    pub name: &'static str,
    pub page_title: &'static str,
    pub heading: &'static str,
    pub tagline: &'static str,
    /// Banner block under the heading, already formatted as HTML.
    pub banner_html: &'static str,
    /// Sidebar blocks, already formatted as HTML.
    pub about_html: &'static str,
    /// Navigation label of the document console.
    pub documents_label: &'static str,
    pub documents_heading: &'static str,
    pub documents_intro: &'static str,
    /// Model answering search queries.
    pub model: Model,
    /// Whether `/prompt` is served.
    pub prompt_editor: bool,
    /// Whether the duplicate scan view is offered.
    pub duplicates_view: bool,
    /// Whether the webapp-upload filter view is offered.
    pub own_uploads_view: bool,
    /// Pause between a successful delete and the redirect to the
    /// refreshed listing.
    pub post_delete_wait: Duration,
    pub default_system_prompt: Option<&'static str>,
}

impl Variant {
    /// The public test build for the cantonal education directorate.
    pub fn public() -> Self {
        Self {
            name: "public",
            page_title: "BELEX Suche",
            heading: "⚖️ BELEX Rechtsdatenbank",
            tagline: "Durchsuchen Sie das Berner Bildungsrecht mit KI-Unterstützung",
            banner_html: concat!(
                r#"<div class="banner banner-public">"#,
                "<h3>🧪 Testversion</h3>",
                "<p>Für die <strong>Bildungsdirektion des Kantons Bern</strong></p>",
                r#"<p class="fine">Entwickelt von <a href="https://kueblaw.ch" target="_blank">kueblaw.ch</a></p>"#,
                "</div>",
            ),
            about_html: concat!(
                "<h3>ℹ️ Über BELEX</h3>",
                "<p>Diese Anwendung durchsucht die <strong>Berner Gesetzessammlung (BSG)</strong> ",
                "mithilfe von KI-gestützter Suchtechnologie.</p>",
                "<p><strong>Funktionen:</strong></p>",
                "<ul><li>🔍 Natürlichsprachige Suche</li><li>📖 Direkte Links zu Gesetzen</li>",
                "<li>📝 KI-generierte Zusammenfassungen</li><li>📚 Quellenangaben mit Textstellen</li></ul>",
                "<p><strong>Hinweis:</strong> Die Antworten sind KI-generiert und sollten nicht ",
                "als offizielle Rechtsberatung verstanden werden.</p>",
                "<hr><h3>🧪 Testversion</h3>",
                "<p>Diese Testversion wurde für die <strong>Bildungsdirektion des Kantons Bern</strong> entwickelt.</p>",
                r#"<p><strong>Entwickelt von:</strong> <a href="https://kueblaw.ch" target="_blank">kueblaw.ch</a></p>"#,
            ),
            documents_label: "📁 Filestore-Verwaltung",
            documents_heading: "📁 Dokumente",
            documents_intro: "Verwalten Sie die Dokumente in Ihrer Datenbank",
            model: Model::Gemini25Flash,
            prompt_editor: false,
            duplicates_view: true,
            own_uploads_view: false,
            post_delete_wait: Duration::ZERO,
            default_system_prompt: None,
        }
    }

    /// The Uni Bern build for research and teaching.
    pub fn unibe() -> Self {
        Self {
            name: "unibe",
            page_title: "BELEX Suche - Universität Bern",
            heading: "🎓 BELEX Rechtsdatenbank",
            tagline: "Durchsuchen Sie das Berner Bildungsrecht mit KI-Unterstützung",
            banner_html: concat!(
                r#"<div class="banner banner-unibe">"#,
                "<h3>🎓 Universität Bern</h3>",
                "<p>Rechtsdatenbank für <strong>Forschung und Lehre</strong></p>",
                r#"<p class="fine">Entwickelt von <a href="https://kueblaw.ch" target="_blank">kueblaw.ch</a></p>"#,
                "</div>",
            ),
            about_html: concat!(
                "<h3>ℹ️ Über BELEX</h3>",
                "<p>Diese Anwendung durchsucht die <strong>Berner Gesetzessammlung (BSG)</strong> ",
                "mithilfe von KI-gestützter Suchtechnologie.</p>",
                "<p><strong>Funktionen:</strong></p>",
                "<ul><li>🔍 Natürlichsprachige Suche</li><li>📖 Direkte Links zu Gesetzen</li>",
                "<li>📝 KI-generierte Zusammenfassungen</li><li>📚 Quellenangaben mit Textstellen</li>",
                "<li>🛠️ Anpassbarer Systemprompt</li></ul>",
                "<p><strong>Hinweis:</strong> Die Antworten sind KI-generiert und sollten nicht ",
                "als offizielle Rechtsberatung verstanden werden.</p>",
                "<hr><h3>🎓 Universität Bern</h3>",
                "<p>Diese Version wurde für die <strong>Universität Bern</strong> entwickelt ",
                "und unterstützt Forschung und Lehre im Bereich Recht.</p>",
                r#"<p><strong>Entwickelt von:</strong> <a href="https://kueblaw.ch" target="_blank">kueblaw.ch</a></p>"#,
            ),
            documents_label: "📚 Wissensgrundlagen",
            documents_heading: "📚 Wissensgrundlagen",
            documents_intro: "Verwalten Sie die Dokumente in Ihrer Wissensdatenbank",
            model: Model::Gemini25Pro,
            prompt_editor: true,
            duplicates_view: false,
            own_uploads_view: true,
            post_delete_wait: POST_DELETE_WAIT,
            default_system_prompt: Some(DEFAULT_SYSTEM_PROMPT),
        }
    }
}
