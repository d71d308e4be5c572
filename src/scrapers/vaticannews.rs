//! Vatican News "Evangelio de hoy" extractor.
//!
//! The page is rendered client-side, so this module only ever sees the HTML
//! produced by a browser. The template has no ids worth anchoring on; the
//! stable parts are a class containing `indicazioneLiturgica` for the season
//! label and `section.section--evidence` blocks whose `h2` names the reading.
//!
//! Inside a reading section the paragraphs are laid out as:
//!
//! ```text
//! p[0]  "Lectura del libro de Isaías"   (source line, ignored)
//! p[1]  "Isaías 25, 6-10"               (citation)
//! p[2..] reading text, possibly with empty spacer paragraphs
//! ```
//!
//! Anything that does not match leaves the corresponding field `None`.

use crate::models::{Lecturas, Reading};
use crate::utils::truncate_for_log;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

/// Title of the first-reading section.
pub const FIRST_READING_TITLE: &str = "Lectura del Día";
/// Title of the gospel section.
pub const GOSPEL_TITLE: &str = "Evangelio del Día";

static SEASON_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[class*="indicazioneLiturgica"]"#).unwrap());
static SECTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("section.section--evidence").unwrap());
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h2").unwrap());
static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Extract the season label and both readings from a rendered page.
///
/// Total over any input: malformed or unrelated HTML yields an empty
/// [`Lecturas`]. When a section title repeats, the first one in document
/// order is used.
#[instrument(level = "debug", skip_all, fields(bytes = html.len()))]
pub fn extract(html: &str) -> Lecturas {
    let document = Html::parse_document(html);

    let indicazione_liturgica = document
        .select(&SEASON_SELECTOR)
        .next()
        .map(|el| element_text(&el));

    let mut primera_lectura = None;
    let mut evangelio = None;

    for section in document.select(&SECTION_SELECTOR) {
        let title = section
            .select(&TITLE_SELECTOR)
            .map(|h| element_text(&h))
            .collect::<String>();

        let slot = match title.as_str() {
            FIRST_READING_TITLE => &mut primera_lectura,
            GOSPEL_TITLE => &mut evangelio,
            _ => {
                debug!(title = %truncate_for_log(&title, 80), "Ignoring unrelated evidence section");
                continue;
            }
        };

        if slot.is_some() {
            debug!(%title, "Duplicate reading section; keeping the first");
            continue;
        }
        *slot = Some(read_section(&section));
    }

    let lecturas = Lecturas {
        indicazione_liturgica,
        primera_lectura: primera_lectura.unwrap_or_default(),
        evangelio: evangelio.unwrap_or_default(),
    };
    debug!(empty = lecturas.is_empty(), "Extracted readings");
    lecturas
}

/// Citation and body of one reading section.
fn read_section(section: &ElementRef<'_>) -> Reading {
    let paragraphs: Vec<String> = section
        .select(&PARAGRAPH_SELECTOR)
        .map(|p| element_text(&p))
        .collect();

    if paragraphs.len() < 2 {
        debug!(count = paragraphs.len(), "Reading section without citation paragraph");
        return Reading::default();
    }

    let lectura = paragraphs[2..]
        .iter()
        .filter(|text| !text.is_empty())
        .join(" ");

    Reading {
        cita: Some(paragraphs[1].clone()),
        lectura: Some(lectura),
    }
}

/// Concatenated, trimmed text of an element and its descendants.
fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> String {
        format!("<!DOCTYPE html><html><head><title>t</title></head><body>{body}</body></html>")
    }

    fn section(title: &str, paragraphs: &[&str]) -> String {
        let ps: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
        format!(
            r#"<section class="section section--evidence"><div class="section__head"><h2>{title}</h2></div><div class="section__content">{ps}</div></section>"#
        )
    }

    #[test]
    fn test_first_reading_citation_and_body() {
        let html = page(&section(
            "Lectura del Día",
            &["info", "Isaías 25, 6-10", "En aquellos días...", "", "el Señor saciará..."],
        ));

        let lecturas = extract(&html);
        assert_eq!(lecturas.primera_lectura.cita.as_deref(), Some("Isaías 25, 6-10"));
        assert_eq!(
            lecturas.primera_lectura.lectura.as_deref(),
            Some("En aquellos días... el Señor saciará...")
        );
        assert_eq!(lecturas.evangelio, Reading::default());
    }

    #[test]
    fn test_gospel_section() {
        let html = page(&section(
            "Evangelio del Día",
            &[
                "Lectura del santo evangelio según san Mateo",
                "  Mateo 15, 29-37 ",
                "En aquel tiempo, Jesús llegó a la orilla del mar de Galilea.",
                "   ",
                "Subió al monte y se sentó.",
            ],
        ));

        let lecturas = extract(&html);
        assert_eq!(lecturas.evangelio.cita.as_deref(), Some("Mateo 15, 29-37"));
        assert_eq!(
            lecturas.evangelio.lectura.as_deref(),
            Some("En aquel tiempo, Jesús llegó a la orilla del mar de Galilea. Subió al monte y se sentó.")
        );
    }

    #[test]
    fn test_season_label_substring_class_match() {
        let html = page(
            r#"<div class="header"><span class="titolo indicazioneLiturgica--it">  Miércoles de la I semana de Adviento </span></div>
               <p class="indicazioneLiturgica">second</p>"#,
        );

        let lecturas = extract(&html);
        assert_eq!(
            lecturas.indicazione_liturgica.as_deref(),
            Some("Miércoles de la I semana de Adviento")
        );
    }

    #[test]
    fn test_season_label_class_match_is_case_sensitive() {
        let html = page(r#"<span class="IndicazioneLiturgica">Adviento</span>"#);
        assert_eq!(extract(&html).indicazione_liturgica, None);
    }

    #[test]
    fn test_no_matching_sections_yields_empty_result() {
        let html = page("<main><h1>Página rediseñada</h1><p>Nada que ver aquí</p></main>");
        let lecturas = extract(&html);
        assert!(lecturas.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_section_with_too_few_paragraphs_yields_nulls() {
        let html = page(&section("Lectura del Día", &["solo info"]));
        assert_eq!(extract(&html).primera_lectura, Reading::default());
    }

    #[test]
    fn test_citation_without_body_paragraphs() {
        let html = page(&section("Lectura del Día", &["info", "Romanos 8, 1-4"]));
        let reading = extract(&html).primera_lectura;
        assert_eq!(reading.cita.as_deref(), Some("Romanos 8, 1-4"));
        assert_eq!(reading.lectura.as_deref(), Some(""));
    }

    #[test]
    fn test_title_must_match_exactly() {
        let html = page(&format!(
            "{}{}",
            section("Lectura del día", &["info", "x", "y"]),
            section("Segunda Lectura del Día", &["info", "x", "y"])
        ));
        assert!(extract(&html).is_empty());
    }

    #[test]
    fn test_plain_section_without_evidence_class_is_ignored() {
        let html = page(r#"<section class="section"><h2>Lectura del Día</h2><p>a</p><p>b</p></section>"#);
        assert!(extract(&html).is_empty());
    }

    #[test]
    fn test_first_duplicate_section_wins() {
        let html = page(&format!(
            "{}{}",
            section("Evangelio del Día", &["info", "Juan 1, 1-5", "Al principio"]),
            section("Evangelio del Día", &["info", "Lucas 2, 1-14", "Por aquellos días"])
        ));

        let gospel = extract(&html).evangelio;
        assert_eq!(gospel.cita.as_deref(), Some("Juan 1, 1-5"));
        assert_eq!(gospel.lectura.as_deref(), Some("Al principio"));
    }

    #[test]
    fn test_both_readings_and_unrelated_sections() {
        let html = page(&format!(
            r#"<div class="indicazioneLiturgica">Tiempo Ordinario</div>{}{}{}"#,
            section("Palabras del Papa", &["a", "b", "c"]),
            section("Lectura del Día", &["info", "Isaías 25, 6-10", "Texto uno"]),
            section("Evangelio del Día", &["info", "Mateo 15, 29-37", "Texto dos"])
        ));

        let lecturas = extract(&html);
        assert_eq!(lecturas.indicazione_liturgica.as_deref(), Some("Tiempo Ordinario"));
        assert_eq!(lecturas.primera_lectura.lectura.as_deref(), Some("Texto uno"));
        assert_eq!(lecturas.evangelio.lectura.as_deref(), Some("Texto dos"));
    }

    #[test]
    fn test_paragraph_text_includes_inline_markup() {
        let html = page(&section(
            "Lectura del Día",
            &["info", "<b>Isaías</b> 25, 6-10", "En <em>aquellos</em> días"],
        ));

        let reading = extract(&html).primera_lectura;
        assert_eq!(reading.cita.as_deref(), Some("Isaías 25, 6-10"));
        assert_eq!(reading.lectura.as_deref(), Some("En aquellos días"));
    }

    #[test]
    fn test_extract_is_deterministic() {
        let html = page(&section(
            "Lectura del Día",
            &["info", "Isaías 25, 6-10", "En aquellos días..."],
        ));
        let first = serde_json::to_string(&extract(&html)).unwrap();
        let second = serde_json::to_string(&extract(&html)).unwrap();
        assert_eq!(first, second);
    }
}
