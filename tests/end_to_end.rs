use std::sync::Arc;

use menu_braille::braille::{BLANK_CELL, glyph_units, symbol_table, to_ascii, wrap};
use menu_braille::settings::Settings;
use menu_braille::summarizer::Unavailable;
use menu_braille::{Converter, DocumentMode, Transliterator, metadata, server};

const MENU: &str = "Today's Specials\nTomato Soup - $5.50\nGrilled Cheese & Fries (vegan option) $9\n\nDesserts\nApple Pie #1 = 100% good!";

fn converter() -> Converter {
    Converter::with_summarizer(Settings::default(), Arc::new(Unavailable)).with_font(None)
}

#[tokio::test]
async fn glyph_units_track_lowercased_characters() {
    let transliterator = Transliterator::new(Unavailable);
    for text in ["", "Soup $5 Salad $3", MENU, "Crème brûlée €7 ¥800"] {
        let result = transliterator.translate(text, false).await;
        assert!(result.success);
        assert_eq!(
            glyph_units(text).len(),
            text.to_lowercase().chars().count()
        );
    }
}

#[test]
fn letters_and_digits_decode_to_tags() {
    let table = symbol_table();
    for letter in 'a'..='z' {
        assert_eq!(to_ascii(&letter.to_string()), format!("[{}]", letter.to_ascii_uppercase()));
        assert!(table.lookup(letter).is_some());
    }
    let digits = "1234567890";
    assert_eq!(to_ascii(digits), "[A][B][C][D][E][F][G][H][I][J]");
}

#[test]
fn wrapped_lines_stay_within_width() {
    let text = "Grilled halloumi with charred peppers and a lemon herb dressing \
                supercalifragilisticexpialidociously-seasoned fries";
    for line in wrap(text, 32).lines() {
        assert!(line.chars().count() <= 32 || !line.contains(' '), "{}", line);
    }
}

#[test]
fn every_source_line_becomes_a_paragraph() {
    for text in [MENU, "one", "a\n\n\nb", "   \nx"] {
        assert_eq!(
            wrap(text, 32).split("\n\n").count(),
            text.split('\n').count()
        );
    }
}

#[tokio::test]
async fn soup_and_salad_example() {
    let conversion = converter().convert("Soup $5 Salad $3", false, None).await;
    let result = conversion.result;
    assert_eq!(
        result.glyph_text,
        "⠎⠕⠥⠏⠀⠐⠎⠑⠀⠎⠁⠇⠁⠙⠀⠐⠎⠉"
    );
    assert_eq!(result.formatted_glyph_text.lines().count(), 1);
    assert!(!result.formatted_glyph_text.contains('\n'));
    assert!(result.glyph_text.contains(BLANK_CELL));
    assert_eq!(result.context_summary, None);
    let meta = metadata("Soup $5 Salad $3");
    assert_eq!(
        (meta.word_count, meta.character_count, meta.line_count),
        (4, 16, 1)
    );
    assert_eq!(conversion.metadata, meta);
}

#[tokio::test]
async fn side_by_side_html_has_balanced_sections() {
    let converter = converter();
    let conversion = converter.convert(MENU, false, None).await;
    let document = converter.export(
        MENU,
        &conversion.result,
        &menu_braille::ExportRequest {
            mode: Some(DocumentMode::SideBySide),
            format: Some(menu_braille::DocumentFormat::Html),
            ..Default::default()
        },
    );
    assert!(!document.failed);
    let html = String::from_utf8(document.bytes).expect("utf8");
    assert!(html.contains("Grilled Cheese &amp; Fries"));
    for table in html.split("<table>").skip(1) {
        let body = table.split("</table>").next().unwrap_or_default();
        let rows = body.matches("<tr").count() - 1;
        let braille_cells = body.matches("<td class=\"braille\">").count();
        assert_eq!(rows, braille_cells);
    }
}

#[tokio::test]
async fn http_service_round_trip() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = server::router(converter());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let base = format!("http://{}", addr);
    let client = reqwest::Client::new();

    let health: serde_json::Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .expect("health")
        .json()
        .await
        .expect("health json");
    assert_eq!(health["status"], "ok");

    let translated: serde_json::Value = client
        .post(format!("{}/translate", base))
        .json(&serde_json::json!({ "text": "Soup $5" }))
        .send()
        .await
        .expect("translate")
        .json()
        .await
        .expect("translate json");
    assert_eq!(translated["result"]["glyph_text"], "⠎⠕⠥⠏⠀⠐⠎⠑");
    assert_eq!(translated["result"]["ascii_text"], "[S][O][U][P] [?][E]");
    assert_eq!(translated["metadata"]["word_count"], 2);

    let response = client
        .post(format!("{}/document", base))
        .json(&serde_json::json!({
            "original_text": "Fish <fresh>",
            "format": "html",
            "mode": "side-by-side",
            "title": "Dinner"
        }))
        .send()
        .await
        .expect("document");
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
    assert_eq!(
        response.headers()["content-type"],
        "text/html; charset=utf-8"
    );
    let html = response.text().await.expect("html");
    assert!(html.contains("Fish &lt;fresh&gt;"));
    assert!(html.contains("<h2>Section 1</h2>"));

    let empty: serde_json::Value = client
        .post(format!("{}/translate", base))
        .json(&serde_json::json!({ "text": "" }))
        .send()
        .await
        .expect("translate empty")
        .json()
        .await
        .expect("translate empty json");
    assert_eq!(empty["result"]["success"], true);
    assert_eq!(empty["metadata"]["word_count"], 0);
    assert_eq!(empty["metadata"]["character_count"], 0);
    assert_eq!(empty["metadata"]["line_count"], 1);

    let bad = client
        .post(format!("{}/convert", base))
        .json(&serde_json::json!({ "title": "Dinner" }))
        .send()
        .await
        .expect("convert");
    assert_eq!(bad.status(), reqwest::StatusCode::BAD_REQUEST);
    let error: serde_json::Value = bad.json().await.expect("error json");
    assert_eq!(error["error"], "original_text is required");
}
