//! Lays the match analysis out as a paginated PDF report.

use tracing::{debug, warn};

use super::chart::BarChart;
use super::pdf::{Document, Font, Image, ImageRef, Page, PdfError, Rgb, A4_LANDSCAPE};
use crate::model::{EventType, MatchAnalysis, ProbabilityTable, TeamAnalysis};

pub const REPORT_TITLE: &str = "GolPRO v2.0 - Report";

const MARGIN: f32 = 36.0;
const ROW_HEIGHT: f32 = 13.0;
const TABLE_GAP: f32 = 12.0;
const FOOTER_SUMMARY: &str = "Summary: per-event probabilities from the Poisson model. Use responsibly.";
const FOOTER_CREDITS: &str = "Developed by Juan Santos - Project started in 2025 - GolPRO v2.0";
const LOGO_SIZE: (f32, f32) = (120.0, 40.0);

fn royal_blue() -> Rgb {
    Rgb::hex(0x1f3a93)
}

/// Build the report: one page per team, then a comparison page.
///
/// `logo` is PNG or JPEG bytes shown in every page header. A logo that
/// cannot be decoded is skipped.
pub fn build(analysis: &MatchAnalysis, logo: Option<&[u8]>) -> Document {
    let mut doc = Document::new(REPORT_TITLE, A4_LANDSCAPE);
    let logo = logo.and_then(|bytes| match Image::decode(bytes) {
        Ok(image) => Some(doc.add_image(image)),
        Err(e) => {
            warn!("Logo could not be loaded, continuing without it: {}", e);
            None
        }
    });
    doc.add_page(team_page(analysis, &analysis.team_a, logo));
    doc.add_page(team_page(analysis, &analysis.team_b, logo));
    doc.add_page(comparison_page(analysis, logo));
    debug!("Report laid out on {} pages", doc.page_count());
    doc
}

/// Render the report to PDF bytes.
pub fn render(analysis: &MatchAnalysis, logo: Option<&[u8]>) -> Result<Vec<u8>, PdfError> {
    build(analysis, logo).to_bytes()
}

/// `GolPRO_Report_<A>_vs_<B>.pdf`, with unsafe characters replaced.
pub fn file_name(analysis: &MatchAnalysis) -> String {
    format!(
        "GolPRO_Report_{}_vs_{}.pdf",
        sanitize(&analysis.team_a.name),
        sanitize(&analysis.team_b.name)
    )
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// Title, timestamp and logo; returns the y coordinate below the header.
fn header(page: &mut Page, analysis: &MatchAnalysis, logo: Option<ImageRef>) -> f32 {
    let (width, height) = A4_LANDSCAPE;
    if let Some(logo) = logo {
        let (w, h) = LOGO_SIZE;
        page.image(logo, width - MARGIN - w, height - MARGIN - h, w, h);
    }
    let mut y = height - MARGIN - 12.0;
    page.text(Font::Bold, 18.0, royal_blue(), MARGIN, y, REPORT_TITLE);
    y -= 18.0;
    page.text(
        Font::Regular,
        10.0,
        Rgb::BLACK,
        MARGIN,
        y,
        &format!(
            "Generated at: {}",
            analysis.generated_at.format("%Y-%m-%d %H:%M:%S")
        ),
    );
    y - 20.0
}

fn footer(page: &mut Page) {
    page.text(Font::Regular, 9.0, Rgb::BLACK, MARGIN, MARGIN + 12.0, FOOTER_SUMMARY);
    page.text(
        Font::Regular,
        9.0,
        Rgb::GREY,
        MARGIN,
        MARGIN,
        FOOTER_CREDITS,
    );
}

fn team_page(analysis: &MatchAnalysis, team: &TeamAnalysis, logo: Option<ImageRef>) -> Page {
    let mut page = Page::new();
    let (width, _) = A4_LANDSCAPE;
    let mut y = header(&mut page, analysis, logo);

    page.text(
        Font::Bold,
        12.0,
        Rgb::BLACK,
        MARGIN,
        y,
        &format!("{} - matches used: {}", team.name, team.sample_size),
    );
    y -= 12.0;

    // A chart that cannot be built must not cost the tables.
    const CHART_HEIGHT: f32 = 150.0;
    match BarChart::at_least_one(team) {
        Ok(chart) => {
            chart.draw(&mut page, MARGIN, y - CHART_HEIGHT, 360.0, CHART_HEIGHT);
            y -= CHART_HEIGHT + 16.0;
        }
        Err(e) => {
            warn!("Chart for {} unavailable, continuing with tables only: {}", team.name, e);
        }
    }

    let column_width = (width - 2.0 * MARGIN - 3.0 * TABLE_GAP) / 4.0;
    for (i, event) in EventType::ALL.into_iter().enumerate() {
        let x = MARGIN + i as f32 * (column_width + TABLE_GAP);
        page.text(Font::Bold, 10.0, royal_blue(), x, y, event.label());
        table(&mut page, &team.tables[event], x, y - 6.0, column_width);
    }

    footer(&mut page);
    page
}

/// Draw a k / exact / cumulative table hanging down from `top`.
fn table(page: &mut Page, table: &ProbabilityTable, x: f32, top: f32, width: f32) {
    let widths = [width * 0.2, width * 0.4, width * 0.4];
    let header = ["k", "P(X=k) (%)", "P(X<=k) (%)"];

    let mut row_top = top;
    page.fill_rect(royal_blue(), x, row_top - ROW_HEIGHT, width, ROW_HEIGHT);
    cells(page, &header, &widths, x, row_top, Font::Bold, Rgb::WHITE);
    row_top -= ROW_HEIGHT;

    for row in &table.rows {
        let k = row.k.to_string();
        let exact = format!("{:.4}%", row.exact);
        let cumulative = format!("{:.4}%", row.cumulative);
        let values = [k.as_str(), exact.as_str(), cumulative.as_str()];
        cells(page, &values, &widths, x, row_top, Font::Regular, Rgb::BLACK);
        row_top -= ROW_HEIGHT;
    }

    // Grid
    let bottom = row_top;
    let mut line_y = top;
    while line_y >= bottom - 0.01 {
        page.line(Rgb::GREY, 0.25, (x, line_y), (x + width, line_y));
        line_y -= ROW_HEIGHT;
    }
    let mut line_x = x;
    page.line(Rgb::GREY, 0.25, (line_x, top), (line_x, bottom));
    for w in widths {
        line_x += w;
        page.line(Rgb::GREY, 0.25, (line_x, top), (line_x, bottom));
    }
}

fn cells(
    page: &mut Page,
    values: &[&str; 3],
    widths: &[f32; 3],
    x: f32,
    row_top: f32,
    font: Font,
    color: Rgb,
) {
    let mut cell_x = x;
    for (value, w) in values.iter().zip(widths) {
        page.text(font, 8.0, color, cell_x + 3.0, row_top - ROW_HEIGHT + 3.5, value);
        cell_x += w;
    }
}

fn comparison_page(analysis: &MatchAnalysis, logo: Option<ImageRef>) -> Page {
    let mut page = Page::new();
    let mut y = header(&mut page, analysis, logo);
    let a = &analysis.team_a;
    let b = &analysis.team_b;

    page.text(
        Font::Bold,
        12.0,
        Rgb::BLACK,
        MARGIN,
        y,
        &format!("Quick insights: {} vs {}", a.name, b.name),
    );
    y -= 20.0;

    let widths = [120.0, 160.0, 160.0, 160.0];
    let total: f32 = widths.iter().sum();
    let headers = [
        "Event".to_string(),
        format!("{} P(X>=1)", a.name),
        format!("{} P(X>=1)", b.name),
        "A - B (pp)".to_string(),
    ];
    page.fill_rect(royal_blue(), MARGIN, y - ROW_HEIGHT, total, ROW_HEIGHT);
    row(&mut page, &headers, &widths, y, Font::Bold, Rgb::WHITE);
    y -= ROW_HEIGHT;

    for event in EventType::ALL {
        let values = [
            event.label().to_string(),
            format!("{:.2}%", a.at_least_one[event]),
            format!("{:.2}%", b.at_least_one[event]),
            format!("{:+.2} pp", analysis.insights[event]),
        ];
        row(&mut page, &values, &widths, y, Font::Regular, Rgb::BLACK);
        page.line(Rgb::GREY, 0.25, (MARGIN, y - ROW_HEIGHT), (MARGIN + total, y - ROW_HEIGHT));
        y -= ROW_HEIGHT;
    }

    y -= 20.0;
    let notes = [
        "P(X=k): chance of exactly k occurrences.".to_string(),
        "P(X<=k): chance of at most k occurrences.".to_string(),
        "P(X>=1): chance of the event happening at least once in the match.".to_string(),
        format!(
            "Means based on {} matches ({}) and {} matches ({}).",
            a.sample_size, a.name, b.sample_size, b.name
        ),
        "pp = percentage points (difference between percentages).".to_string(),
    ];
    for note in &notes {
        page.text(Font::Regular, 9.0, Rgb::BLACK, MARGIN, y, note);
        y -= 13.0;
    }

    footer(&mut page);
    page
}

fn row(page: &mut Page, values: &[String; 4], widths: &[f32; 4], top: f32, font: Font, color: Rgb) {
    let mut x = MARGIN;
    for (value, w) in values.iter().zip(widths) {
        page.text(font, 9.0, color, x + 4.0, top - ROW_HEIGHT + 3.5, value);
        x += w;
    }
}
