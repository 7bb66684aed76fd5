use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info};

use crate::model::{analyze, MatchAnalysis, MatchInput, PerEvent, TeamInput};
use crate::report::document;

#[derive(Clone)]
pub struct AppState {
    /// Form values used when a query parameter is missing.
    pub defaults: MatchInput,
    /// Logo bytes embedded in every generated report.
    pub logo: Option<Vec<u8>>,
}

/// Build the Axum router for the dashboard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/defaults", get(defaults_handler))
        .route("/api/analysis", get(analysis_handler))
        .route("/api/report.pdf", get(report_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Query string accepted by the analysis and report endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    pub team_a: Option<String>,
    pub matches_a: Option<u32>,
    pub shots_a: Option<f64>,
    pub corners_a: Option<f64>,
    pub cards_a: Option<f64>,
    pub goals_a: Option<f64>,
    pub team_b: Option<String>,
    pub matches_b: Option<u32>,
    pub shots_b: Option<f64>,
    pub corners_b: Option<f64>,
    pub cards_b: Option<f64>,
    pub goals_b: Option<f64>,
}

impl AnalysisQuery {
    /// Overlay the supplied fields on `defaults`.
    pub fn into_input(self, defaults: &MatchInput) -> MatchInput {
        let team = |base: &TeamInput,
                    name: Option<String>,
                    matches: Option<u32>,
                    rates: [Option<f64>; 4],
                    fallback: &str| {
            TeamInput {
                name: name.unwrap_or_else(|| base.name.clone()),
                sample_size: matches.unwrap_or(base.sample_size),
                rates: PerEvent {
                    shots: rates[0].unwrap_or(base.rates.shots),
                    corners: rates[1].unwrap_or(base.rates.corners),
                    cards: rates[2].unwrap_or(base.rates.cards),
                    goals: rates[3].unwrap_or(base.rates.goals),
                },
            }
            .normalized(fallback)
        };
        MatchInput {
            team_a: team(
                &defaults.team_a,
                self.team_a,
                self.matches_a,
                [self.shots_a, self.corners_a, self.cards_a, self.goals_a],
                "Team A",
            ),
            team_b: team(
                &defaults.team_b,
                self.team_b,
                self.matches_b,
                [self.shots_b, self.corners_b, self.cards_b, self.goals_b],
                "Team B",
            ),
        }
    }
}

fn run_analysis(
    state: &AppState,
    query: AnalysisQuery,
) -> Result<MatchAnalysis, (StatusCode, String)> {
    let input = query.into_input(&state.defaults);
    analyze(&input).map_err(|e| {
        debug!("Rejected dashboard input: {}", e);
        (StatusCode::BAD_REQUEST, e.to_string())
    })
}

/// Serve the dashboard HTML page.
async fn index_handler() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

/// GET /api/defaults
async fn defaults_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.defaults.clone())
}

/// GET /api/analysis?team_a=..&goals_a=..
async fn analysis_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalysisQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    run_analysis(&state, query).map(Json)
}

/// GET /api/report.pdf?team_a=..&goals_a=..
async fn report_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalysisQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let analysis = run_analysis(&state, query)?;
    let file_name = document::file_name(&analysis);
    let pdf = document::render(&analysis, state.logo.as_deref()).map_err(|e| {
        error!("Failed to render PDF report {}: {}", file_name, e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    info!("Generated PDF report {} ({} bytes)", file_name, pdf.len());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        pdf,
    ))
}

/// Embedded single-file dashboard (HTML + CSS + JS)
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>GolPRO v2.0 Dashboard</title>
<style>
  :root {
    --gold: #C9A516;
    --royal: #1F3A93;
    --bg: #f8f9fb;
    --card: #ffffff;
    --border: #e6e6e6;
    --muted: #6b6b6b;
    --text: #111111;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { display: flex; align-items: center; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); background: var(--card); }
  header h1 { font-size: 1.4rem; font-weight: 700; color: var(--gold); }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; }
  h2 { color: var(--gold); font-size: 1.1rem; margin-bottom: .6rem; }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1rem 1.2rem; }
  .two-col { display: grid; grid-template-columns: 1fr 1fr; gap: 1.5rem; }
  @media (max-width: 768px) { .two-col { grid-template-columns: 1fr; } }
  label { display: block; font-size: .8rem; color: var(--muted); margin-top: .5rem; }
  input { width: 100%; padding: .35rem .5rem; border: 1px solid var(--border); border-radius: 6px; }
  .actions { display: flex; gap: 1rem; align-items: center; }
  button, a.btn { background: var(--royal); color: #fff; border: 2px solid var(--gold); border-radius: 8px; padding: .45rem .8rem; font-weight: 700; cursor: pointer; text-decoration: none; font-size: .9rem; }
  button:hover, a.btn:hover { background: var(--gold); color: #000; }
  .error { color: #E04848; font-weight: 600; }
  .muted { color: var(--muted); font-size: .8rem; }
  .bar-row { display: flex; align-items: center; gap: .6rem; margin: .3rem 0; }
  .bar-label { width: 80px; font-size: .85rem; }
  .bar-track { flex: 1; background: #eef0f5; border-radius: 4px; height: 18px; }
  .bar { height: 18px; border-radius: 4px; transition: width .6s ease-in-out; }
  .bar-value { width: 70px; text-align: right; font-size: .85rem; }
  table { width: 100%; border-collapse: collapse; margin-bottom: 1rem; }
  th { background: var(--royal); color: #fff; padding: .4rem .6rem; text-align: left; font-size: .75rem; }
  td { padding: .35rem .6rem; font-size: .85rem; border-bottom: 1px solid var(--border); }
  .insights { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; }
  .metric .value { font-size: 1.5rem; font-weight: 700; }
  .pos { color: #00a67e; }
  .neg { color: #E04848; }
</style>
</head>
<body>
<header>
  <h1>GolPRO v2.0 - Poisson match statistics</h1>
  <span style="margin-left:auto" class="muted" id="generated-at"></span>
</header>

<main>
  <form id="form" class="two-col">
    <div class="panel" id="form-a"></div>
    <div class="panel" id="form-b"></div>
  </form>
  <div class="actions">
    <button type="submit" form="form">Calculate</button>
    <a class="btn" id="pdf-link" href="/api/report.pdf">Download PDF report</a>
    <span class="error" id="error"></span>
  </div>
  <div class="muted" id="sample-note"></div>

  <div class="two-col">
    <div class="panel"><h2 id="chart-a-title">Team A</h2><div id="chart-a"></div></div>
    <div class="panel"><h2 id="chart-b-title">Team B</h2><div id="chart-b"></div></div>
  </div>
  <div class="muted">Each bar is the chance of the event happening at least once in the match, P(X &ge; 1).</div>

  <div class="panel">
    <h2>Quick insights (A - B, pp)</h2>
    <div class="insights" id="insights"></div>
  </div>

  <div class="panel">
    <h2>Exact (0 to 10) and cumulative probabilities</h2>
    <div id="tables"></div>
  </div>
</main>

<script>
function esc(s) {
  return String(s).replace(/[&<>"']/g, c =>
    ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' })[c]);
}

const EVENTS = [
  ['shots', 'Shots', '#1F3A93'],
  ['corners', 'Corners', '#C9A516'],
  ['cards', 'Cards', '#007ACC'],
  ['goals', 'Goals', '#E04848'],
];

function teamForm(side, team) {
  const rate = ([key, label]) =>
    `<label>${label} per match</label><input name="${key}_${side}" type="number" step="0.1" min="0" value="${team.rates[key]}">`;
  return `<h2>Team ${side.toUpperCase()}</h2>
    <label>Name</label><input name="team_${side}" value="${esc(team.name)}">
    <label>Matches used for the means</label><input name="matches_${side}" type="number" min="0" max="1000" value="${team.sample_size}">
    ${EVENTS.map(rate).join('')}`;
}

function query() {
  return new URLSearchParams(new FormData(document.getElementById('form'))).toString();
}

function bars(team) {
  return EVENTS.map(([key, label, color]) => {
    const v = team.at_least_one[key];
    return `<div class="bar-row"><span class="bar-label">${label}</span>
      <div class="bar-track"><div class="bar" style="width:${v}%;background:${color}"></div></div>
      <span class="bar-value">${v.toFixed(2)}%</span></div>`;
  }).join('');
}

function table(title, t) {
  const rows = t.rows.map(r =>
    `<tr><td>${r.k}</td><td>${r.exact.toFixed(4)}</td><td>${r.cumulative.toFixed(4)}</td></tr>`).join('');
  return `<h3>${esc(title)}</h3><table><thead><tr><th>k</th><th>P(X=k) (%)</th><th>P(X&le;k) (%)</th></tr></thead><tbody>${rows}</tbody></table>`;
}

function render(a) {
  document.getElementById('generated-at').textContent = 'Generated at ' + new Date(a.generated_at).toLocaleString();
  document.getElementById('chart-a-title').textContent = a.team_a.name;
  document.getElementById('chart-b-title').textContent = a.team_b.name;
  document.getElementById('chart-a').innerHTML = bars(a.team_a);
  document.getElementById('chart-b').innerHTML = bars(a.team_b);
  document.getElementById('sample-note').textContent =
    `Means based on ${a.team_a.sample_size} matches (${a.team_a.name}) and ${a.team_b.sample_size} matches (${a.team_b.name}). Larger samples give more reliable estimates.`;
  document.getElementById('insights').innerHTML = EVENTS.map(([key, label]) => {
    const v = a.insights[key];
    return `<div class="metric"><div class="muted">${label}</div><div class="value ${v >= 0 ? 'pos' : 'neg'}">${v.toFixed(2)} pp</div></div>`;
  }).join('');
  document.getElementById('tables').innerHTML = EVENTS.map(([key, label]) =>
    `<div class="two-col"><div>${table(label + ' - ' + a.team_a.name, a.team_a.tables[key])}</div>
     <div>${table(label + ' - ' + a.team_b.name, a.team_b.tables[key])}</div></div>`).join('');
}

async function calculate(ev) {
  if (ev) ev.preventDefault();
  const q = query();
  document.getElementById('pdf-link').href = '/api/report.pdf?' + q;
  const r = await fetch('/api/analysis?' + q);
  const err = document.getElementById('error');
  if (!r.ok) { err.textContent = await r.text(); return; }
  err.textContent = '';
  render(await r.json());
}

async function init() {
  const r = await fetch('/api/defaults');
  const d = await r.json();
  document.getElementById('form-a').innerHTML = teamForm('a', d.team_a);
  document.getElementById('form-b').innerHTML = teamForm('b', d.team_b);
  document.getElementById('form').addEventListener('submit', calculate);
  calculate();
}

init();
</script>
</body>
</html>
"#;
