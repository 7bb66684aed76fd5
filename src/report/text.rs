use crate::model::{EventType, MatchAnalysis, ProbabilityTable, TeamAnalysis};

/// Render the full analysis as plain-text tables for a terminal.
pub fn render(analysis: &MatchAnalysis) -> String {
    let mut out = String::new();
    let a = &analysis.team_a;
    let b = &analysis.team_b;

    out.push_str("Poisson probability tables (0-10) and cumulative\n");
    out.push_str(&format!(
        "Generated at: {}\n",
        analysis.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!(
        "Note: means are based on {} matches ({}) and {} matches ({}). \
         Larger samples give more reliable estimates.\n\n",
        a.sample_size, a.name, b.sample_size, b.name
    ));

    for event in EventType::ALL {
        for team in [a, b] {
            out.push_str(&format!("{} - {} (0-10 table)\n", event, team.name));
            let table = &team.tables[event];
            out.push_str(&render_table(table));
            let residual = table.truncation_residual();
            if residual >= 0.0001 {
                out.push_str(&format!("  P(X>10) = {:.4}% (beyond the table)\n", residual));
            }
            out.push('\n');
        }
    }

    out.push_str("Chance of at least one occurrence, P(X>=1)\n");
    for team in [a, b] {
        out.push_str(&render_at_least_one(team));
    }
    out.push('\n');

    out.push_str(&format!("Quick insights ({} - {}, pp)\n", a.name, b.name));
    for (event, pp) in analysis.insights.iter() {
        out.push_str(&format!("  {:<10} {:>8.2} pp\n", event.label(), pp));
    }
    out.push_str("pp = percentage points (difference between percentages)\n");
    out
}

/// One table: count, exact and cumulative percentages.
pub fn render_table(table: &ProbabilityTable) -> String {
    let mut out = format!("  {:>3}  {:>12}  {:>12}\n", "k", "P(X=k) (%)", "P(X<=k) (%)");
    for row in &table.rows {
        out.push_str(&format!(
            "  {:>3}  {:>12.4}  {:>12.4}\n",
            row.k, row.exact, row.cumulative
        ));
    }
    out
}

fn render_at_least_one(team: &TeamAnalysis) -> String {
    let mut out = format!("  {}\n", team.name);
    for (event, pct) in team.at_least_one.iter() {
        out.push_str(&format!("    {:<10} {:>6.2}%\n", event.label(), pct));
    }
    out
}
