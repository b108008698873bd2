use crate::report::{LevelSummary, SummaryData, format_f64_6};

pub fn render_report_text(data: &SummaryData) -> String {
    let mut out = String::new();

    out.push_str("Genome Chimerism & Contamination Report\n");
    out.push_str("=======================================\n\n");

    out.push_str("1. Run\n");
    out.push_str(&format!(
        "Tool: {} {}\n",
        data.tool.name, data.tool.version
    ));
    out.push_str(&format!(
        "Abundance cutoff: {}\n",
        data.config.abundance.describe()
    ));
    out.push_str(&format!(
        "Minimum genes_retained_index: {}\n",
        format_f64_6(data.config.min_genes_retained_index)
    ));
    out.push_str(&format!(
        "Pass cutoff (CSS >): {}\n",
        format_f64_6(data.config.pass_cutoff)
    ));
    out.push_str(&format!(
        "Genomes: {}, rows: {}, failures: {}\n\n",
        data.n_genomes, data.n_rows, data.n_failures
    ));

    out.push_str("2. Levels\n");
    for level in &data.levels {
        out.push_str(&format!(
            "{}: rows={} failed={} css_median={} css_p90={} contamination_median={} pass_fraction={}\n",
            level.level,
            level.n_rows,
            level.n_failed,
            format_f64_6(level.css_median),
            format_f64_6(level.css_p90),
            format_f64_6(level.contamination_median),
            format_f64_6(level.pass_fraction),
        ));
    }
    out.push_str(&format!("{}\n\n", separation_statement(&data.levels)));

    out.push_str("3. Genomes\n");
    for genome in &data.genomes {
        let level = genome
            .max_css_level
            .map(|l| l.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{}: max_css={} at {}; pass at all levels: {}\n",
            genome.genome,
            format_f64_6(genome.max_css),
            level,
            if genome.pass_all_levels { "yes" } else { "no" }
        ));
        if let Some(reason) = &genome.missing_input {
            out.push_str(&format!("  missing input: {}\n", reason));
        }
        if genome.failures > 0 {
            out.push_str(&format!("  failed levels: {}\n", genome.failures));
        }
    }

    out
}

fn separation_statement(levels: &[LevelSummary]) -> &'static str {
    let scored = levels.iter().filter(|l| l.n_rows > 0).collect::<Vec<_>>();
    if scored.is_empty() {
        "No level produced rows."
    } else if scored.iter().all(|l| l.pass_fraction >= 1.0) {
        "All genomes pass at every scored level."
    } else if scored.iter().all(|l| l.pass_fraction <= 0.0) {
        "No genome passes at any scored level."
    } else {
        "Pass rates differ across levels."
    }
}
