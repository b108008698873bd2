use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::model::scores::ScoreRow;
use crate::model::taxonomy::TaxonomicLevel;
use crate::model::thresholds::ThresholdProfile;
use crate::pipeline::{GenomeScores, LevelOutcome};
use crate::report::json::render_summary_json;
use crate::report::text::render_report_text;
use crate::report::{
    GenomeSummary, LevelSummary, SummaryData, ToolMeta, bool_fraction, format_bool, format_f64_6,
    median, p90,
};

pub const SCORES_FILE: &str = "chimerism_scores.tsv";
pub const FAILURES_FILE: &str = "failures.tsv";
pub const SUMMARY_FILE: &str = "summary.json";
pub const REPORT_FILE: &str = "report.txt";

const SCORE_COLUMNS: [&str; 13] = [
    "genome",
    "n_genes_called",
    "n_genes_mapped",
    "n_contigs",
    "taxonomic_level",
    "proportion_genes_retained_in_major_clades",
    "genes_retained_index",
    "clade_separation_score",
    "contamination_portion",
    "n_effective_surplus_clades",
    "mean_hit_identity",
    "reference_representation_score",
    "pass.GUNC",
];

const NULL_MODEL_COLUMNS: [&str; 2] = [
    "mean_random_clade_separation_score",
    "clade_separation_score_adjusted",
];

#[derive(Debug, Clone)]
pub struct Stage7Input<'a> {
    pub genomes: &'a [GenomeScores],
    pub profile: &'a ThresholdProfile,
    pub tool_name: String,
    pub tool_version: String,
    pub git_hash: Option<String>,
}

pub fn write_reports(input: &Stage7Input<'_>, out_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(out_dir)?;

    let mut w = BufWriter::new(File::create(out_dir.join(SCORES_FILE))?);
    write_scores_tsv(input.genomes, input.profile.null_model, &mut w)?;
    w.flush()?;

    let mut w = BufWriter::new(File::create(out_dir.join(FAILURES_FILE))?);
    write_failures_tsv(input.genomes, &mut w)?;
    w.flush()?;

    let summary = build_summary(input);
    let json = render_summary_json(&summary).map_err(io::Error::other)?;
    write_text(&out_dir.join(SUMMARY_FILE), &json)?;

    let report = render_report_text(&summary);
    write_text(&out_dir.join(REPORT_FILE), &report)?;

    tracing::info!(
        out_dir = %out_dir.display(),
        rows = summary.n_rows,
        failures = summary.n_failures,
        "reports written"
    );
    Ok(())
}

pub fn write_scores_tsv<W: Write>(
    genomes: &[GenomeScores],
    null_model: bool,
    w: &mut W,
) -> io::Result<()> {
    let mut header = SCORE_COLUMNS.join("\t");
    if null_model {
        for name in NULL_MODEL_COLUMNS {
            header.push('\t');
            header.push_str(name);
        }
    }
    writeln!(w, "{}", header)?;

    for row in genomes.iter().flat_map(GenomeScores::rows) {
        writeln!(w, "{}", format_row(row, null_model))?;
    }
    Ok(())
}

pub fn format_row(row: &ScoreRow, null_model: bool) -> String {
    let mut fields = vec![
        row.genome.clone(),
        row.n_genes_called.to_string(),
        row.n_genes_mapped.to_string(),
        row.n_contigs.to_string(),
        row.taxonomic_level.to_string(),
        format_f64_6(row.proportion_genes_retained_in_major_clades),
        format_f64_6(row.genes_retained_index),
        format_f64_6(row.clade_separation_score),
        format_f64_6(row.contamination_portion),
        format_f64_6(row.n_effective_surplus_clades),
        format_f64_6(row.mean_hit_identity),
        format_f64_6(row.reference_representation_score),
        format_bool(row.pass).to_string(),
    ];
    if null_model {
        match row.null_model {
            Some(nm) => {
                fields.push(format_f64_6(nm.mean_random_clade_separation_score));
                fields.push(format_f64_6(nm.clade_separation_score_adjusted));
            }
            None => {
                fields.push("NA".to_string());
                fields.push("NA".to_string());
            }
        }
    }
    fields.join("\t")
}

pub fn write_failures_tsv<W: Write>(genomes: &[GenomeScores], w: &mut W) -> io::Result<()> {
    writeln!(w, "genome\ttaxonomic_level\tkind\tdetail")?;
    for genome in genomes {
        for outcome in &genome.outcomes {
            if let Some(issue) = outcome.issue() {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}",
                    genome.genome,
                    outcome.level(),
                    issue.kind(),
                    sanitize_field(&issue.detail())
                )?;
            }
        }
    }
    Ok(())
}

fn build_summary(input: &Stage7Input<'_>) -> SummaryData {
    let genomes = input
        .genomes
        .iter()
        .map(summarize_genome)
        .collect::<Vec<_>>();
    let levels = input
        .profile
        .levels
        .iter()
        .map(|&level| summarize_level(input.genomes, level))
        .collect::<Vec<_>>();

    SummaryData {
        tool: ToolMeta {
            name: input.tool_name.clone(),
            version: input.tool_version.clone(),
            git_hash: input.git_hash.clone(),
        },
        config: input.profile.clone(),
        n_genomes: input.genomes.len(),
        n_rows: input.genomes.iter().map(|g| g.rows().count()).sum(),
        n_failures: input
            .genomes
            .iter()
            .flat_map(|g| &g.outcomes)
            .filter(|o| o.issue().is_some())
            .count(),
        levels,
        genomes,
    }
}

fn summarize_genome(scores: &GenomeScores) -> GenomeSummary {
    let missing_input = scores.outcomes.iter().find_map(|o| match o {
        LevelOutcome::Degraded { issue, .. } => Some(issue.detail()),
        _ => None,
    });

    // first level wins ties, so the coarsest level is reported
    let mut max: Option<(TaxonomicLevel, f64)> = None;
    for row in scores.rows() {
        if max.is_none_or(|(_, best)| row.clade_separation_score > best) {
            max = Some((row.taxonomic_level, row.clade_separation_score));
        }
    }

    GenomeSummary {
        genome: scores.genome.clone(),
        levels_scored: scores
            .outcomes
            .iter()
            .filter(|o| matches!(o, LevelOutcome::Scored(_)))
            .count(),
        failures: scores
            .outcomes
            .iter()
            .filter(|o| matches!(o, LevelOutcome::Failed { .. }))
            .count(),
        missing_input,
        max_css_level: max.map(|(level, _)| level),
        max_css: max.map(|(_, css)| css).unwrap_or(0.0),
        pass_all_levels: !scores.outcomes.is_empty()
            && scores
                .outcomes
                .iter()
                .all(|o| o.row().is_some_and(|r| r.pass)),
    }
}

fn summarize_level(genomes: &[GenomeScores], level: TaxonomicLevel) -> LevelSummary {
    let outcomes = genomes
        .iter()
        .flat_map(|g| &g.outcomes)
        .filter(|o| o.level() == level)
        .collect::<Vec<_>>();
    let rows = outcomes.iter().filter_map(|o| o.row()).collect::<Vec<_>>();

    let css = rows
        .iter()
        .map(|r| r.clade_separation_score)
        .collect::<Vec<_>>();
    let contamination = rows
        .iter()
        .map(|r| r.contamination_portion)
        .collect::<Vec<_>>();
    let gri = rows
        .iter()
        .map(|r| r.genes_retained_index)
        .collect::<Vec<_>>();
    let pass = rows.iter().map(|r| r.pass).collect::<Vec<_>>();

    LevelSummary {
        level,
        n_rows: rows.len(),
        n_failed: outcomes.len() - rows.len(),
        css_median: median(&css),
        css_p90: p90(&css),
        contamination_median: median(&contamination),
        genes_retained_index_median: median(&gri),
        pass_fraction: bool_fraction(&pass),
    }
}

fn sanitize_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

fn write_text(path: &Path, content: &str) -> io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(content.as_bytes())?;
    w.flush()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage7_report.rs"]
mod tests;
