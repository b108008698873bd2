use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::model::issues::RowIssue;
use crate::model::scores::NullModelScores;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> std::path::PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_chimeraqc_report_test_{}_{}", std::process::id(), id));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn row(genome: &str, level: TaxonomicLevel, css: f64) -> ScoreRow {
    let mut row = ScoreRow::zeroed(genome, level, 1200, 1100, 14);
    row.proportion_genes_retained_in_major_clades = 0.98;
    row.genes_retained_index = 0.9;
    row.clade_separation_score = css;
    row.mean_hit_identity = 0.912345678;
    row.pass = css > 0.45;
    row
}

fn genomes() -> Vec<GenomeScores> {
    vec![
        GenomeScores {
            genome: "bin.1".to_string(),
            outcomes: vec![
                LevelOutcome::Scored(row("bin.1", TaxonomicLevel::Kingdom, 0.0)),
                LevelOutcome::Scored(row("bin.1", TaxonomicLevel::Phylum, 0.8)),
                LevelOutcome::Failed {
                    genome: "bin.1".to_string(),
                    level: TaxonomicLevel::Class,
                    issue: RowIssue::LineageInconsistency {
                        level: TaxonomicLevel::Class,
                        gene: "c1_4".to_string(),
                        detail: "no class label in lineage".to_string(),
                    },
                },
            ],
        },
        GenomeScores {
            genome: "bin.2".to_string(),
            outcomes: [
                TaxonomicLevel::Kingdom,
                TaxonomicLevel::Phylum,
                TaxonomicLevel::Class,
            ]
            .into_iter()
            .map(|level| LevelOutcome::Degraded {
                row: ScoreRow::zeroed("bin.2", level, 0, 0, 0),
                issue: RowIssue::MissingInput("no genes called".to_string()),
            })
            .collect(),
        },
    ]
}

fn profile() -> ThresholdProfile {
    let mut profile = ThresholdProfile::default_v1();
    profile.levels = vec![
        TaxonomicLevel::Kingdom,
        TaxonomicLevel::Phylum,
        TaxonomicLevel::Class,
    ];
    profile
}

#[test]
fn test_scores_tsv_layout() {
    let mut out = Vec::new();
    write_scores_tsv(&genomes(), false, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines = text.lines().collect::<Vec<_>>();

    assert_eq!(lines[0].split('\t').collect::<Vec<_>>(), SCORE_COLUMNS.to_vec());
    // failed level has no row, degraded levels do
    assert_eq!(lines.len(), 1 + 2 + 3);
    assert_eq!(
        lines[2],
        "bin.1\t1200\t1100\t14\tphylum\t0.980000\t0.900000\t0.800000\t0.000000\t0.000000\t0.912346\t0.000000\tTrue"
    );
    assert!(lines[3].starts_with("bin.2\t0\t0\t0\tkingdom\t"));
    assert!(lines[3].ends_with("\tFalse"));
}

#[test]
fn test_null_model_columns() {
    let mut with_null = row("bin.3", TaxonomicLevel::Genus, 0.7);
    with_null.null_model = Some(NullModelScores {
        mean_random_clade_separation_score: 0.25,
        clade_separation_score_adjusted: 0.7,
    });
    let genomes = vec![GenomeScores {
        genome: "bin.3".to_string(),
        outcomes: vec![
            LevelOutcome::Scored(with_null),
            LevelOutcome::Degraded {
                row: ScoreRow::zeroed("bin.3", TaxonomicLevel::Species, 20, 0, 0),
                issue: RowIssue::MissingInput("x".to_string()),
            },
        ],
    }];
    let mut out = Vec::new();
    write_scores_tsv(&genomes, true, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines = text.lines().collect::<Vec<_>>();

    assert_eq!(lines[0].split('\t').count(), 15);
    assert!(lines[0].ends_with("mean_random_clade_separation_score\tclade_separation_score_adjusted"));
    assert!(lines[1].ends_with("\tTrue\t0.250000\t0.700000"));
    assert!(lines[2].ends_with("\tFalse\tNA\tNA"));
}

#[test]
fn test_failures_tsv_lists_every_issue() {
    let mut out = Vec::new();
    write_failures_tsv(&genomes(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines = text.lines().collect::<Vec<_>>();

    assert_eq!(lines[0], "genome\ttaxonomic_level\tkind\tdetail");
    assert_eq!(lines.len(), 1 + 1 + 3);
    assert_eq!(
        lines[1],
        "bin.1\tclass\tLineageInconsistency\tgene c1_4: no class label in lineage"
    );
    assert_eq!(lines[2], "bin.2\tkingdom\tMissingInput\tno genes called");
}

#[test]
fn test_genome_summary_reports_max_level() {
    let scores = genomes();
    let summary = summarize_genome(&scores[0]);
    assert_eq!(summary.max_css_level, Some(TaxonomicLevel::Phylum));
    assert_eq!(summary.max_css, 0.8);
    assert_eq!(summary.levels_scored, 2);
    assert_eq!(summary.failures, 1);
    assert!(!summary.pass_all_levels);
    assert!(summary.missing_input.is_none());

    let missing = summarize_genome(&scores[1]);
    assert_eq!(missing.max_css_level, Some(TaxonomicLevel::Kingdom));
    assert_eq!(missing.missing_input.as_deref(), Some("no genes called"));
}

#[test]
fn test_level_summary() {
    let scores = genomes();
    let class = summarize_level(&scores, TaxonomicLevel::Class);
    assert_eq!(class.n_rows, 1);
    assert_eq!(class.n_failed, 1);

    let phylum = summarize_level(&scores, TaxonomicLevel::Phylum);
    assert_eq!(phylum.n_rows, 2);
    assert_eq!(phylum.css_median, 0.8);
    assert_eq!(phylum.pass_fraction, 0.5);
}

#[test]
fn test_write_reports_creates_all_files() {
    let dir = make_temp_dir().join("out");
    let scores = genomes();
    let profile = profile();
    let input = Stage7Input {
        genomes: &scores,
        profile: &profile,
        tool_name: "kira-chimeraqc".to_string(),
        tool_version: "0.0.0".to_string(),
        git_hash: None,
    };
    write_reports(&input, &dir).unwrap();

    for name in [SCORES_FILE, FAILURES_FILE, SUMMARY_FILE, REPORT_FILE] {
        assert!(dir.join(name).exists(), "{name} missing");
    }

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join(SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(json["n_genomes"], 2);
    assert_eq!(json["n_rows"], 5);
    assert_eq!(json["n_failures"], 4);
    assert_eq!(json["tool"]["name"], "kira-chimeraqc");
    assert_eq!(json["config"]["pass_cutoff"], 0.45);
    assert_eq!(json["levels"].as_array().unwrap().len(), 3);
    assert_eq!(json["genomes"][0]["max_css_level"], "phylum");

    let report = std::fs::read_to_string(dir.join(REPORT_FILE)).unwrap();
    assert!(report.contains("bin.1: max_css=0.800000 at phylum"));
    assert!(report.contains("missing input: no genes called"));
}
