// Expected values follow the completeness score of the published GUNC method,
// I(contig; clade) / H(clade) with natural logarithms, worked out by hand.

use std::sync::Arc;

use super::*;
use crate::model::genome::{GeneMapping, GenomeBuilder};
use crate::model::taxonomy::{Lineage, TaxonomicLevel};
use crate::model::thresholds::AbundanceCutoff;
use crate::pipeline::stage1_aggregate::aggregate_clades;
use crate::pipeline::stage2_filter::filter_major_clades;

fn genus(label: &str) -> Option<GeneMapping> {
    let mut lineage = Lineage::new();
    for (level, l) in TaxonomicLevel::ALL
        .iter()
        .zip(["Bacteria", "P", "C", "O", "F", label])
    {
        lineage.set(*level, l);
    }
    Some(GeneMapping {
        lineage: Arc::new(lineage),
        identity: 1.0,
    })
}

/// `layout` lists (contig, genus, gene count).
fn genome(n_called: usize, layout: &[(&str, &str, usize)]) -> Genome {
    let mut builder = GenomeBuilder::new("g", n_called);
    for &(contig, label, count) in layout {
        for i in 0..count {
            builder.push_gene(format!("{contig}_{i}"), contig, genus(label));
        }
    }
    builder.build()
}

fn params(null_model: bool) -> SeparationParams {
    SeparationParams {
        min_genes_retained_index: 0.4,
        null_model,
    }
}

fn separation(genome: &Genome, null_model: bool) -> SeparationScores {
    let table = aggregate_clades(genome, TaxonomicLevel::Genus).unwrap();
    let retained = filter_major_clades(&table, genome.n_genes_called, AbundanceCutoff::Fraction(0.02));
    score_separation(genome, &retained, params(null_model))
}

#[test]
fn test_clades_on_separate_contigs() {
    let pairs = [(0, 0), (0, 0), (1, 1), (1, 1)];
    assert!((clade_separation_score(&pairs) - 1.0).abs() < 1e-12);
}

#[test]
fn test_fully_mixed_contigs() {
    let pairs = [(0, 0), (0, 1), (1, 0), (1, 1)];
    assert!(clade_separation_score(&pairs).abs() < 1e-12);
}

#[test]
fn test_partially_mixed_contigs() {
    // H(clade) = 0.562335, H(clade | contig) = ln(2) / 2
    let pairs = [(0, 0), (0, 0), (1, 0), (1, 1)];
    assert!((clade_separation_score(&pairs) - 0.383_688_5).abs() < 1e-6);
}

#[test]
fn test_degenerate_inputs() {
    assert_eq!(clade_separation_score(&[]), 0.0);
    assert_eq!(clade_separation_score(&[(3, 0)]), 1.0);
    assert_eq!(clade_separation_score(&[(0, 0), (1, 0), (2, 0)]), 1.0);
}

#[test]
fn test_score_is_order_independent() {
    let a = [(0, 0), (0, 1), (1, 1), (2, 0), (2, 0)];
    let mut b = a;
    b.reverse();
    assert_eq!(clade_separation_score(&a), clade_separation_score(&b));
}

#[test]
fn test_low_retained_index_forces_zero() {
    let low = separation(&genome(100, &[("c1", "A", 39)]), false);
    assert_eq!(low.raw, 1.0);
    assert_eq!(low.clade_separation_score, 0.0);

    let boundary = separation(&genome(100, &[("c1", "A", 40)]), false);
    assert_eq!(boundary.clade_separation_score, 1.0);
}

#[test]
fn test_null_model_absent_unless_requested() {
    let g = genome(100, &[("c1", "A", 50), ("c2", "B", 50)]);
    assert!(separation(&g, false).null_model.is_none());
}

#[test]
fn test_null_model_on_long_contigs() {
    let g = genome(100, &[("c1", "A", 50), ("c2", "B", 50)]);
    let scores = separation(&g, true);
    let null = scores.null_model.unwrap();
    assert!((null.mean_random_clade_separation_score - 0.014_575).abs() < 1e-5);
    assert_eq!(null.clade_separation_score_adjusted, 1.0);
}

#[test]
fn test_null_model_on_singleton_contigs() {
    let layout = (0..20)
        .map(|i| (format!("c{i}"), if i % 2 == 0 { "A" } else { "B" }))
        .collect::<Vec<_>>();
    let layout = layout
        .iter()
        .map(|(c, l)| (c.as_str(), *l, 1))
        .collect::<Vec<_>>();
    let scores = separation(&genome(20, &layout), true);
    let null = scores.null_model.unwrap();
    assert_eq!(scores.clade_separation_score, 1.0);
    assert!((null.mean_random_clade_separation_score - 1.0).abs() < 1e-12);
    assert_eq!(null.clade_separation_score_adjusted, 0.0);
}

#[test]
fn test_expected_entropy_of_two_draws() {
    let h = expected_entropy_estimate(&[0.5, 0.5], 2);
    assert!((h - std::f64::consts::LN_2 / 2.0).abs() < 1e-12);
    assert_eq!(expected_entropy_estimate(&[0.5, 0.5], 1), 0.0);
}
