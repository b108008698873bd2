use std::collections::BTreeMap;

use super::*;
use crate::model::taxonomy::TaxonomicLevel;

fn table(counts: &[(&str, usize)]) -> CladeTable {
    let mut clades = BTreeMap::new();
    let mut next = 0usize;
    for &(label, count) in counts {
        let bucket = CladeBucket {
            genes: (next..next + count).collect(),
            contigs: Default::default(),
            identity_sum: count as f64,
        };
        next += count;
        clades.insert(label.to_string(), bucket);
    }
    CladeTable {
        level: TaxonomicLevel::Genus,
        n_genes_mapped: next,
        clades,
    }
}

#[test]
fn test_share_at_threshold_is_dropped() {
    let t = table(&[("A", 97), ("B", 2), ("C", 1)]);
    let retained = filter_major_clades(&t, 200, AbundanceCutoff::Fraction(0.02));
    assert_eq!(retained.clades.len(), 1);
    assert_eq!(retained.clades[0].label, "A");
    assert_eq!(retained.n_genes_retained, 97);
    assert!((retained.proportion_genes_retained_in_major_clades - 0.97).abs() < 1e-12);
    assert!((retained.genes_retained_index - 0.485).abs() < 1e-12);
}

#[test]
fn test_gene_count_cutoff_is_strict() {
    let t = table(&[("A", 500), ("B", 11), ("C", 10)]);
    let retained = filter_major_clades(&t, 521, AbundanceCutoff::GeneCount(10));
    assert_eq!(retained.counts(), vec![500, 11]);
}

#[test]
fn test_gene_clades_follow_clade_order() {
    let t = table(&[("A", 2), ("B", 3)]);
    let retained = filter_major_clades(&t, 5, AbundanceCutoff::Fraction(0.02));
    let pairs = retained.gene_clades().collect::<Vec<_>>();
    assert_eq!(pairs, vec![(0, 0), (1, 0), (2, 1), (3, 1), (4, 1)]);
}

#[test]
fn test_empty_table_retains_nothing() {
    let t = table(&[]);
    let retained = filter_major_clades(&t, 50, AbundanceCutoff::Fraction(0.02));
    assert!(retained.clades.is_empty());
    assert_eq!(retained.proportion_genes_retained_in_major_clades, 0.0);
    assert_eq!(retained.genes_retained_index, 0.0);
}

#[test]
fn test_retained_index_is_retained_over_called() {
    let mut counts = vec![("A".to_string(), 40)];
    counts.extend((0..20).map(|i| (format!("S{i:02}"), 1)));
    let counts = counts
        .iter()
        .map(|(label, n)| (label.as_str(), *n))
        .collect::<Vec<_>>();
    let t = table(&counts);
    let retained = filter_major_clades(&t, 100, AbundanceCutoff::Fraction(0.02));
    assert_eq!(retained.n_genes_retained, 40);
    assert_eq!(retained.genes_retained_index, 0.4);
}
