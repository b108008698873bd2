use crate::model::thresholds::AbundanceCutoff;
use crate::pipeline::stage1_aggregate::{CladeBucket, CladeTable};

#[derive(Debug, Clone, PartialEq)]
pub struct MajorClade<'a> {
    pub label: &'a str,
    pub bucket: &'a CladeBucket,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetainedGenes<'a> {
    /// Major clades in label order.
    pub clades: Vec<MajorClade<'a>>,
    pub n_genes_retained: usize,
    pub proportion_genes_retained_in_major_clades: f64,
    pub genes_retained_index: f64,
}

impl RetainedGenes<'_> {
    pub fn counts(&self) -> Vec<usize> {
        self.clades.iter().map(|c| c.bucket.gene_count()).collect()
    }

    /// Retained gene indices with the position of their clade in `clades`.
    pub fn gene_clades(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.clades
            .iter()
            .enumerate()
            .flat_map(|(clade, c)| c.bucket.genes.iter().map(move |&g| (g, clade)))
    }
}

pub fn filter_major_clades<'a>(
    table: &'a CladeTable,
    n_genes_called: usize,
    cutoff: AbundanceCutoff,
) -> RetainedGenes<'a> {
    let n_genes_mapped = table.n_genes_mapped;
    let clades = table
        .clades
        .iter()
        .filter(|(_, bucket)| cutoff.is_major(bucket.gene_count(), n_genes_mapped))
        .map(|(label, bucket)| MajorClade {
            label: label.as_str(),
            bucket,
        })
        .collect::<Vec<_>>();
    let n_genes_retained = clades.iter().map(|c| c.bucket.gene_count()).sum::<usize>();

    let proportion = if n_genes_mapped > 0 {
        n_genes_retained as f64 / n_genes_mapped as f64
    } else {
        0.0
    };
    // mapped/called * retained/mapped, with a single rounding
    let genes_retained_index = if n_genes_called > 0 {
        n_genes_retained as f64 / n_genes_called as f64
    } else {
        0.0
    };

    RetainedGenes {
        clades,
        n_genes_retained,
        proportion_genes_retained_in_major_clades: proportion,
        genes_retained_index,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_filter.rs"]
mod tests;
