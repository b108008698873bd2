use std::collections::HashMap;
use std::sync::Arc;

use crate::model::taxonomy::Lineage;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneMapping {
    pub lineage: Arc<Lineage>,
    /// Alignment identity in [0, 1].
    pub identity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gene {
    pub id: String,
    pub contig: usize,
    pub mapping: Option<GeneMapping>,
}

impl Gene {
    pub fn is_mapped(&self) -> bool {
        self.mapping.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    pub id: String,
    pub genes: Vec<usize>,
}

/// Gene set of one genome as handed over by the calling/alignment step.
///
/// Unmapped genes are present only when the caller knows their ids; the
/// called-gene total is carried separately in `n_genes_called`.
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    pub id: String,
    pub n_genes_called: usize,
    pub contigs: Vec<Contig>,
    pub genes: Vec<Gene>,
}

impl Genome {
    pub fn mapped_genes(&self) -> impl Iterator<Item = (usize, &Gene, &GeneMapping)> {
        self.genes
            .iter()
            .enumerate()
            .filter_map(|(idx, gene)| gene.mapping.as_ref().map(|m| (idx, gene, m)))
    }

    pub fn n_genes_mapped(&self) -> usize {
        self.genes.iter().filter(|g| g.is_mapped()).count()
    }

    pub fn n_contigs(&self) -> usize {
        self.contigs
            .iter()
            .filter(|c| c.genes.iter().any(|&g| self.genes[g].is_mapped()))
            .count()
    }
}

/// Collects genes in arrival order and interns their contigs.
#[derive(Debug)]
pub struct GenomeBuilder {
    id: String,
    n_genes_called: usize,
    contigs: Vec<Contig>,
    contig_index: HashMap<String, usize>,
    genes: Vec<Gene>,
}

impl GenomeBuilder {
    pub fn new(id: impl Into<String>, n_genes_called: usize) -> Self {
        Self {
            id: id.into(),
            n_genes_called,
            contigs: Vec::new(),
            contig_index: HashMap::new(),
            genes: Vec::new(),
        }
    }

    pub fn push_gene(
        &mut self,
        gene_id: impl Into<String>,
        contig_id: &str,
        mapping: Option<GeneMapping>,
    ) -> &mut Self {
        let contig = match self.contig_index.get(contig_id) {
            Some(&idx) => idx,
            None => {
                let idx = self.contigs.len();
                self.contigs.push(Contig {
                    id: contig_id.to_string(),
                    genes: Vec::new(),
                });
                self.contig_index.insert(contig_id.to_string(), idx);
                idx
            }
        };
        let gene_idx = self.genes.len();
        self.contigs[contig].genes.push(gene_idx);
        self.genes.push(Gene {
            id: gene_id.into(),
            contig,
            mapping,
        });
        self
    }

    pub fn build(self) -> Genome {
        Genome {
            id: self.id,
            n_genes_called: self.n_genes_called,
            contigs: self.contigs,
            genes: self.genes,
        }
    }
}
