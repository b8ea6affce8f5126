//! Keyword clustering of annotated genes
//!
//! Each gene carries a list of free-text annotation fields. A gene joins a
//! group when any of the group's keywords occurs, ignoring case, in the
//! concatenated text of its fields.

use derive_new::new;
use itertools::Itertools;
use log::{debug, info};

use crate::errors::Result;
use crate::membership::GroupMembership;

/// One annotated gene
#[derive(Debug, Clone, new)]
pub struct AnnotationRow {
    pub locus_tag: String,
    /// Annotation columns following the locus tag
    pub fields: Vec<String>,
}

impl AnnotationRow {
    /// Lower-cased text searched for keywords
    ///
    /// The locus tag and every field are stripped of trailing commas and
    /// joined by single spaces.
    pub fn match_text(&self) -> String {
        std::iter::once(self.locus_tag.as_str())
            .chain(self.fields.iter().map(String::as_str))
            .map(|field| field.trim_end_matches(','))
            .join(" ")
            .to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct KeywordGroup {
    pub name: String,
    pub keywords: Vec<String>,
}

impl KeywordGroup {
    fn matches(&self, text: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| text.contains(&keyword.to_lowercase()))
    }
}

/// Ordered collection of keyword groups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordGroups(Vec<KeywordGroup>);

impl KeywordGroups {
    pub fn new(groups: Vec<KeywordGroup>) -> Self {
        Self(groups)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeywordGroup> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Functional categories commonly used for bacterial genome annotations
    pub fn default_vocabulary() -> Self {
        let groups = DEFAULT_VOCABULARY
            .iter()
            .map(|(name, keywords)| {
                KeywordGroup::new(
                    name.to_string(),
                    keywords.iter().map(|k| k.to_string()).collect(),
                )
            })
            .collect();
        Self(groups)
    }
}

/// Assigns annotated genes to keyword groups
///
/// Groups keep the order of `groups`, including those without any match.
/// Members of each group are sorted and unique.
pub fn run_clustering(rows: &[AnnotationRow], groups: &KeywordGroups) -> Result<GroupMembership> {
    let texts = rows
        .iter()
        .map(|row| (row.locus_tag.as_str(), row.match_text()))
        .collect::<Vec<_>>();

    let mut membership = GroupMembership::new();
    for group in groups.iter() {
        let members = texts
            .iter()
            .filter(|(_, text)| group.matches(text))
            .map(|(locus, _)| locus.to_string())
            .sorted()
            .dedup()
            .collect::<Vec<_>>();
        debug!("Group {}: {} matching genes", group.name, members.len());
        membership.insert(group.name.clone(), members)?;
    }
    info!(
        "Assigned {} annotated genes to {} keyword groups",
        rows.len(),
        membership.len()
    );
    Ok(membership)
}

const DEFAULT_VOCABULARY: &[(&str, &[&str])] = &[
    ("Secretion", &["secretion", "secreted", "type iii", "type iv"]),
    (
        "DNA mobility",
        &["transposition", "transposase", "integrase", "recombinase", "recombination"],
    ),
    ("quorum sensing", &["quorum sensing"]),
    (
        "Virulence",
        &["virulence", "pathogenesis", "toxin", "effector", "host", "infection", "invasion"],
    ),
    (
        "virulence+secretion",
        &[
            "secretion", "secreted", "type iii", "type iv", "virulence", "pathogenesis", "toxin",
            "effector", "host", "infection", "invasion",
        ],
    ),
    (
        "LPS",
        &[
            "LPS", "lipopolysaccharide", "o antigen", "o-antigen", "lipid a",
            "core oligosaccharide", "lps biosynthesis",
            "lipopolysaccharide biosynthetic process", "waa", "wba",
        ],
    ),
    ("Motility", &["flagellum", "flagellar", "motility", "chemotaxis"]),
    ("Phages", &["phage", "phages", "prophage", "prophages"]),
    (
        "Translation",
        &["translation", "ribosome", "rRNA", "ribosomal", "ribonucleoprotein", "EFTU"],
    ),
    (
        "Cell Division",
        &[
            "cell division", "cytokinesis", "septum", "fission", "binary fission", "divisome",
            "FtsZ", "FtsA", "FtsI", "FtsQ", "FtsK", "FtsL", "FtsN", "FtsW", "FtsB", "MinC",
            "MinD", "MinE", "Z-ring", "midcell", "division site",
        ],
    ),
    (
        "Amino acid biosynthesis",
        &[
            "amino acid biosynthesis", "amino-acid biosynthesis", "amino acid synthesis",
            "amino-acid synthesis",
        ],
    ),
    ("Glycolysis", &["glycolysis"]),
    (
        "Carbon metabolism",
        &["ubiquinone", "TCA", "carbon metabolism", "tricarboxylic acid", "citrate cycle"],
    ),
    ("Cytochrome", &["cytochrome"]),
    ("4Fe-4S", &["sulfur cluster", "4Fe-4S"]),
    (
        "Transmembrane",
        &[
            "Siderophore", "ABC", "transporter", "permease", "porin", "heme",
            "electron transport", "transmembrane",
        ],
    ),
    (
        "Adhesion",
        &["adhesion", "fimbriae", "pili", "flagellum", "LPS", "lipopolysaccharide"],
    ),
    (
        "Anaeroby",
        &[
            "anaeroby", "anaerobic", "fumarate reductase", "nitrate reductase",
            "anaerobic respiration", "nitrite", "formate dehydrogenase",
            "pyruvate formate-lyase", "anaerobic growth",
        ],
    ),
    (
        "Acid stress",
        &[
            "acid stress", "acid resistance", "low pH", "acid tolerance", "proton motive force",
            "glutamate decarboxylase", "gadA", "gadB", "gadC", "acid shock",
        ],
    ),
    (
        "Heat shock",
        &[
            "heat shock", "chaperone", "dnaK", "groEL", "groES", "grpE", "hsp",
            "heat inducible", "temperature stress", "thermotolerance",
        ],
    ),
    (
        "SOS response",
        &[
            "SOS response", "dna damage", "recA", "lexA", "umuC", "umuD", "dinB",
            "error-prone repair", "nucleotide excision repair", "uv damage",
        ],
    ),
    (
        "Oxidative stress",
        &[
            "oxidative stress", "superoxide", "catalase", "sodA", "sodB", "peroxidase",
            "hydrogen peroxide", "ROS", "oxyR", "soxR", "soxS",
        ],
    ),
    (
        "Envelope stress",
        &[
            "envelope stress", "cpx", "bacterial envelope", "degP", "surA", "sigmaE", "omp",
            "misfolded protein", "outer membrane protein",
        ],
    ),
    (
        "Osmotic stress",
        &[
            "osmotic stress", "osmoregulation", "osmoprotectant", "proP", "betT", "kdp", "osmY",
            "high salt", "NaCl",
        ],
    ),
    (
        "Cold shock",
        &["cold shock", "cspA", "cspB", "low temperature", "cold inducible", "RNA chaperone"],
    ),
    (
        "Nutrient limitation",
        &[
            "nutrient limitation", "nutrient starvation", "starvation response",
            "carbon starvation", "phosphate starvation", "phoB", "phoR", "cAMP", "crp",
            "nutrient stress",
        ],
    ),
    (
        "tRNA charging",
        &[
            "tRNAs", "tRNA", "aminoacyl-tRNA synthetase", "tRNA charging", "tRNA ligase",
            "tRNA synthetase", "aminoacylation",
        ],
    ),
    (
        "TCA cycle",
        &[
            "TCA cycle", "tricarboxylic acid cycle", "citrate cycle", "citrate synthase",
            "aconitase", "isocitrate dehydrogenase", "α-ketoglutarate dehydrogenase",
            "succinyl-CoA synthetase", "succinate dehydrogenase", "fumarase",
            "malate dehydrogenase", "oxidative decarboxylation",
        ],
    ),
];
