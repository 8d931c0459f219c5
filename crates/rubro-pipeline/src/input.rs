//! Loading of entity ids, documents and declared rubros
//!
//! The corpus is a TSV file of `label<TAB>text` lines. Each document is
//! attributed to the entity named by its `RUTEmisor:` value (as issuer) and
//! to the one named by `RUTRecep:` (as recipient). The label column is not
//! used.

use crate::error::PipelineError;
use crate::types::EntityInput;
use once_cell::sync::Lazy;
use regex::Regex;
use rubro_domain::{Document, EntityDocuments, Rut};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

static RUT_EMISOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"RUTEmisor:([0-9\-Kk]+)").expect("valid regex"));
static RUT_RECEP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"RUTRecep:([0-9\-Kk]+)").expect("valid regex"));
static GIRO_RECEP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"GiroRecep:(.*?)(?:\s\w+:|$)").expect("valid regex"));

/// Documents of every entity found in a corpus
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entities: HashMap<Rut, EntityDocuments>,
    receptor_giros: HashMap<Rut, BTreeSet<String>>,
    documents: usize,
}

impl Corpus {
    /// Parse TSV content
    ///
    /// Lines without a tab are skipped with a warning. A text seen twice is
    /// only attributed once.
    pub fn from_tsv(content: &str) -> Self {
        let mut corpus = Self::default();
        let mut seen = HashSet::new();

        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let Some((_label, text)) = line.split_once('\t') else {
                warn!("Corpus line {} has no tab separator, skipped", number + 1);
                continue;
            };
            let text = text.trim();
            if text.is_empty() || !seen.insert(text.to_string()) {
                continue;
            }
            corpus.add_document(text);
        }

        info!(
            "Corpus loaded: {} documents for {} entities",
            corpus.documents,
            corpus.entities.len()
        );
        corpus
    }

    /// Read and parse a TSV file
    pub fn load_tsv(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Input(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_tsv(&content))
    }

    fn add_document(&mut self, text: &str) {
        let emisor = capture_rut(&RUT_EMISOR_RE, text);
        let receptor = capture_rut(&RUT_RECEP_RE, text);
        if emisor.is_none() && receptor.is_none() {
            debug!("Document without RUTEmisor or RUTRecep ignored");
            return;
        }
        self.documents += 1;

        if let Some(rut) = emisor {
            self.entities.entry(rut).or_default().push(Document::emisor(text));
        }
        if let Some(rut) = receptor {
            if let Some(giro) = GIRO_RECEP_RE
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|g| !g.is_empty())
            {
                self.receptor_giros.entry(rut.clone()).or_default().insert(giro);
            }
            self.entities.entry(rut).or_default().push(Document::receptor(text));
        }
    }

    /// Documents of one entity (empty when unknown)
    pub fn documents_of(&self, rut: &Rut) -> EntityDocuments {
        self.entities.get(rut).cloned().unwrap_or_default()
    }

    /// Giros the entity was given as a recipient, sorted
    pub fn receptor_giros(&self, rut: &Rut) -> Vec<String> {
        self.receptor_giros
            .get(rut)
            .map(|giros| giros.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of entities with at least one document
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of distinct attributed documents
    pub fn document_count(&self) -> usize {
        self.documents
    }
}

fn capture_rut(re: &Regex, text: &str) -> Option<Rut> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| Rut::new(m.as_str()))
        .filter(|rut| !rut.is_empty())
}

/// Historical registry of declared rubros, keyed by RUT
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredRubros {
    entries: HashMap<Rut, Vec<String>>,
}

impl DeclaredRubros {
    /// Parse a JSON object `{ "<RUT>": ["rubro", ...] }`
    pub fn from_json(content: &str) -> Result<Self, PipelineError> {
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(content)?;
        let entries = raw
            .into_iter()
            .map(|(rut, rubros)| (Rut::new(rut), rubros))
            .filter(|(rut, _)| !rut.is_empty())
            .collect();
        Ok(Self { entries })
    }

    /// Read and parse a JSON file
    pub fn load_json(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Input(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Declared rubros of one entity
    pub fn get(&self, rut: &Rut) -> Option<&[String]> {
        self.entries.get(rut).map(Vec::as_slice)
    }

    /// Number of entities in the registry
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Union of registry rubros and recipient giros; `None` when both are empty
pub fn declared_rubros_for(rut: &Rut, corpus: &Corpus, registry: &DeclaredRubros) -> Option<Vec<String>> {
    let mut rubros: BTreeSet<String> = registry
        .get(rut)
        .unwrap_or_default()
        .iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect();
    rubros.extend(corpus.receptor_giros(rut));
    if rubros.is_empty() {
        None
    } else {
        Some(rubros.into_iter().collect())
    }
}

/// Build one pipeline input per RUT, in the given order
pub fn build_inputs(ruts: &[Rut], corpus: &Corpus, registry: &DeclaredRubros) -> Vec<EntityInput> {
    ruts.iter()
        .map(|rut| EntityInput {
            rut: rut.clone(),
            documents: corpus.documents_of(rut),
            declared_rubros: declared_rubros_for(rut, corpus, registry),
        })
        .collect()
}

/// Normalize entity ids: drop empty ones, deduplicate and sort
pub fn normalize_ruts(ruts: impl IntoIterator<Item = Rut>) -> Vec<Rut> {
    ruts.into_iter()
        .filter(|rut| !rut.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Parse a RUT list, one per line
pub fn parse_rut_list(content: &str) -> Vec<Rut> {
    normalize_ruts(content.lines().map(Rut::new))
}

/// Read and merge several RUT list files
pub fn load_rut_lists<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Rut>, PipelineError> {
    let mut ruts = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Input(format!("{}: {}", path.display(), e)))?;
        ruts.extend(parse_rut_list(&content));
    }
    Ok(normalize_ruts(ruts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CORPUS: &str = "venta\tFchEmis:2023-01-10 RUTEmisor:76543210-k RznSocEmisor:Ferreteria RUTRecep:11111111-1 GiroRecep:CONSTRUCCION DE OBRAS MntNeto:100
venta\tFchEmis:2023-02-10 RUTEmisor:76543210-K RznSocEmisor:Ferreteria RUTRecep:22222222-2 MntNeto:50
venta\tFchEmis:2023-02-10 RUTEmisor:76543210-K RznSocEmisor:Ferreteria RUTRecep:22222222-2 MntNeto:50
linea sin tabulador
compra\tFchEmis:2023-03-01 RUTEmisor:11111111-1 RUTRecep:76543210-K GiroRecep:VENTA DE HERRAMIENTAS
vacio\tsin identificadores
";

    #[test]
    fn test_corpus_attribution() {
        let corpus = Corpus::from_tsv(CORPUS);
        assert_eq!(corpus.document_count(), 3);
        assert_eq!(corpus.entity_count(), 3);

        let ferreteria = corpus.documents_of(&Rut::new("76543210-K"));
        assert_eq!(ferreteria.emisor.len(), 2);
        assert_eq!(ferreteria.receptor.len(), 1);

        let constructora = corpus.documents_of(&Rut::new("11111111-1"));
        assert_eq!(constructora.emisor.len(), 1);
        assert_eq!(constructora.receptor.len(), 1);

        assert!(corpus.documents_of(&Rut::new("99-9")).is_empty());
    }

    #[test]
    fn test_receptor_giros() {
        let corpus = Corpus::from_tsv(CORPUS);
        assert_eq!(corpus.receptor_giros(&Rut::new("11111111-1")), vec!["CONSTRUCCION DE OBRAS"]);
        assert_eq!(corpus.receptor_giros(&Rut::new("76543210-K")), vec!["VENTA DE HERRAMIENTAS"]);
        assert!(corpus.receptor_giros(&Rut::new("22222222-2")).is_empty());
    }

    #[test]
    fn test_declared_rubros_merge() {
        let corpus = Corpus::from_tsv(CORPUS);
        let registry = DeclaredRubros::from_json(
            r#"{"76543210-k": ["COMERCIO", "VENTA DE HERRAMIENTAS"], "33333333-3": []}"#,
        )
        .unwrap();

        assert_eq!(
            declared_rubros_for(&Rut::new("76543210-K"), &corpus, &registry),
            Some(vec!["COMERCIO".to_string(), "VENTA DE HERRAMIENTAS".to_string()])
        );
        assert_eq!(declared_rubros_for(&Rut::new("33333333-3"), &corpus, &registry), None);
        assert_eq!(declared_rubros_for(&Rut::new("22222222-2"), &corpus, &registry), None);
    }

    #[test]
    fn test_invalid_declared_json() {
        assert!(matches!(
            DeclaredRubros::from_json("[1, 2]"),
            Err(PipelineError::JsonParse(_))
        ));
    }

    #[test]
    fn test_build_inputs_keeps_order() {
        let corpus = Corpus::from_tsv(CORPUS);
        let ruts = vec![Rut::new("76543210-K"), Rut::new("99-9")];
        let inputs = build_inputs(&ruts, &corpus, &DeclaredRubros::default());

        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].documents.emisor.len(), 2);
        assert_eq!(inputs[0].declared_rubros, Some(vec!["VENTA DE HERRAMIENTAS".to_string()]));
        assert!(inputs[1].documents.is_empty());
    }

    #[test]
    fn test_parse_rut_list() {
        let ruts = parse_rut_list("22-2\n\n11-k\n  \n22-2\n11-K\n");
        assert_eq!(ruts, vec![Rut::new("11-K"), Rut::new("22-2")]);
    }

    #[test]
    fn test_load_rut_lists_merges_files() {
        let mut a = tempfile::NamedTempFile::new().unwrap();
        let mut b = tempfile::NamedTempFile::new().unwrap();
        writeln!(a, "3-3\n1-1").unwrap();
        writeln!(b, "2-2\n1-1").unwrap();

        let ruts = load_rut_lists(&[a.path(), b.path()]).unwrap();
        assert_eq!(ruts, vec![Rut::new("1-1"), Rut::new("2-2"), Rut::new("3-3")]);
    }

    #[test]
    fn test_missing_rut_list_is_input_error() {
        let result = load_rut_lists(&["/nonexistent/ruts.txt"]);
        assert!(matches!(result, Err(PipelineError::Input(_))));
    }
}
