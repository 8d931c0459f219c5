//! End-to-end pipeline tests over the JSON file store

use rubro_domain::{Document, EntityDocuments, ResultStore, RunId, Rut};
use rubro_llm::{MockProvider, RateLimitedCaller};
use rubro_pipeline::{
    EntityInput, Orchestrator, PipelineConfig, ProgressEvent, RunMode, SamplingMethod,
};
use rubro_store::JsonFileStore;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

const CLASSIFY_MARKER: &str = "Resumen de Rubros";
const CLASSIFICATION: &str = r#"{"main_rubros": ["CONSTRUCCION"], "justification": "obras civiles"}"#;

fn open_store(dir: &TempDir) -> JsonFileStore {
    JsonFileStore::open(dir.path().join("results"), dir.path().join("results_clas"), RunId::new()).unwrap()
}

fn config(dir: &TempDir) -> PipelineConfig {
    PipelineConfig {
        seed: Some(42),
        completion_dir: dir.path().join("results"),
        classification_dir: dir.path().join("results_clas"),
        ..PipelineConfig::default()
    }
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

fn single_doc_entity(index: usize) -> EntityInput {
    let mut documents = EntityDocuments::default();
    documents.push(Document::emisor(format!(
        "FchEmis:2023-01-01 RUTEmisor:{index}-{index} RznSocEmisor:Empresa{index} RUTRecep:9-9"
    )));
    EntityInput::new(Rut::new(format!("{index}-{index}")), documents)
        .with_declared_rubros(vec![format!("MARCADOR{index}")])
}

#[tokio::test]
async fn test_most_recent_prompts_only_newest_documents() {
    let dir = TempDir::new().unwrap();
    let mut mock = MockProvider::new("vendedor: ferreteria");
    mock.add_response(CLASSIFY_MARKER, CLASSIFICATION);
    let caller = RateLimitedCaller::new(Arc::new(mock.clone()));
    let config = PipelineConfig {
        max_docs: 2,
        sampling_method: SamplingMethod::MostRecent,
        ..config(&dir)
    };

    let mut documents = EntityDocuments::default();
    documents.push(Document::emisor("FchEmis:2021-03-01 RznSocEmisor:Viejo RUTRecep:9-9"));
    documents.push(Document::emisor("FchEmis:2023-03-01 RznSocEmisor:Nuevo RUTRecep:9-9"));
    documents.push(Document::emisor("FchEmis:2022-03-01 RznSocEmisor:Medio RUTRecep:9-9"));
    let entity = EntityInput::new(Rut::new("76543210-K"), documents);

    let mut orchestrator = Orchestrator::new(caller, open_store(&dir), &config).unwrap();
    let metrics = orchestrator.run(vec![entity], 10).await.unwrap();
    assert_eq!(metrics.classified, 1);

    let completion_prompts: Vec<String> = mock
        .prompts()
        .into_iter()
        .filter(|p| !p.contains(CLASSIFY_MARKER))
        .collect();
    assert_eq!(completion_prompts.len(), 2);
    assert!(completion_prompts.iter().any(|p| p.contains("nuevo")));
    assert!(completion_prompts.iter().any(|p| p.contains("medio")));
    assert!(!completion_prompts.iter().any(|p| p.contains("viejo")));

    let stored = read_json(&orchestrator.store().completion_path(&Rut::new("76543210-K")));
    let sampled: Vec<&str> = stored["documentos_emisor_original"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(
        sampled,
        vec!["FchEmis:2023-03-01 RznSocEmisor:Nuevo RUTRecep:9-9", "FchEmis:2022-03-01 RznSocEmisor:Medio RUTRecep:9-9"]
    );
}

#[tokio::test]
async fn test_all_calls_failing_persists_sentinel() {
    let dir = TempDir::new().unwrap();
    let mock = MockProvider::failing();
    let caller = RateLimitedCaller::new(Arc::new(mock.clone()));

    let mut orchestrator = Orchestrator::new(caller, open_store(&dir), &config(&dir)).unwrap();
    let metrics = orchestrator
        .run(vec![single_doc_entity(1), single_doc_entity(2)], 10)
        .await
        .unwrap();

    assert_eq!(metrics.sentinel, 2);
    assert_eq!(metrics.calls_issued, 2);
    assert_eq!(metrics.calls_failed, 2);

    for index in [1, 2] {
        let rut = Rut::new(format!("{index}-{index}"));
        let stored = read_json(&orchestrator.store().classification_path(&rut));
        assert_eq!(stored["clasificacion_economica"], serde_json::json!(["API_ERROR"]));
        assert!(!stored["justification"].as_str().unwrap().is_empty());
        assert_eq!(stored["completaciones_emisor_limpias"], serde_json::json!([]));
        assert_eq!(stored["schema_version"], 1);
    }
}

#[tokio::test]
async fn test_batches_run_strictly_in_sequence() {
    let dir = TempDir::new().unwrap();
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut mock = MockProvider::new("vendedor: x")
        .with_delay(Duration::from_millis(5))
        .with_journal(journal.clone());
    mock.add_response(CLASSIFY_MARKER, CLASSIFICATION);
    let caller = RateLimitedCaller::new(Arc::new(mock.clone()));

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut orchestrator = Orchestrator::new(caller, open_store(&dir), &config(&dir))
        .unwrap()
        .with_progress(tx);
    let entities = (0..5).map(single_doc_entity).collect();
    let metrics = orchestrator.run(entities, 2).await.unwrap();

    assert_eq!(metrics.batches, 3);
    assert_eq!(metrics.classified, 5);

    let mut sizes = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let ProgressEvent::BatchStarted { size, .. } = event {
            sizes.push(size);
        }
    }
    assert_eq!(sizes, vec![2, 2, 1]);

    // entity index from the seller name (completion) or declared rubro (classification)
    let entity_of = |entry: &str| -> usize {
        (0..5)
            .find(|i| entry.contains(&format!("empresa{i}")) || entry.contains(&format!("MARCADOR{i}")))
            .unwrap()
    };
    let entries = journal.lock().unwrap().clone();
    assert_eq!(entries.len(), 20);
    for batch in 1..3 {
        let first_call = entries
            .iter()
            .position(|e| e.starts_with("call:") && entity_of(e) / 2 == batch)
            .unwrap();
        let last_done = entries
            .iter()
            .rposition(|e| e.starts_with("done:") && entity_of(e) / 2 == batch - 1)
            .unwrap();
        assert!(last_done < first_call, "batch {batch} started before batch {} finished", batch - 1);
    }
}

#[tokio::test]
async fn test_in_flight_bounded_by_outer_times_inner() {
    let dir = TempDir::new().unwrap();
    let mut mock = MockProvider::new("vendedor: x").with_delay(Duration::from_millis(20));
    mock.add_response(CLASSIFY_MARKER, CLASSIFICATION);
    let caller = RateLimitedCaller::new(Arc::new(mock.clone()));
    let config = PipelineConfig {
        outer_workers: 2,
        inner_workers: 3,
        max_docs: 6,
        ..config(&dir)
    };

    let entities = (0..4)
        .map(|e| {
            let mut documents = EntityDocuments::default();
            for d in 0..6 {
                documents.push(Document::emisor(format!("FchEmis:2023-01-0{} RznSocEmisor:E{e}D{d}", d + 1)));
            }
            EntityInput::new(Rut::new(format!("{e}-0")), documents)
        })
        .collect();

    let mut orchestrator = Orchestrator::new(caller, open_store(&dir), &config).unwrap();
    let metrics = orchestrator.run(entities, 4).await.unwrap();

    assert_eq!(metrics.classified, 4);
    assert_eq!(mock.call_count(), 4 * 7);
    assert_eq!(mock.max_in_flight(), config.max_in_flight());
}

#[tokio::test]
async fn test_complete_then_classify_stored() {
    let dir = TempDir::new().unwrap();
    let mock = MockProvider::new("<think>razonando</think>vendedor: constructora");
    let caller = RateLimitedCaller::new(Arc::new(mock.clone()));

    let mut completer = Orchestrator::new(caller, open_store(&dir), &config(&dir))
        .unwrap()
        .with_mode(RunMode::CompleteOnly);
    let metrics = completer
        .run(vec![single_doc_entity(1), single_doc_entity(2)], 10)
        .await
        .unwrap();
    assert_eq!(metrics.completed, 2);
    assert!(!completer.store().classification_path(&Rut::new("1-1")).exists());

    let stored = completer.store().load_completion(&Rut::new("1-1")).unwrap().unwrap();
    assert_eq!(stored.emisor_completions, vec!["vendedor: constructora"]);
    assert_eq!(stored.declared_rubros, Some(vec!["MARCADOR1".to_string()]));

    let mut mock = MockProvider::new("unused");
    mock.add_response(CLASSIFY_MARKER, CLASSIFICATION);
    let caller = RateLimitedCaller::new(Arc::new(mock.clone()));
    let mut classifier = Orchestrator::new(caller, open_store(&dir), &config(&dir)).unwrap();
    let ruts = classifier.store().stored_completions().unwrap();
    assert_eq!(ruts, vec![Rut::new("1-1"), Rut::new("2-2")]);

    let metrics = classifier.classify_stored(ruts, 1).await.unwrap();
    assert_eq!(metrics.classified, 2);
    assert_eq!(metrics.batches, 2);
    assert_eq!(mock.call_count(), 2);
    assert!(mock.prompts().iter().all(|p| p.contains("vendedor: constructora")));

    let result = classifier.store().load_classification(&Rut::new("2-2")).unwrap().unwrap();
    assert_eq!(result.rubros, vec!["CONSTRUCCION"]);
    assert_eq!(result.justification, "obras civiles");
    assert_eq!(result.record.emisor_completions, vec!["vendedor: constructora"]);
}
