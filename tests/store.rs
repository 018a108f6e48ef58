use gabma_docs::records::{self, Convenio, RecordError, RecordKey, Rotina};
use gabma_docs::store::{DocumentStore, FileStore, RecordStore, StoreError, VersionToken, Versioned};
use std::cell::Cell;
use std::path::PathBuf;

fn convenios(dir: &tempfile::TempDir) -> RecordStore<FileStore, Convenio> {
    RecordStore::new(FileStore::new(dir.path().join("convenios.json")))
}

#[test]
fn missing_file_is_an_empty_collection() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = convenios(&dir).load().unwrap();
    assert!(loaded.records.is_empty());
    assert!(loaded.token.is_none());
}

#[test]
fn saved_records_can_be_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let store = convenios(&dir);

    store
        .update(|list| {
            records::upsert(list, Convenio::named("Unimed"));
            records::upsert(list, Convenio::named("Amil"));
            Ok(())
        })
        .unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.records.len(), 2);
    assert!(records::find(&loaded.records, RecordKey::Name("Amil")).is_some());

    let file = std::fs::read_to_string(dir.path().join("convenios.json")).unwrap();
    assert!(file.contains("\n    {"), "expected 4-space indentation:\n{file}");
    assert!(!dir.path().join("convenios.json.tmp").exists());
}

#[test]
fn external_edits_are_detected() {
    let dir = tempfile::tempdir().unwrap();
    let store = convenios(&dir);
    store.save(&[Convenio::named("Unimed")], None).unwrap();

    let loaded = store.load().unwrap();
    std::fs::write(dir.path().join("convenios.json"), r#"[{"nome": "Outro"}]"#).unwrap();

    let err = store.save(&loaded.records, loaded.token.as_ref()).unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));

    let now = store.load().unwrap();
    assert_eq!(now.records[0].nome(), "Outro");
}

#[test]
fn unknown_fields_and_loose_types_survive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("convenios.json");
    std::fs::write(&path, r#"[{"nome": "Geap", "codigo": 123, "cor_etiqueta": "azul"}]"#).unwrap();

    let store = convenios(&dir);
    let loaded = store.load().unwrap();
    assert_eq!(loaded.records[0].codigo(), "123");

    store.save(&loaded.records, loaded.token.as_ref()).unwrap();
    let file = std::fs::read_to_string(&path).unwrap();
    assert!(file.contains("cor_etiqueta"));
}

#[test]
fn deleting_a_rotina() {
    let dir = tempfile::tempdir().unwrap();
    let store: RecordStore<FileStore, Rotina> = RecordStore::new(FileStore::new(dir.path().join("rotinas.json")));
    store
        .update(|list| {
            for nome in ["Abertura", "Fechamento"] {
                let id = records::next_rotina_id(list);
                list.push(Rotina::new(id, nome));
            }
            Ok(())
        })
        .unwrap();

    let removed = store
        .update(|list| Ok(records::remove(list, RecordKey::Id(1))))
        .unwrap();
    assert_eq!(removed, 1);

    let missing = store.update(|list| match records::remove(list, RecordKey::Id(1)) {
        0 => Err(StoreError::NotFound(RecordKey::Id(1).to_string())),
        n => Ok(n),
    });
    assert!(matches!(missing, Err(StoreError::NotFound(_))));

    let loaded = store.load().unwrap();
    assert_eq!(loaded.records.len(), 1);
    assert_eq!(loaded.records[0].id, 2);
}

#[test]
fn saving_rotinas_from_the_form() {
    let dir = tempfile::tempdir().unwrap();
    let store: RecordStore<FileStore, Rotina> = RecordStore::new(FileStore::new(dir.path().join("rotinas.json")));

    let first: Rotina = serde_json::from_str(r#"{"nome": "Abertura", "setor": "Recepção"}"#).unwrap();
    assert_eq!(store.save_rotina(&first).unwrap(), 1);
    assert_eq!(store.save_rotina(&Rotina::new(0, "Fechamento")).unwrap(), 2);

    let mut edit = Rotina::new(1, "Abertura do caixa");
    edit.descricao = Some("<p>Conferir o troco</p>".into());
    assert_eq!(store.save_rotina(&edit).unwrap(), 1);

    let blank = store.save_rotina(&Rotina::new(0, "   "));
    assert!(matches!(blank, Err(StoreError::Invalid(RecordError::MissingName))));

    let loaded = store.load().unwrap().records;
    assert_eq!(loaded.len(), 2);
    assert_eq!(records::find(&loaded, RecordKey::Id(1)), Some(&edit));
}

#[test]
fn saving_convenios_checks_the_tiss_version() {
    let dir = tempfile::tempdir().unwrap();
    let store = convenios(&dir);

    let mut convenio = Convenio::named("Unimed");
    convenio.versao_xml = Some("4.03.00".into());
    assert!(!store.save_convenio(&convenio).unwrap());

    convenio.codigo = Some("77".into());
    assert!(store.save_convenio(&convenio).unwrap());

    convenio.versao_xml = Some("5.00.00".into());
    let err = store.save_convenio(&convenio).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(RecordError::UnknownTissVersion(_))));

    let loaded = store.load().unwrap().records;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].codigo(), "77");
    assert_eq!(loaded[0].versao_xml(), "4.03.00");
}

/// A file store that someone else writes to right after the first read
struct Contended {
    file: FileStore,
    path: PathBuf,
    raced: Cell<bool>,
}

impl DocumentStore for Contended {
    fn fetch(&self) -> Result<Option<Versioned<Vec<u8>>>, StoreError> {
        let current = self.file.fetch()?;
        if !self.raced.replace(true) {
            std::fs::write(&self.path, r#"[{"nome": "Cassi"}]"#)?;
        }
        Ok(current)
    }

    fn put(&self, bytes: &[u8], expected: Option<&VersionToken>) -> Result<VersionToken, StoreError> {
        self.file.put(bytes, expected)
    }
}

#[test]
fn a_conflicting_save_keeps_the_edit_for_retry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("convenios.json");
    std::fs::write(&path, "[]").unwrap();

    let store: RecordStore<Contended, Convenio> = RecordStore::new(Contended {
        file: FileStore::new(&path),
        path: path.clone(),
        raced: Cell::new(false),
    });

    let mut edit = Convenio::named("Amil");
    edit.observacoes = Some("Enviar até o dia 5".into());
    let before = edit.clone();

    let err = store.save_convenio(&edit).unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));
    assert_eq!(edit, before);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"[{"nome": "Cassi"}]"#);

    // the other writer's change survives the retry
    assert!(!store.save_convenio(&edit).unwrap());
    let names: Vec<String> = store
        .load()
        .unwrap()
        .records
        .iter()
        .map(|c| c.nome().to_string())
        .collect();
    assert_eq!(names, vec!["Cassi", "Amil"]);
}
