use invoicing_core::{
    Company, FileInvoiceRepository, Invoice, InvoiceEntry, InvoiceRepository, RepoError,
    StoreConfig, Vat,
};
use std::collections::HashSet;
use tempfile::TempDir;
use uuid::Uuid;

fn open_repo() -> (TempDir, StoreConfig, FileInvoiceRepository) {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(dir.path().to_str().unwrap()).unwrap();
    let repo = FileInvoiceRepository::open(&config).unwrap();
    (dir, config, repo)
}

fn invoice(buyer_name: &str) -> Invoice {
    invoice_with_id(Uuid::new_v4(), buyer_name)
}

fn invoice_with_id(id: Uuid, buyer_name: &str) -> Invoice {
    Invoice::with_id(
        id,
        "2024-06-30",
        Company::new("123-456-78-90", "ul. Prosta 1, Warszawa", buyer_name),
        Company::new("098-765-43-21", "ul. Krzywa 2, Krakow", "Seller Sp. z o.o."),
        vec![
            InvoiceEntry::new("hosting", 1, 9_900, Vat::Vat23),
            InvoiceEntry::new("domain", 2, 4_500, Vat::Vat8),
        ],
    )
}

fn ids_log(config: &StoreConfig) -> Vec<String> {
    std::fs::read_to_string(config.ids_path())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn empty_store_lists_nothing() {
    let (_dir, _config, repo) = open_repo();
    assert!(repo.get_all().unwrap().is_empty());
}

#[test]
fn save_and_get_roundtrip() {
    let (_dir, _config, mut repo) = open_repo();

    let original = invoice("Buyer A");
    let stored = repo.save(original.clone()).unwrap();
    assert_eq!(stored, original);

    let loaded = repo.get_by_id(stored.id).unwrap();
    assert_eq!(loaded, original);
    assert!(repo.contains(stored.id).unwrap());
}

#[test]
fn get_all_is_idempotent_and_keeps_file_order() {
    let (_dir, _config, mut repo) = open_repo();
    let a = repo.save(invoice("A")).unwrap();
    let b = repo.save(invoice("B")).unwrap();
    let c = repo.save(invoice("C")).unwrap();

    let first = repo.get_all().unwrap();
    let second = repo.get_all().unwrap();
    assert_eq!(first, second);
    assert_eq!(first, vec![a, b, c]);
}

#[test]
fn colliding_candidate_id_is_replaced() {
    let (_dir, config, mut repo) = open_repo();
    let shared = Uuid::new_v4();

    let a = repo.save(invoice_with_id(shared, "A")).unwrap();
    let b = repo.save(invoice_with_id(shared, "B")).unwrap();

    assert_eq!(a.id, shared);
    assert_ne!(b.id, shared);
    assert_eq!(b.buyer.name, "B");

    let all = repo.get_all().unwrap();
    assert_eq!(all.len(), 2);
    let ids: HashSet<_> = all.iter().map(|stored| stored.id).collect();
    assert_eq!(ids, HashSet::from([a.id, b.id]));
    assert_eq!(repo.get_by_id(b.id).unwrap().buyer.name, "B");

    assert_eq!(ids_log(&config), vec![a.id.to_string(), b.id.to_string()]);
}

#[test]
fn many_saves_never_share_an_id() {
    let (_dir, config, mut repo) = open_repo();
    let shared = Uuid::new_v4();

    for index in 0..20 {
        let candidate = if index % 2 == 0 { shared } else { Uuid::new_v4() };
        repo.save(invoice_with_id(candidate, &format!("buyer {index}")))
            .unwrap();
    }

    let all = repo.get_all().unwrap();
    let unique: HashSet<_> = all.iter().map(|stored| stored.id).collect();
    assert_eq!(unique.len(), 20);

    let logged: HashSet<_> = ids_log(&config).into_iter().collect();
    let expected: HashSet<_> = unique.iter().map(Uuid::to_string).collect();
    assert_eq!(logged, expected);
}

#[test]
fn get_by_unknown_id_is_not_found() {
    let (_dir, _config, mut repo) = open_repo();
    repo.save(invoice("A")).unwrap();

    let missing = Uuid::new_v4();
    let err = repo.get_by_id(missing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn update_replaces_payload_and_moves_record_last() {
    let (_dir, config, mut repo) = open_repo();
    let first = repo.save(invoice("First")).unwrap();
    let second = repo.save(invoice("Second")).unwrap();
    let ids_before = ids_log(&config);

    let mut changed = first.clone();
    changed.buyer.name = "First, renamed".to_string();
    changed.entries.push(InvoiceEntry::new("support", 3, 1_000, Vat::Vat5));

    let updated = repo.update(&changed).unwrap();
    assert_eq!(updated, Some(changed.clone()));

    assert_eq!(repo.get_by_id(first.id).unwrap(), changed);
    let all = repo.get_all().unwrap();
    assert_eq!(all, vec![second, changed]);
    assert_eq!(all.iter().filter(|stored| stored.id == first.id).count(), 1);

    assert_eq!(ids_log(&config), ids_before);
}

#[test]
fn update_of_unknown_id_is_soft_absent_and_changes_nothing() {
    let (_dir, config, mut repo) = open_repo();
    repo.save(invoice("A")).unwrap();
    repo.save(invoice("B")).unwrap();
    let before = repo.get_all().unwrap();
    let ids_before = ids_log(&config);

    let stranger = invoice("Stranger");
    assert_eq!(repo.update(&stranger).unwrap(), None);

    assert_eq!(repo.get_all().unwrap(), before);
    assert_eq!(ids_log(&config), ids_before);
    assert!(!repo.contains(stranger.id).unwrap());
}

#[test]
fn delete_removes_record_and_id() {
    let (_dir, config, mut repo) = open_repo();
    let keep = repo.save(invoice("Keep")).unwrap();
    let gone = repo.save(invoice("Gone")).unwrap();

    assert!(repo.delete(gone.id).unwrap());

    let err = repo.get_by_id(gone.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == gone.id));
    assert_eq!(repo.get_all().unwrap(), vec![keep.clone()]);
    assert_eq!(ids_log(&config), vec![keep.id.to_string()]);

    let err = repo.delete(gone.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == gone.id));
}

#[test]
fn deleting_middle_of_three_keeps_the_others_reachable() {
    let (_dir, _config, mut repo) = open_repo();
    let a = repo.save(invoice("A")).unwrap();
    let b = repo.save(invoice("B")).unwrap();
    let c = repo.save(invoice("C")).unwrap();

    repo.delete(b.id).unwrap();

    let remaining: HashSet<_> = repo.get_all().unwrap().into_iter().map(|i| i.id).collect();
    assert_eq!(remaining, HashSet::from([a.id, c.id]));
    assert_eq!(repo.get_by_id(a.id).unwrap(), a);
    assert_eq!(repo.get_by_id(c.id).unwrap(), c);
}

#[test]
fn deleting_last_record_leaves_empty_logs() {
    let (_dir, config, mut repo) = open_repo();
    let only = repo.save(invoice("Only")).unwrap();

    repo.delete(only.id).unwrap();

    assert!(repo.get_all().unwrap().is_empty());
    assert_eq!(std::fs::metadata(config.records_path()).unwrap().len(), 0);
    assert_eq!(std::fs::metadata(config.ids_path()).unwrap().len(), 0);
}

#[test]
fn data_survives_reopen() {
    let (_dir, config, mut repo) = open_repo();
    let a = repo.save(invoice("A")).unwrap();
    let b = repo.save(invoice("B")).unwrap();
    repo.delete(a.id).unwrap();
    drop(repo);

    let reopened = FileInvoiceRepository::open(&config).unwrap();
    assert_eq!(reopened.get_all().unwrap(), vec![b.clone()]);
    assert_eq!(reopened.get_by_id(b.id).unwrap(), b);
    assert!(!reopened.contains(a.id).unwrap());
}

#[test]
fn record_log_holds_one_json_line_per_invoice() {
    let (_dir, config, mut repo) = open_repo();
    let mut tricky = invoice("Multi\nLine Buyer");
    tricky.entries[0].description = "line one\r\nline two".to_string();
    let stored = repo.save(tricky).unwrap();
    repo.save(invoice("Plain")).unwrap();

    let raw = std::fs::read_to_string(config.records_path()).unwrap();
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["id"], stored.id.to_string());
    assert_eq!(first["buyer"]["name"], "Multi\nLine Buyer");
}

#[test]
fn in_memory_repository_follows_same_contract() {
    let mut repo = FileInvoiceRepository::open_in_memory();
    let shared = Uuid::new_v4();

    let a = repo.save(invoice_with_id(shared, "A")).unwrap();
    let b = repo.save(invoice_with_id(shared, "B")).unwrap();
    assert_ne!(a.id, b.id);

    let mut changed = b.clone();
    changed.date = "2024-07-01".to_string();
    assert_eq!(repo.update(&changed).unwrap(), Some(changed.clone()));
    assert_eq!(repo.update(&invoice("ghost")).unwrap(), None);

    assert!(repo.delete(a.id).unwrap());
    assert_eq!(repo.get_all().unwrap(), vec![changed]);
    assert!(matches!(repo.delete(a.id), Err(RepoError::NotFound(_))));
}
