use common::{SagaId, TenantId};
use criterion::{Criterion, criterion_group, criterion_main};
use journal::{AppendOptions, InMemoryJournal, JournalRecord, JournalStore, Version};

fn make_record(saga_id: SagaId, version: i64, event_type: &str) -> JournalRecord {
    JournalRecord::builder()
        .saga_id(saga_id)
        .saga_type("InvoiceCreation")
        .event_type(event_type)
        .version(Version::new(version))
        .payload_raw(serde_json::json!({
            "result": "INV-0001",
            "saga_id": saga_id.to_string(),
        }))
        .build()
}

fn make_saga_id(key: &str) -> SagaId {
    SagaId::derive(&TenantId::from("bench-tenant"), key)
}

fn bench_append_single_record(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("journal/append_single_record", |b| {
        b.iter(|| {
            rt.block_on(async {
                let journal = InMemoryJournal::new();
                let saga_id = make_saga_id("single");
                let record = make_record(saga_id, 1, "SagaStarted");
                journal
                    .append(vec![record], AppendOptions::new())
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_append_with_version_check(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("journal/append_with_version_check", |b| {
        b.iter(|| {
            rt.block_on(async {
                let journal = InMemoryJournal::new();
                let saga_id = make_saga_id("checked");
                let record = make_record(saga_id, 1, "SagaStarted");
                journal
                    .append(vec![record], AppendOptions::expect_new())
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_replay_full_saga(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    // A completed saga journals three records
    let journal = InMemoryJournal::new();
    let saga_id = make_saga_id("replay");
    rt.block_on(async {
        let records = vec![
            make_record(saga_id, 1, "SagaStarted"),
            make_record(saga_id, 2, "InvoiceCreated"),
            make_record(saga_id, 3, "PdfStored"),
        ];
        journal
            .append(records, AppendOptions::expect_new())
            .await
            .unwrap();
    });

    c.bench_function("journal/replay_full_saga", |b| {
        b.iter(|| {
            rt.block_on(async {
                let records = journal.get_records(saga_id).await.unwrap();
                assert_eq!(records.len(), 3);
            });
        });
    });
}

criterion_group!(
    benches,
    bench_append_single_record,
    bench_append_with_version_check,
    bench_replay_full_saga
);
criterion_main!(benches);
