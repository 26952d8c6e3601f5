use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use restmock::adapters::mock_value::MockValueGenerator;
use restmock::adapters::record_store::InMemoryRecordStore;
use restmock::adapters::seed_generator::SeedGenerator;
use restmock::domain::{EndpointDefinition, FieldType};
use std::collections::BTreeMap;
use std::sync::Arc;

fn benchmark_field_types(c: &mut Criterion) {
    let generator = MockValueGenerator::new();
    let mut group = c.benchmark_group("mock_value");

    for field_type in [
        FieldType::String,
        FieldType::Integer,
        FieldType::Double,
        FieldType::Boolean,
        FieldType::Character,
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(field_type),
            &field_type,
            |b, field_type| {
                b.iter(|| generator.generate(black_box(*field_type), "field").to_string());
            },
        );
    }
    group.finish();
}

fn benchmark_generate_entry(c: &mut Criterion) {
    let store = Arc::new(InMemoryRecordStore::new());
    let seeder = SeedGenerator::new(store);

    let fields: BTreeMap<String, String> = (0..10)
        .map(|i| {
            let type_name = if i % 2 == 0 { "string" } else { "double" };
            (format!("field_{}", i), type_name.to_string())
        })
        .collect();
    let definition = EndpointDefinition::new("Wide", "wide", &fields, "all", 1).unwrap();

    c.bench_function("generate_entry_10_fields", |b| {
        b.iter(|| seeder.generate_entry(black_box(&definition)));
    });
}

fn benchmark_seed(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let fields = BTreeMap::from([
        ("name".to_string(), "string".to_string()),
        ("age".to_string(), "integer".to_string()),
    ]);
    let definition = EndpointDefinition::new("Users", "users", &fields, "all", 100).unwrap();
    let definition = &definition;

    c.bench_function("seed_100_records", |b| {
        b.to_async(&rt).iter(|| async move {
            let seeder = SeedGenerator::new(Arc::new(InMemoryRecordStore::new()));
            seeder.seed(black_box(definition)).await.unwrap()
        });
    });
}

criterion_group!(
    benches,
    benchmark_field_types,
    benchmark_generate_entry,
    benchmark_seed
);
criterion_main!(benches);
