use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use studiodesk_auth::{GrantTable, Permission, Role, explain};

fn bench_allows(c: &mut Criterion) {
    let table = GrantTable::builtin();
    let mut group = c.benchmark_group("allows");

    // (role, permission) pairs hitting each decision path.
    let cases = [
        ("universal", Role::Owner, "finance.delete"),
        ("exact", Role::Ops, "finance.view"),
        ("wildcard", Role::Studio, "studio.book"),
        ("deny", Role::Client, "studio.view"),
        ("scope_less", Role::Ops, "financeview"),
    ];

    for (name, role, raw) in cases {
        group.bench_with_input(BenchmarkId::new("str", name), &(role, raw), |b, (role, raw)| {
            b.iter(|| table.allows_str(black_box(*role), black_box(raw)))
        });

        let permission = Permission::new(raw);
        group.bench_with_input(BenchmarkId::new("parsed", name), &(role, permission), |b, (role, p)| {
            b.iter(|| table.allows(black_box(*role), black_box(p)))
        });
    }

    group.finish();
}

fn bench_explain(c: &mut Criterion) {
    let table = GrantTable::builtin();
    let permission = Permission::new("finance.delete");
    c.bench_function("explain/deny", |b| {
        b.iter(|| explain(black_box(&table), Role::Ops, black_box(&permission)))
    });
}

criterion_group!(benches, bench_allows, bench_explain);
criterion_main!(benches);
