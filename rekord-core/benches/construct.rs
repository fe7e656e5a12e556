use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rekord_core::data::Value;
use rekord_core::field::{Factory, FieldDecl};
use rekord_core::record::{Arguments, RecordBuilder, RecordType};

fn wide_record(width: usize, frozen: bool) -> RecordType {
    RecordBuilder::new("Wide")
        .fields((0..width).map(|i| FieldDecl::new(format!("f{}", i), "int")))
        .field(FieldDecl::new("tags", "list").with_factory(Factory::list()))
        .frozen(frozen)
        .build()
        .unwrap()
}

fn positional(width: usize) -> Vec<Value> {
    (0..width).map(|i| Value::Int(i as i64 * 31)).collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for width in [4, 16, 64].iter() {
        group.throughput(Throughput::Elements(*width as u64));
        group.bench_with_input(BenchmarkId::new("flat", width), width, |b, &width| {
            b.iter(|| wide_record(black_box(width), false))
        });

        let base = wide_record(*width, false);
        group.bench_with_input(BenchmarkId::new("derived", width), width, |b, &width| {
            b.iter(|| {
                RecordBuilder::new("Derived")
                    .extends(black_box(&base))
                    .field(FieldDecl::new(format!("f{}", width - 1), "int").with_default(0))
                    .field(FieldDecl::new(format!("extra{}", width), "int").with_default(1))
                    .build()
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct");

    for width in [4, 16, 64].iter() {
        let ty = wide_record(*width, false);
        let args = positional(*width);
        group.throughput(Throughput::Elements(*width as u64));
        group.bench_with_input(BenchmarkId::new("positional", width), &args, |b, args| {
            b.iter(|| ty.construct(Arguments::from(black_box(args.clone()))).unwrap())
        });

        let named = args
            .iter()
            .enumerate()
            .fold(Arguments::new(), |acc, (i, value)| {
                acc.kwarg(format!("f{}", i), value.clone())
            });
        group.bench_with_input(BenchmarkId::new("named", width), &named, |b, named| {
            b.iter(|| ty.construct(black_box(named.clone())).unwrap())
        });
    }
    group.finish();
}

fn bench_behaviors(c: &mut Criterion) {
    let mut group = c.benchmark_group("behaviors");

    for width in [4, 16, 64].iter() {
        let ty = wide_record(*width, true);
        let a = ty.construct(positional(*width).into()).unwrap();
        let b = ty.construct(positional(*width).into()).unwrap();
        group.throughput(Throughput::Elements(*width as u64));

        group.bench_with_input(BenchmarkId::new("repr", width), &a, |bench, a| {
            bench.iter(|| black_box(a).repr())
        });
        group.bench_with_input(BenchmarkId::new("eq", width), &(&a, &b), |bench, (a, b)| {
            bench.iter(|| black_box(a) == black_box(b))
        });
        group.bench_with_input(BenchmarkId::new("cmp", width), &(&a, &b), |bench, (a, b)| {
            bench.iter(|| black_box(a).try_cmp(black_box(b)))
        });
    }

    // lists are unhashable, so hashing uses a record without the factory field
    for width in [4, 16, 64].iter() {
        let ty = RecordBuilder::new("Key")
            .fields((0..*width).map(|i| FieldDecl::new(format!("f{}", i), "int")))
            .frozen(true)
            .build()
            .unwrap();
        let key = ty.construct(positional(*width).into()).unwrap();
        group.bench_with_input(BenchmarkId::new("hash", width), &key, |bench, key| {
            bench.iter(|| black_box(key).try_hash().unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_construct, bench_behaviors);
criterion_main!(benches);
