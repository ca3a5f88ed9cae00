use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use veil::{reflect, Class, Hook, Intercept, ObjectRef, PropertyKey, Value};

struct Doubling;

impl Intercept for Doubling {
    fn get(&self, target: &ObjectRef, key: &PropertyKey, receiver: &Value) -> Hook<Value> {
        Some(target.get_with_receiver(key, receiver).map(|value| match value {
            Value::Number(n) => Value::from(n * 2.0),
            other => other,
        }))
    }
}

fn point_class(builder: veil::ClassBuilder) -> Class {
    builder
        .init(|this, _| {
            this.create_data_property("x", 1)?;
            this.create_data_property("y", 2)?;
            Ok(())
        })
        .build()
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");

    let plain_class = point_class(Class::builder("Plain"));
    let ordinary = ObjectRef::new(Some(plain_class.prototype().clone()));
    ordinary.create_data_property("x", 1).unwrap();
    let passthrough = plain_class.instantiate(&[]).unwrap();
    let overridden = point_class(Class::builder("Doubling").intercept(Doubling))
        .instantiate(&[])
        .unwrap();

    for (name, obj) in [
        ("ordinary", &ordinary),
        ("passthrough", &passthrough),
        ("override", &overridden),
    ] {
        group.bench_with_input(BenchmarkId::new("own", name), obj, |b, obj| {
            b.iter(|| obj.get(black_box("x")).unwrap());
        });
    }

    group.finish();
}

fn bench_lineage_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("lineage");

    for depth in [1usize, 4, 16] {
        let mut class = Class::builder("Root").intercept(Doubling).build();
        for _ in 1..depth {
            class = Class::builder("Sub").extends(&class).build();
        }
        let handle = point_class(Class::builder("Leaf").extends(&class))
            .instantiate(&[])
            .unwrap();

        group.bench_with_input(BenchmarkId::new("get", depth), &handle, |b, handle| {
            b.iter(|| handle.get(black_box("y")).unwrap());
        });
    }

    group.finish();
}

fn bench_enumeration(c: &mut Criterion) {
    let class = Class::builder("Wide")
        .init(|this, _| {
            for i in 0..64u32 {
                this.create_data_property(format!("field{}", i), i)?;
            }
            Ok(())
        })
        .build();
    let handle = class.instantiate(&[]).unwrap();

    c.bench_function("keys_64", |b| {
        b.iter(|| reflect::keys(black_box(&handle)).unwrap());
    });
}

criterion_group!(benches, bench_get, bench_lineage_depth, bench_enumeration);
criterion_main!(benches);
