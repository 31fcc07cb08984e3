use codec_core::node::{Node, RecordChild};
use codec_core::value::Value;
use criterion::{criterion_group, criterion_main, Criterion};

fn gen_schema(field_count: usize) -> Node {
    let mut children = Vec::with_capacity(field_count);
    for i in 0..field_count {
        children.push(RecordChild::new(
            format!("f{i}"),
            Node::primitive("u2b").unwrap(),
        ));
    }
    Node::record(children).unwrap()
}

fn gen_input(field_count: usize) -> Value {
    let fields = (0..field_count)
        .map(|i| (format!("f{i}"), Value::U64((i * 31 % 65536) as u64)))
        .collect();
    Value::Map(fields)
}

fn bench_encode(c: &mut Criterion) {
    for &field_count in &[1usize, 10, 50, 100] {
        let schema = gen_schema(field_count);
        let input = gen_input(field_count);

        c.bench_function(&format!("encode_{field_count}_fields"), |b| {
            b.iter(|| {
                let _ = schema.encode(&input).unwrap();
            })
        });
    }
}

criterion_group!(benches, bench_encode);
criterion_main!(benches);
