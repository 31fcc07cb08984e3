use codec_core::node::{Node, RecordChild};
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

fn gen_packet(field_count: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(field_count * 2);
    for i in 0..field_count * 2 {
        data.push((i * 31 % 256) as u8);
    }
    data
}

fn bench_decode(c: &mut Criterion) {
    for &field_count in &[1usize, 10, 50, 100] {
        let schema = gen_schema(field_count);
        let packet = gen_packet(field_count);

        c.bench_function(&format!("decode_{field_count}_fields"), |b| {
            b.iter(|| {
                let _ = schema.decode(&packet, 0).unwrap();
            })
        });
    }
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
