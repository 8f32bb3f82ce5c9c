use brc_processor::models::AggregationTable;
use brc_processor::processors::ShardMerger;
use brc_processor::readers::{process_chunk, station_hash, tokenize_line};
use brc_processor::{ParallelProcessor, ProcessingConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const STATIONS: [&str; 8] = [
    "Hamburg",
    "Bulawayo",
    "Palembang",
    "St. John's",
    "Cracow",
    "Bridgetown",
    "Istanbul",
    "Roseau",
];

// Create test data for benchmarking
fn create_measurements(lines: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(lines * 16);
    for i in 0..lines {
        let station = STATIONS[i % STATIONS.len()];
        let tenths = (i * 37 % 1999) as i32 - 999;
        let sign = if tenths < 0 { "-" } else { "" };
        let abs = tenths.abs();
        let line = format!("{};{}{}.{}\n", station, sign, abs / 10, abs % 10);
        data.extend_from_slice(line.as_bytes());
    }
    data
}

fn benchmark_tokenizer(c: &mut Criterion) {
    let lines: Vec<&[u8]> = vec![
        &b"Hamburg;12.0\n"[..],
        &b"St. John's;-15.2\n"[..],
        &b"Palembang;38.8\n"[..],
        &b"Roseau;-0.1\n"[..],
    ];

    c.bench_function("tokenize_line", |b| {
        b.iter(|| {
            let mut acc = 0i64;
            for line in &lines {
                if let Ok(token) = tokenize_line(black_box(line)) {
                    acc += token.temperature as i64;
                }
            }
            black_box(acc)
        })
    });
}

fn benchmark_process_chunk(c: &mut Criterion) {
    let chunk = create_measurements(50_000);
    let mut group = c.benchmark_group("process_chunk");
    group.throughput(Throughput::Bytes(chunk.len() as u64));

    group.bench_function("50k_lines", |b| {
        b.iter(|| {
            let mut table = AggregationTable::new();
            let result = process_chunk(0, black_box(&chunk), &mut table);
            black_box(result.map(|(_, rows)| rows).unwrap_or(0))
        })
    });
    group.finish();
}

fn benchmark_shard_merger(c: &mut Criterion) {
    let build_shards = || -> Vec<AggregationTable> {
        (0..16)
            .map(|shard| {
                let mut table = AggregationTable::new();
                for i in 0..1_000 {
                    let name = format!("Station {}", (i * 7 + shard) % 400);
                    let name = name.as_bytes();
                    let _ = table.upsert(station_hash(name), name, i as i32 % 500);
                }
                table
            })
            .collect()
    };

    for parallel in [false, true] {
        let label = if parallel { "parallel" } else { "sequential" };
        c.bench_function(&format!("shard_merger_{}", label), |b| {
            b.iter_batched(
                build_shards,
                |shards| {
                    let merged = ShardMerger::with_parallel(parallel).merge(shards);
                    black_box(merged.map(|t| t.len()).unwrap_or(0))
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
}

fn benchmark_varying_chunk_sizes(c: &mut Criterion) {
    let input = create_measurements(200_000);
    let mut group = c.benchmark_group("pipeline_by_chunk_size");
    group.throughput(Throughput::Bytes(input.len() as u64));
    group.sample_size(20);

    for &chunk_size in &[4 * 1024, 64 * 1024, 1024 * 1024] {
        group.bench_with_input(
            BenchmarkId::new("chunk_size", chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                let config = ProcessingConfig::default()
                    .with_chunk_size(chunk_size)
                    .with_size_hint(Some(input.len() as u64));
                let processor = ParallelProcessor::new(config);

                b.iter(|| {
                    let output = processor.process(black_box(&input[..]), None);
                    black_box(output.map(|o| o.stations.len()).unwrap_or(0))
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_tokenizer,
    benchmark_process_chunk,
    benchmark_shard_merger,
    benchmark_varying_chunk_sizes
);
criterion_main!(benches);
