use criterion::{black_box, criterion_group, criterion_main, Criterion};
use go2pack::codec::{Codec, BrotliCodec, Lz4Codec, ZstdCodec};
use go2pack::{container, AssetType, Registry};

fn bench_compression(c: &mut Criterion) {
    let data = b"<item id=\"42\" name=\"Ion Cannon\"/>\n".repeat(32 * 1024);

    c.bench_function("zstd19_compress_1mb", |b| b.iter(|| ZstdCodec.compress(black_box(&data), 19)));
    c.bench_function("brotli9_compress_1mb", |b| b.iter(|| BrotliCodec.compress(black_box(&data), 9)));
    c.bench_function("lz4_compress_1mb", |b| b.iter(|| Lz4Codec.compress(black_box(&data), 0)));
}

fn bench_container(c: &mut Criterion) {
    let registry = Registry::from_master_key([1u8; 32]);
    let audio = vec![0x5Au8; 1024 * 1024];
    let markup = b"<ship hull=\"3\"/>".repeat(16 * 1024);

    c.bench_function("encode_audio_1mb", |b| {
        b.iter(|| container::encode(&registry, black_box(&audio), AssetType::Audio).unwrap())
    });
    c.bench_function("encode_markup_256kb", |b| {
        b.iter(|| container::encode(&registry, black_box(&markup), AssetType::Markup).unwrap())
    });

    let encoded = container::encode(&registry, &audio, AssetType::Audio).unwrap();
    c.bench_function("decode_audio_1mb", |b| {
        b.iter(|| container::decode(&registry, black_box(&encoded.container)).unwrap())
    });
}

criterion_group!(benches, bench_compression, bench_container);
criterion_main!(benches);
