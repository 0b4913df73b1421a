use std::io::{Cursor, Write};
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use zune_png::PngDecoder;

/// Builds a `width`x`height` 8-bit RGB PNG with a simple horizontal
/// gradient, filter type None throughout, as one IDAT chunk.
fn gradient_rgb_png(width: u32, height: u32) -> Vec<u8>
{
    let mut raw = Vec::with_capacity((height as usize) * (1 + width as usize * 3));
    for y in 0..height
    {
        raw.push(0); // filter: None
        for x in 0..width
        {
            raw.push((x % 256) as u8);
            raw.push((y % 256) as u8);
            raw.push(((x + y) % 256) as u8);
        }
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.extend_from_slice(&[8, 2, 0, 0, 0]);

    let chunk = |chunk_type: &[u8; 4], data: &[u8]| -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(chunk_type);
        out.extend_from_slice(data);
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(chunk_type);
        hasher.update(data);
        out.extend_from_slice(&hasher.finalize().to_be_bytes());
        out
    };

    let mut bytes = vec![137, 80, 78, 71, 13, 10, 26, 10];
    bytes.extend(chunk(b"IHDR", &ihdr));
    bytes.extend(chunk(b"IDAT", &compressed));
    bytes.extend(chunk(b"IEND", &[]));
    bytes
}

fn decode_gradient(bytes: &[u8]) -> usize
{
    let mut decoder = PngDecoder::new(Cursor::new(bytes));
    let (buffer, _metadata) = decoder.decode_to_rgba().unwrap();
    buffer.pixels.len()
}

fn decode_test(c: &mut Criterion)
{
    let bytes = gradient_rgb_png(512, 512);

    let mut group = c.benchmark_group("PNG decoding");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("zune-png/512x512-rgb", |b| {
        b.iter(|| black_box(decode_gradient(black_box(bytes.as_slice()))))
    });
}

criterion_group!(name=benches;
      config={
      let c = Criterion::default();
        c.measurement_time(Duration::from_secs(10))
      };
    targets=decode_test);

criterion_main!(benches);
