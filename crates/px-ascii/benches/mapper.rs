use criterion::{Criterion, black_box, criterion_group, criterion_main};
use px_ascii::map_glyphs;
use px_core::charset::CharSet;
use px_core::config::{AdjustParams, ColorStyle, EffectMode};
use px_core::frame::{Channels, PixelGrid};

fn noise(w: u32, h: u32) -> PixelGrid {
    let data = (0..w * h * 3).map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8).collect();
    PixelGrid::from_raw(w, h, Channels::Rgb, data).unwrap_or_else(|_| PixelGrid::new(w, h, Channels::Rgb))
}

fn bench_mapper(c: &mut Criterion) {
    let grid = noise(300, 165);
    let palette = CharSet::Extended.palette("");
    let plain = AdjustParams::default();
    let colored = AdjustParams {
        effect: EffectMode::Colored,
        color_style: ColorStyle::Vivid,
        ..AdjustParams::default()
    };

    c.bench_function("map_300x165_plain", |b| {
        b.iter(|| map_glyphs(black_box(&grid), &palette, &plain));
    });
    c.bench_function("map_300x165_colored", |b| {
        b.iter(|| map_glyphs(black_box(&grid), &palette, &colored));
    });
}

criterion_group!(benches, bench_mapper);
criterion_main!(benches);
