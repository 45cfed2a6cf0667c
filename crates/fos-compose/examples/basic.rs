//! Example: compose and rebuild a justified paragraph

use std::sync::Arc;

use fos_compose::{
    compose_paragraph, rebuild_line, Alignment, CharacterStyle, ColumnGeometry, ComposerConfig,
    FaceCache, ParagraphStyle, Rect, RenderedLine, StyledText, Tiler, UniformFont,
};

fn main() -> fos_compose::Result<()> {
    // Initialize logging, RUST_LOG=fos_compose=trace shows every break decision
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let style = Arc::new(CharacterStyle::new(Arc::new(UniformFont::new(0.5)), 10.0));
    let para = ParagraphStyle::default()
        .alignment(Alignment::JustifyLeft)
        .drop_cap(2, 1);
    let text = StyledText::new(para).push(
        "Typesetting is the composition of text by means of arranging glyphs \
         into lines that are filled and justified to a measure.\r",
        &style,
    );

    let geometry = ColumnGeometry::new(Rect::new(0.0, 0.0, 160.0, 400.0));
    let cursor = geometry.cursor();
    let config = ComposerConfig::default().face_cache_capacity(4);
    let mut faces = FaceCache::with_config(&config);
    let mut tiler = Tiler::with_config(geometry, cursor, config);

    let lines = compose_paragraph(&mut tiler, &mut faces, &text, 0)?;
    for line in &lines {
        let mut rendered = RenderedLine::new();
        rebuild_line(&mut faces, &text, line, &mut rendered)?;

        println!(
            "y={:6.1} tiles={} width={:6.1} {:?}",
            line.y,
            line.tiles.len(),
            rendered.width(),
            text.slice(line.offset..line.end()).trim_end()
        );
    }

    Ok(())
}
