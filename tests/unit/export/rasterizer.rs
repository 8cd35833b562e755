use super::*;
use crate::{
    assets::fonts::FontSet,
    cover::{compose::compose, config::ComposerConfig, state::CoverState},
    export::sink::InMemorySink,
};

struct FailingSink;

impl ExportSink for FailingSink {
    fn deliver(&mut self, _filename: &str, _png: &[u8]) -> PortadaResult<()> {
        Err(PortadaError::storage("disk full"))
    }
}

fn mounted(cpu: &mut CpuRasterizer) -> PreviewSurface {
    let stack = compose(&CoverState::default(), &ComposerConfig::default());
    PreviewSurface::paint(cpu, stack, 1.0).unwrap()
}

#[test]
fn export_without_surface_is_a_no_op() {
    let mut cpu = CpuRasterizer::new(FontSet::empty());
    let mut sink = InMemorySink::new();
    assert!(Rasterizer::default().export(&mut cpu, None, &mut sink).is_none());
    assert!(sink.files().is_empty());
}

#[test]
fn export_doubles_density_and_names_the_file() {
    let mut cpu = CpuRasterizer::new(FontSet::empty());
    let surface = mounted(&mut cpu);
    let mut sink = InMemorySink::new();
    let artifact = Rasterizer::default()
        .export(&mut cpu, Some(&surface), &mut sink)
        .unwrap();

    assert_eq!(artifact.filename, "Cerrajería_Totti_thumbnail.png");
    assert_eq!((artifact.width, artifact.height), (540, 960));
    assert_eq!(sink.files().len(), 1);
    assert_eq!(sink.files()[0].0, artifact.filename);

    let decoded = image::load_from_memory(&artifact.png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (540, 960));
    assert!(decoded.color().has_alpha());
}

#[test]
fn sink_failure_is_swallowed() {
    let mut cpu = CpuRasterizer::new(FontSet::empty());
    let surface = mounted(&mut cpu);
    assert!(Rasterizer::default()
        .export(&mut cpu, Some(&surface), &mut FailingSink)
        .is_none());
}

#[test]
fn density_is_validated() {
    assert!(Rasterizer::new(0.0).is_err());
    assert!(Rasterizer::new(f64::NAN).is_err());
    assert_eq!(Rasterizer::new(4.0).unwrap().density(), 4.0);
}
