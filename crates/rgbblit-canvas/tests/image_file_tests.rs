use rgbblit_canvas::image_file::ImageFileCanvas;
use rgbblit_canvas::target::DisplayTarget;
use rgbblit_core::canvas::{Canvas, MemoryCanvas};
use rgbblit_core::config::RunConfig;
use rgbblit_core::coordinator::Coordinator;
use rgbblit_core::error::{BlitError, ErrorKind};
use rgbblit_core::partition::PartitionMode;
use rgbblit_core::filters::FilterChain;
use rgbblit_core::geometry::Geometry;
use rgbblit_core::launcher::ThreadLauncher;
use rgbblit_core::point::Rgb;
use rgbblit_test_harness::assertions::{
    assert_full_coverage, assert_raster_matches_source, assert_solid,
};
use rgbblit_test_harness::builders::RawImageBuilder;
use rgbblit_test_harness::fixtures;

#[test]
fn test_png_written_on_close() {
    let dir = fixtures::fixture_dir();
    let path = dir.path().join("out.png");
    let mut canvas = ImageFileCanvas::new(&path);

    canvas.open(Geometry::new(2, 1).unwrap()).unwrap();
    canvas.set_pixel(0, 0, Rgb::new(1, 2, 3)).unwrap();
    canvas.set_pixel(1, 0, Rgb::new(4, 5, 6)).unwrap();
    canvas.flush().unwrap();
    canvas.close().unwrap();

    let image = image::open(&path).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (2, 1));
    assert_eq!(image.get_pixel(0, 0).0, [1, 2, 3]);
    assert_eq!(image.get_pixel(1, 0).0, [4, 5, 6]);
}

#[test]
fn test_unsupported_extension_fails_open() {
    let dir = fixtures::fixture_dir();
    let mut canvas = ImageFileCanvas::new(dir.path().join("out.txt"));
    let err = canvas.open(Geometry::new(1, 1).unwrap()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Canvas);
}

#[test]
fn test_unwritable_path_fails_open() {
    let dir = fixtures::fixture_dir();
    let mut canvas = ImageFileCanvas::new(dir.path().join("no/such/dir/out.png"));
    let err = canvas.open(Geometry::new(1, 1).unwrap()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Canvas);
}

#[test]
fn test_pipeline_into_ppm() {
    let dir = fixtures::fixture_dir();
    let builder = RawImageBuilder::new(6, 4).gradient();
    let input = builder.write(dir.path(), "ramp");
    let out = dir.path().join("ramp.ppm");

    let coordinator = Coordinator::new(RunConfig {
        width: 6,
        ..RunConfig::default()
    });
    let prepared = coordinator.prepare("5", &input, Some("d")).unwrap();
    let mut canvas = DisplayTarget::File(out.clone()).canvas();
    coordinator
        .run(&prepared, &ThreadLauncher, canvas.as_mut())
        .unwrap();

    let image = image::open(&out).unwrap().to_rgb8();
    let darken = FilterChain::parse("d");
    for (x, y, pixel) in image.enumerate_pixels() {
        let c = darken.apply(builder.color_at(x, y));
        assert_eq!(pixel.0, [c.r, c.g, c.b]);
    }
}

#[test]
fn test_memory_target_matches_source() {
    let dir = fixtures::fixture_dir();
    let builder = RawImageBuilder::new(5, 3);
    let source = builder.build();
    let input = builder.write(dir.path(), "pattern");

    let coordinator = Coordinator::new(RunConfig {
        width: 5,
        ..RunConfig::default()
    });
    let filters = FilterChain::parse("il");
    let prepared = coordinator.prepare("4", &input, Some("il")).unwrap();
    let mut canvas = MemoryCanvas::new();
    coordinator.run(&prepared, &ThreadLauncher, &mut canvas).unwrap();

    let raster = canvas.into_raster().unwrap();
    assert_raster_matches_source(&raster, &source, &filters);
    assert_full_coverage(&raster);
}

#[test]
fn test_solid_source_stays_solid() {
    let dir = fixtures::fixture_dir();
    let input = RawImageBuilder::new(4, 4)
        .solid(Rgb::new(10, 20, 30))
        .write(dir.path(), "solid");

    let coordinator = Coordinator::new(RunConfig {
        width: 4,
        ..RunConfig::default()
    });
    let prepared = coordinator.prepare("3", &input, Some("g")).unwrap();
    let mut canvas = MemoryCanvas::new();
    coordinator.run(&prepared, &ThreadLauncher, &mut canvas).unwrap();

    assert_solid(&canvas.into_raster().unwrap(), Rgb::new(20, 20, 20));
}

#[test]
fn test_failed_run_leaves_no_file() {
    let dir = fixtures::fixture_dir();
    let input = RawImageBuilder::new(2, 2).write(dir.path(), "pattern");
    let out = dir.path().join("partial.png");

    let coordinator = Coordinator::new(RunConfig {
        width: 2,
        partition: PartitionMode::Bytes,
        ..RunConfig::default()
    });
    let prepared = coordinator.prepare("3", &input, None).unwrap();
    let mut canvas = DisplayTarget::File(out.clone()).canvas();
    let err = coordinator
        .run(&prepared, &ThreadLauncher, canvas.as_mut())
        .unwrap_err();

    assert!(matches!(err, BlitError::MisalignedChunk { .. }), "{err}");
    assert!(!out.exists(), "partial image written to {}", out.display());
}
