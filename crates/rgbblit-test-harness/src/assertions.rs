use rgbblit_core::canvas::Raster;
use rgbblit_core::filters::FilterChain;
use rgbblit_core::point::Rgb;

/// Assert the raster holds `source` with `filters` applied to every pixel.
pub fn assert_raster_matches_source(raster: &Raster, source: &[u8], filters: &FilterChain) {
    let geometry = raster.geometry();
    assert_eq!(
        source.len() as u64,
        geometry.byte_len(),
        "source is {} bytes, raster is {}x{}",
        source.len(),
        geometry.width,
        geometry.height
    );
    for (i, triplet) in source.chunks_exact(3).enumerate() {
        let (x, y) = geometry.coordinate_of(i as u64 * 3);
        let expected = filters.apply(Rgb::from_triplet(triplet));
        assert_eq!(
            raster.pixel(x, y),
            Some(expected),
            "pixel ({x}, {y}) does not match source"
        );
    }
}

/// Assert every pixel of the raster has the same color.
pub fn assert_solid(raster: &Raster, color: Rgb) {
    for (i, triplet) in raster.as_bytes().chunks_exact(3).enumerate() {
        assert_eq!(
            Rgb::from_triplet(triplet),
            color,
            "pixel {i} is not {color:?}"
        );
    }
}

/// Assert no pixel was left at the canvas's initial black. Only meaningful
/// for sources that contain no black pixel.
pub fn assert_full_coverage(raster: &Raster) {
    for (i, triplet) in raster.as_bytes().chunks_exact(3).enumerate() {
        assert_ne!(
            Rgb::from_triplet(triplet),
            Rgb::default(),
            "pixel {i} was never painted"
        );
    }
}
