mod support;

use approx::assert_relative_eq;
use layerstack::{
    GuideParams, SliceError, SliceParams,
    float_types::Real,
    layers::layer_file_name,
    mesh::Mesh,
    raster::{CropMode, DEFAULT_PALETTE},
    slice_to_layers, slice_to_layers_with_cancel,
    traits::CSG,
};
use std::sync::atomic::AtomicBool;
use support::{GUIDE_GRAY, WHITE, content_bounds, unit_cube};
use tempfile::tempdir;

fn small_canvas() -> SliceParams {
    SliceParams::default().with_canvas_size(256).with_margin(20)
}

#[test]
fn unit_cube_at_half_height_gives_two_layers() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let params = small_canvas().with_layer_height(0.5);
    let report = slice_to_layers(&unit_cube(), dir.path(), &params)?;

    assert_eq!(report.candidate_layers, 2);
    assert_eq!(report.written.len(), 2);
    assert!(report.skipped.is_empty());
    assert!(!report.cancelled);
    assert_relative_eq!(report.z_min, 0.0);
    assert_relative_eq!(report.z_max, 1.0);

    for (i, layer) in report.written.iter().enumerate() {
        assert_eq!(layer.index, i);
        assert_relative_eq!(layer.z, 0.5 * i as Real, epsilon = 1e-12);
        // square + 4 guide rods
        assert_eq!(layer.contour_count, 5);
        assert_eq!(layer.path, dir.path().join(layer_file_name(i)));

        let image = image::open(&layer.path)?.to_rgb8();
        assert_eq!(image.dimensions(), (256, 256));
    }

    let mut names: Vec<String> = std::fs::read_dir(dir.path())?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    names.sort();
    assert_eq!(names, vec!["layer_0000.png", "layer_0001.png"]);
    Ok(())
}

#[test]
fn layer_height_above_extent_gives_one_layer() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let params = small_canvas().with_layer_height(2.0);
    let report = slice_to_layers(&unit_cube(), dir.path(), &params)?;

    assert_eq!(report.candidate_layers, 1);
    assert_eq!(report.written.len(), 1);
    assert!(dir.path().join("layer_0000.png").exists());
    assert!(!dir.path().join("layer_0001.png").exists());
    Ok(())
}

#[test]
fn candidate_count_is_ceiling_of_extent_over_height() -> Result<(), Box<dyn std::error::Error>> {
    let tall: Mesh<()> = Mesh::cuboid(1.0, 1.0, 1.3, None);
    for (dz, expected) in [(0.5, 3), (0.65, 2), (0.1, 13), (0.4, 4)] {
        let dir = tempdir()?;
        let params = small_canvas().with_canvas_size(64).with_margin(4).with_layer_height(dz);
        let report = slice_to_layers(&tall, dir.path(), &params)?;
        assert_eq!(report.candidate_layers, expected, "dz = {dz}");
        assert_eq!(report.written.len() + report.skipped.len(), expected);
    }
    Ok(())
}

#[test]
fn layers_between_disjoint_parts_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let lower = unit_cube();
    let upper = lower.translate(0.0, 0.0, 2.0);
    let dir = tempdir()?;
    let params = small_canvas().with_layer_height(0.5).without_guides();
    let report = slice_to_layers(&lower.merge(&upper), dir.path(), &params)?;

    // z = 0, 0.5 | 1.0, 1.5 miss | 2.0, 2.5
    assert_eq!(report.candidate_layers, 6);
    assert_eq!(report.skipped, vec![2, 3]);
    let written: Vec<usize> = report.written.iter().map(|l| l.index).collect();
    assert_eq!(written, vec![0, 1, 4, 5]);
    assert!(!dir.path().join("layer_0002.png").exists());
    assert!(dir.path().join("layer_0004.png").exists());
    Ok(())
}

#[test]
fn half_canvas_margin_is_rejected_before_touching_disk() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("never");
    let params = SliceParams::default().with_canvas_size(512).with_margin(256);
    let result = slice_to_layers(&unit_cube(), &out, &params);
    assert!(matches!(result, Err(SliceError::InvalidParameters(_))));
    assert!(!out.exists());
}

#[test]
fn vanishing_layer_height_is_rejected_before_touching_disk() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("never");
    for dz in [1e-300, 1e-9] {
        let params = small_canvas().with_canvas_size(64).with_margin(4).with_layer_height(dz);
        assert!(params.validate().is_ok());
        let result = slice_to_layers(&unit_cube(), &out, &params);
        assert!(
            matches!(result, Err(SliceError::InvalidParameters(_))),
            "dz = {dz}"
        );
    }
    assert!(!out.exists());
}

#[test]
fn empty_mesh_is_rejected() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("never");
    let result = slice_to_layers(&Mesh::<()>::new(), &out, &SliceParams::default());
    assert!(matches!(result, Err(SliceError::InvalidMesh(_))));
    assert!(!out.exists());
}

#[test]
fn broken_guides_are_rejected() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("never");
    let params = small_canvas().with_guides(GuideParams {
        segments: 2,
        ..Default::default()
    });
    let result = slice_to_layers(&unit_cube(), &out, &params);
    assert!(matches!(result, Err(SliceError::InvalidGuideGeometry(_))));
    assert!(!out.exists());
}

#[test]
fn output_directory_over_a_file_is_reported() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("file");
    std::fs::write(&out, b"not a directory").unwrap();
    let result = slice_to_layers(&unit_cube(), &out, &small_canvas().with_layer_height(0.5));
    assert!(matches!(result, Err(SliceError::OutputDirectory { .. })));
}

#[test]
fn unwritable_layer_is_reported_with_its_index() {
    let dir = tempdir().unwrap();
    // A directory squatting on the first image name
    std::fs::create_dir(dir.path().join("layer_0000.png")).unwrap();

    let params = small_canvas().with_layer_height(0.5);
    let err = slice_to_layers(&unit_cube(), dir.path(), &params).unwrap_err();
    assert!(matches!(err, SliceError::WriteFailure { layer: 0, .. }));
    assert_eq!(err.layer(), Some(0));
}

#[test]
fn cancelled_run_writes_nothing_further() {
    let dir = tempdir().unwrap();
    let cancel = AtomicBool::new(true);
    let report =
        slice_to_layers_with_cancel(&unit_cube(), dir.path(), &small_canvas(), &cancel).unwrap();
    assert!(report.cancelled);
    assert!(report.written.is_empty());
    assert_eq!(report.candidate_layers, 20);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn output_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
    let params = small_canvas().with_layer_height(0.25);
    let (a, b) = (tempdir()?, tempdir()?);
    let ra = slice_to_layers(&unit_cube(), a.path(), &params)?;
    let rb = slice_to_layers(&unit_cube(), b.path(), &params)?;
    assert_eq!(ra.written.len(), rb.written.len());

    for (la, lb) in ra.written.iter().zip(&rb.written) {
        assert_eq!(std::fs::read(&la.path)?, std::fs::read(&lb.path)?);
    }
    Ok(())
}

#[test]
fn square_is_centred_and_fills_the_circle() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let params = small_canvas().with_layer_height(0.5).without_guides();
    let report = slice_to_layers(&unit_cube(), dir.path(), &params)?;
    let image = image::open(&report.written[1].path)?.to_rgb8();

    // Only the first palette colour is used for a single contour
    assert!(
        image
            .pixels()
            .all(|p| *p == WHITE || *p == GUIDE_GRAY || *p == DEFAULT_PALETTE[0].color)
    );

    let [x0, y0, x1, y1] = content_bounds(&image, &[WHITE, GUIDE_GRAY]).unwrap();
    let mid_x = (x0 + x1) as f64 / 2.0;
    let mid_y = (y0 + y1) as f64 / 2.0;
    assert!((mid_x - 128.0).abs() <= 1.5, "mid_x = {mid_x}");
    assert!((mid_y - 128.0).abs() <= 1.5, "mid_y = {mid_y}");

    // Side of a square whose half diagonal is base_radius = 108
    let side = (x1 - x0) as f64;
    let expected = 108.0 * 2.0_f64.sqrt();
    assert!((side - expected).abs() <= 3.0, "side = {side}");
    Ok(())
}

#[test]
fn tight_crop_shrinks_images() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let params = small_canvas()
        .with_layer_height(0.5)
        .with_crop(CropMode::Tight);
    let report = slice_to_layers(&unit_cube(), dir.path(), &params)?;
    for layer in &report.written {
        let (w, h) = image::image_dimensions(&layer.path)?;
        assert!(w < 256 && h < 256);
    }
    Ok(())
}
