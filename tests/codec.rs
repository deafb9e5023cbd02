use pixcalc::{
    CompressedImage, Image, Run, compress, decompress,
    image::{ImageError, Pixel},
    render::{render_compressed, render_image, write_compressed},
    rle::DecodeError,
};
use proptest::prelude::*;

// Strategy for images up to 12x12, with few distinct values so runs form.
fn arb_image() -> impl Strategy<Value = Image> {
    (1usize..12, 1usize..12).prop_flat_map(|(width, height)| {
        let pixel = prop_oneof![Just(0u8), Just(32), Just(b'#'), any::<Pixel>()];
        prop::collection::vec(pixel, width * height)
            .prop_map(move |pixels| Image::new(width, height, pixels).unwrap())
    })
}

proptest! {
    #[test]
    fn decompress_inverts_compress(image in arb_image()) {
        prop_assert_eq!(decompress(&compress(&image)).unwrap(), image);
    }

    #[test]
    fn runs_never_span_rows(image in arb_image()) {
        let compressed = compress(&image);
        let mut column = 0;
        for run in compressed.runs() {
            prop_assert!(run.length > 0);
            prop_assert!(column + run.length <= image.width());
            column = (column + run.length) % image.width();
        }
        prop_assert_eq!(column, 0);
    }

    #[test]
    fn rows_sum_to_width(image in arb_image()) {
        let compressed = compress(&image);
        let rows: Vec<&[Run]> = compressed.row_runs().collect();
        prop_assert_eq!(rows.len(), image.height());
        for (row, runs) in rows.iter().zip(image.rows()) {
            prop_assert_eq!(row.iter().map(|run| run.length).sum::<usize>(), image.width());
            let expanded: Vec<Pixel> = row
                .iter()
                .flat_map(|run| std::iter::repeat_n(run.value, run.length))
                .collect();
            prop_assert_eq!(&expanded[..], runs);
        }
    }

    #[test]
    fn runs_are_maximal_within_a_row(image in arb_image()) {
        for row in compress(&image).row_runs() {
            for pair in row.windows(2) {
                prop_assert_ne!(pair[0].value, pair[1].value);
            }
        }
    }

    #[test]
    fn packed_form_survives(image in arb_image()) {
        let compressed = compress(&image);
        let bytes = compressed.to_bytes().unwrap();
        prop_assert_eq!(CompressedImage::from_bytes(bytes).unwrap(), compressed);
    }

    #[test]
    fn both_renderers_agree(image in arb_image()) {
        let rendered = render_image(&image);
        prop_assert_eq!(&render_compressed(&compress(&image)), &rendered);
        for line in rendered.split(|&b| b == b'\n').take(image.height()) {
            prop_assert_eq!(line.len(), image.width());
        }
    }
}

#[test]
fn equal_pixels_across_a_row_boundary_stay_separate() {
    let image = Image::from_rows(&[[1u8, 2, 2], [2, 2, 3]]).unwrap();
    let compressed = compress(&image);
    assert_eq!(
        compressed.runs(),
        &[Run::new(1, 1), Run::new(2, 2), Run::new(2, 2), Run::new(3, 1)]
    );
}

#[test]
fn uniform_image_has_one_run_per_row() {
    let image = Image::filled(5, 4, 200).unwrap();
    assert_eq!(compress(&image).runs(), &[Run::new(200, 5); 4]);
}

#[test]
fn malformed_streams_are_rejected() {
    let truncated = CompressedImage::new(4, 2, vec![Run::new(0, 4), Run::new(1, 2)]);
    assert!(matches!(
        decompress(&truncated),
        Err(DecodeError::MissingPixels { expected: 8, actual: 6 })
    ));

    let spilling = CompressedImage::new(4, 2, vec![Run::new(0, 8)]);
    assert!(matches!(
        decompress(&spilling),
        Err(DecodeError::RunCrossesRow { index: 0, row: 0, column: 0, length: 8 })
    ));

    let trailing = CompressedImage::new(4, 1, vec![Run::new(0, 4), Run::new(1, 4)]);
    assert!(matches!(
        decompress(&trailing),
        Err(DecodeError::TrailingRuns { count: 1 })
    ));
}

#[test]
fn overflowing_dimensions_are_errors() {
    assert!(matches!(
        Image::new(usize::MAX, 2, vec![]),
        Err(ImageError::TooLarge { width: usize::MAX, height: 2 })
    ));
    assert!(matches!(
        Image::filled(3, usize::MAX / 2, 0),
        Err(ImageError::TooLarge { .. })
    ));

    let claimed = CompressedImage::new(usize::MAX, usize::MAX, vec![Run::new(7, usize::MAX)]);
    assert!(matches!(
        decompress(&claimed),
        Err(DecodeError::Image(ImageError::TooLarge { .. }))
    ));
}

#[test]
fn header_only_stream_decodes_to_an_error() {
    let packed = b"PXRL\xff\xff\xff\xff\xff\xff\xff\xff";
    let compressed = CompressedImage::from_bytes(&packed[..]).unwrap();
    assert!(compressed.runs().is_empty());
    assert!(matches!(
        decompress(&compressed),
        Err(DecodeError::MissingPixels { actual: 0, .. })
    ));

    let mut out = Vec::new();
    write_compressed(&mut out, &compressed).unwrap();
    assert!(out.is_empty());
}

#[test]
fn runs_claiming_huge_rows_are_rejected_before_decoding() {
    let claimed = CompressedImage::new(
        u32::MAX as usize,
        u32::MAX as usize,
        vec![Run::new(1, u32::MAX as usize), Run::new(2, 3)],
    );
    assert!(matches!(
        decompress(&claimed),
        Err(DecodeError::MissingPixels { actual, .. }) if actual == u32::MAX as usize + 3
    ));
}
