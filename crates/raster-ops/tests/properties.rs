//! Behavioral properties of the pixel contract and the engine, checked
//! across representations.

use approx::assert_relative_eq;
use raster_core::{
    Color, ErrorCode, ErrorStack, FloatColor, Image, RasterImage, Rect, SampleDepth, TagList,
    VirtualImage,
};
use raster_ops::{
    copy, copy_region, count_colors, flip, rotate, rub_through, scale_axis, scale_nn,
    squared_diff, Axis, ColorCount, FlipAxis, OpsError,
};

// ============================================================================
// Fixtures
// ============================================================================

/// Every pixel gets a distinct color derived from its position.
fn gradient(width: u32, height: u32, channels: usize) -> Image {
    let mut img = Image::new_empty(width, height, channels).unwrap();
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let c = Color::new((x * 17) as u8, (y * 29) as u8, (x + y) as u8, (x * y) as u8);
            img.put_pixel(x, y, &c);
        }
    }
    img
}

fn gradient_wide(width: u32, height: u32) -> Image {
    let mut img = Image::new_wide(width, height, 3, SampleDepth::F32).unwrap();
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let c = FloatColor::new(x as f64 / 10.0, y as f64 / 10.0, 0.25, 0.0);
            img.put_pixel_f(x, y, &c);
        }
    }
    img
}

fn striped_paletted(width: u32, height: u32) -> Image {
    let mut img = Image::new_paletted(width, height, 3, 16).unwrap();
    img.add_colors(&[
        Color::new(0, 0, 0, 0),
        Color::new(255, 0, 0, 0),
        Color::new(0, 255, 0, 0),
        Color::new(0, 0, 255, 0),
    ])
    .unwrap();
    for y in 0..height as i32 {
        let row: Vec<u8> = (0..width as i32).map(|x| ((x + 2 * y) % 4) as u8).collect();
        img.put_indices(0, width as i32, y, &row);
    }
    img
}

fn same_pixels(a: &dyn RasterImage, b: &dyn RasterImage) -> bool {
    a.width() == b.width()
        && a.height() == b.height()
        && (0..a.height() as i32).all(|y| {
            (0..a.width() as i32).all(|x| a.get_pixel_f(x, y) == b.get_pixel_f(x, y))
        })
}

// ============================================================================
// Pixel contract
// ============================================================================

#[test]
fn test_put_get_round_trip() {
    for channels in 1..=4 {
        let mut img = Image::new_empty(3, 2, channels).unwrap();
        let c = Color::new(11, 22, 33, 44);
        for y in 0..2 {
            for x in 0..3 {
                assert!(img.put_pixel(x, y, &c));
                let got = img.get_pixel(x, y).unwrap();
                assert!(got.matches(&c, channels), "channels {channels}");
            }
        }
    }
}

#[test]
fn test_masked_channel_keeps_prior_value() {
    let mut img = Image::new_empty(2, 2, 4).unwrap();
    img.put_pixel(1, 1, &Color::new(1, 2, 3, 4));
    img.set_channel_mask(!(1 << 2));
    img.put_pixel(1, 1, &Color::new(100, 110, 120, 130));
    assert_eq!(img.get_pixel(1, 1), Some(Color::new(100, 110, 3, 130)));
}

#[test]
fn test_masked_channel_keeps_prior_value_wide() {
    let mut img = Image::new_wide(2, 1, 3, SampleDepth::F32).unwrap();
    img.put_pixel_f(0, 0, &FloatColor::new(0.1, 0.2, 0.3, 0.0));
    img.set_channel_mask(!(1 << 1));
    img.put_pixel_f(0, 0, &FloatColor::new(0.7, 0.8, 0.9, 0.0));
    let got = img.get_pixel_f(0, 0).unwrap();
    assert_relative_eq!(got.0[0], 0.7, epsilon = 1e-6);
    assert_relative_eq!(got.0[1], 0.2, epsilon = 1e-6);
    assert_relative_eq!(got.0[2], 0.9, epsilon = 1e-6);

    // 8-bit writes into float storage go through the same mask
    img.put_pixel(1, 0, &Color::new(255, 255, 255, 0));
    assert_eq!(img.get_pixel(1, 0), Some(Color::new(255, 0, 255, 0)));

    let mut img = Image::new_wide(1, 1, 4, SampleDepth::U16).unwrap();
    img.put_pixel(0, 0, &Color::new(10, 20, 30, 40));
    img.set_channel_mask(!(1 << 3));
    img.put_pixel(0, 0, &Color::new(50, 60, 70, 80));
    assert_eq!(img.get_pixel(0, 0), Some(Color::new(50, 60, 70, 40)));
    img.put_pixel_f(0, 0, &FloatColor::new(1.0, 1.0, 1.0, 1.0));
    assert_eq!(img.get_pixel(0, 0), Some(Color::new(255, 255, 255, 40)));
}

#[test]
fn test_masked_channel_keeps_prior_value_paletted() {
    let mut img = Image::new_paletted(2, 1, 3, 8).unwrap();
    img.put_pixel(0, 0, &Color::new(200, 10, 20, 0));
    img.put_pixel(1, 0, &Color::new(200, 10, 20, 0));
    img.set_channel_mask(!(1 << 1));
    assert!(img.put_pixel(0, 0, &Color::new(1, 2, 3, 0)));
    assert_eq!(img.get_pixel(0, 0), Some(Color::new(1, 10, 3, 0)));
    // the untouched pixel still points at the original entry
    assert_eq!(img.get_pixel(1, 0), Some(Color::new(200, 10, 20, 0)));
    assert_eq!(img.color_count(), Some(2));
}

#[test]
fn test_out_of_range_access_fails_quietly() {
    let mut img = Image::new_rgb(2, 2).unwrap();
    assert_eq!(img.get_pixel(-1, 0), None);
    assert!(!img.put_pixel(2, 0, &Color::gray(1)));
    assert!(img.pixel(0, 5).is_err());
}

// ============================================================================
// Flip and rotate
// ============================================================================

#[test]
fn test_flip_is_an_involution() {
    for (w, h) in [(4, 4), (5, 3), (3, 5), (1, 7), (7, 1)] {
        let original = gradient(w, h, 4);
        for axis in [FlipAxis::X, FlipAxis::Y, FlipAxis::XY] {
            let mut img = copy(&original).unwrap();
            flip(&mut img, axis);
            flip(&mut img, axis);
            assert!(same_pixels(&img, &original), "{w}x{h} {axis:?}");
        }
    }
}

#[test]
fn test_flip_involution_wide_and_paletted() {
    let wide = gradient_wide(5, 3);
    let mut img = copy(&wide).unwrap();
    flip(&mut img, FlipAxis::XY);
    assert!(!same_pixels(&img, &wide));
    flip(&mut img, FlipAxis::XY);
    assert!(same_pixels(&img, &wide));

    let pal = striped_paletted(5, 3);
    let mut img = copy(&pal).unwrap();
    flip(&mut img, FlipAxis::Y);
    flip(&mut img, FlipAxis::Y);
    assert!(same_pixels(&img, &pal));
}

#[test]
fn test_flip_axis_codes() {
    assert_eq!(FlipAxis::try_from(1).unwrap(), FlipAxis::Y);
    let err = FlipAxis::try_from(3).unwrap_err();
    assert!(matches!(err, OpsError::InvalidParameter(_)));
}

#[test]
fn test_rotate_90_then_270_restores() {
    for img in [gradient(5, 3, 3), gradient_wide(4, 7), striped_paletted(3, 6)] {
        let turned = rotate(&img, 90).unwrap();
        assert_eq!((turned.width(), turned.height()), (img.height(), img.width()));
        let back = rotate(&turned, 270).unwrap();
        assert!(same_pixels(&back, &img));
        assert_eq!(back.representation(), img.representation());
    }
}

#[test]
fn test_rotate_180_matches_flip_xy() {
    let img = gradient(5, 4, 3);
    let turned = rotate(&img, 180).unwrap();
    let mut flipped = copy(&img).unwrap();
    flip(&mut flipped, FlipAxis::XY);
    assert_eq!(squared_diff(&turned, &flipped), 0.0);
}

#[test]
fn test_rotate_rejects_other_angles() {
    let img = gradient(2, 2, 3);
    assert!(matches!(rotate(&img, 45), Err(OpsError::InvalidParameter(_))));
}

// ============================================================================
// Scaling
// ============================================================================

#[test]
fn test_identity_scale() {
    let img = gradient(6, 5, 3);
    for axis in [Axis::X, Axis::Y] {
        let out = scale_axis(&img, 1.0, axis).unwrap();
        assert_eq!((out.width(), out.height()), (6, 5));
        for y in 0..5 {
            for x in 0..6 {
                let (a, b) = (img.get_pixel(x, y).unwrap(), out.get_pixel(x, y).unwrap());
                for ch in 0..3 {
                    assert!((a.0[ch] as i32 - b.0[ch] as i32).abs() <= 1, "{axis:?} ({x},{y})");
                }
            }
        }
    }
}

#[test]
fn test_scale_extents() {
    let img = gradient(10, 4, 3);
    let half = scale_axis(&img, 0.5, Axis::X).unwrap();
    assert_eq!((half.width(), half.height()), (5, 4));
    let grown = scale_axis(&img, 1.5, Axis::Y).unwrap();
    assert_eq!((grown.width(), grown.height()), (10, 6));
    let nn = scale_nn(&img, 0.35, 2.0).unwrap();
    assert_eq!((nn.width(), nn.height()), (3, 8));
    assert!(scale_axis(&img, 0.0, Axis::X).is_err());
}

// ============================================================================
// Copy, metrics and color counting
// ============================================================================

#[test]
fn test_copy_has_zero_difference() {
    for img in [gradient(7, 3, 4), gradient_wide(3, 3), striped_paletted(4, 4)] {
        let dup = copy(&img).unwrap();
        assert_eq!(squared_diff(&img, &dup), 0.0);
    }
}

#[test]
fn test_difference_only_outside_overlap() {
    let small = gradient(3, 3, 3);
    let mut big = Image::new_rgb(5, 4).unwrap();
    copy_region(&mut big, &small, Rect::from_size(3, 3), 0, 0);
    big.put_pixel(4, 3, &Color::new(255, 255, 255, 0));
    big.put_pixel(3, 0, &Color::new(255, 255, 255, 0));
    assert_eq!(squared_diff(&small, &big), 0.0);
}

#[test]
fn test_color_count_bound() {
    let max = 6;
    let mut img = Image::new_rgb(4, 2).unwrap();
    for i in 0..=max as i32 {
        img.put_pixel(i % 4, i / 4, &Color::new(i as u8 + 1, 0, 0, 0));
    }
    // the eighth pixel stays black: max + 2 colors in total
    assert_eq!(count_colors(&img, max + 1).unwrap(), ColorCount::TooMany);
    assert_eq!(count_colors(&img, max + 2).unwrap(), ColorCount::Exact(max + 2));

    let mut exact = Image::new_rgb(max as u32 + 1, 1).unwrap();
    for x in 0..=max as i32 {
        exact.put_pixel(x, 0, &Color::new(0, 0, x as u8, 0));
    }
    assert_eq!(count_colors(&exact, max).unwrap(), ColorCount::TooMany);
}

// ============================================================================
// Compositing
// ============================================================================

#[test]
fn test_rub_through_scenario() {
    let base = Color::new(20, 40, 60, 0);
    let mut dest = Image::new_rgb(4, 4).unwrap();
    for y in 0..4 {
        for x in 0..4 {
            dest.put_pixel(x, y, &base);
        }
    }
    let logo = Color::new(250, 5, 128, 255);
    let mut src = Image::new_empty(2, 2, 4).unwrap();
    for y in 0..2 {
        for x in 0..2 {
            src.put_pixel(x, y, &logo);
        }
    }

    rub_through(&mut dest, &src, 1, 1).unwrap();
    for y in 0..4 {
        for x in 0..4 {
            let inside = (1..3).contains(&x) && (1..3).contains(&y);
            let want = if inside { Color::new(250, 5, 128, 0) } else { base };
            assert_eq!(dest.get_pixel(x, y), Some(want), "({x},{y})");
        }
    }
}

#[test]
fn test_rub_through_reports_through_error_stack() {
    let mut dest = Image::new_rgb(2, 2).unwrap();
    let src = Image::new_rgb(2, 2).unwrap();
    let mut errors = ErrorStack::new();
    let result = rub_through(&mut dest, &src, 0, 0);
    assert!(errors.record(result).is_none());
    let latest = errors.latest().unwrap();
    assert_eq!(latest.code, OpsError::Unsupported(String::new()).code());
}

// ============================================================================
// Tags and virtual images
// ============================================================================

#[test]
fn test_tag_dpi_scenario() {
    let mut tags = TagList::new();
    tags.add_int(Some("dpi"), 100, 300).unwrap();
    assert_eq!(tags.find_by_name("dpi", 0), Some(0));
    assert_eq!(tags.get_int("dpi"), Some(300));
    assert_eq!(tags.delete_all_by_code(100), 1);
    assert_eq!(tags.find_by_code(100, 0), None);
}

#[test]
fn test_virtual_image_forwards_to_engine() {
    let mut backing = gradient(4, 3, 3);
    let expected = rotate(&backing, 90).unwrap();
    {
        let mut view = VirtualImage::new(&mut backing);
        assert!(view.is_virtual());
        let turned = rotate(&view, 90).unwrap();
        assert!(same_pixels(&turned, &expected));

        flip(&mut view, FlipAxis::X);
        view.tags_mut().add_int(Some("note"), 1, 1).unwrap();
    }
    assert_eq!(backing.get_pixel(3, 0), gradient(4, 3, 3).get_pixel(0, 0));
    assert!(backing.tags().is_empty());

    let view = VirtualImage::read_only(&backing);
    let mut out = Image::new_rgb(4, 3).unwrap();
    assert_eq!(copy_region(&mut out, &view, Rect::from_size(4, 3), 0, 0), 12);
    assert!(same_pixels(&out, &backing));
}
