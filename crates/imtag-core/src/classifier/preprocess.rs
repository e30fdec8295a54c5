//! VGG-style evaluation preprocessing for ImageNet classifiers.
//!
//! - Aspect-preserving bilinear resize so the shorter side equals the crop size
//! - Central crop to `size × size`
//! - Per-channel mean subtraction on the 0..255 scale (no std division)
//! - Channel order RGB, NHWC or NCHW layout

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use ndarray::Array4;

use super::TensorLayout;

/// ImageNet per-channel means (R, G, B) on the 0..255 scale.
pub const IMAGENET_MEAN: [f32; 3] = [123.68, 116.78, 103.94];

const CHANNELS: usize = 3;

/// Output size of the aspect-preserving resize: shorter side becomes `smallest_side`.
fn smallest_side_at_least(width: u32, height: u32, smallest_side: u32) -> (u32, u32) {
    let scale = smallest_side as f64 / width.min(height).max(1) as f64;
    let w = (width as f64 * scale).round().max(smallest_side as f64) as u32;
    let h = (height as f64 * scale).round().max(smallest_side as f64) as u32;
    (w, h)
}

/// Preprocess an image into a `[1, …]` float tensor for a classifier.
pub fn preprocess(image: &DynamicImage, size: u32, layout: TensorLayout) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let (resized_w, resized_h) = smallest_side_at_least(width, height, size);
    let resized = image.resize_exact(resized_w, resized_h, FilterType::Triangle);

    let left = (resized_w - size) / 2;
    let top = (resized_h - size) / 2;
    let rgb = resized.crop_imm(left, top, size, size).to_rgb8();

    let s = size as usize;
    let mut tensor = match layout {
        TensorLayout::Nhwc => Array4::<f32>::zeros((1, s, s, CHANNELS)),
        TensorLayout::Nchw => Array4::<f32>::zeros((1, CHANNELS, s, s)),
    };

    // Fresh zeros() arrays are contiguous in standard order.
    if let Some(data) = tensor.as_slice_mut() {
        for (i, pixel) in rgb.as_raw().chunks_exact(CHANNELS).enumerate() {
            for (c, &val) in pixel.iter().enumerate() {
                let idx = match layout {
                    TensorLayout::Nhwc => i * CHANNELS + c,
                    TensorLayout::Nchw => c * s * s + i,
                };
                data[idx] = val as f32 - IMAGENET_MEAN[c];
            }
        }
    }

    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_smallest_side_landscape() {
        assert_eq!(smallest_side_at_least(640, 480, 224), (299, 224));
    }

    #[test]
    fn test_smallest_side_portrait() {
        assert_eq!(smallest_side_at_least(480, 640, 224), (224, 299));
    }

    #[test]
    fn test_smallest_side_upscales_small_images() {
        assert_eq!(smallest_side_at_least(10, 20, 224), (224, 448));
    }

    #[test]
    fn test_preprocess_shape_nhwc() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(640, 480));
        let tensor = preprocess(&img, 224, TensorLayout::Nhwc);
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn test_preprocess_shape_nchw() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(300, 900));
        let tensor = preprocess(&img, 224, TensorLayout::Nchw);
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
    }

    #[test]
    fn test_mean_subtraction() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 50, Rgb([200, 100, 50])));
        let tensor = preprocess(&img, 224, TensorLayout::Nhwc);
        assert!((tensor[[0, 10, 10, 0]] - (200.0 - 123.68)).abs() < 0.01);
        assert!((tensor[[0, 10, 10, 1]] - (100.0 - 116.78)).abs() < 0.01);
        assert!((tensor[[0, 10, 10, 2]] - (50.0 - 103.94)).abs() < 0.01);
    }

    #[test]
    fn test_layouts_hold_same_values() {
        let mut img = RgbImage::from_pixel(224, 224, Rgb([0, 0, 0]));
        img.put_pixel(5, 7, Rgb([255, 128, 1]));
        let img = DynamicImage::ImageRgb8(img);
        let nhwc = preprocess(&img, 224, TensorLayout::Nhwc);
        let nchw = preprocess(&img, 224, TensorLayout::Nchw);
        for c in 0..3 {
            assert_eq!(nhwc[[0, 7, 5, c]], nchw[[0, c, 7, 5]]);
        }
    }

    #[test]
    fn test_central_crop_keeps_center() {
        // left third red, middle third green, right third blue
        let mut img = RgbImage::new(672, 224);
        for (x, _, px) in img.enumerate_pixels_mut() {
            *px = match x / 224 {
                0 => Rgb([255, 0, 0]),
                1 => Rgb([0, 255, 0]),
                _ => Rgb([0, 0, 255]),
            };
        }
        let tensor = preprocess(&DynamicImage::ImageRgb8(img), 224, TensorLayout::Nhwc);
        // center pixel is green
        assert!((tensor[[0, 112, 112, 1]] - (255.0 - 116.78)).abs() < 0.01);
        assert!((tensor[[0, 112, 112, 0]] - (0.0 - 123.68)).abs() < 0.01);
    }
}
