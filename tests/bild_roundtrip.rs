// End-to-end tests of the BILD container: encode an image, decode it again and
// compare, plus rejection of damaged or foreign input.

#[cfg(test)]
mod bild_container_roundtrip {
    use bild_rs::container::{self, BildDecoder};
    use bild_rs::{BildError, Image, compress_to_file, decompress_file, read_file_info};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::path::PathBuf;

    fn smooth_image(width: u32, height: u32) -> Image {
        let pixels: Vec<u8> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .flat_map(|(x, y)| [(x * 2) as u8, (y * 2 + 20) as u8, ((x + y) / 2 + 60) as u8])
            .collect();
        Image::from_rgb8(width, height, &pixels).unwrap()
    }

    fn noisy_image(width: u32, height: u32, seed: u64) -> Image {
        let mut rng = StdRng::seed_from_u64(seed);
        let base = smooth_image(width, height).to_rgb8();
        let pixels: Vec<u8> = base
            .iter()
            .map(|&v| (v as i32 + rng.random_range(-40..=40)).clamp(0, 255) as u8)
            .collect();
        Image::from_rgb8(width, height, &pixels).unwrap()
    }

    fn mean_abs_error(a: &Image, b: &Image) -> f64 {
        let (a, b) = (a.to_rgb8(), b.to_rgb8());
        assert_eq!(a.len(), b.len());
        let total: u64 = a
            .iter()
            .zip(&b)
            .map(|(&x, &y)| (x as i32 - y as i32).unsigned_abs() as u64)
            .sum();
        total as f64 / a.len() as f64
    }

    fn roundtrip(image: &Image, quality: u32) -> Image {
        let coded = container::encode(image, quality).unwrap();
        container::decode(&coded).unwrap()
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bild_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_lossless_is_exact() {
        for (w, h) in [(1, 1), (3, 2), (17, 1), (1, 31), (64, 48), (45, 37)] {
            let image = noisy_image(w, h, (w * h) as u64);
            let restored = roundtrip(&image, 0);
            assert_eq!(restored.to_rgb8(), image.to_rgb8(), "{w}x{h}");
        }
    }

    #[test]
    fn test_quality_4_bounded_error() {
        let image = smooth_image(64, 48);
        let restored = roundtrip(&image, 4);
        assert_eq!((restored.width(), restored.height()), (64, 48));
        let error = mean_abs_error(&image, &restored);
        assert!(error < 8.0, "mean absolute error {error}");
    }

    #[test]
    fn test_error_grows_with_quality() {
        let image = noisy_image(80, 60, 7);
        let errors: Vec<f64> = [0, 2, 5, 7]
            .iter()
            .map(|&q| mean_abs_error(&image, &roundtrip(&image, q)))
            .collect();
        assert_eq!(errors[0], 0.0);
        for pair in errors.windows(2) {
            assert!(pair[0] <= pair[1], "errors {errors:?}");
        }
    }

    #[test]
    fn test_size_shrinks_with_quality() {
        let image = noisy_image(80, 60, 11);
        let lossless = container::encode(&image, 0).unwrap().len();
        let lossy = container::encode(&image, 6).unwrap().len();
        assert!(lossy < lossless, "{lossy} >= {lossless}");
    }

    #[test]
    fn test_grayscale_input() {
        let pixels: Vec<u8> = (0..20 * 10).map(|i| (i % 200) as u8).collect();
        let image = Image::from_gray8(20, 10, &pixels).unwrap();
        let restored = roundtrip(&image, 0);
        assert_eq!(restored.to_gray8(), pixels);
    }

    #[test]
    fn test_rejects_foreign_data() {
        assert!(matches!(
            container::decode(b"P6 1 1 255 abc xyz 123"),
            Err(BildError::NotBildFile)
        ));
        assert!(matches!(container::decode(b"BILD"), Err(BildError::NotBildFile)));
    }

    #[test]
    fn test_rejects_other_version() {
        let mut coded = container::encode(&smooth_image(8, 8), 3).unwrap();
        coded[4] = 7;
        assert!(matches!(
            container::decode(&coded),
            Err(BildError::VersionMismatch { found: 7, expected: 1 })
        ));
    }

    #[test]
    fn test_truncated_input_is_rejected() {
        let coded = container::encode(&noisy_image(16, 16, 3), 4).unwrap();
        for len in (0..coded.len()).step_by(7) {
            assert!(container::decode(&coded[..len]).is_err(), "length {len}");
        }
    }

    #[test]
    fn test_corrupted_bytes_do_not_panic() {
        let coded = container::encode(&noisy_image(12, 9, 5), 3).unwrap();
        for position in 0..coded.len() {
            let mut damaged = coded.clone();
            damaged[position] ^= 0xA5;
            // any outcome but a panic is acceptable
            let _ = container::decode(&damaged);
        }
    }

    #[test]
    fn test_header_is_read_before_decode() {
        let coded = container::encode(&smooth_image(30, 20), 5).unwrap();
        let mut decoder = BildDecoder::new(&coded);
        assert!(decoder.header().is_none());
        let header = decoder.read_header().unwrap();
        assert_eq!((header.width, header.height, header.quality), (30, 20, 5));
        assert_eq!(decoder.decode().unwrap().width(), 30);
    }

    #[test]
    fn test_file_helpers() {
        let path = temp_path("helpers.bild");
        let image = noisy_image(33, 17, 21);

        let written = compress_to_file(&image, &path, 0).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len() as usize, written);

        let header = read_file_info(&path).unwrap();
        assert_eq!((header.width, header.height, header.quality), (33, 17, 0));
        assert_eq!(header.raw_size(), 33 * 17 * 3);

        let restored = decompress_file(&path).unwrap();
        assert_eq!(restored.to_rgb8(), image.to_rgb8());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_helpers_report_errors() {
        let missing = temp_path("missing.bild");
        assert!(matches!(decompress_file(&missing), Err(BildError::Io(_))));
        assert!(matches!(read_file_info(&missing), Err(BildError::Io(_))));

        let path = temp_path("short.bild");
        std::fs::write(&path, b"BILD\x01\x00").unwrap();
        assert!(matches!(read_file_info(&path), Err(BildError::NotBildFile)));
        std::fs::remove_file(&path).unwrap();

        let path = temp_path("bad_quality.bild");
        assert!(matches!(
            compress_to_file(&smooth_image(2, 2), &path, 9),
            Err(BildError::InvalidQuality(9))
        ));
        assert!(!path.exists());
    }
}
