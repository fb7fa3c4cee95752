//! Tests for pass frame rendering and GIF export

#[cfg(test)]
mod tests {
    use ndarray::{Array2, Array3};
    use patchgrow::PassReport;
    use patchgrow::io::visualization::{PassRecorder, render_rgba};
    use tempfile::TempDir;

    fn report(pass: usize) -> PassReport {
        PassReport {
            pass,
            frontier_len: 1,
            accepted: 1,
            rejected: 0,
            filled: pass,
            total: 4,
            max_error_threshold: 0.3,
        }
    }

    // Tests unfilled pixels render transparent and filled ones opaque
    // Verified by ignoring the mask
    #[test]
    fn test_render_rgba_masks_unfilled() {
        let output = Array3::from_elem((2, 2, 3), 1.0);
        let mut filled = Array2::from_elem((2, 2), false);
        filled[[0, 1]] = true;

        let img = render_rgba(&output, Some(&filled));
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(img.get_pixel(1, 1).0[3], 0);
    }

    // Tests one channel renders as opaque gray
    // Verified by leaving green and blue at zero
    #[test]
    fn test_render_rgba_gray() {
        let output = Array3::from_elem((1, 1, 1), 0.2);
        let img = render_rgba(&output, None);
        assert_eq!(img.get_pixel(0, 0).0, [51, 51, 51, 255]);
    }

    // Tests frames are recorded per pass and exported as a GIF
    // Verified by skipping the final frame
    #[test]
    fn test_record_and_export_gif() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("growth.gif");
        let mut recorder = PassRecorder::new();
        let output = Array3::from_elem((2, 2, 3), 0.5);
        let mut filled = Array2::from_elem((2, 2), false);

        for (pass, position) in [[0, 0], [0, 1], [1, 0]].into_iter().enumerate() {
            filled[position] = true;
            recorder.record(&report(pass + 1), &output, &filled);
        }

        assert_eq!(recorder.frame_count(), 3);
        assert_eq!(recorder.frames()[2].pass, 3);

        recorder.export_gif(&path, 60).expect("export");
        assert!(path.exists());
        assert!(std::fs::metadata(&path).expect("metadata").len() > 0);
    }

    // Tests exporting without frames is an error
    // Verified by writing an empty file
    #[test]
    fn test_export_gif_without_frames() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let recorder = PassRecorder::new();
        assert!(recorder.export_gif(temp_dir.path().join("empty.gif"), 20).is_err());
    }
}
