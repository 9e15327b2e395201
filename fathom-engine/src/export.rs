//! Grayscale PNG export of the settled field.

use std::io::BufWriter;
use std::path::Path;

use tracing::debug;

use fathom_core::Fractal;

use crate::session::Session;

/// Write the session's color grid as an 8-bit grayscale PNG, one byte per
/// cell, dimensions equal to the current grid.
///
/// The session is drained to completion first, so the file always reflects
/// a fully resolved field rather than an in-progress frame. Viewport state
/// is embedded as tEXt chunks (readable by exiftool and friends) so the
/// view can be reconstructed from the image alone. I/O and encoding
/// failures leave the session untouched.
pub fn export_png<F: Fractal>(session: &mut Session<F>, path: &Path) -> crate::Result<()> {
    session.settle();
    let viewport = session.viewport();
    let frame = session.frame();

    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, frame.width, frame.height);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);

    encoder.add_text_chunk("Software".to_string(), "Fathom".to_string())?;
    encoder.add_text_chunk("Fathom.PanX".to_string(), viewport.pan_x().to_string())?;
    encoder.add_text_chunk("Fathom.PanY".to_string(), viewport.pan_y().to_string())?;
    encoder.add_text_chunk("Fathom.Zoom".to_string(), viewport.zoom().to_string())?;
    encoder.add_text_chunk(
        "Fathom.Resolution".to_string(),
        format!("{}%", viewport.resolution()),
    )?;

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(frame.colors)?;

    debug!(
        width = frame.width,
        height = frame.height,
        "exported grayscale png to {}",
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn export_creates_valid_grayscale_png() {
        let dir = std::env::temp_dir().join("fathom_test_export");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("field.png");

        let mut session = Session::new(16, 12).unwrap();
        export_png(&mut session, &path).expect("export should succeed");
        assert!(session.is_settled(), "export must force-drain the session");

        let mut file = std::fs::File::open(&path).expect("file should exist");
        let mut header = [0u8; 8];
        file.read_exact(&mut header).expect("should read header");
        assert_eq!(&header, b"\x89PNG\r\n\x1a\n", "valid PNG signature");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn export_embeds_view_metadata() {
        let dir = std::env::temp_dir().join("fathom_test_export_meta");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("meta.png");

        let mut session = Session::new(20, 10).unwrap();
        session.pan_click(10.0, 5.0).unwrap();
        export_png(&mut session, &path).expect("export should succeed");

        let decoder = png::Decoder::new(std::fs::File::open(&path).expect("file should exist"));
        let reader = decoder.read_info().expect("should read info");
        let info = reader.info();

        assert_eq!(info.color_type, png::ColorType::Grayscale);
        assert_eq!(info.bit_depth, png::BitDepth::Eight);
        assert_eq!((info.width, info.height), (20, 10));

        let texts: Vec<_> = info.uncompressed_latin1_text.iter().collect();
        assert!(
            texts
                .iter()
                .any(|t| t.keyword == "Software" && t.text == "Fathom"),
            "should contain Software text chunk"
        );
        assert!(
            texts
                .iter()
                .any(|t| t.keyword == "Fathom.Zoom" && t.text == "400"),
            "should record the doubled zoom"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
