use crate::qrcode::QrCode;

use image::{ImageBuffer, Luma};
use std::fs;
use std::path::Path;

/*---- Utilities ----*/

/// Returns the SVG path data for the dark modules of the given QR Code.
///
/// Each row is scanned for maximal runs of equal color. Every dark run becomes one
/// `M{x},{y}h{len}` command along the vertical center of its row, to be stroked with a
/// width of `unit`. Light runs emit nothing.
///
/// # Example
///
/// ```
/// use qrpath::{helper::to_svg_path, QrCode, QrCodeEcc};
///
/// let qr = QrCode::encode_text("Hello", QrCodeEcc::Low).unwrap();
/// assert!(to_svg_path(&qr, 4).starts_with("M0,2h28"));
/// ```
pub fn to_svg_path(qr: &QrCode, unit: u32) -> String {
    let mut result = String::new();
    let half = f64::from(unit) / 2.0;
    for (y, row) in qr.rows().enumerate() {
        let cy = f64::from(y as u32 * unit) + half;
        let mut x: usize = 0;
        while x < row.len() {
            let color = row[x];
            let runlen = row[x..].iter().take_while(|&&m| m == color).count();
            if color {
                if !result.is_empty() {
                    result.push(' ');
                }
                result += &format!("M{},{}h{}", x as u32 * unit, cy, runlen as u32 * unit);
            }
            x += runlen;
        }
    }
    result
}

/// Returns a string of SVG code for an image depicting the given QR Code, with each
/// module drawn as a `unit` x `unit` square.
///
/// The view box is `size * unit` on each side with no quiet zone; callers that need one
/// should pad the enclosing element. The string always uses Unix newlines (\n).
pub fn to_svg_string(qr: &QrCode, unit: u32) -> String {
    let dimension = qr.size() as u32 * unit;
    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"0 0 {0} {0}\" width=\"{0}\" height=\"{0}\" shape-rendering=\"crispEdges\">\n",
        dimension
    );
    result += "\t<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\n";
    result += &format!(
        "\t<path d=\"{}\" stroke=\"#000000\" stroke-width=\"{}\" fill=\"none\"/>\n",
        to_svg_path(qr, unit),
        unit
    );
    result += "</svg>\n";
    result
}

/// Returns the QR Code as text, two characters per module, surrounded by `border` light
/// modules on every side.
pub fn to_terminal_string(qr: &QrCode, border: i32) -> String {
    let mut result = String::new();
    for y in -border..qr.size() + border {
        for x in -border..qr.size() + border {
            let c: char = if qr.get_module(x, y) { '█' } else { ' ' };
            result.push(c);
            result.push(c);
        }
        result.push('\n');
    }
    result
}

/// Prints the given QrCode object to the console.
pub fn print_qr(qr: &QrCode) {
    println!("{}", to_terminal_string(qr, 4));
}

/// Renders the QR Code into a grayscale image buffer.
///
/// # Arguments
///
/// * `qr` - The QR Code object to render.
/// * `border` - Width of the light quiet zone, in modules.
/// * `scale` - Side length of one module, in pixels. Must be at least 1.
///
/// # Example
///
/// ```
/// use qrpath::{helper::to_image_buffer, QrCode, QrCodeEcc};
///
/// let qr = QrCode::encode_text("Hello, World!", QrCodeEcc::Low).unwrap();
/// let img = to_image_buffer(&qr, 4, 1);
/// assert_eq!(img.dimensions(), (29, 29));
/// ```
pub fn to_image_buffer(qr: &QrCode, border: u32, scale: u32) -> ImageBuffer<Luma<u8>, Vec<u8>> {
    assert!(scale >= 1, "Scale must be positive");
    let size = (qr.size() as u32 + 2 * border) * scale;
    let mut img = ImageBuffer::new(size, size);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let qr_x = (x / scale) as i32 - border as i32;
        let qr_y = (y / scale) as i32 - border as i32;
        *pixel = if qr.get_module(qr_x, qr_y) {
            Luma([0u8]) // Black
        } else {
            Luma([255u8]) // White
        };
    }

    img
}

/// Renders the QR Code and saves it as a PNG file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an `image::ImageError` if the directory cannot be created or the image cannot
/// be written.
pub fn save_png(qr: &QrCode, path: &Path, border: u32, scale: u32) -> Result<(), image::ImageError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    to_image_buffer(qr, border, scale).save(path)
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::QrCodeEcc;

    fn sample() -> QrCode {
        QrCode::encode_text("HELLO WORLD", QrCodeEcc::Low).unwrap()
    }

    #[test]
    fn test_to_svg_string() {
        let qr = sample();
        let svg = to_svg_string(&qr, 4);
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains("viewBox=\"0 0 84 84\""));
        assert!(svg.contains("stroke-width=\"4\""));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_svg_path_covers_dark_modules() {
        let qr = sample();
        let path = to_svg_path(&qr, 1);
        let mut covered = vec![false; qr.modules().len()];
        for cmd in path.split(' ') {
            let cmd = cmd.strip_prefix('M').unwrap();
            let (pos, len) = cmd.split_once('h').unwrap();
            let (x, y) = pos.split_once(',').unwrap();
            let x: usize = x.parse().unwrap();
            let y: f64 = y.parse().unwrap();
            let len: usize = len.parse().unwrap();
            let row = (y - 0.5) as usize;
            for i in x..x + len {
                assert!(!covered[row * 21 + i]);
                covered[row * 21 + i] = true;
            }
        }
        assert_eq!(covered.as_slice(), qr.modules());
    }

    #[test]
    fn test_svg_path_first_row_starts_with_finder() {
        let qr = sample();
        // The top-left finder is a run of 7 dark modules starting at the origin.
        assert!(to_svg_path(&qr, 2).starts_with("M0,1h14 "));
    }

    #[test]
    fn test_generate_image_buffer() {
        let qr = sample();
        let img = to_image_buffer(&qr, 4, 1);

        // A version 1 symbol with a border of 4 is 29x29 pixels.
        assert_eq!(img.dimensions(), (29, 29));
        assert_eq!(img.get_pixel(0, 0), &Luma([255u8]));
        assert_eq!(img.get_pixel(4, 4), &Luma([0u8]));

        let img = to_image_buffer(&qr, 0, 3);
        assert_eq!(img.dimensions(), (63, 63));
        assert_eq!(img.get_pixel(2, 2), &Luma([0u8]));
        // Module (1, 1) is in the light ring of the finder, (2, 2) in its dark core.
        assert_eq!(img.get_pixel(3, 3), &Luma([255u8]));
        assert_eq!(img.get_pixel(6, 6), &Luma([0u8]));
    }

    #[test]
    fn test_terminal_string_dimensions() {
        let qr = sample();
        let text = to_terminal_string(&qr, 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 25);
        assert!(lines.iter().all(|l| l.chars().count() == 50));
        assert!(lines[2].starts_with("    ██████████████"));
    }
}
