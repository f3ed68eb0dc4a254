use std::fs::File;
use std::io::{
    BufWriter,
    Write,
};
use std::path::Path;

use anyhow::{
    anyhow,
    Context,
};

use crate::geom::Color;
use crate::render::Image;

/// Gamma-encode (gamma 2) a linear color and quantize it to 8 bits per channel.
pub fn to_rgb8(color: Color) -> [u8; 3] {
    let encode = |c: f64| (256. * c.max(0.0).sqrt().clamp(0.0, 0.999)) as u8;
    [encode(color.x()), encode(color.y()), encode(color.z())]
}

/// Write `image` to `path`, picking the format from its extension.
pub fn save<P: AsRef<Path>>(path: P, image: &Image) -> anyhow::Result<()> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    let format = match extension.as_deref() {
        Some("png") => Format::Png,
        Some("ppm") => Format::Ppm,
        other => {
            return Err(anyhow!(
                "unsupported output format {:?} for '{}', expected png or ppm",
                other.unwrap_or(""),
                path.display()
            ))
        }
    };
    let f = File::create(path).with_context(|| format!("could not create '{}'", path.display()))?;
    let writer = BufWriter::new(f);
    let written = match format {
        Format::Png => write_png(writer, image),
        Format::Ppm => write_ppm(writer, image),
    };
    written.with_context(|| format!("could not write image to '{}'", path.display()))
}

enum Format {
    Png,
    Ppm,
}

pub fn write_png<W: Write>(w: W, image: &Image) -> anyhow::Result<()> {
    let mut encoder = png::Encoder::new(w, image.width() as u32, image.height() as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    let data: Vec<u8> = image
        .rows()
        .flat_map(|row| row.iter().flat_map(|&c| to_rgb8(c)))
        .collect();
    writer.write_image_data(&data)?;
    writer.finish()?;
    Ok(())
}

/// Plain-text (P3) portable pixmap.
pub fn write_ppm<W: Write>(mut w: W, image: &Image) -> anyhow::Result<()> {
    writeln!(w, "P3")?;
    writeln!(w, "{} {}", image.width(), image.height())?;
    writeln!(w, "255")?;
    for row in image.rows() {
        for &c in row {
            let [r, g, b] = to_rgb8(c);
            writeln!(w, "{} {} {}", r, g, b)?;
        }
    }
    w.flush()?;
    Ok(())
}
