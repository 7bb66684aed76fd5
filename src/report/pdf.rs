//! Page drawing on top of `lopdf`.
//!
//! Supports what the match report needs: pages of a fixed size, text in the
//! two standard Helvetica faces, filled rectangles, stroked lines and RGB
//! images. Text is written with WinAnsiEncoding; characters outside Latin-1
//! are replaced by `?`.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Object, ObjectId, Stream};
use thiserror::Error;

/// Landscape A4 in points.
pub const A4_LANDSCAPE: (f32, f32) = (842.0, 595.0);

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to encode PDF: {0}")]
    Encode(#[from] lopdf::Error),
    #[error("failed to write PDF: {0}")]
    Write(#[from] std::io::Error),
    #[error("unsupported image: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
    pub const GREY: Rgb = Rgb(0.5, 0.5, 0.5);

    /// Parse `#RRGGBB`.
    pub fn hex(value: u32) -> Rgb {
        Rgb(
            ((value >> 16) & 0xff) as f32 / 255.0,
            ((value >> 8) & 0xff) as f32 / 255.0,
            (value & 0xff) as f32 / 255.0,
        )
    }

    fn operands(self) -> Vec<Object> {
        vec![self.0.into(), self.1.into(), self.2.into()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Decoded 8-bit RGB raster, ready to embed as an image XObject.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

impl Image {
    /// Decode PNG or JPEG bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, PdfError> {
        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        Ok(Image {
            width: rgb.width(),
            height: rgb.height(),
            rgb: rgb.into_raw(),
        })
    }

    fn to_stream(&self) -> Stream {
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => self.width as i64,
                "Height" => self.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            self.rgb.clone(),
        )
    }
}

/// Handle to an image registered with [`Document::add_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef(usize);

impl ImageRef {
    fn resource(self) -> String {
        format!("Im{}", self.0 + 1)
    }
}

/// Drawing operations for one page, in PDF user space (origin bottom-left).
#[derive(Debug, Default)]
pub struct Page {
    ops: Vec<Operation>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, font: Font, size: f32, color: Rgb, x: f32, y: f32, text: &str) {
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("rg", color.operands()),
            Operation::new("Tf", vec![font.resource().into(), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    pub fn fill_rect(&mut self, color: Rgb, x: f32, y: f32, w: f32, h: f32) {
        self.ops.extend([
            Operation::new("rg", color.operands()),
            Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()]),
            Operation::new("f", vec![]),
        ]);
    }

    pub fn line(&mut self, color: Rgb, width: f32, from: (f32, f32), to: (f32, f32)) {
        self.ops.extend([
            Operation::new("RG", color.operands()),
            Operation::new("w", vec![width.into()]),
            Operation::new("m", vec![from.0.into(), from.1.into()]),
            Operation::new("l", vec![to.0.into(), to.1.into()]),
            Operation::new("S", vec![]),
        ]);
    }

    /// Paint `image` scaled into the box with lower-left corner `(x, y)`.
    pub fn image(&mut self, image: ImageRef, x: f32, y: f32, w: f32, h: f32) {
        let zero: Object = 0.into();
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![w.into(), zero.clone(), zero, h.into(), x.into(), y.into()],
            ),
            Operation::new("Do", vec![Object::Name(image.resource().into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
    }
}

#[derive(Debug)]
pub struct Document {
    title: String,
    size: (f32, f32),
    pages: Vec<Page>,
    images: Vec<Image>,
}

impl Document {
    pub fn new(title: impl Into<String>, size: (f32, f32)) -> Self {
        Document {
            title: title.into(),
            size,
            pages: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Register an image once; any page may then draw it.
    pub fn add_image(&mut self, image: Image) -> ImageRef {
        self.images.push(image);
        ImageRef(self.images.len() - 1)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Assemble the object graph and serialize it.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PdfError> {
        let mut doc = lopdf::Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(font("Helvetica"));
        let bold = doc.add_object(font("Helvetica-Bold"));
        let mut xobjects = Dictionary::new();
        for (i, image) in self.images.iter().enumerate() {
            let id = doc.add_object(image.to_stream());
            xobjects.set(ImageRef(i).resource(), id);
        }
        let resources = doc.add_object(dictionary! {
            "Font" => dictionary! {
                Font::Regular.resource() => regular,
                Font::Bold.resource() => bold,
            },
            "XObject" => xobjects,
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let content = Content {
                operations: page.ops.clone(),
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), self.size.0.into(), self.size.1.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Producer" => Object::string_literal("golpro"),
            "Title" => Object::string_literal(win_ansi(&self.title)),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut out = Vec::new();
        doc.save_to(&mut out)?;
        Ok(out)
    }
}

fn font(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Latin-1 bytes for the standard fonts; anything else becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch as u32 {
            code @ (0x20..=0x7e | 0xa0..=0xff) => code as u8,
            _ => b'?',
        })
        .collect()
}

/// Text drawn on each page of a serialized document, in drawing order.
#[cfg(test)]
pub fn page_texts(bytes: &[u8]) -> Vec<Vec<String>> {
    let doc = lopdf::Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::String(bytes, _)) => {
                        Some(bytes.iter().map(|&b| b as char).collect())
                    }
                    _ => None,
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let raster = image::RgbImage::from_pixel(width, height, image::Rgb([31, 58, 147]));
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(raster)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn latin1_passes_and_everything_else_is_replaced() {
        assert_eq!(win_ansi("a(b)c\\"), b"a(b)c\\".to_vec());
        assert_eq!(win_ansi("P(X≤k)"), b"P(X?k)".to_vec());
        assert_eq!(win_ansi("São"), vec![b'S', 0xe3, b'o']);
    }

    #[test]
    fn hex_colors_map_to_unit_range() {
        assert_eq!(Rgb::hex(0xffffff), Rgb::WHITE);
        let royal = Rgb::hex(0x1f3a93);
        assert!((royal.2 - 147.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn pages_load_back_in_order() {
        let mut doc = Document::new("Report", A4_LANDSCAPE);
        for i in 0..3 {
            let mut page = Page::new();
            page.text(Font::Bold, 12.0, Rgb::BLACK, 10.0, 10.0, &format!("Page {}", i));
            page.fill_rect(Rgb::GREY, 0.0, 0.0, 5.0, 5.0);
            page.line(Rgb::BLACK, 1.0, (0.0, 0.0), (10.0, 10.0));
            doc.add_page(page);
        }
        assert_eq!(doc.page_count(), 3);

        let bytes = doc.to_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        let texts = page_texts(&bytes);
        assert_eq!(texts.len(), 3);
        for (i, page) in texts.iter().enumerate() {
            assert_eq!(page, &vec![format!("Page {}", i)]);
        }
    }

    #[test]
    fn unbalanced_delimiters_survive_serialization() {
        let mut page = Page::new();
        page.text(Font::Regular, 9.0, Rgb::BLACK, 0.0, 0.0, "a) (b \\ c");
        let mut doc = Document::new("Esc", A4_LANDSCAPE);
        doc.add_page(page);
        let texts = page_texts(&doc.to_bytes().unwrap());
        assert_eq!(texts[0], vec!["a) (b \\ c".to_string()]);
    }

    #[test]
    fn image_is_embedded_once_and_drawn_per_page() {
        let mut doc = Document::new("Logo", A4_LANDSCAPE);
        let logo = doc.add_image(Image::decode(&png(6, 2)).unwrap());
        for _ in 0..2 {
            let mut page = Page::new();
            page.image(logo, 10.0, 10.0, 120.0, 40.0);
            doc.add_page(page);
        }

        let loaded = lopdf::Document::load_mem(&doc.to_bytes().unwrap()).unwrap();
        let images: Vec<&Stream> = loaded
            .objects
            .values()
            .filter_map(|obj| match obj {
                Object::Stream(s) => Some(s),
                _ => None,
            })
            .filter(|s| s.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(&b"Image"[..]))
            .collect();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].dict.get(b"Width").and_then(Object::as_i64).unwrap(), 6);
        assert_eq!(images[0].content.len(), 6 * 2 * 3);

        for (_, page_id) in loaded.get_pages() {
            let content = Content::decode(&loaded.get_page_content(page_id).unwrap()).unwrap();
            assert!(content.operations.iter().any(|op| op.operator == "Do"));
        }
    }

    #[test]
    fn rejects_bytes_that_are_not_an_image() {
        assert!(matches!(
            Image::decode(b"definitely not a png"),
            Err(PdfError::Image(_))
        ));
    }
}
