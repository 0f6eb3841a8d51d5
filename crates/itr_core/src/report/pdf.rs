//! Minimal single-page PDF 1.4 writer.
//!
//! Only what the incident report needs: filled rectangles and left/centered text in the two
//! standard Helvetica faces with WinAnsi encoding. Coordinates are millimetres from the top-left
//! corner of an A4 page and are converted to PDF user space on output.

use sha2::{Digest, Sha256};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

const PT_PER_MM: f32 = 72.0 / 25.4;
const PAGE_WIDTH_PT: f32 = 595.28;
const PAGE_HEIGHT_PT: f32 = 841.89;

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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    fn operands(self) -> String {
        format!(
            "{:.3} {:.3} {:.3}",
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0
        )
    }
}

/// Helvetica advance widths (1/1000 em) for printable ASCII, starting at U+0020.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

fn char_width(c: char) -> u16 {
    let code = c as u32;
    if (0x20..0x7f).contains(&code) {
        return HELVETICA_WIDTHS[(code - 0x20) as usize];
    }
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'é' | 'è' | 'ê' | 'ë' | 'ó' | 'ò' | 'ô' | 'ö' | 'õ'
        | 'ú' | 'ù' | 'û' | 'ü' | 'ñ' => 556,
        'í' | 'ì' | 'î' | 'ï' => 278,
        'Á' | 'À' | 'Â' | 'Ä' | 'É' | 'È' | 'Ê' | 'Ë' => 667,
        'Í' | 'Ì' | 'Î' | 'Ï' => 278,
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 778,
        'Ñ' => 722,
        _ => 556,
    }
}

/// Rendered width of `text` in millimetres at `size` points.
///
/// Bold text is measured with the regular metrics; the difference is negligible at report sizes.
pub fn text_width_mm(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    units as f32 / 1000.0 * size / PT_PER_MM
}

/// Map a char to its WinAnsiEncoding byte; unsupported characters become `?`.
fn win_ansi(c: char) -> u8 {
    let code = c as u32;
    match code {
        0x20..=0x7e | 0xa0..=0xff => code as u8,
        0x09 | 0x0a | 0x0d => b' ',
        _ => match c {
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        },
    }
}

fn push_pdf_string(out: &mut Vec<u8>, text: &str) {
    out.push(b'(');
    for c in text.chars() {
        let b = win_ansi(c);
        if matches!(b, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(b);
    }
    out.push(b')');
}

fn x_pt(x_mm: f32) -> f32 {
    x_mm * PT_PER_MM
}

fn y_pt(y_mm: f32) -> f32 {
    PAGE_HEIGHT_PT - y_mm * PT_PER_MM
}

/// Content stream of a single page.
#[derive(Debug, Clone, Default)]
pub struct PdfPage {
    ops: Vec<u8>,
}

impl PdfPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        let op = format!(
            "{} rg {:.2} {:.2} {:.2} {:.2} re f\n",
            color.operands(),
            x_pt(x),
            y_pt(y + h),
            w * PT_PER_MM,
            h * PT_PER_MM
        );
        self.ops.extend_from_slice(op.as_bytes());
    }

    /// Draw `text` with its baseline starting at (`x`, `y`).
    pub fn text(&mut self, x: f32, y: f32, font: Font, size: f32, color: Rgb, text: &str) {
        let head = format!(
            "BT /{} {:.1} Tf {} rg {:.2} {:.2} Td ",
            font.resource(),
            size,
            color.operands(),
            x_pt(x),
            y_pt(y)
        );
        self.ops.extend_from_slice(head.as_bytes());
        push_pdf_string(&mut self.ops, text);
        self.ops.extend_from_slice(b" Tj ET\n");
    }

    pub fn text_centered(
        &mut self,
        cx: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Rgb,
        text: &str,
    ) {
        let x = cx - text_width_mm(text, size) / 2.0;
        self.text(x, y, font, size, color, text);
    }

    pub fn content(&self) -> &[u8] {
        &self.ops
    }
}

/// Document metadata written to the `/Info` dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfInfo {
    pub title: String,
    pub producer: String,
    /// `D:YYYYMMDDHHmmSSZ`
    pub creation_date: String,
}

fn document_id(page: &PdfPage, info: &PdfInfo) -> String {
    let mut hasher = Sha256::new();
    hasher.update(info.title.as_bytes());
    hasher.update(info.creation_date.as_bytes());
    hasher.update(page.content());
    let digest = hasher.finalize();
    hex::encode(&digest[..16])
}

/// Serialize one page into a complete PDF file.
pub fn write_document(page: &PdfPage, info: &PdfInfo) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = Vec::new();

    out.extend_from_slice(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");

    let mut object = |out: &mut Vec<u8>, body: &[u8]| {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", offsets.len()).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    };

    object(&mut out, b"<< /Type /Catalog /Pages 2 0 R >>");
    object(&mut out, b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    let page_dict = format!(
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH_PT} {PAGE_HEIGHT_PT}] \
         /Resources << /Font << /F1 4 0 R /F2 5 0 R >> >> /Contents 6 0 R >>"
    );
    object(&mut out, page_dict.as_bytes());
    object(
        &mut out,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );
    object(
        &mut out,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );

    let content = page.content();
    let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
    stream.extend_from_slice(content);
    stream.extend_from_slice(b"\nendstream");
    object(&mut out, &stream);

    let mut info_dict = b"<< /Title ".to_vec();
    push_pdf_string(&mut info_dict, &info.title);
    info_dict.extend_from_slice(b" /Producer ");
    push_pdf_string(&mut info_dict, &info.producer);
    info_dict.extend_from_slice(b" /CreationDate ");
    push_pdf_string(&mut info_dict, &info.creation_date);
    info_dict.extend_from_slice(b" >>");
    object(&mut out, &info_dict);

    let xref_offset = out.len();
    let size = offsets.len() + 1;
    out.extend_from_slice(format!("xref\n0 {size}\n0000000000 65535 f \n").as_bytes());
    for off in &offsets {
        out.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    let id = document_id(page, info);
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {size} /Root 1 0 R /Info {} 0 R /ID [<{id}> <{id}>] >>\nstartxref\n{xref_offset}\n%%EOF\n",
            size - 1
        )
        .as_bytes(),
    );
    out
}
