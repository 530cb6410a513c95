//! In-memory PDF fixtures for tests.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::PdfError;

/// Build a PDF with one page per entry of `pages`, each showing its text with
/// a single `Tj` in a WinAnsi-encoded Courier.
pub fn build_pdf(pages: &[&str]) -> Result<Vec<u8>, PdfError> {
    let mut doc = Document::with_version("1.5");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });

    let shown = pages
        .iter()
        .map(|text| Object::string_literal(*text))
        .collect();
    assemble(doc, font_id, shown)
}

/// Build a PDF whose single font is a Type0 `Identity-H` font with a
/// `/ToUnicode` CMap mapping each 2-byte code in `to_unicode` to its char.
///
/// Each entry of `pages` is the sequence of codes painted on that page.
pub fn build_cid_pdf(
    to_unicode: &[(u16, char)],
    pages: &[&[u16]],
) -> Result<Vec<u8>, PdfError> {
    let mut doc = Document::with_version("1.5");
    let cmap_id = doc.add_object(Stream::new(
        dictionary! {},
        to_unicode_cmap(to_unicode).into_bytes(),
    ));
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "CidFixture",
        "Encoding" => "Identity-H",
        "ToUnicode" => cmap_id,
    });

    let shown = pages
        .iter()
        .map(|codes| {
            let bytes = codes.iter().flat_map(|code| code.to_be_bytes()).collect();
            Object::String(bytes, StringFormat::Hexadecimal)
        })
        .collect();
    assemble(doc, font_id, shown)
}

fn to_unicode_cmap(to_unicode: &[(u16, char)]) -> String {
    let mut entries = String::new();
    for (code, ch) in to_unicode {
        let mut units = [0u16; 2];
        let target: String = ch
            .encode_utf16(&mut units)
            .iter()
            .map(|unit| format!("{unit:04X}"))
            .collect();
        entries.push_str(&format!("<{code:04X}> <{target}>\n"));
    }

    format!(
        "/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe)
/Ordering (UCS)
/Supplement 0
>> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
{} beginbfchar
{}endbfchar
endcmap
CMapName currentdict /CMap defineresource pop
end
end
",
        to_unicode.len(),
        entries
    )
}

/// Lay out one page per string in `shown`, all using `font_id` as `/F1`.
fn assemble(
    mut doc: Document,
    font_id: ObjectId,
    shown: Vec<Object>,
) -> Result<Vec<u8>, PdfError> {
    let pages_id = doc.new_object_id();
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(shown.len());
    for string in shown {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![string]),
                Operation::new("ET", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| PdfError::Parse(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| PdfError::Parse(e.to_string()))?;
    Ok(bytes)
}
