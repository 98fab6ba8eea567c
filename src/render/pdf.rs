//! Print-ready PDF: one full-bleed label bitmap on a 2" × 1" page.

use lopdf::{
    Document, Object, Stream,
    content::{Content, Operation},
    dictionary,
};

use super::label::{FieldConfig, render_label_to_canvas};
use super::surface::LabelSurface;
use crate::error::CardLabelError;
use crate::geometry::{LABEL_HEIGHT_IN, LABEL_WIDTH_IN, PreviewScale};
use crate::layout::LabelData;

/// PDF user-space units per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Rasterize the label at `dpi` and wrap it in a single-page PDF.
///
/// Guides are always off. The page is exactly 144 × 72 pt.
pub fn generate_label_pdf(
    config: &FieldConfig,
    data: &LabelData,
    dpi: f32,
) -> Result<Vec<u8>, CardLabelError> {
    let mut surface = LabelSurface::new(PreviewScale::for_output_dpi(dpi));
    render_label_to_canvas(&mut surface, config, data, false)?;
    surface_to_pdf(&surface)
}

/// Same as [`generate_label_pdf`] on a blocking worker: one awaited round
/// trip per call. The surface never leaves the worker.
pub async fn generate_label_pdf_async(
    config: FieldConfig,
    data: LabelData,
    dpi: f32,
) -> Result<Vec<u8>, CardLabelError> {
    tokio::task::spawn_blocking(move || generate_label_pdf(&config, &data, dpi))
        .await
        .map_err(|e| CardLabelError::Transcode(format!("render task failed: {}", e)))?
}

/// Embed a surface as a DeviceGray image filling a 2" × 1" page.
pub fn surface_to_pdf(surface: &LabelSurface) -> Result<Vec<u8>, CardLabelError> {
    let page_w = (LABEL_WIDTH_IN * POINTS_PER_INCH).round() as i64;
    let page_h = (LABEL_HEIGHT_IN * POINTS_PER_INCH).round() as i64;

    let mut doc = Document::with_version("1.5");
    let id_pages = doc.new_object_id();

    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(surface.width() as i64),
            "Height" => Object::Integer(surface.height() as i64),
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => Object::Integer(8),
        },
        surface.as_image().as_raw().clone(),
    );
    let id_image = doc.add_object(image);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(page_w),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(page_h),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content
        .encode()
        .map_err(|e| CardLabelError::Transcode(format!("content stream: {}", e)))?;
    let id_content = doc.add_object(Stream::new(dictionary! {}, encoded));

    let id_resources = doc.add_object(dictionary! {
        "XObject" => dictionary! {
            "Im0" => id_image,
        },
    });

    let id_page = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => id_pages,
        "Contents" => id_content,
        "Resources" => id_resources,
    });

    doc.set_object(
        id_pages,
        dictionary! {
            "Type" => "Pages",
            "Count" => Object::Integer(1),
            "Kids" => Object::Array(vec![Object::Reference(id_page)]),
            "MediaBox" => Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(page_w),
                Object::Integer(page_h),
            ]),
        },
    );

    let id_catalog = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => id_pages,
    });
    doc.trailer.set("Root", id_catalog);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| CardLabelError::Transcode(format!("PDF write failed: {}", e)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> LabelData {
        LabelData {
            title: "Umbreon VMAX".into(),
            sku: "PKM-215".into(),
            price: "520".into(),
            ..Default::default()
        }
    }

    fn integers(objects: &[Object]) -> Vec<i64> {
        objects.iter().map(|o| o.as_i64().unwrap()).collect()
    }

    /// (MediaBox, `cm` operands, image width and height) of the only page.
    fn page_geometry(pdf: &[u8]) -> (Vec<i64>, Vec<i64>, (i64, i64)) {
        let doc = Document::load_mem(pdf).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();

        let parent = page.get(b"Parent").unwrap().as_reference().unwrap();
        let media_box = doc
            .get_object(parent)
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap();

        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let cm = content
            .operations
            .iter()
            .find(|op| op.operator == "cm")
            .unwrap();

        let resources = page.get(b"Resources").unwrap().as_reference().unwrap();
        let xobjects = doc
            .get_object(resources)
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"XObject")
            .unwrap()
            .as_dict()
            .unwrap();
        let image_id = xobjects.get(b"Im0").unwrap().as_reference().unwrap();
        let image = doc.get_object(image_id).unwrap().as_stream().unwrap();
        let size = (
            image.dict.get(b"Width").unwrap().as_i64().unwrap(),
            image.dict.get(b"Height").unwrap().as_i64().unwrap(),
        );

        (integers(media_box), integers(&cm.operands), size)
    }

    #[test]
    fn test_pdf_header_and_page_size() {
        let pdf = generate_label_pdf(&FieldConfig::default(), &data(), 203.0).unwrap();
        assert!(pdf.starts_with(b"%PDF-1.5"));

        let (media_box, cm, size) = page_geometry(&pdf);
        assert_eq!(media_box, vec![0, 0, 144, 72]);
        // image scaled to cover the whole page
        assert_eq!(cm, vec![144, 0, 0, 72, 0, 0]);
        assert_eq!(size, (406, 203));
    }

    #[test]
    fn test_higher_dpi_embeds_larger_image() {
        let pdf = generate_label_pdf(&FieldConfig::default(), &data(), 300.0).unwrap();
        let (media_box, cm, size) = page_geometry(&pdf);
        assert_eq!(media_box, vec![0, 0, 144, 72]);
        assert_eq!(cm, vec![144, 0, 0, 72, 0, 0]);
        assert_eq!(size, (600, 300));
    }

    #[tokio::test]
    async fn test_async_matches_sync() {
        let sync = generate_label_pdf(&FieldConfig::default(), &data(), 203.0).unwrap();
        let asynchronous = generate_label_pdf_async(FieldConfig::default(), data(), 203.0)
            .await
            .unwrap();
        assert_eq!(sync.len(), asynchronous.len());
    }
}
