//! # Label Pipeline Tests
//!
//! End-to-end behavior across modules: data and layout in, TSPL text, raster
//! pixels, PDFs and dispatch accounting out.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::Mutex;

use cardlabel::{
    CardLabelError,
    dispatch::{
        PrintDispatcher, PrintDocument, PrintRequest, PrintResponse, PrinterInfo, print_batch,
    },
    geometry::PreviewScale,
    layout::{BarcodeMode, LabelData, LabelLayout},
    render::{FieldConfig, LabelSurface, generate_label_pdf, render_label_to_canvas, shrink_to_fit},
    scene::{Scene, fabric_to_tspl},
    template::{TemplateEngine, add_size_guards, detect_tokens, interpolate},
    tspl::{FontSize, PrintSettings, Rotation, TextLine, TsplOptions, build_tspl, layout_to_tspl},
};

// ============================================================================
// HELPERS
// ============================================================================

fn card() -> LabelData {
    LabelData {
        title: "Charizard Base Set Unlimited".into(),
        sku: "PKM-004".into(),
        price: "349.99".into(),
        lot: "12".into(),
        condition: "NM".into(),
        barcode: String::new(),
    }
}

fn count_lines(program: &str, keyword: &str) -> usize {
    program
        .lines()
        .filter(|l| l.split(' ').next() == Some(keyword))
        .count()
}

fn position(program: &str, keyword: &str) -> usize {
    program
        .lines()
        .position(|l| l.split(' ').next() == Some(keyword))
        .unwrap()
}

// ============================================================================
// TSPL
// ============================================================================

#[test]
fn program_has_one_size_cls_print_in_order() {
    for n in [0, 1, 5, 40] {
        let mut options = TsplOptions::new();
        for i in 0..n {
            options = options.text(TextLine::new(format!("line {}", i)).at(10, 10 + i));
        }
        let program = build_tspl(&options);

        assert_eq!(count_lines(&program, "SIZE"), 1);
        assert_eq!(count_lines(&program, "CLS"), 1);
        assert_eq!(count_lines(&program, "PRINT"), 1);
        assert_eq!(count_lines(&program, "TEXT"), n as usize);
        assert!(position(&program, "SIZE") < position(&program, "CLS"));
        assert!(position(&program, "CLS") < position(&program, "PRINT"));
        assert!(program.ends_with("PRINT 1\n"));
    }
}

#[test]
fn font_buckets_are_monotonic_and_total() {
    let mut previous = FontSize::One;
    for size in -10..=200 {
        let bucket = FontSize::from_points(size as f32);
        assert!(bucket >= previous, "bucket dropped at {}", size);
        previous = bucket;
    }
    assert_eq!(FontSize::from_points(12.0), FontSize::One);
    assert_eq!(FontSize::from_points(18.0), FontSize::Two);
    assert_eq!(FontSize::from_points(24.0), FontSize::Three);
    assert_eq!(FontSize::from_points(32.0), FontSize::Four);
    assert_eq!(FontSize::from_points(33.0), FontSize::Five);
}

#[test]
fn rotation_buckets_wrap() {
    assert_eq!(Rotation::from_degrees(-10.0), Rotation::from_degrees(350.0));
    assert_eq!(Rotation::from_degrees(-90.0), Rotation::R270);
    assert_eq!(Rotation::from_degrees(720.0 + 95.0), Rotation::R90);
}

#[test]
fn layout_program_places_fields_and_qr() {
    let program = build_tspl(&layout_to_tspl(
        &LabelLayout::default(),
        &card(),
        PrintSettings::default(),
    ));

    assert!(program.starts_with("SIZE 2,1\nGAP 0,0\nDENSITY 10\nSPEED 4\n"));
    assert!(program.contains("\"$349.99\""));
    assert!(program.contains("\"SKU: PKM-004\""));
    assert!(program.contains("QRCODE 10,100,M,4,A,0,\"PKM-004\""));
}

#[test]
fn layout_program_uses_code128_in_barcode_mode() {
    let mut layout = LabelLayout::default();
    layout.barcode.mode = BarcodeMode::Barcode;
    let program = build_tspl(&layout_to_tspl(&layout, &card(), PrintSettings::default()));
    assert_eq!(count_lines(&program, "QRCODE"), 0);
    assert_eq!(count_lines(&program, "BARCODE"), 1);
}

// ============================================================================
// SCENE
// ============================================================================

#[test]
fn scene_with_two_qr_images_emits_first_only() {
    let scene: Scene = serde_json::from_str(
        r#"{"objects": [
            {"type": "textbox", "left": 10, "top": 10, "text": "Blastoise", "fontSize": 18},
            {"type": "image", "left": 10, "top": 90, "meta": {"type": "qrcode", "data": "PKM-009"}},
            {"type": "image", "left": 250, "top": 90, "meta": {"type": "qrcode", "data": "PKM-010"}}
        ]}"#,
    )
    .unwrap();

    let program = fabric_to_tspl(&scene);
    let qr: Vec<&str> = program.lines().filter(|l| l.starts_with("QRCODE")).collect();
    assert_eq!(qr.len(), 1);
    assert!(qr[0].ends_with("\"PKM-009\""));
}

// ============================================================================
// RASTER
// ============================================================================

fn render(layout: &LabelLayout, data: &LabelData) -> LabelSurface {
    let mut surface = LabelSurface::new(PreviewScale::DOTS);
    render_label_to_canvas(&mut surface, &FieldConfig::from(layout), data, false).unwrap();
    surface
}

#[test]
fn hidden_price_is_omitted_not_faded() {
    let mut layout = LabelLayout::default();
    layout.price.visible = false;

    let with_price = render(&layout, &card());
    let without_price = render(
        &layout,
        &LabelData {
            price: String::new(),
            ..card()
        },
    );

    // the price value makes no difference at all once the field is hidden
    assert_eq!(with_price.as_image().as_raw(), without_price.as_image().as_raw());

    let visible = render(&LabelLayout::default(), &card());
    assert_ne!(visible.as_image().as_raw(), with_price.as_image().as_raw());
}

#[test]
fn shrink_to_fit_stays_within_bounds() {
    let long = "W".repeat(300);
    let samples = [
        "A",
        "Charizard",
        "Pikachu Illustrator Promo CoroCoro 1998 PSA 10 Gem Mint",
        long.as_str(),
    ];
    for text in samples {
        for (w, h) in [(1.0, 1.0), (50.0, 20.0), (120.0, 60.0), (400.0, 200.0), (5000.0, 5000.0)] {
            let size = shrink_to_fit(text, w, h);
            assert!((8.0..=40.0).contains(&size), "{} in {}x{} gave {}", text, w, h, size);
        }
    }
}

#[test]
fn pdf_is_single_page() {
    let pdf = generate_label_pdf(&FieldConfig::default(), &card(), 203.0).unwrap();
    let doc = lopdf::Document::load_mem(&pdf).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

// ============================================================================
// TEMPLATES
// ============================================================================

#[test]
fn template_round_trip_leaves_no_tokens() {
    let body = "^XA\n^FO20,20^FD{{title}}^FS\n^FO20,60^FD{{sku}} {{price}}^FS\n^FO20,100^FD{{title}}^FS\n^XZ";
    assert_eq!(detect_tokens(body), vec!["title", "sku", "price"]);

    let values: HashMap<String, String> = card().to_values();
    let filled = interpolate(body, &values).unwrap();
    assert!(!filled.contains("{{"));

    let guarded = add_size_guards(&filled, TemplateEngine::Zpl);
    assert_eq!(add_size_guards(&guarded, TemplateEngine::Zpl), guarded);
    assert!(guarded.starts_with("^XA\n^PW406\n^LL203\n"));
}

#[test]
fn template_missing_value_is_reported() {
    let err = interpolate("{{grade}}", &card().to_values()).unwrap_err();
    assert!(matches!(err, CardLabelError::MissingVariable(ref t) if t == "grade"));
}

// ============================================================================
// DISPATCH
// ============================================================================

#[derive(Default)]
struct MockPrinter {
    received: Mutex<Vec<String>>,
}

#[async_trait]
impl PrintDispatcher for MockPrinter {
    async fn list_printers(&self) -> Result<Vec<PrinterInfo>, CardLabelError> {
        Ok(Vec::new())
    }

    async fn submit(&self, request: &PrintRequest) -> Result<PrintResponse, CardLabelError> {
        let text = String::from_utf8_lossy(request.document.as_bytes()).into_owned();
        self.received.lock().unwrap().push(text);
        Ok(PrintResponse::ok(None))
    }
}

#[tokio::test]
async fn batch_with_failed_transcode_prints_the_rest() {
    let printer = MockPrinter::default();
    let labels = vec![
        LabelData { sku: "PKM-001".into(), ..card() },
        LabelData { sku: "PKM-002".into(), ..card() },
        LabelData { sku: "PKM-003".into(), ..card() },
    ];

    let outcome = print_batch(&printer, "Zebra", 1, labels, |data| async move {
        if data.sku == "PKM-002" {
            return Err(CardLabelError::Transcode("surface encode failed".into()));
        }
        let options = layout_to_tspl(&LabelLayout::default(), &data, PrintSettings::default());
        Ok(PrintDocument::Raw(build_tspl(&options)))
    })
    .await;

    assert_eq!((outcome.success_count, outcome.failed_count), (2, 1));

    let received = printer.received.lock().unwrap();
    assert_eq!(received.len(), 2);
    assert!(received[0].contains("PKM-001"));
    assert!(received[1].contains("PKM-003"));
}
