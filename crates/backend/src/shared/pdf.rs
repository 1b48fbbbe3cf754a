use anyhow::Context;
use contracts::domain::calibration::aggregate::CalibrationData;
use printpdf::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Flowing write position on the page; lines are placed at the current
/// height and the cursor only ever moves down.
struct TextCursor<'a> {
    layer: &'a PdfLayerReference,
    font: &'a IndirectFontRef,
    y: Mm,
}

impl TextCursor<'_> {
    fn line(&mut self, x: Mm, size: f32, text: &str) {
        self.layer.begin_text_section();
        self.layer.set_font(self.font, size as _);
        self.layer.set_text_cursor(x, self.y);
        self.layer.write_text(text, self.font);
        self.layer.end_text_section();
    }

    fn advance(&mut self, dy: Mm) {
        self.y = self.y - dy;
    }
}

/// Render `data` as an A4 certificate at `output_path`.
pub fn generate_certificate(data: &CalibrationData, output_path: &Path) -> anyhow::Result<()> {
    let (doc, page1, layer1) =
        PdfDocument::new("Calibration Certificate", Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .context("loading builtin font")?;

    let mut cursor = TextCursor {
        layer: &layer,
        font: &font,
        y: Mm(280.0),
    };

    cursor.line(Mm(105.0), 20.0, "Calibration Certificate");
    cursor.advance(Mm(20.0));

    cursor.line(Mm(20.0), 12.0, &format!("Company: {}", data.company_name));
    cursor.advance(Mm(10.0));
    if let Some(customer) = &data.customer {
        cursor.line(Mm(20.0), 12.0, &format!("Customer: {}", customer));
        cursor.advance(Mm(10.0));
    }
    cursor.line(
        Mm(20.0),
        12.0,
        &format!("Certificate Number: {}", data.certificate_number),
    );
    cursor.advance(Mm(10.0));
    cursor.line(Mm(20.0), 12.0, &format!("PO Number: {}", data.po_number));
    cursor.advance(Mm(10.0));
    cursor.line(
        Mm(20.0),
        12.0,
        &format!("Model Details: {}", data.model_details),
    );
    cursor.advance(Mm(10.0));
    cursor.line(
        Mm(20.0),
        12.0,
        &format!("Calibration Date: {}", data.calibration_date),
    );
    cursor.advance(Mm(20.0));

    cursor.line(Mm(20.0), 14.0, "Calibration Measurements:");
    cursor.advance(Mm(10.0));

    for measurement in &data.measurements {
        cursor.line(Mm(30.0), 12.0, &format!("Measurement: {}", measurement.name));
        cursor.advance(Mm(10.0));
        cursor.line(Mm(40.0), 12.0, &format!("Voltage: {} V", measurement.voltage));
        cursor.advance(Mm(10.0));
        cursor.line(Mm(40.0), 12.0, &format!("Current: {} A", measurement.current));
        cursor.advance(Mm(10.0));
        cursor.line(
            Mm(40.0),
            12.0,
            &format!("Frequency: {} Hz", measurement.frequency),
        );
        cursor.advance(Mm(10.0));
        cursor.line(Mm(40.0), 12.0, &format!("Power: {} W", measurement.power));
        cursor.advance(Mm(15.0));
    }

    let file = File::create(output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer).context("writing pdf")?;
    Ok(())
}
