//! Server-side rendering of filtered record sets into downloadable files.
//!
//! All three formats share the same display formatting: masked CPF,
//! `DD/MM/YYYY` dates, expanded sex codes, and `Ativo`/`Inativo` status.

use anyhow::Result;
use cadastro_api::{ClientResponse, ExportFormat};
use chrono::{DateTime, NaiveDate, Utc};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};

use common::cpf::format_cpf;

const CSV_COLUMNS: [&str; 10] = [
    "ID",
    "CPF",
    "Nome Completo",
    "Data de Nascimento",
    "Sexo",
    "Nome da Mãe",
    "Cidade",
    "UF",
    "Status",
    "Data de Cadastro",
];

/// Render the record set in the requested format
pub fn render(format: ExportFormat, clients: &[ClientResponse]) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => to_csv(clients),
        ExportFormat::Excel => to_excel(clients),
        ExportFormat::Pdf => to_pdf(clients),
    }
}

fn display_row(client: &ClientResponse) -> Vec<String> {
    vec![
        client.id_cliente.to_string(),
        format_cpf(&client.cpf),
        client.nome_completo.clone(),
        format_date(client.data_nascimento),
        format_sexo(client.sexo.as_deref()),
        client.nome_mae.clone().unwrap_or_default(),
        client.cidade.clone().unwrap_or_default(),
        client.uf.clone().unwrap_or_default(),
        format_status(client.ativo),
        format_timestamp(&client.created_at),
    ]
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%d/%m/%Y %H:%M").to_string()
}

fn format_sexo(sexo: Option<&str>) -> String {
    match sexo {
        Some("M") => "Masculino".to_string(),
        Some("F") => "Feminino".to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn format_status(ativo: bool) -> String {
    if ativo { "Ativo" } else { "Inativo" }.to_string()
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// Semicolon-delimited CSV with a UTF-8 BOM so spreadsheet tools pick up
/// the encoding.
fn to_csv(clients: &[ClientResponse]) -> Result<Vec<u8>> {
    let mut buffer = vec![0xEF, 0xBB, 0xBF];
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .from_writer(&mut buffer);
        writer.write_record(CSV_COLUMNS)?;
        for client in clients {
            writer.write_record(display_row(client))?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

fn to_excel(clients: &[ClientResponse]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x366092))
        .set_align(FormatAlign::Center);

    let rows: Vec<Vec<String>> = clients.iter().map(display_row).collect();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Clientes")?;

    for (col, header) in CSV_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }
    for (row, values) in rows.iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            worksheet.write_string(row as u32 + 1, col as u16, value.as_str())?;
        }
    }

    // Fit column widths to the longest cell, capped like a sane spreadsheet
    for (col, header) in CSV_COLUMNS.iter().enumerate() {
        let max_len = rows
            .iter()
            .map(|values| values[col].chars().count())
            .chain(std::iter::once(header.chars().count()))
            .max()
            .unwrap_or(0);
        let width = (max_len + 2).min(50) as f64;
        worksheet.set_column_width(col as u16, width)?;
    }

    Ok(workbook.save_to_buffer()?)
}

const PDF_COLUMNS: [&str; 8] = ["ID", "Nome", "CPF", "Data Nasc.", "Sexo", "Cidade", "UF", "Status"];
const PDF_COLUMN_X: [f32; 8] = [15.0, 28.0, 90.0, 122.0, 145.0, 162.0, 186.0, 194.0];

fn pdf_header_row(layer: &PdfLayerReference, bold: &IndirectFontRef, y: f32) {
    for (i, header) in PDF_COLUMNS.iter().enumerate() {
        layer.use_text(*header, 9.0, Mm(PDF_COLUMN_X[i]), Mm(y), bold);
    }
}

/// A4 tabular report with title, generation timestamp and total count.
fn to_pdf(clients: &[ClientResponse]) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new("Relatório de Clientes", Mm(210.0), Mm(297.0), "Layer 1");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);

    layer.use_text("Relatório de Clientes", 16.0, Mm(70.0), Mm(280.0), &bold);
    layer.use_text(
        format!("Data de geração: {}", format_timestamp(&Utc::now())),
        10.0,
        Mm(15.0),
        Mm(271.0),
        &font,
    );

    let mut y = 262.0;
    pdf_header_row(&layer, &bold, y);
    y -= 6.0;

    for client in clients {
        if y < 15.0 {
            let (page, page_layer) = doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
            y = 282.0;
            pdf_header_row(&layer, &bold, y);
            y -= 6.0;
        }

        let values = [
            client.id_cliente.to_string(),
            truncate(&client.nome_completo, 30),
            format_cpf(&client.cpf),
            format_date(client.data_nascimento),
            format_sexo(client.sexo.as_deref()),
            truncate(client.cidade.as_deref().unwrap_or_default(), 12),
            client.uf.clone().unwrap_or_default(),
            format_status(client.ativo),
        ];
        for (i, value) in values.iter().enumerate() {
            layer.use_text(value.as_str(), 9.0, Mm(PDF_COLUMN_X[i]), Mm(y), &font);
        }
        y -= 5.0;
    }

    if y < 20.0 {
        let (page, page_layer) = doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
        layer = doc.get_page(page).get_layer(page_layer);
        y = 282.0;
    }
    layer.use_text(
        format!("Total de clientes: {}", clients.len()),
        10.0,
        Mm(15.0),
        Mm(y - 6.0),
        &font,
    );

    Ok(doc.save_to_bytes()?)
}
