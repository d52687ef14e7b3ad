//! Terminal rendering of client records.

use cadastro_api::ClientResponse;
use chrono::NaiveDate;
use comfy_table::{Table, presets};
use std::fmt::Write as _;

/// Mask a CPF as `NNN.NNN.NNN-NN` when it has exactly eleven digits;
/// anything else is shown as-is.
pub fn format_cpf(cpf: &str) -> String {
    let digits: String = cpf.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 11 {
        return cpf.to_string();
    }
    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "Não informado".to_string())
}

fn format_sexo(sexo: Option<&str>) -> &str {
    match sexo {
        Some("M") => "Masculino",
        Some("F") => "Feminino",
        _ => "Não informado",
    }
}

fn format_status(ativo: bool) -> &'static str {
    if ativo { "Ativo" } else { "Inativo" }
}

/// Results table for the search command
pub fn clients_table(items: &[ClientResponse]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_header(vec!["ID", "CPF", "Nome", "Cidade", "UF", "Status"]);
    for client in items {
        table.add_row(vec![
            client.id_cliente.to_string(),
            format_cpf(&client.cpf),
            client.nome_completo.clone(),
            client.cidade.clone().unwrap_or_default(),
            client.uf.clone().unwrap_or_default(),
            format_status(client.ativo).to_string(),
        ]);
    }
    table
}

/// Detail view for a single record
pub fn client_details(client: &ClientResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Informações Pessoais");
    let _ = writeln!(out, "  Nome Completo:      {}", client.nome_completo);
    let _ = writeln!(out, "  CPF:                {}", format_cpf(&client.cpf));
    let _ = writeln!(
        out,
        "  Data de Nascimento: {}",
        format_date(client.data_nascimento)
    );
    let _ = writeln!(out, "  Sexo:               {}", format_sexo(client.sexo.as_deref()));
    let _ = writeln!(
        out,
        "  Nome da Mãe:        {}",
        client.nome_mae.as_deref().unwrap_or("Não informado")
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Informações do Sistema");
    let _ = writeln!(out, "  Status:             {}", format_status(client.ativo));
    let _ = writeln!(
        out,
        "  Data de Cadastro:   {}",
        client.created_at.format("%d/%m/%Y")
    );
    let _ = writeln!(out, "  ID do Cliente:      {}", client.id_cliente);
    out
}
