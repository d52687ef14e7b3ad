/// Static navigation hub; no data dependency.
pub fn run() -> anyhow::Result<()> {
    println!("Cadastro — Sistema de Clientes");
    println!();
    println!("  search   Busque clientes por CPF, nome, cidade e outros filtros");
    println!("  show     Veja os detalhes completos de um cliente");
    println!("  export   Gere relatórios em Excel, CSV ou PDF");
    println!("  login    Autentique-se e armazene o token de acesso");
    println!("  logout   Remova o token armazenado");
    println!();
    println!("Use 'cadastro-cli <comando> --help' para detalhes.");
    Ok(())
}
