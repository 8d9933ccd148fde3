//! Interface de linha de comando do parsesmith baseada em clap.
//!
//! Uma única opção obrigatória, `--target`, com o nome do banco cujo
//! extrato deve ganhar um parser. O restante vem de `parsesmith.toml`.

use clap::Parser;

/// parsesmith — gera e valida parsers de extratos bancários com um LLM.
#[derive(Debug, Parser)]
#[command(name = "parsesmith", version, about)]
pub struct Cli {
    /// Banco alvo (ex.: icici, sbi). Comparado sem distinção de maiúsculas.
    #[arg(long)]
    pub target: String,
}
